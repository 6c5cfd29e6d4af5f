//! Pop-free control of the DAC mute line, amplifier enable and sink.
//!
//! The DAC must only be unmuted while the sink is transmitting a defined
//! signal, and the amplifier must only be enabled once that signal has
//! settled. Every sink start and stop in the pipeline goes through here.
//!
//! Generic over any [`embedded_hal::digital::OutputPin`] pair and
//! [`embedded_hal::delay::DelayNs`] provider.
//!
//! | Line | High | Low |
//! |------|------|-----|
//! | DAC mute | unmuted | muted |
//! | Amplifier enable | enabled | disabled |

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::info;

use crate::codec::silence;
use crate::error::Error;

use super::{Half, OutputSink};

/// DAC mute / amplifier enable sequencer.
pub struct PopSequencer<M, A, D> {
    dac_mute: M,
    amp_enable: A,
    delay: D,
    settle_ms: u32,
    sink_running: bool,
}

impl<M, A, D> PopSequencer<M, A, D>
where
    M: OutputPin,
    A: OutputPin<Error = M::Error>,
    D: DelayNs,
{
    /// Take ownership of the control lines. Nothing is driven until
    /// [`power_up`](Self::power_up).
    pub fn new(dac_mute: M, amp_enable: A, delay: D, settle_ms: u32) -> Self {
        PopSequencer {
            dac_mute,
            amp_enable,
            delay,
            settle_ms,
            sink_running: false,
        }
    }

    /// Whether the sink was last left running.
    pub fn is_sink_running(&self) -> bool {
        self.sink_running
    }

    /// Release the control lines and delay provider.
    pub fn release(self) -> (M, A, D) {
        (self.dac_mute, self.amp_enable, self.delay)
    }

    fn start_sink<K: OutputSink>(&mut self, sink: &mut K) -> Result<(), Error<K::Error, M::Error>> {
        sink.start().map_err(Error::<K::Error, M::Error>::Sink)?;
        self.sink_running = true;
        Ok(())
    }

    fn stop_sink<K: OutputSink>(&mut self, sink: &mut K) -> Result<(), Error<K::Error, M::Error>> {
        if self.sink_running {
            sink.stop().map_err(Error::<K::Error, M::Error>::Sink)?;
            self.sink_running = false;
        }
        Ok(())
    }

    fn silence_halves<K: OutputSink>(sink: &mut K) {
        for half in Half::ALL {
            silence(sink.half_mut(half));
        }
    }

    /// Cold start: bring the sink up on silence and enable the amplifier once
    /// the DAC output has settled. `muted` is the combined host/local mute
    /// applied at the end.
    ///
    /// Blocks for the settle delay.
    pub fn power_up<K: OutputSink>(
        &mut self,
        sink: &mut K,
        muted: bool,
    ) -> Result<(), Error<K::Error, M::Error>> {
        let pin = Error::<K::Error, M::Error>::Pin;

        self.dac_mute.set_low().map_err(pin)?;
        self.amp_enable.set_low().map_err(pin)?;

        Self::silence_halves(sink);
        self.start_sink(sink)?;

        self.dac_mute.set_high().map_err(pin)?;
        self.delay.delay_ms(self.settle_ms);
        self.amp_enable.set_high().map_err(pin)?;

        self.apply_mute(muted).map_err(pin)?;
        info!("output: powered up ({} ms settle)", self.settle_ms);
        Ok(())
    }

    /// Stream stop: restart the sink on silence behind a muted DAC. The
    /// amplifier stays enabled.
    pub fn stop_stream<K: OutputSink>(
        &mut self,
        sink: &mut K,
        muted: bool,
    ) -> Result<(), Error<K::Error, M::Error>> {
        let pin = Error::<K::Error, M::Error>::Pin;

        self.dac_mute.set_low().map_err(pin)?;
        self.stop_sink(sink)?;
        Self::silence_halves(sink);
        self.start_sink(sink)?;
        self.apply_mute(muted).map_err(pin)
    }

    /// Restart the sink from the first half with whatever the halves hold.
    pub fn restart<K: OutputSink>(
        &mut self,
        sink: &mut K,
    ) -> Result<(), Error<K::Error, M::Error>> {
        self.stop_sink(sink)?;
        self.start_sink(sink)
    }

    /// Drive the DAC mute line from the combined mute state.
    ///
    /// Unmuting only happens while the sink is running.
    pub fn apply_mute(&mut self, muted: bool) -> Result<(), M::Error> {
        if muted {
            self.dac_mute.set_low()
        } else if self.sink_running {
            self.dac_mute.set_high()
        } else {
            Ok(())
        }
    }
}
