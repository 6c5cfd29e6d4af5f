//! Streaming scheduler: prebuffering, steady-state refills and underruns.
//!
//! ## State machine
//!
//! ```text
//!            start()                 available >= threshold
//!   Idle ─────────────► Prebuffering ──────────────────────► Streaming
//!    ▲                       │                                   │
//!    └──────── stop() ───────┴───────────── stop() ──────────────┘
//! ```
//!
//! ## Refill policy (Streaming)
//!
//! For each half flagged by [`FillFlags`]:
//!
//! | Host bytes available | Action |
//! |----------------------|--------|
//! | ≥ one half | full fill |
//! | ≥ one frame | partial fill, then hold-pad with the last frame |
//! | < one frame | underrun: hold-pad the whole half |
//!
//! Holding the last rendered frame is far less audible than dropping to
//! zero. No path blocks waiting for data.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{debug, info, warn};

use crate::codec::{fill_hold, interleave, silence, whole_frame_bytes};
use crate::config::Config;
use crate::constants::{
    BYTES_PER_FRAME, CHANNELS, FRAMES_PER_HALF, SAMPLE_RATE_HZ, WIRE_BYTES_PER_HALF,
};
use crate::error::Error;
use crate::frame::Frame;
use crate::host::HostStream;
use crate::render::Renderer;

use super::{FillFlags, Half, OutputSink, PopSequencer, StreamState, StreamStats};

/// Moves host audio into the sink's half-buffers.
pub struct Scheduler<'a, H, K> {
    flags: &'a FillFlags,
    host: H,
    sink: K,
    state: StreamState,
    prebuffer_bytes: usize,
    /// Scratch for one half of wire bytes.
    wire: [u8; WIRE_BYTES_PER_HALF],
    /// Scratch for one half of rendered frames.
    frames: [Frame; FRAMES_PER_HALF],
    /// Last frame written from host data; repeated on underrun.
    held: Frame,
    stats: StreamStats,
}

impl<'a, H, K> Scheduler<'a, H, K>
where
    H: HostStream,
    K: OutputSink,
{
    pub fn new(flags: &'a FillFlags, host: H, sink: K, config: &Config) -> Self {
        Scheduler {
            flags,
            host,
            sink,
            state: StreamState::Idle,
            prebuffer_bytes: config.prebuffer_bytes(),
            wire: [0; WIRE_BYTES_PER_HALF],
            frames: [Frame::SILENCE; FRAMES_PER_HALF],
            held: Frame::SILENCE,
            stats: StreamStats::default(),
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Frame repeated by hold padding.
    pub fn held(&self) -> Frame {
        self.held
    }

    pub fn flags(&self) -> &'a FillFlags {
        self.flags
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    /// Host stream opened. Ignored unless idle.
    ///
    /// Both halves go silent, the held frame and filter state are zeroed and
    /// the scheduler waits for the prebuffer threshold. The sink keeps
    /// running on silence meanwhile.
    pub fn start(&mut self, renderer: &mut Renderer) {
        if self.state != StreamState::Idle {
            return;
        }

        for half in Half::ALL {
            silence(self.sink.half_mut(half));
        }
        self.held = Frame::SILENCE;
        self.flags.clear_all();
        renderer.reset_filters();

        let rate = self.host.sample_rate();
        if rate != SAMPLE_RATE_HZ {
            warn!("stream: host rate {} Hz, output runs at {} Hz", rate, SAMPLE_RATE_HZ);
        }

        self.state = StreamState::Prebuffering;
        info!("stream: prebuffering ({} bytes)", self.prebuffer_bytes);
    }

    /// Host stream closed. Ignored when already idle.
    pub fn stop<M, A, D>(
        &mut self,
        sequencer: &mut PopSequencer<M, A, D>,
        muted: bool,
    ) -> Result<(), Error<K::Error, M::Error>>
    where
        M: OutputPin,
        A: OutputPin<Error = M::Error>,
        D: DelayNs,
    {
        if self.state == StreamState::Idle {
            return Ok(());
        }
        self.state = StreamState::Idle;
        info!("stream: idle");
        sequencer.stop_stream(&mut self.sink, muted)
    }

    /// One task-loop pass. Never blocks.
    pub fn service<M, A, D>(
        &mut self,
        renderer: &mut Renderer,
        sequencer: &mut PopSequencer<M, A, D>,
    ) -> Result<(), Error<K::Error, M::Error>>
    where
        M: OutputPin,
        A: OutputPin<Error = M::Error>,
        D: DelayNs,
    {
        match self.state {
            StreamState::Idle => Ok(()),
            StreamState::Prebuffering => self.service_prebuffer(renderer, sequencer),
            StreamState::Streaming => {
                self.service_streaming(renderer);
                Ok(())
            }
        }
    }

    fn service_prebuffer<M, A, D>(
        &mut self,
        renderer: &mut Renderer,
        sequencer: &mut PopSequencer<M, A, D>,
    ) -> Result<(), Error<K::Error, M::Error>>
    where
        M: OutputPin,
        A: OutputPin<Error = M::Error>,
        D: DelayNs,
    {
        if self.host.available() < self.prebuffer_bytes {
            return Ok(());
        }

        self.fill(Half::First, WIRE_BYTES_PER_HALF, renderer);
        if self.host.available() >= WIRE_BYTES_PER_HALF {
            self.fill(Half::Second, WIRE_BYTES_PER_HALF, renderer);
        }

        sequencer.restart(&mut self.sink)?;
        self.flags.clear_all();
        self.state = StreamState::Streaming;
        info!("stream: streaming");
        Ok(())
    }

    fn service_streaming(&mut self, renderer: &mut Renderer) {
        for half in Half::ALL {
            if !self.flags.needs_fill(half) {
                continue;
            }
            let available = self.host.available();
            if available >= BYTES_PER_FRAME {
                self.fill(half, available, renderer);
            } else {
                self.hold(half);
            }
            self.flags.clear(half);
        }
    }

    /// Render up to `budget` bytes of host data into `half`, hold-padding
    /// whatever the data does not cover. Returns the frames rendered.
    fn fill(&mut self, half: Half, budget: usize, renderer: &mut Renderer) -> usize {
        let want = whole_frame_bytes(budget.min(WIRE_BYTES_PER_HALF));
        let read = self.host.read(&mut self.wire[..want]);
        let volume = self.host.volume_db();
        let count = renderer.render(&self.wire[..read], &mut self.frames, volume);

        if count == 0 {
            self.hold(half);
            return 0;
        }
        self.held = self.frames[count - 1];

        let words = count * CHANNELS;
        let dest = self.sink.half_mut(half);
        interleave(&mut dest[..words], &self.frames[..count]);
        fill_hold(&mut dest[words..], self.held);

        if count == FRAMES_PER_HALF {
            self.stats.full_fills = self.stats.full_fills.wrapping_add(1);
        } else {
            self.stats.partial_fills = self.stats.partial_fills.wrapping_add(1);
            debug!("stream: partial fill {:?}, {} frames", half, count);
        }
        count
    }

    /// Fill `half` entirely with the held frame.
    fn hold(&mut self, half: Half) {
        fill_hold(self.sink.half_mut(half), self.held);
        self.stats.underruns = self.stats.underruns.wrapping_add(1);
        warn!("stream: underrun on {:?}", half);
    }
}
