//! The owned pipeline context.
//!
//! [`Pipeline`] bundles the scheduler, the renderer and the pop sequencer
//! and is the single entry point for the firmware's task loop, the USB class
//! callbacks and the UI. The ISR side only ever touches the shared
//! [`FillFlags`].
//!
//! ```ignore
//! static FLAGS: FillFlags = FillFlags::new();
//!
//! let mut pipeline = Pipeline::new(&FLAGS, usb, i2s, dac_mute, amp_en, delay, Config::default());
//! pipeline.restore(&stored_settings)?;
//! pipeline.init()?;
//! loop {
//!     pipeline.task()?;
//! }
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::Config;
use crate::eq::Band;
use crate::error::{Error, ProfileError};
use crate::gain::PowerTier;
use crate::host::HostStream;
use crate::output::{FillFlags, OutputSink, PopSequencer, Scheduler, StreamState, StreamStats};
use crate::profile::{Profile, ProfileStore};
use crate::render::Renderer;
use crate::settings::Settings;

/// Result of any operation that may drive the sink or a control pin.
pub type PipelineResult<K, M> = Result<
    (),
    Error<<K as OutputSink>::Error, <M as embedded_hal::digital::ErrorType>::Error>,
>;

/// Audio output pipeline for one USB audio stream.
pub struct Pipeline<'a, H, K, M, A, D> {
    scheduler: Scheduler<'a, H, K>,
    renderer: Renderer,
    sequencer: PopSequencer<M, A, D>,
    host_muted: bool,
}

impl<'a, H, K, M, A, D> Pipeline<'a, H, K, M, A, D>
where
    H: HostStream,
    K: OutputSink,
    M: OutputPin,
    A: OutputPin<Error = M::Error>,
    D: DelayNs,
{
    /// Assemble the pipeline. No hardware is touched until
    /// [`init`](Self::init).
    pub fn new(
        flags: &'a FillFlags,
        host: H,
        sink: K,
        dac_mute: M,
        amp_enable: A,
        delay: D,
        config: Config,
    ) -> Self {
        Pipeline {
            scheduler: Scheduler::new(flags, host, sink, &config),
            renderer: Renderer::new(&config),
            sequencer: PopSequencer::new(dac_mute, amp_enable, delay, config.amp_settle_ms),
            host_muted: false,
        }
    }

    /// Power-up sequence. Blocks for the amplifier settle delay.
    pub fn init(&mut self) -> PipelineResult<K, M> {
        let muted = self.is_muted();
        self.sequencer.power_up(self.scheduler.sink_mut(), muted)
    }

    /// Apply persisted settings (see [`Renderer::restore`]).
    pub fn restore(&mut self, settings: &Settings) -> PipelineResult<K, M> {
        self.renderer.restore(settings);
        self.apply_mute()
    }

    /// Current settings for the persistence collaborator.
    pub fn snapshot(&self) -> Settings {
        self.renderer.snapshot()
    }

    // ── Streaming ───────────────────────────────────────────────────────

    /// Host opened the stream.
    pub fn start_streaming(&mut self) {
        self.scheduler.start(&mut self.renderer);
    }

    /// Host closed the stream.
    pub fn stop_streaming(&mut self) -> PipelineResult<K, M> {
        let muted = self.is_muted();
        self.scheduler.stop(&mut self.sequencer, muted)
    }

    /// One cooperative task-loop pass.
    pub fn task(&mut self) -> PipelineResult<K, M> {
        self.scheduler.service(&mut self.renderer, &mut self.sequencer)
    }

    pub fn state(&self) -> StreamState {
        self.scheduler.state()
    }

    pub fn stats(&self) -> StreamStats {
        self.scheduler.stats()
    }

    pub fn reset_stats(&mut self) {
        self.scheduler.reset_stats();
    }

    pub fn flags(&self) -> &'a FillFlags {
        self.scheduler.flags()
    }

    pub fn scheduler(&self) -> &Scheduler<'a, H, K> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler<'a, H, K> {
        &mut self.scheduler
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    // ── Mute and gain ───────────────────────────────────────────────────

    /// Host or local mute.
    pub fn is_muted(&self) -> bool {
        self.host_muted || self.renderer.is_local_muted()
    }

    fn apply_mute(&mut self) -> PipelineResult<K, M> {
        let muted = self.is_muted();
        self.sequencer.apply_mute(muted).map_err(Error::Pin)
    }

    pub fn set_host_mute(&mut self, muted: bool) -> PipelineResult<K, M> {
        self.host_muted = muted;
        self.apply_mute()
    }

    pub fn is_host_muted(&self) -> bool {
        self.host_muted
    }

    pub fn set_local_mute(&mut self, muted: bool) -> PipelineResult<K, M> {
        self.renderer.set_local_muted(muted);
        self.apply_mute()
    }

    pub fn toggle_local_mute(&mut self) -> PipelineResult<K, M> {
        let muted = !self.renderer.is_local_muted();
        self.set_local_mute(muted)
    }

    pub fn is_local_muted(&self) -> bool {
        self.renderer.is_local_muted()
    }

    pub fn set_local_volume(&mut self, volume: u8) {
        self.renderer.set_local_volume(volume);
    }

    pub fn local_volume(&self) -> u8 {
        self.renderer.local_volume()
    }

    pub fn set_power_tier(&mut self, tier: PowerTier) {
        self.renderer.set_power_tier(tier);
    }

    // ── EQ ──────────────────────────────────────────────────────────────

    pub fn set_band(&mut self, band: Band, level: i8) {
        self.renderer.set_band(band, level);
    }

    pub fn band(&self, band: Band) -> i8 {
        self.renderer.band(band)
    }

    pub fn set_eq_enabled(&mut self, enabled: bool) {
        self.renderer.set_eq_enabled(enabled);
    }

    pub fn set_active_profile(&mut self, id: Option<u8>) -> Result<(), ProfileError> {
        self.renderer.set_active_profile(id)
    }

    pub fn active_profile(&self) -> Option<u8> {
        self.renderer.active_profile()
    }

    pub fn active_profile_name(&self) -> &str {
        self.renderer.active_profile_name()
    }

    pub fn store_profile(&mut self, id: u8, profile: Profile) -> Result<(), ProfileError> {
        self.renderer.store_profile(id, profile)
    }

    pub fn delete_profile(&mut self, id: u8) -> Result<(), ProfileError> {
        self.renderer.delete_profile(id)
    }

    pub fn profiles(&self) -> &ProfileStore {
        self.renderer.profiles()
    }
}
