//! Integration tests exercising the full pipeline in software.
//!
//! A mock USB FIFO feeds the pipeline, completions are raised by hand on the
//! shared [`FillFlags`](crate::output::FillFlags), and the mock sink's
//! halves are decoded back into frames:
//!
//! ```text
//! MockHost → Scheduler → Renderer → MockSink halves → deinterleave → asserts
//!                ▲
//!    FillFlags ──┘ (on_half_complete / on_transfer_complete)
//! ```

#[cfg(test)]
mod tests {
    use core::cell::RefCell;

    use heapless::Vec;
    use libm::sinf;

    use crate::codec::pack_frames;
    use crate::codec::slot::{deinterleave, to_slot};
    use crate::config::Config;
    use crate::constants::{
        BYTES_PER_FRAME, FRAMES_PER_HALF, SAMPLE_MAX, SAMPLE_MIN, WIRE_BYTES_PER_HALF,
    };
    use crate::eq::{self, Band, Equalizer};
    use crate::frame::Frame;
    use crate::gain::{Gain, PowerTier};
    use crate::host::HostStream;
    use crate::output::sequencer::mock::{events, Event, Line, Log, MockDelay, MockPin, MockSink};
    use crate::output::{FillFlags, Half, StreamState};
    use crate::pipeline::Pipeline;
    use crate::profile::{BiquadCoefficients, Filter, FilterKind, Profile, ProfileStore};

    // ── Mock USB FIFO ─────────────────────────────────────────────────

    struct MockHost {
        data: Vec<u8, 16384>,
        pos: usize,
        volume_db: i16,
    }

    impl MockHost {
        fn new() -> Self {
            MockHost {
                data: Vec::new(),
                pos: 0,
                volume_db: 0,
            }
        }

        fn push_bytes(&mut self, bytes: &[u8]) {
            let rest = self.data.len() - self.pos;
            self.data.copy_within(self.pos.., 0);
            self.data.truncate(rest);
            self.pos = 0;
            self.data.extend_from_slice(bytes).unwrap();
        }

        fn push_frames(&mut self, frames: &[Frame]) {
            let mut wire = [0u8; WIRE_BYTES_PER_HALF];
            for chunk in frames.chunks(FRAMES_PER_HALF) {
                let n = pack_frames(chunk, &mut wire);
                self.push_bytes(&wire[..n * BYTES_PER_FRAME]);
            }
        }
    }

    impl HostStream for MockHost {
        fn available(&self) -> usize {
            self.data.len() - self.pos
        }

        fn read(&mut self, buf: &mut [u8]) -> usize {
            let n = buf.len().min(self.available());
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            n
        }

        fn volume_db(&self) -> i16 {
            self.volume_db
        }
    }

    // ── Harness ───────────────────────────────────────────────────────

    type TestPipeline<'a> =
        Pipeline<'a, MockHost, MockSink<'a>, MockPin<'a>, MockPin<'a>, MockDelay<'a>>;

    /// Powered-up pipeline: no channel swap, highest power tier.
    fn pipeline<'a>(flags: &'a FillFlags, log: &'a Log) -> TestPipeline<'a> {
        let config = Config {
            swap_channels: false,
            ..Config::default()
        };
        let mut p = Pipeline::new(
            flags,
            MockHost::new(),
            MockSink::new(log),
            MockPin::new(Line::DacMute, log),
            MockPin::new(Line::AmpEnable, log),
            MockDelay { log },
            config,
        );
        p.set_power_tier(PowerTier::High);
        p.init().unwrap();
        p
    }

    fn push(p: &mut TestPipeline<'_>, frames: &[Frame]) {
        p.scheduler_mut().host_mut().push_frames(frames);
    }

    fn ramp(start: i32, step: i32) -> [Frame; FRAMES_PER_HALF] {
        let mut frames = [Frame::SILENCE; FRAMES_PER_HALF];
        for (i, f) in frames.iter_mut().enumerate() {
            let v = start + i as i32 * step;
            *f = Frame::new(v, -v);
        }
        frames
    }

    fn half_frames(p: &TestPipeline<'_>, half: Half) -> [Frame; FRAMES_PER_HALF] {
        let mut frames = [Frame::SILENCE; FRAMES_PER_HALF];
        deinterleave(p.scheduler().sink().half(half), &mut frames);
        frames
    }

    /// Raise the completion for `half` and run one task pass.
    fn complete(p: &mut TestPipeline<'_>, half: Half) {
        match half {
            Half::First => p.flags().on_half_complete(),
            Half::Second => p.flags().on_transfer_complete(),
        }
        p.task().unwrap();
    }

    /// Start the stream and prebuffer three halves of `frames`.
    fn stream(p: &mut TestPipeline<'_>, frames: &[Frame; FRAMES_PER_HALF]) {
        p.start_streaming();
        for _ in 0..3 {
            push(p, frames);
        }
        p.task().unwrap();
        assert_eq!(p.state(), StreamState::Streaming);
    }

    /// Expected flat-path output for `input` at the pipeline's current gain.
    fn flat_expected(
        p: &TestPipeline<'_>,
        input: &[Frame; FRAMES_PER_HALF],
    ) -> [Frame; FRAMES_PER_HALF] {
        let mut expected = *input;
        eq::flat(&mut expected, p.renderer().gain_factor(0));
        expected
    }

    fn tone(freq_hz: f32, amplitude: f32, start: usize) -> [Frame; FRAMES_PER_HALF] {
        let mut frames = [Frame::SILENCE; FRAMES_PER_HALF];
        for (i, f) in frames.iter_mut().enumerate() {
            let t = (start + i) as f32 / 48_000.0;
            let s = (amplitude * sinf(core::f32::consts::TAU * freq_hz * t)) as i32;
            *f = Frame::new(s, s);
        }
        frames
    }

    // ---------------------------------------------------------------
    // Prebuffering
    // ---------------------------------------------------------------
    #[test]
    fn prebuffer_waits_for_threshold() {
        let log = RefCell::new(Vec::new());
        let flags = FillFlags::new();
        let mut p = pipeline(&flags, &log);
        p.set_eq_enabled(false);
        let starts_after_init = p.scheduler().sink().starts;

        p.start_streaming();
        assert_eq!(p.state(), StreamState::Prebuffering);

        let first = ramp(1000, 1000);
        let second = ramp(-500_000, 777);
        push(&mut p, &first);
        push(&mut p, &second);
        p.task().unwrap();

        // Two halves is below the three-half threshold.
        assert_eq!(p.state(), StreamState::Prebuffering);
        assert_eq!(p.scheduler().sink().starts, starts_after_init);
        assert!(half_frames(&p, Half::First).iter().all(|f| *f == Frame::SILENCE));

        push(&mut p, &ramp(0, 1));
        p.task().unwrap();

        assert_eq!(p.state(), StreamState::Streaming);
        assert_eq!(p.scheduler().sink().starts, starts_after_init + 1);
        assert_eq!(half_frames(&p, Half::First), flat_expected(&p, &first));
        assert_eq!(half_frames(&p, Half::Second), flat_expected(&p, &second));
        assert_eq!(p.scheduler().host().available(), WIRE_BYTES_PER_HALF);
    }

    #[test]
    fn prebuffer_ignores_completions() {
        let log = RefCell::new(Vec::new());
        let flags = FillFlags::new();
        let mut p = pipeline(&flags, &log);
        p.start_streaming();
        flags.on_half_complete();
        flags.on_transfer_complete();
        for _ in 0..3 {
            push(&mut p, &ramp(5, 5));
        }
        p.task().unwrap();

        assert_eq!(p.state(), StreamState::Streaming);
        assert!(!flags.needs_fill(Half::First));
        assert!(!flags.needs_fill(Half::Second));
    }

    // ---------------------------------------------------------------
    // Steady state
    // ---------------------------------------------------------------
    #[test]
    fn full_fills_follow_completions() {
        let log = RefCell::new(Vec::new());
        let flags = FillFlags::new();
        let mut p = pipeline(&flags, &log);
        p.set_eq_enabled(false);
        let base = ramp(0, 10);
        stream(&mut p, &base);

        let next = ramp(42, -3);
        push(&mut p, &next);

        // The third prebuffered half comes out first.
        complete(&mut p, Half::First);
        assert_eq!(half_frames(&p, Half::First), flat_expected(&p, &base));
        assert!(!flags.needs_fill(Half::First));

        complete(&mut p, Half::Second);
        assert_eq!(half_frames(&p, Half::Second), flat_expected(&p, &next));
        assert_eq!(p.stats().full_fills, 4);
        assert_eq!(p.stats().underruns, 0);
    }

    #[test]
    fn underrun_repeats_held_frame() {
        let log = RefCell::new(Vec::new());
        let flags = FillFlags::new();
        let mut p = pipeline(&flags, &log);
        p.set_eq_enabled(false);
        stream(&mut p, &ramp(100, 100));

        // Drain the third prebuffered half so the FIFO is empty.
        complete(&mut p, Half::First);
        let held = p.scheduler().held();
        assert_ne!(held, Frame::SILENCE);
        assert_eq!(p.scheduler().host().available(), 0);

        complete(&mut p, Half::Second);

        let word_l = to_slot(held.left);
        let word_r = to_slot(held.right);
        let words = p.scheduler().sink().half(Half::Second);
        assert!(words.chunks_exact(2).all(|w| w[0] == word_l && w[1] == word_r));
        assert_eq!(p.stats().underruns, 1);
        assert_eq!(p.scheduler().held(), held);
    }

    #[test]
    fn partial_fill_hold_pads_remainder() {
        let log = RefCell::new(Vec::new());
        let flags = FillFlags::new();
        let mut p = pipeline(&flags, &log);
        p.set_eq_enabled(false);
        stream(&mut p, &ramp(0, 1));
        complete(&mut p, Half::First);

        let data = ramp(7_000, 13);
        push(&mut p, &data[..100]);
        complete(&mut p, Half::Second);

        let expected = flat_expected(&p, &data);
        let out = half_frames(&p, Half::Second);
        assert_eq!(&out[..100], &expected[..100]);
        assert!(out[100..].iter().all(|f| *f == expected[99]));
        assert_eq!(p.stats().partial_fills, 1);
    }

    #[test]
    fn residue_shorter_than_a_frame_is_starvation() {
        let log = RefCell::new(Vec::new());
        let flags = FillFlags::new();
        let mut p = pipeline(&flags, &log);
        p.set_eq_enabled(false);
        stream(&mut p, &ramp(0, 1));
        complete(&mut p, Half::First);

        let data = ramp(-9_000, 21);
        push(&mut p, &data[..10]);
        p.scheduler_mut().host_mut().push_bytes(&[1, 2, 3]);
        complete(&mut p, Half::Second);
        assert_eq!(p.stats().partial_fills, 1);
        assert_eq!(p.scheduler().host().available(), 3);

        complete(&mut p, Half::First);
        assert_eq!(p.stats().underruns, 1);
        let held = flat_expected(&p, &data)[9];
        assert!(half_frames(&p, Half::First).iter().all(|f| *f == held));
    }

    // ---------------------------------------------------------------
    // EQ through the pipeline
    // ---------------------------------------------------------------
    #[test]
    fn zeros_in_zeros_out_with_default_tone() {
        let log = RefCell::new(Vec::new());
        let flags = FillFlags::new();
        let mut p = pipeline(&flags, &log);
        assert_eq!(p.band(Band::Bass), 0);
        assert_eq!(p.band(Band::Treble), 0);

        let zeros = [Frame::SILENCE; FRAMES_PER_HALF];
        stream(&mut p, &zeros);
        for k in 0..20 {
            push(&mut p, &zeros);
            let half = if k % 2 == 0 { Half::First } else { Half::Second };
            complete(&mut p, half);
            assert!(p.scheduler().sink().half(half).iter().all(|&w| w == 0));
        }
    }

    /// Peak output over the last half of a 100 Hz tone run.
    fn tone_peak(bass: i8) -> i32 {
        let log = RefCell::new(Vec::new());
        let flags = FillFlags::new();
        let mut p = pipeline(&flags, &log);
        p.set_band(Band::Bass, bass);

        let amplitude = SAMPLE_MAX as f32 * 0.9;
        p.start_streaming();
        for k in 0..3 {
            push(&mut p, &tone(100.0, amplitude, k * FRAMES_PER_HALF));
        }
        p.task().unwrap();

        let mut peak = 0;
        for k in 3..203 {
            push(&mut p, &tone(100.0, amplitude, k * FRAMES_PER_HALF));
            let half = if k % 2 == 1 { Half::First } else { Half::Second };
            complete(&mut p, half);
            if k > 100 {
                for f in half_frames(&p, half).iter() {
                    assert!(f.left >= SAMPLE_MIN && f.left <= SAMPLE_MAX);
                    peak = peak.max(f.left.max(-SAMPLE_MAX).abs());
                }
            }
        }
        peak
    }

    #[test]
    fn bass_boost_raises_100hz_within_range() {
        let neutral = tone_peak(-1);
        let boosted = tone_peak(6);
        assert!(boosted > neutral, "neutral {neutral} boosted {boosted}");
        assert!(boosted <= SAMPLE_MAX);
    }

    #[test]
    fn profile_switch_clears_residual_energy() {
        let log = RefCell::new(Vec::new());
        let flags = FillFlags::new();
        let mut p = pipeline(&flags, &log);

        let ringing = Filter::design(FilterKind::Bell, 48_000.0, 100.0, 12.0, 10.0);
        let other = Filter::design(FilterKind::HighShelf, 48_000.0, 4000.0, 3.0, 0.707);
        p.store_profile(1, Profile::from_parts("Ring", &[ringing])).unwrap();
        p.store_profile(2, Profile::from_parts("Air", &[other])).unwrap();
        p.set_active_profile(Some(1)).unwrap();

        let zeros = [Frame::SILENCE; FRAMES_PER_HALF];
        stream(&mut p, &zeros);
        complete(&mut p, Half::First);

        let mut impulse = zeros;
        impulse[0] = Frame::new(4_000_000, 4_000_000);
        push(&mut p, &impulse);
        complete(&mut p, Half::Second);
        push(&mut p, &zeros);
        complete(&mut p, Half::First);
        assert!(half_frames(&p, Half::First).iter().any(|f| f.left != 0));

        p.set_active_profile(Some(2)).unwrap();
        push(&mut p, &zeros);
        complete(&mut p, Half::Second);
        assert!(half_frames(&p, Half::Second).iter().all(|f| *f == Frame::SILENCE));

        // Re-selecting the ringing profile also starts clean.
        p.set_active_profile(Some(1)).unwrap();
        push(&mut p, &impulse);
        complete(&mut p, Half::First);
        p.set_active_profile(Some(1)).unwrap();
        push(&mut p, &zeros);
        complete(&mut p, Half::Second);
        assert!(half_frames(&p, Half::Second).iter().all(|f| *f == Frame::SILENCE));
    }

    #[test]
    fn active_profile_overrides_tone_controls() {
        let log = RefCell::new(Vec::new());
        let flags = FillFlags::new();
        let mut p = pipeline(&flags, &log);
        let identity =
            Filter::new(FilterKind::Bell, BiquadCoefficients::IDENTITY, 1000.0, 0.0, 1.0);
        p.store_profile(0, Profile::from_parts("Id", &[identity])).unwrap();
        p.set_active_profile(Some(0)).unwrap();
        p.set_band(Band::Bass, 6);
        p.set_band(Band::Treble, 6);

        let input = ramp(1_000_000, 5_000);
        stream(&mut p, &input);

        // Identity cascade: pre-attenuation and gain only, bands ignored.
        let expected = flat_expected(&p, &input);
        for (out, exp) in half_frames(&p, Half::First).iter().zip(expected.iter()) {
            assert!((out.left - exp.left).abs() <= 2);
            assert!((out.right - exp.right).abs() <= 2);
        }
    }

    #[test]
    fn flat_contract_holds_for_both_engines() {
        const INPUTS: [i32; 8] = [SAMPLE_MIN, -5_000_001, -4097, -1, 0, 1, 4_194_304, SAMPLE_MAX];

        let mut store = ProfileStore::new();
        let mut dormant = Filter::design(FilterKind::Bell, 48_000.0, 1000.0, 6.0, 1.0);
        dormant.enabled = false;
        store.set(0, Profile::from_parts("Dormant", &[dormant])).unwrap();

        for &q8 in [256u16, 203, 117, 1].iter() {
            let gain = Gain::from_q8(q8);

            let mut two_band = Equalizer::new();
            two_band.set_band(Band::Bass, -1);
            let mut parametric = Equalizer::new();
            parametric.activate(Some(0));

            for &s in INPUTS.iter() {
                let input = Frame::new(s, (-s).min(SAMPLE_MAX));
                let ideal = |x: i32| x as f64 * 2303.0 / 4096.0 * q8 as f64 / 256.0;

                let mut a = [input];
                two_band.process(&mut a, gain, &store);
                let mut b = [input];
                parametric.process(&mut b, gain, &store);

                for (out, engine) in [(a[0], "two-band"), (b[0], "parametric")] {
                    let left = out.left as f64 - ideal(input.left);
                    let right = out.right as f64 - ideal(input.right);
                    assert!(left.abs() < 2.0, "{engine} left s={s} g={q8}");
                    assert!(right.abs() < 2.0, "{engine} right s={s} g={q8}");
                }
                assert!((a[0].right - b[0].right).abs() <= 2, "engines diverge s={s} g={q8}");
            }
        }
    }

    // ---------------------------------------------------------------
    // Mute and sequencing
    // ---------------------------------------------------------------
    #[test]
    fn power_up_order_through_pipeline() {
        let log = RefCell::new(Vec::new());
        let flags = FillFlags::new();
        let p = pipeline(&flags, &log);
        assert_eq!(
            events(&log).as_slice(),
            &[
                Event::DacUnmuted(false),
                Event::AmpEnabled(false),
                Event::SinkStart,
                Event::DacUnmuted(true),
                Event::DelayMs(500),
                Event::AmpEnabled(true),
                Event::DacUnmuted(true),
            ]
        );
        assert_eq!(p.state(), StreamState::Idle);
    }

    #[test]
    fn stop_restarts_sink_on_silence() {
        let log = RefCell::new(Vec::new());
        let flags = FillFlags::new();
        let mut p = pipeline(&flags, &log);
        stream(&mut p, &ramp(1_000, 1_000));
        log.borrow_mut().clear();

        p.stop_streaming().unwrap();

        assert_eq!(p.state(), StreamState::Idle);
        assert_eq!(
            events(&log).as_slice(),
            &[
                Event::DacUnmuted(false),
                Event::SinkStop,
                Event::SinkStart,
                Event::DacUnmuted(true),
            ]
        );
        for half in Half::ALL {
            assert!(p.scheduler().sink().half(half).iter().all(|&w| w == 0));
        }
        assert!(p.scheduler().sink().running);
    }

    #[test]
    fn stop_while_host_muted_stays_muted() {
        let log = RefCell::new(Vec::new());
        let flags = FillFlags::new();
        let mut p = pipeline(&flags, &log);
        stream(&mut p, &ramp(1_000, 1_000));
        p.set_host_mute(true).unwrap();
        log.borrow_mut().clear();

        p.stop_streaming().unwrap();

        assert!(!events(&log).contains(&Event::DacUnmuted(true)));
        assert_eq!(events(&log).last(), Some(&Event::DacUnmuted(false)));
    }

    #[test]
    fn stop_and_start_are_idempotent() {
        let log = RefCell::new(Vec::new());
        let flags = FillFlags::new();
        let mut p = pipeline(&flags, &log);
        log.borrow_mut().clear();

        p.stop_streaming().unwrap();
        assert!(events(&log).is_empty());

        p.start_streaming();
        p.start_streaming();
        assert_eq!(p.state(), StreamState::Prebuffering);

        p.stop_streaming().unwrap();
        let after_first = events(&log).len();
        p.stop_streaming().unwrap();
        assert_eq!(events(&log).len(), after_first);
    }

    #[test]
    fn restart_resets_filter_state() {
        let log = RefCell::new(Vec::new());
        let flags = FillFlags::new();
        let mut p = pipeline(&flags, &log);
        p.set_band(Band::Bass, 6);
        stream(&mut p, &ramp(2_000_000, 100));
        assert!(!p.renderer().equalizer().strategy().is_clear());

        p.stop_streaming().unwrap();
        p.start_streaming();
        assert!(p.renderer().equalizer().strategy().is_clear());
        assert_eq!(p.scheduler().held(), Frame::SILENCE);
    }

    #[test]
    fn combined_mute_drives_dac_line() {
        let log = RefCell::new(Vec::new());
        let flags = FillFlags::new();
        let mut p = pipeline(&flags, &log);
        log.borrow_mut().clear();

        p.set_host_mute(true).unwrap();
        p.toggle_local_mute().unwrap();
        p.set_host_mute(false).unwrap();
        // Local mute still holds the line low.
        assert!(p.is_muted());
        p.toggle_local_mute().unwrap();
        assert!(!p.is_muted());

        assert_eq!(
            events(&log).as_slice(),
            &[
                Event::DacUnmuted(false),
                Event::DacUnmuted(false),
                Event::DacUnmuted(false),
                Event::DacUnmuted(true),
            ]
        );
    }

    #[test]
    fn local_mute_silences_output() {
        let log = RefCell::new(Vec::new());
        let flags = FillFlags::new();
        let mut p = pipeline(&flags, &log);
        p.set_local_mute(true).unwrap();

        stream(&mut p, &ramp(3_000_000, 1_000));
        for half in Half::ALL {
            assert!(p.scheduler().sink().half(half).iter().all(|&w| w == 0));
        }
        assert_eq!(p.renderer().gain_factor(0), Gain::ZERO);
    }

    #[test]
    fn snapshot_reflects_ui_changes() {
        let log = RefCell::new(Vec::new());
        let flags = FillFlags::new();
        let mut p = pipeline(&flags, &log);
        p.set_local_volume(40);
        p.set_band(Band::Treble, -3);
        p.toggle_local_mute().unwrap();

        let s = p.snapshot();
        assert_eq!(s.local_volume, 40);
        assert_eq!(s.treble, -3);
        assert!(s.local_muted);
        assert_eq!(s.active_profile, None);
        assert_eq!(p.active_profile_name(), "OFF");
    }
}
