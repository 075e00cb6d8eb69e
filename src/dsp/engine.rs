//! # Delay Engine
//!
//! The engine ties one [`DelayBuffer`] per channel to the shared
//! parameter state and runs the feedback delay one frame at a time.
//!
//! ## Signal flow (per channel)
//!
//! ```text
//! input ──┬───────────────────────────────────────── × dry ───┐
//!         │                                                   │
//!         └──►(+)──► [DelayBuffer] ──┬── delayed ── × wet ──►(+)──► output
//!              ▲                     │
//!              └──── × feedback ◄────┘
//! ```
//!
//! For every frame and channel:
//!
//! 1. Snapshot the parameters (once per frame, or once per block).
//! 2. `delay_samples = delay_ms * sample_rate / 1000`, clamped to `[0, C - 1]`.
//! 3. Read the delayed tap from the buffer.
//! 4. `output = dry_gain * input + wet_gain * delayed`.
//! 5. Write `input + feedback * delayed` back into the buffer.
//!
//! Nothing in the frame path allocates, locks, or logs.

use std::sync::Arc;

use nih_plug::{nih_debug_assert_eq, nih_debug_assert_failure, nih_log};

use super::delay_line::DelayBuffer;
use super::gain::{ms_to_samples, pct_to_fraction, CachedGain};
use super::interpolate;
use super::lifecycle::{EngineConfig, EngineState};
use super::param_state::{DelayParameters, SharedParameters};
use super::smoother::ParamSmoother;
use crate::error::ConfigureError;

/// The engine is a stereo effect: left and right lanes.
pub const CHANNELS: usize = 2;

/// Glide time for delay time changes.
const DELAY_SMOOTHING_MS: f32 = 50.0;

/// Glide time for feedback and level changes.
const LEVEL_SMOOTHING_MS: f32 = 20.0;

/// Feedback above which a tail is computed from the decay rate. Below it
/// the single echo is all there is.
const TAIL_FEEDBACK_THRESHOLD: f32 = 0.001;

/// Buffers and the configuration they were sized for. Present only once
/// the engine has been configured.
struct Configured {
    config: EngineConfig,
    buffers: [DelayBuffer; CHANNELS],
}

/// Per-parameter smoothers.
struct Smoothers {
    delay_ms: [ParamSmoother; CHANNELS],
    feedback: ParamSmoother,
    wet: ParamSmoother,
    dry: ParamSmoother,
    /// Set by `configure()`/`reset()`: the next frame jumps straight to the
    /// published values instead of gliding from stale ones.
    snap_pending: bool,
}

impl Smoothers {
    fn new() -> Self {
        Self {
            delay_ms: std::array::from_fn(|_| ParamSmoother::new(DELAY_SMOOTHING_MS)),
            feedback: ParamSmoother::new(LEVEL_SMOOTHING_MS),
            wet: ParamSmoother::new(LEVEL_SMOOTHING_MS),
            dry: ParamSmoother::new(LEVEL_SMOOTHING_MS),
            snap_pending: true,
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        for smoother in &mut self.delay_ms {
            smoother.set_sample_rate(sample_rate);
        }
        self.feedback.set_sample_rate(sample_rate);
        self.wet.set_sample_rate(sample_rate);
        self.dry.set_sample_rate(sample_rate);
    }
}

/// A stereo feedback delay with wet/dry mixing.
///
/// The engine owns its buffers outright. Parameters live in an
/// `Arc<SharedParameters>`: clone the handle from [`parameters()`] to
/// write them from the control thread while the audio thread keeps
/// calling [`process_frame()`].
///
/// [`parameters()`]: Self::parameters
/// [`process_frame()`]: Self::process_frame
pub struct DelayEngine {
    params: Arc<SharedParameters>,
    configured: Option<Configured>,
    smoothers: Smoothers,
    wet_gain: CachedGain,
    dry_gain: CachedGain,
}

impl Default for DelayEngine {
    fn default() -> Self {
        Self::new(Arc::new(SharedParameters::default()))
    }
}

impl DelayEngine {
    /// Create an unconfigured engine reading from `params`.
    pub fn new(params: Arc<SharedParameters>) -> Self {
        let initial = params.snapshot();
        Self {
            params,
            configured: None,
            smoothers: Smoothers::new(),
            wet_gain: CachedGain::new(initial.wet_level_db),
            dry_gain: CachedGain::new(initial.dry_level_db),
        }
    }

    /// The shared parameter store this engine reads from.
    pub fn parameters(&self) -> &Arc<SharedParameters> {
        &self.params
    }

    pub fn state(&self) -> EngineState {
        if self.configured.is_some() {
            EngineState::Configured
        } else {
            EngineState::Unconfigured
        }
    }

    /// The active configuration, if any.
    pub fn config(&self) -> Option<&EngineConfig> {
        self.configured.as_ref().map(|configured| &configured.config)
    }

    /// Size both buffers for `sample_rate` and `max_delay_ms`, silence
    /// them, and rewind the write heads.
    ///
    /// Must run before the first [`process_frame()`](Self::process_frame)
    /// and again whenever the sample rate changes. This may allocate, so
    /// call it from the control thread only and never while audio is being
    /// processed. When the capacity is unchanged the existing buffers are
    /// cleared in place.
    ///
    /// On error the engine keeps its previous configuration.
    pub fn configure(&mut self, sample_rate: f32, max_delay_ms: f32) -> Result<(), ConfigureError> {
        let config = EngineConfig::new(sample_rate, max_delay_ms)?;

        match self.configured.as_mut() {
            Some(configured) if configured.config.capacity() == config.capacity() => {
                for buffer in &mut configured.buffers {
                    buffer.clear();
                }
                configured.config = config;
            }
            _ => {
                let capacity = config.capacity();
                self.configured = Some(Configured {
                    config,
                    buffers: std::array::from_fn(|_| DelayBuffer::new(capacity)),
                });
            }
        }

        self.smoothers.set_sample_rate(sample_rate);
        self.smoothers.snap_pending = true;

        nih_log!(
            "Delay engine configured: {} Hz, {} ms max, {} samples per channel",
            sample_rate,
            max_delay_ms,
            config.capacity()
        );
        Ok(())
    }

    /// Silence both buffers and rewind the write heads without
    /// reallocating.
    ///
    /// Real-time safe. Hosts call this when the transport stops or starts
    /// so old echoes don't bleed into the next playback.
    pub fn reset(&mut self) {
        if let Some(configured) = self.configured.as_mut() {
            for buffer in &mut configured.buffers {
                buffer.clear();
            }
        }
        self.smoothers.snap_pending = true;
    }

    /// Publish a full parameter set. Each field is clamped to its range.
    ///
    /// Control-rate only; the audio thread picks the values up on its next
    /// snapshot.
    pub fn set_parameters(&self, params: &DelayParameters) {
        self.params.set_all(params);
    }

    /// Process one stereo frame, taking a fresh parameter snapshot.
    ///
    /// Called once per sample from the audio thread. Calling it before
    /// [`configure()`](Self::configure) is a contract violation: it trips a
    /// debug assertion and outputs silence.
    #[inline]
    pub fn process_frame(&mut self, inputs: &[f32; CHANNELS], outputs: &mut [f32; CHANNELS]) {
        let params = self.params.snapshot();
        self.process_frame_with(&params, inputs, outputs);
    }

    /// Process one stereo frame against an existing snapshot.
    ///
    /// Use this to take one snapshot per block and share it across every
    /// frame in the block.
    pub fn process_frame_with(
        &mut self,
        params: &DelayParameters,
        inputs: &[f32; CHANNELS],
        outputs: &mut [f32; CHANNELS],
    ) {
        let Some(configured) = self.configured.as_mut() else {
            nih_debug_assert_failure!("DelayEngine::process_frame() called before configure()");
            *outputs = [0.0; CHANNELS];
            return;
        };

        let feedback_target = pct_to_fraction(params.feedback_pct);
        let wet_target = self.wet_gain.gain_for(params.wet_level_db);
        let dry_target = self.dry_gain.gain_for(params.dry_level_db);

        let smoothers = &mut self.smoothers;
        if smoothers.snap_pending {
            for (channel, smoother) in smoothers.delay_ms.iter_mut().enumerate() {
                smoother.snap(params.delay_ms(channel));
            }
            smoothers.feedback.snap(feedback_target);
            smoothers.wet.snap(wet_target);
            smoothers.dry.snap(dry_target);
            smoothers.snap_pending = false;
        }

        let feedback = smoothers.feedback.next(feedback_target);
        let wet = smoothers.wet.next(wet_target);
        let dry = smoothers.dry.next(dry_target);
        let sample_rate = configured.config.sample_rate();

        for (channel, buffer) in configured.buffers.iter_mut().enumerate() {
            let delay_ms = smoothers.delay_ms[channel].next(params.delay_ms(channel));
            let delay_samples = ms_to_samples(delay_ms, sample_rate).clamp(0.0, buffer.max_delay());

            let input = inputs[channel];
            let delayed = read_tap(buffer, input, delay_samples);

            outputs[channel] = dry * input + wet * delayed;
            buffer.write(flush_denormal(input + feedback * delayed));
        }
    }

    /// Process two channel slices in place with one parameter snapshot.
    ///
    /// Both slices must be the same length; extra samples in the longer
    /// one are left untouched.
    pub fn process_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        nih_debug_assert_eq!(left.len(), right.len());

        let params = self.params.snapshot();
        let mut outputs = [0.0; CHANNELS];
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            self.process_frame_with(&params, &[*l, *r], &mut outputs);
            *l = outputs[0];
            *r = outputs[1];
        }
    }

    /// How many samples the echoes keep ringing after the input stops.
    ///
    /// Each repeat is scaled by the feedback factor, so after `N` repeats
    /// the level is `feedback^N`. Solving `feedback^N = 0.001` (-60 dB):
    ///
    /// ```text
    /// N = log10(0.001) / log10(feedback) = -3 / log10(feedback)
    /// ```
    ///
    /// `N` times the longer channel delay gives the tail. With no feedback
    /// the tail is one delay period. Returns 0 while unconfigured. Near the
    /// feedback ceiling a long delay rings for more than `u32::MAX`
    /// samples; the cast saturates there.
    pub fn tail_samples(&self, params: &DelayParameters) -> u32 {
        let Some(configured) = self.configured.as_ref() else {
            return 0;
        };

        let sample_rate = configured.config.sample_rate();
        let max_delay = configured.buffers[0].max_delay();
        let longest_ms = params.left_delay_ms.max(params.right_delay_ms);
        let delay_samples = ms_to_samples(longest_ms, sample_rate).clamp(0.0, max_delay);

        let feedback = pct_to_fraction(params.feedback_pct);
        if feedback > TAIL_FEEDBACK_THRESHOLD {
            let repeats = -3.0 / feedback.log10();
            (repeats * delay_samples).ceil() as u32
        } else {
            delay_samples.ceil() as u32
        }
    }
}

/// Read the delayed tap for one channel.
///
/// Delays of at least one sample come straight from the buffer. Below one
/// sample the newest stored sample is blended with the current input, so a
/// zero delay passes the input through instead of reading the oldest slot
/// of the ring.
#[inline]
fn read_tap(buffer: &DelayBuffer, input: f32, delay_samples: f32) -> f32 {
    if delay_samples < 1.0 {
        interpolate::lerp(input, buffer.read_delayed(1.0), delay_samples)
    } else {
        buffer.read_delayed(delay_samples)
    }
}

/// Flush denormal-range values to zero.
///
/// A decaying feedback loop drifts into subnormal floats, which are very
/// slow on many CPUs. Inside a host nih-plug already sets flush-to-zero
/// around `process()`; this covers the engine when it runs on its own.
#[inline]
fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 {
        0.0
    } else {
        x
    }
}
