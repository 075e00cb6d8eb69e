//! # Engine Lifecycle
//!
//! The delay buffers are sized from the sample rate, which the engine only
//! learns once the host prepares playback. Until then the engine is
//! [`EngineState::Unconfigured`] and must not process audio.
//!
//! ```text
//! Unconfigured ──configure()──► Configured ◄──┐
//!                                   │         │ reset() / set_parameters()
//!                                   │         │ process_frame() / configure()
//!                                   └─────────┘
//! ```
//!
//! `configure()` allocates, so it belongs on the control-rate path and must
//! never race with processing. The host calls it while the audio stream is
//! stopped (nih-plug's `initialize()`). `reset()` only zeroes existing
//! storage and is safe from the audio thread.

use std::num::NonZeroUsize;

use crate::error::ConfigureError;

/// Largest per-channel buffer the engine will allocate: 2^24 samples,
/// about 64 MB of `f32`s. Ten seconds at 768 kHz fits comfortably.
pub const MAX_BUFFER_SAMPLES: usize = 1 << 24;

/// Where the engine is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No buffers yet. `process_frame()` is a contract violation here.
    Unconfigured,
    /// Buffers allocated for the current sample rate.
    Configured,
}

/// A validated sample rate and maximum delay pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    sample_rate: f32,
    max_delay_ms: f32,
    capacity: NonZeroUsize,
}

impl EngineConfig {
    /// Validate the pair and compute the buffer capacity.
    pub fn new(sample_rate: f32, max_delay_ms: f32) -> Result<Self, ConfigureError> {
        let capacity = buffer_capacity(sample_rate, max_delay_ms)?;
        Ok(Self {
            sample_rate,
            max_delay_ms,
            capacity,
        })
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn max_delay_ms(&self) -> f32 {
        self.max_delay_ms
    }

    /// Samples per channel buffer.
    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }
}

/// Samples needed to hold `max_delay_ms` at `sample_rate`:
/// `ceil(sample_rate * max_delay_ms / 1000)`.
///
/// The product is computed in `f64` so large rates and long delays do not
/// lose whole samples to `f32` rounding.
pub fn buffer_capacity(sample_rate: f32, max_delay_ms: f32) -> Result<NonZeroUsize, ConfigureError> {
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return Err(ConfigureError::InvalidSampleRate(sample_rate));
    }
    if !max_delay_ms.is_finite() || max_delay_ms <= 0.0 {
        return Err(ConfigureError::InvalidMaxDelay(max_delay_ms));
    }

    let samples = (f64::from(sample_rate) * f64::from(max_delay_ms) / 1000.0).ceil();
    if samples > MAX_BUFFER_SAMPLES as f64 {
        return Err(ConfigureError::BufferTooLarge {
            requested: samples as u64,
            limit: MAX_BUFFER_SAMPLES,
        });
    }

    // `samples` is positive, so the ceiling is at least 1.
    NonZeroUsize::new(samples as usize).ok_or(ConfigureError::InvalidMaxDelay(max_delay_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_at_common_rates() {
        assert_eq!(buffer_capacity(48000.0, 2000.0).unwrap().get(), 96000);
        assert_eq!(buffer_capacity(44100.0, 2000.0).unwrap().get(), 88200);
        assert_eq!(buffer_capacity(44100.0, 2100.0).unwrap().get(), 92610);
    }

    /// Partial samples round up so the full delay always fits.
    #[test]
    fn test_capacity_rounds_up() {
        assert_eq!(buffer_capacity(44100.0, 0.01).unwrap().get(), 1);
        assert_eq!(buffer_capacity(1000.0, 2.5).unwrap().get(), 3);
    }

    #[test]
    fn test_rejects_invalid_sample_rate() {
        for rate in [0.0, -48000.0, f32::NAN, f32::INFINITY] {
            let result = buffer_capacity(rate, 2000.0);
            assert!(
                matches!(result, Err(ConfigureError::InvalidSampleRate(_))),
                "Rate {rate} should be rejected, got {result:?}"
            );
        }
    }

    #[test]
    fn test_rejects_invalid_max_delay() {
        for max_delay in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let result = buffer_capacity(48000.0, max_delay);
            assert!(
                matches!(result, Err(ConfigureError::InvalidMaxDelay(_))),
                "Max delay {max_delay} should be rejected, got {result:?}"
            );
        }
    }

    #[test]
    fn test_rejects_oversized_buffer() {
        let result = buffer_capacity(768_000.0, 60_000.0);
        assert!(
            matches!(result, Err(ConfigureError::BufferTooLarge { .. })),
            "Expected BufferTooLarge, got {result:?}"
        );
    }

    #[test]
    fn test_config_accessors() {
        let config = EngineConfig::new(48000.0, 250.0).unwrap();
        assert_eq!(config.sample_rate(), 48000.0);
        assert_eq!(config.max_delay_ms(), 250.0);
        assert_eq!(config.capacity().get(), 12000);
    }
}
