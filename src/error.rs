//! Error types for engine configuration.
//!
//! Only the control-rate path can fail. The audio path has no error type:
//! every parameter is clamped before it gets there.

use thiserror::Error;

/// Errors returned when the delay engine cannot be configured.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigureError {
    /// The sample rate is zero, negative, or not a number.
    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(f32),

    /// The maximum delay time is zero, negative, or not a number.
    #[error("invalid maximum delay: {0} ms")]
    InvalidMaxDelay(f32),

    /// The requested buffer would exceed the per-channel limit.
    #[error("delay buffer of {requested} samples exceeds the limit of {limit} samples")]
    BufferTooLarge {
        /// Capacity the sample rate and maximum delay call for.
        requested: u64,
        /// Largest capacity the engine will allocate.
        limit: usize,
    },
}
