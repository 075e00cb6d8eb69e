//! # DSP Core
//!
//! Everything that runs on the audio thread, plus the control-rate
//! plumbing that feeds it:
//!
//! - **`delay_line`**: the per-channel ring buffer (`DelayBuffer`).
//! - **`interpolate`**: linear interpolation for fractional delays.
//! - **`param_state`**: the lock-free parameter store shared between the
//!   control thread and the audio thread.
//! - **`gain`**: dB and percentage conversions, with a cached dB→gain.
//! - **`smoother`**: nih-plug linear smoothing so parameter changes glide.
//! - **`lifecycle`**: configuration validation and buffer sizing.
//! - **`engine`**: the stereo feedback delay that ties it all together.

pub mod delay_line;
pub mod engine;
pub mod gain;
pub mod interpolate;
pub mod lifecycle;
pub mod param_state;
pub mod smoother;
