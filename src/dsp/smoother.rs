//! # Parameter Smoothing
//!
//! When the host changes a parameter, the value the engine sees jumps
//! instantly. For a gain that jump is an audible click; for the delay
//! time it makes the read head skip across the buffer. A smoother turns
//! the jump into a short glide.
//!
//! The glide itself is nih-plug's [`Smoother`] with
//! `SmoothingStyle::Linear(ms)`: the value ramps in a straight line and
//! lands exactly on the target after `ms` milliseconds. nih-plug smoothers
//! normally hang off a `FloatParam`, but the engine reads its targets from
//! a [`SharedParameters`](super::param_state::SharedParameters) snapshot,
//! so [`ParamSmoother`] drives one directly.
//!
//! Gliding the delay time also bends the pitch of the repeats while the
//! read head moves, much like turning the time knob on a tape or
//! bucket-brigade unit.

use nih_plug::prelude::{Smoother, SmoothingStyle};

/// A linear glide toward whatever target the engine reads each sample.
pub struct ParamSmoother {
    smoother: Smoother<f32>,
    sample_rate: f32,
    /// The target the running glide heads for.
    target: f32,
}

impl ParamSmoother {
    /// A smoother sitting at 0.0 that glides over `glide_ms`.
    ///
    /// Until [`set_sample_rate`](Self::set_sample_rate) is called every
    /// target comes straight through.
    pub fn new(glide_ms: f32) -> Self {
        Self {
            smoother: Smoother::new(SmoothingStyle::Linear(glide_ms)),
            sample_rate: 0.0,
            target: 0.0,
        }
    }

    /// Set the rate the glide length is counted in. Takes effect on the
    /// next target change.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    /// Advance one sample toward `target` and return the new value.
    ///
    /// The engine passes the same target every sample; only a changed
    /// target starts a new glide, so a glide in progress runs to the end.
    #[inline]
    pub fn next(&mut self, target: f32) -> f32 {
        if target != self.target {
            self.target = target;
            self.smoother.set_target(self.sample_rate, target);
        }
        self.smoother.next()
    }

    /// Jump straight to `value`.
    pub fn snap(&mut self, value: f32) {
        self.target = value;
        self.smoother.reset(value);
    }

    pub fn current(&self) -> f32 {
        self.smoother.previous_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smoother(glide_ms: f32, sample_rate: f32) -> ParamSmoother {
        let mut smoother = ParamSmoother::new(glide_ms);
        smoother.set_sample_rate(sample_rate);
        smoother
    }

    /// Without a sample rate the target comes straight through.
    #[test]
    fn test_passthrough_without_sample_rate() {
        let mut smoother = ParamSmoother::new(20.0);

        assert_eq!(smoother.next(1.0), 1.0);
        assert_eq!(smoother.next(-0.3), -0.3);
    }

    /// A step is approached gradually and never overshot.
    #[test]
    fn test_step_glides_monotonically() {
        let mut smoother = smoother(20.0, 1000.0);

        let mut previous = 0.0;
        for _ in 0..19 {
            let value = smoother.next(1.0);
            assert!(value > previous, "Glide must rise, {value} <= {previous}");
            assert!(value < 1.0, "Glide overshot: {value}");
            previous = value;
        }
    }

    /// The glide is a straight line that ends on the target after the
    /// glide time, even though the target is passed in every sample.
    #[test]
    fn test_linear_glide_lands_on_time() {
        let mut smoother = smoother(10.0, 1000.0);

        let mut value = 0.0;
        for _ in 0..5 {
            value = smoother.next(250.0);
        }
        assert!((value - 125.0).abs() < 1e-3, "Expected halfway, got {value}");

        for _ in 0..5 {
            value = smoother.next(250.0);
        }
        assert_eq!(value, 250.0);
        assert_eq!(smoother.current(), 250.0);
        assert_eq!(smoother.next(250.0), 250.0);
    }

    /// A new target mid-glide starts a fresh glide from where it stood.
    #[test]
    fn test_retarget_mid_glide() {
        let mut smoother = smoother(10.0, 1000.0);

        for _ in 0..5 {
            smoother.next(1.0);
        }
        let midway = smoother.current();

        let value = smoother.next(0.0);
        assert!(value < midway, "Expected a turn toward 0, got {value}");

        for _ in 0..10 {
            smoother.next(0.0);
        }
        assert_eq!(smoother.current(), 0.0);
    }

    #[test]
    fn test_snap() {
        let mut smoother = smoother(50.0, 48000.0);

        smoother.snap(0.7);
        assert_eq!(smoother.current(), 0.7);
        assert_eq!(smoother.next(0.7), 0.7);
    }
}
