//! # Plugin Parameters
//!
//! The knobs the host shows for Analog Delay. Each parameter has:
//!
//! - A **unique string ID** (`#[id = "..."]`) the host uses to save and
//!   recall presets. Never change these once published.
//! - A **human-readable name**, a **range**, and a **default value**.
//! - A **value-change callback** that publishes the new value into the
//!   engine's [`SharedParameters`].
//!
//! ## Why callbacks instead of reading the params in `process()`?
//!
//! The engine keeps its own lock-free parameter store so it can run
//! without a host (benchmarks, other Rust code). The callbacks bridge the
//! two: whenever the host, the automation lane, or the editor changes a
//! value, nih-plug calls the callback, which clamps the value and stores
//! it atomically. The audio thread picks it up on its next snapshot.
//!
//! The engine does its own smoothing, so none of these parameters carry a
//! nih-plug smoother.

use std::sync::Arc;

use nih_plug::prelude::*;

use crate::dsp::param_state::{
    ParameterField, SharedParameters, MAX_DELAY_MS, MAX_LEVEL_DB, MIN_LEVEL_DB,
};

/// All user-facing parameters for the Analog Delay plugin.
#[derive(Params)]
pub struct PluginParams {
    /// The engine-side store the callbacks write into. Not a host
    /// parameter itself.
    shared: Arc<SharedParameters>,

    /// **Time** — the gap between the input and its echo.
    ///
    /// One control drives both channels' delay times. Range 0–2000 ms,
    /// default 250 ms. At 0 ms the echo lands on top of the dry signal.
    #[id = "time"]
    pub delay_time: FloatParam,

    /// **Feedback** — how much of each echo is sent back into the delay.
    ///
    /// The host range is 0–100%, but the engine holds it just below 100%
    /// so the echoes always die away.
    #[id = "fdbk"]
    pub feedback: FloatParam,

    /// **Wet Level** — level of the delayed signal, -60 to +12 dB.
    /// The bottom of the range mutes the echoes entirely.
    #[id = "wet"]
    pub wet_level: FloatParam,

    /// **Dry Level** — level of the unprocessed input, -60 to +12 dB.
    #[id = "dry"]
    pub dry_level: FloatParam,
}

impl PluginParams {
    /// Build the parameter tree with callbacks publishing into `shared`.
    pub fn new(shared: Arc<SharedParameters>) -> Self {
        Self {
            delay_time: FloatParam::new(
                "Time",
                250.0,
                FloatRange::Linear {
                    min: 0.0,
                    max: MAX_DELAY_MS,
                },
            )
            .with_unit(" ms")
            .with_step_size(1.0)
            .with_callback(publish_delay_time(&shared)),

            feedback: FloatParam::new(
                "Feedback",
                30.0,
                FloatRange::Linear {
                    min: 0.0,
                    max: 100.0,
                },
            )
            .with_unit("%")
            .with_step_size(1.0)
            .with_callback(publish(&shared, ParameterField::FeedbackPct)),

            wet_level: level_param("Wet Level", publish(&shared, ParameterField::WetLevelDb)),

            dry_level: level_param("Dry Level", publish(&shared, ParameterField::DryLevelDb)),

            shared,
        }
    }

    /// Push every current host value into the engine store.
    ///
    /// Callbacks only fire on changes, so this runs whenever the plugin is
    /// (re)initialized to pick up values restored from a preset or session.
    pub fn publish_all(&self) {
        let delay_ms = self.delay_time.value();
        self.shared.set(ParameterField::LeftDelayMs, delay_ms);
        self.shared.set(ParameterField::RightDelayMs, delay_ms);
        self.shared.set(ParameterField::FeedbackPct, self.feedback.value());
        self.shared.set(ParameterField::WetLevelDb, self.wet_level.value());
        self.shared.set(ParameterField::DryLevelDb, self.dry_level.value());
    }
}

/// A wet/dry level in dB. The floor reads "-inf" because the engine treats
/// it as silence.
fn level_param(name: &str, callback: Arc<dyn Fn(f32) + Send + Sync>) -> FloatParam {
    FloatParam::new(
        name,
        -3.0,
        FloatRange::Linear {
            min: MIN_LEVEL_DB,
            max: MAX_LEVEL_DB,
        },
    )
    .with_unit(" dB")
    .with_step_size(0.1)
    .with_value_to_string(Arc::new(|value: f32| {
        if value <= MIN_LEVEL_DB {
            String::from("-inf")
        } else {
            format!("{value:.1}")
        }
    }))
    .with_string_to_value(Arc::new(|string: &str| {
        let trimmed = string.trim().trim_end_matches("dB").trim();
        if trimmed.eq_ignore_ascii_case("-inf") {
            Some(MIN_LEVEL_DB)
        } else {
            trimmed.parse().ok()
        }
    }))
    .with_callback(callback)
}

fn publish(
    shared: &Arc<SharedParameters>,
    field: ParameterField,
) -> Arc<dyn Fn(f32) + Send + Sync> {
    let shared = Arc::clone(shared);
    Arc::new(move |value| {
        shared.set(field, value);
    })
}

/// The host exposes one time control; it sets both channels.
fn publish_delay_time(shared: &Arc<SharedParameters>) -> Arc<dyn Fn(f32) + Send + Sync> {
    let shared = Arc::clone(shared);
    Arc::new(move |value| {
        shared.set(ParameterField::LeftDelayMs, value);
        shared.set(ParameterField::RightDelayMs, value);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_engine_defaults() {
        let shared = Arc::new(SharedParameters::default());
        let params = PluginParams::new(Arc::clone(&shared));

        params.publish_all();

        let snapshot = shared.snapshot();
        assert_eq!(snapshot, crate::dsp::param_state::DelayParameters::default());
        assert_eq!(params.delay_time.value(), 250.0);
        assert_eq!(params.feedback.value(), 30.0);
    }

    #[test]
    fn test_time_callback_sets_both_channels() {
        let shared = Arc::new(SharedParameters::default());
        let callback = publish_delay_time(&shared);

        callback(640.0);

        let snapshot = shared.snapshot();
        assert_eq!(snapshot.left_delay_ms, 640.0);
        assert_eq!(snapshot.right_delay_ms, 640.0);
    }

    /// A host sending 100% feedback still leaves a decaying loop.
    #[test]
    fn test_feedback_callback_clamps() {
        let shared = Arc::new(SharedParameters::default());
        let callback = publish(&shared, ParameterField::FeedbackPct);

        callback(100.0);

        assert!(shared.get(ParameterField::FeedbackPct) < 100.0);
    }

    #[test]
    fn test_level_display_floor_is_minus_infinity() {
        let shared = Arc::new(SharedParameters::default());
        let params = PluginParams::new(shared);

        assert_eq!(params.wet_level.normalized_value_to_string(0.0, false), "-inf");
        assert_eq!(params.dry_level.string_to_normalized_value("-inf"), Some(0.0));
    }
}
