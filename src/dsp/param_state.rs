//! # Parameter State
//!
//! Two execution contexts touch the delay parameters:
//!
//! - the **control-rate** side (host automation, knob moves) writes them,
//! - the **audio-rate** side (the process loop) reads them.
//!
//! The audio side must never wait on the control side, so there is no
//! lock here. Each field lives in its own `AtomicU32` holding the `f32`
//! bit pattern. A store or load of one field is a single atomic
//! operation, which means the reader sees either the whole old value or
//! the whole new value, never half of each. Fields are independent: a
//! reader may see a new feedback value together with an old wet level,
//! which is harmless for a delay.
//!
//! The reader calls [`SharedParameters::snapshot`] once per frame (or
//! once per block) and works from that plain [`DelayParameters`] copy, so
//! every sample in the call sees the same values.

use std::sync::atomic::{AtomicU32, Ordering};

use nih_plug::nih_debug_assert_failure;

/// Longest delay the engine accepts, per channel.
pub const MAX_DELAY_MS: f32 = 2000.0;

/// Feedback is clamped strictly below 100%: at 100% the loop gain is 1.0
/// and the echoes never decay. Everything in `[0, 99.99]` is stored as
/// given.
pub const MAX_FEEDBACK_PCT: f32 = 99.99;

/// Bottom of the wet/dry level range. Treated as silence.
pub const MIN_LEVEL_DB: f32 = -60.0;
/// Top of the wet/dry level range.
pub const MAX_LEVEL_DB: f32 = 12.0;

/// Identifies one field of the parameter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterField {
    LeftDelayMs,
    RightDelayMs,
    FeedbackPct,
    WetLevelDb,
    DryLevelDb,
}

impl ParameterField {
    pub const ALL: [ParameterField; 5] = [
        ParameterField::LeftDelayMs,
        ParameterField::RightDelayMs,
        ParameterField::FeedbackPct,
        ParameterField::WetLevelDb,
        ParameterField::DryLevelDb,
    ];

    /// Inclusive valid range for this field.
    pub fn range(self) -> (f32, f32) {
        match self {
            ParameterField::LeftDelayMs | ParameterField::RightDelayMs => (0.0, MAX_DELAY_MS),
            ParameterField::FeedbackPct => (0.0, MAX_FEEDBACK_PCT),
            ParameterField::WetLevelDb | ParameterField::DryLevelDb => {
                (MIN_LEVEL_DB, MAX_LEVEL_DB)
            }
        }
    }

    /// Clamp `value` into this field's range. NaN has no meaningful
    /// position in the range and yields `None`.
    pub fn clamp(self, value: f32) -> Option<f32> {
        if value.is_nan() {
            return None;
        }
        let (min, max) = self.range();
        Some(value.clamp(min, max))
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// A plain copy of the delay parameters.
///
/// This is what the audio thread works from during one call, and what the
/// control side hands to [`SharedParameters::set_all`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayParameters {
    pub left_delay_ms: f32,
    pub right_delay_ms: f32,
    pub feedback_pct: f32,
    pub wet_level_db: f32,
    pub dry_level_db: f32,
}

impl Default for DelayParameters {
    fn default() -> Self {
        Self {
            left_delay_ms: 250.0,
            right_delay_ms: 250.0,
            feedback_pct: 30.0,
            wet_level_db: -3.0,
            dry_level_db: -3.0,
        }
    }
}

impl DelayParameters {
    /// Read one field.
    pub fn get(&self, field: ParameterField) -> f32 {
        match field {
            ParameterField::LeftDelayMs => self.left_delay_ms,
            ParameterField::RightDelayMs => self.right_delay_ms,
            ParameterField::FeedbackPct => self.feedback_pct,
            ParameterField::WetLevelDb => self.wet_level_db,
            ParameterField::DryLevelDb => self.dry_level_db,
        }
    }

    /// Delay time of channel `channel` (0 = left, anything else = right).
    #[inline]
    pub fn delay_ms(&self, channel: usize) -> f32 {
        if channel == 0 {
            self.left_delay_ms
        } else {
            self.right_delay_ms
        }
    }
}

/// The lock-free store shared between the control-rate writer and the
/// audio-rate reader.
///
/// Wrap it in an `Arc` and hand one clone to each side.
pub struct SharedParameters {
    values: [AtomicU32; 5],
}

impl Default for SharedParameters {
    fn default() -> Self {
        Self::new(DelayParameters::default())
    }
}

impl SharedParameters {
    /// Create a store holding `initial`, clamped field by field.
    pub fn new(initial: DelayParameters) -> Self {
        let store = Self {
            values: std::array::from_fn(|_| AtomicU32::new(0.0f32.to_bits())),
        };
        let defaults = DelayParameters::default();
        for field in ParameterField::ALL {
            let value = field
                .clamp(initial.get(field))
                .unwrap_or_else(|| defaults.get(field));
            store.values[field.index()].store(value.to_bits(), Ordering::Relaxed);
        }
        store
    }

    /// Clamp `value` to the field's range and publish it.
    ///
    /// Returns the value that was stored. A NaN is rejected and the field
    /// keeps its previous value, which is returned instead.
    pub fn set(&self, field: ParameterField, value: f32) -> f32 {
        let Some(clamped) = field.clamp(value) else {
            nih_debug_assert_failure!("NaN written to delay parameter {:?}", field);
            return self.get(field);
        };
        self.values[field.index()].store(clamped.to_bits(), Ordering::Release);
        clamped
    }

    /// Publish every field of `params`.
    pub fn set_all(&self, params: &DelayParameters) {
        for field in ParameterField::ALL {
            self.set(field, params.get(field));
        }
    }

    /// Current value of one field.
    pub fn get(&self, field: ParameterField) -> f32 {
        f32::from_bits(self.values[field.index()].load(Ordering::Acquire))
    }

    /// Copy all fields for use during one audio call.
    #[inline]
    pub fn snapshot(&self) -> DelayParameters {
        DelayParameters {
            left_delay_ms: self.get(ParameterField::LeftDelayMs),
            right_delay_ms: self.get(ParameterField::RightDelayMs),
            feedback_pct: self.get(ParameterField::FeedbackPct),
            wet_level_db: self.get(ParameterField::WetLevelDb),
            dry_level_db: self.get(ParameterField::DryLevelDb),
        }
    }
}
