//! Level and percentage conversions used by the engine.

use nih_plug::util;

use super::param_state::MIN_LEVEL_DB;

/// Convert a level in decibels to a linear gain factor.
///
/// The bottom of the level range counts as minus infinity, so the wet or
/// dry path can be switched fully off.
#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    if db <= MIN_LEVEL_DB {
        0.0
    } else {
        util::db_to_gain(db)
    }
}

/// `30.0` percent becomes `0.3`.
#[inline]
pub fn pct_to_fraction(pct: f32) -> f32 {
    pct / 100.0
}

/// Milliseconds to (fractional) samples at `sample_rate`.
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> f32 {
    ms * sample_rate / 1000.0
}

/// A dB level with its linear gain, recomputed only when the level changes.
///
/// `10^(dB/20)` is a transcendental call. Levels change at control rate,
/// so the audio loop compares bit patterns and reuses the last result.
#[derive(Debug, Clone, Copy)]
pub struct CachedGain {
    db: f32,
    gain: f32,
}

impl CachedGain {
    pub fn new(db: f32) -> Self {
        Self {
            db,
            gain: db_to_gain(db),
        }
    }

    /// Linear gain for `db`.
    #[inline]
    pub fn gain_for(&mut self, db: f32) -> f32 {
        if db.to_bits() != self.db.to_bits() {
            self.db = db;
            self.gain = db_to_gain(db);
        }
        self.gain
    }
}
