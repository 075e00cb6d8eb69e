//! # Delay Buffer (Ring Buffer)
//!
//! A delay buffer stores one channel's past samples and reads them back
//! after a fractional delay. It is the heart of the delay engine: one
//! buffer per channel, each owned exclusively by the engine lane that
//! uses it.
//!
//! ## How the ring works
//!
//! The storage is a `Vec<f32>` of fixed capacity `C` and `write_pos` is
//! the write head. For every processed sample the engine:
//!
//! 1. Reads the delayed sample at `write_pos - delay`, wrapped into `[0, C)`.
//! 2. Writes the new sample at `write_pos`.
//! 3. Moves `write_pos` forward by one, wrapping back to 0 at `C`.
//!
//! Steps 2 and 3 are a single [`DelayBuffer::write`] call, so a read
//! always sees the state *before* the current sample lands. A delay of
//! `d` whole samples therefore returns the sample written `d` calls ago.
//!
//! ## Capacity
//!
//! The capacity is fixed when the engine is configured and never changes
//! during processing: changing the delay time only moves the read
//! position. `NonZeroUsize` rules out an empty buffer, which would make
//! the modular arithmetic divide by zero.

use std::num::NonZeroUsize;

use super::interpolate;

/// A fixed-capacity circular buffer for one audio channel.
///
/// Pre-allocated once at configuration time so that no allocation ever
/// happens on the audio thread.
pub struct DelayBuffer {
    /// The circular storage. All values start at 0.0 (silence).
    storage: Vec<f32>,

    /// Where the next incoming sample will be stored. Always in `[0, C)`.
    write_pos: usize,
}

impl DelayBuffer {
    /// Allocate a silent buffer holding `capacity` samples.
    ///
    /// For a 2-second buffer at 48 kHz that is 96000 samples, about
    /// 375 KB of `f32`s.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            storage: vec![0.0; capacity.get()],
            write_pos: 0,
        }
    }

    /// Number of samples the buffer holds (`C`).
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// The longest delay that can be read back, `C - 1` samples.
    pub fn max_delay(&self) -> f32 {
        (self.storage.len() - 1) as f32
    }

    /// Current write head position.
    pub fn write_pos(&self) -> usize {
        self.write_pos
    }

    /// Store `sample` at the write head and advance the head by one.
    ///
    /// Never fails. The oldest stored sample is overwritten once the
    /// buffer has been filled.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.storage[self.write_pos] = sample;
        self.write_pos += 1;
        if self.write_pos == self.storage.len() {
            self.write_pos = 0;
        }
    }

    /// Read the sample `delay_samples` behind the write head.
    ///
    /// Fractional delays are linearly interpolated. The caller must keep
    /// `delay_samples` within `[0, C)`; the engine clamps before calling.
    /// Stray values are clamped here as well so they read a valid slot
    /// instead of indexing out of bounds.
    ///
    /// # Position math
    ///
    /// ```text
    /// pos = write_pos - delay_samples    (wrapped into [0, C))
    /// ```
    ///
    /// Example: `write_pos = 5`, `delay_samples = 10.3`, `C = 100`:
    /// `pos = 94.7`, which blends slot 94 (weight 0.3) with slot 95
    /// (weight 0.7). Slot 95 was written 10 samples ago and slot 94
    /// 11 samples ago.
    ///
    /// The delay is split into whole samples and a fraction before any
    /// index math. Subtracting it from `write_pos` as a float would round
    /// the fraction away once `write_pos` grows large: at 100000 an `f32`
    /// only resolves 1/128 of a sample.
    #[inline]
    pub fn read_delayed(&self, delay_samples: f32) -> f32 {
        let capacity = self.storage.len();
        let delay = delay_samples.clamp(0.0, (capacity - 1) as f32);

        let whole = delay as usize;
        let frac = delay - whole as f32;

        // Slot written `whole` calls ago.
        let newer = if whole <= self.write_pos {
            self.write_pos - whole
        } else {
            self.write_pos + capacity - whole
        };
        if frac == 0.0 {
            return self.storage[newer];
        }

        // `pos` sits between the slot one further back and `newer`.
        let older = if newer == 0 { capacity - 1 } else { newer - 1 };
        interpolate::read_linear(&self.storage, older, 1.0 - frac)
    }

    /// Zero the storage and move the write head back to 0.
    ///
    /// Real-time safe: touches the existing allocation only.
    pub fn clear(&mut self) {
        self.storage.fill(0.0);
        self.write_pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(capacity: usize) -> DelayBuffer {
        DelayBuffer::new(NonZeroUsize::new(capacity).unwrap())
    }

    /// Verify basic write-then-read at an exact sample position.
    #[test]
    fn test_write_and_read_exact() {
        let mut db = buffer(100);

        db.write(0.75);

        let result = db.read_delayed(1.0);
        assert!((result - 0.75).abs() < 1e-6, "Expected 0.75, got {result}");
    }

    /// Verify linear interpolation between two samples.
    #[test]
    fn test_interpolation() {
        let mut db = buffer(100);

        db.write(0.0);
        db.write(1.0);

        // write_pos is 2. 1.5 samples back sits halfway between the
        // 1.0 written one sample ago and the 0.0 written two samples ago.
        let result = db.read_delayed(1.5);
        assert!((result - 0.5).abs() < 1e-6, "Expected 0.5, got {result}");
    }

    /// Interpolation weights follow the fractional part of the delay.
    #[test]
    fn test_interpolation_weights() {
        let mut db = buffer(16);

        db.write(1.0);
        for _ in 0..3 {
            db.write(0.0);
        }

        // The 1.0 was written 4 samples ago. Reading 3.25 back is a quarter
        // of the way from the 3-samples-ago slot (0.0) to it.
        let result = db.read_delayed(3.25);
        assert!((result - 0.25).abs() < 1e-6, "Expected 0.25, got {result}");
    }

    /// Verify the buffer wraps correctly past its boundaries.
    #[test]
    fn test_wrapping() {
        let mut db = buffer(4);

        for i in 0..6 {
            db.write(i as f32);
        }

        // After 6 writes into size-4 storage:
        //   write_pos = 2, storage = [4.0, 5.0, 2.0, 3.0]
        assert_eq!(db.write_pos(), 2);
        assert!((db.read_delayed(1.0) - 5.0).abs() < 1e-6);
        assert!((db.read_delayed(3.0) - 3.0).abs() < 1e-6);
    }

    /// A fractional read straddling slot C-1 and slot 0 uses both.
    #[test]
    fn test_fractional_read_across_wrap_point() {
        let mut db = buffer(4);

        // storage = [2.0, 0.0, 0.0, 1.0] after these writes, write_pos = 1.
        db.write(0.0);
        db.write(0.0);
        db.write(0.0);
        db.write(1.0);
        db.write(2.0);
        assert_eq!(db.write_pos(), 1);

        // 1.5 back from pos 1 is pos 3.5: halfway between 1.0 and 2.0.
        let result = db.read_delayed(1.5);
        assert!((result - 1.5).abs() < 1e-6, "Expected 1.5, got {result}");
    }

    /// Verify that clearing resets everything to silence.
    #[test]
    fn test_clear() {
        let mut db = buffer(10);

        db.write(0.5);
        db.clear();

        assert_eq!(db.write_pos(), 0);
        let result = db.read_delayed(1.0);
        assert!(
            result.abs() < 1e-6,
            "Expected 0.0 after clear, got {result}"
        );
    }

    /// A fresh buffer outputs silence at any delay.
    #[test]
    fn test_silence_in_silence_out() {
        let db = buffer(100);

        for delay in [0.0, 1.0, 10.0, 50.0, 99.0] {
            let result = db.read_delayed(delay);
            assert!(
                result.abs() < 1e-6,
                "Expected silence at delay {delay}, got {result}"
            );
        }
    }

    /// FIFO behaviour: most recent first.
    #[test]
    fn test_fifo_sequence() {
        let mut db = buffer(10);

        for i in 1..=5 {
            db.write(i as f32);
        }

        assert!((db.read_delayed(1.0) - 5.0).abs() < 1e-6);
        assert!((db.read_delayed(2.0) - 4.0).abs() < 1e-6);
        assert!((db.read_delayed(3.0) - 3.0).abs() < 1e-6);
        assert!((db.read_delayed(4.0) - 2.0).abs() < 1e-6);
        assert!((db.read_delayed(5.0) - 1.0).abs() < 1e-6);
    }

    /// Deep into a long buffer a fractional read keeps its full weights.
    #[test]
    fn test_fractional_read_far_from_start() {
        let mut db = buffer(100_800);

        for i in 0..100_010 {
            db.write(if i == 100_000 { 1.0 } else { 0.0 });
        }
        assert_eq!(db.write_pos(), 100_010);

        // The 1.0 was written 10 calls ago; 9.3 back weights it by 0.3.
        let result = db.read_delayed(9.3);
        assert!((result - 0.3).abs() < 1e-6, "Expected 0.3, got {result}");

        let result = db.read_delayed(9.9);
        assert!((result - 0.9).abs() < 1e-6, "Expected 0.9, got {result}");
    }

    /// The longest readable delay returns the sample written C-1 calls ago.
    #[test]
    fn test_max_delay_reads_oldest_live_sample() {
        let mut db = buffer(8);
        assert_eq!(db.capacity(), 8);
        assert_eq!(db.max_delay(), 7.0);

        for i in 0..8 {
            db.write(i as f32);
        }

        // Seven calls ago the value 1.0 was written.
        assert!((db.read_delayed(db.max_delay()) - 1.0).abs() < 1e-6);
    }
}
