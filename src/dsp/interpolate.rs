//! # Fractional-Sample Interpolation
//!
//! Delay times in milliseconds almost never land on a whole number of
//! samples: 10.007 ms at 44100 Hz is 441.3 samples. Reading only whole
//! positions would make the delay time jump in one-sample steps whenever
//! it changes ("stair-stepping"), which is audible as zipper noise.
//!
//! Linear interpolation draws a straight line between the two stored
//! samples either side of the fractional position:
//!
//! ```text
//! result = storage[i] * (1 - frac) + storage[i + 1] * frac
//! ```
//!
//! It slightly damps the highest frequencies when `frac` sits near 0.5,
//! which suits an analog-style delay just fine.

/// Blend between `a` and `b`. `frac = 0.0` yields `a`, `frac = 1.0` yields `b`.
#[inline]
pub fn lerp(a: f32, b: f32, frac: f32) -> f32 {
    a * (1.0 - frac) + b * frac
}

/// Read `storage` at position `index + frac`, wrapping around the end.
///
/// `index` must be in `[0, storage.len())` and `frac` in `[0, 1]`. The
/// position arrives already split so the fraction keeps full precision no
/// matter how far into a long buffer `index` points. The upper neighbour of
/// the last slot is slot 0, which is what makes this correct for circular
/// buffers.
#[inline]
pub fn read_linear(storage: &[f32], index: usize, frac: f32) -> f32 {
    let next = if index + 1 == storage.len() { 0 } else { index + 1 };

    lerp(storage[index], storage[next], frac)
}
