//! Core data structures for the qcsim simulation.

pub mod civilization;
pub mod crisis;
pub mod entity;

/// Clamps `value` into `[lo, hi]`, mapping NaN to `lo`.
#[inline]
#[must_use]
pub fn clamp_unit_range(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        lo
    } else {
        value.clamp(lo, hi)
    }
}

/// Clamps `value` into `[0, 1]`, mapping NaN to `0`.
#[inline]
#[must_use]
pub fn clamp01(value: f64) -> f64 {
    clamp_unit_range(value, 0.0, 1.0)
}
