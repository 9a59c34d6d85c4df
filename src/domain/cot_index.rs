//! Rolling COT index over a net-position series.
//!
//! COT_INDEX[lower..=upper] = round((cur - min) / (max - min) * 100)
//! where cur = series[upper]. A flat range yields 50.
//! Rounding is to nearest, ties to even.

/// Value reported when the window has no spread (max == min).
pub const FLAT_RANGE_INDEX: i32 = 50;

/// Index of `series[upper]` within the inclusive range `lower..=upper`.
///
/// Callers guarantee `lower <= upper < series.len()`.
pub fn cot_index(series: &[i64], lower: usize, upper: usize) -> i32 {
    let window = &series[lower..=upper];
    let (min, max) = window
        .iter()
        .fold((i64::MAX, i64::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    if max == min {
        return FLAT_RANGE_INDEX;
    }

    // widened so extreme nets cannot overflow the spread
    let current = i128::from(series[upper]);
    let (min, max) = (i128::from(min), i128::from(max));
    let ratio = (current - min) as f64 / (max - min) as f64;
    (ratio * 100.0).round_ties_even() as i32
}
