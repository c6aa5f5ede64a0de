//! Numeric guards applied at formula boundaries
//!
//! Degenerate arithmetic (zero denominators, overflow to infinity, NaN)
//! collapses to a neutral zero here instead of leaking into downstream totals.

/// Convert a percentage to a fraction
#[inline]
pub fn pct(rate_percent: f64) -> f64 {
    rate_percent / 100.0
}

/// `value`, or zero when it is NaN or infinite
#[inline]
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Division that yields zero for a zero or non-finite denominator
#[inline]
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    finite_or_zero(numerator / denominator)
}

/// `value` as a percentage of `base`, zero when `base` is zero
#[inline]
pub fn percent_of(value: f64, base: f64) -> f64 {
    safe_div(value, base) * 100.0
}
