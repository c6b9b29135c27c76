//! Display rounding.
//!
//! Scale by 10^places, round half away from zero, scale back. The result
//! carries the usual binary floating-point caveats: 1.005 is stored as
//! 1.00499999999999989..., so `round(1.005, 2)` is 1.0, not 1.01.
//! Not for monetary exactness.

pub fn round(value: f64, places: i32) -> f64 {
    let multiplier = 10f64.powi(places);
    (value * multiplier).round() / multiplier
}
