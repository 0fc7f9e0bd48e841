//! Shared numeric helpers.
//!
//! Rounding goes through `Decimal` with a half-away-from-zero strategy so that
//! every score and measurement in a response is rounded the same way
//! (`2.25 → 2.3`, `-2.5 → -3`), without binary float artefacts.
//!
//! All helpers return `0.0` / `Decimal::ZERO` for non-finite inputs (NaN, ±Inf).

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

/// Round an f64 to `dp` decimal places, half away from zero.
pub(crate) fn round_dp(v: f64, dp: u32) -> f64 {
    if !v.is_finite() {
        tracing::warn!("round_dp received non-finite value {}, defaulting to 0", v);
        return 0.0;
    }
    Decimal::from_f64(v)
        .map(|d| d.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or(0.0)
}

/// Round to one decimal place (scores, temperatures, rainfall).
pub(crate) fn round_1dp(v: f64) -> f64 {
    round_dp(v, 1)
}

/// Round to two decimal places (irradiance, efficiency factors).
pub(crate) fn round_2dp(v: f64) -> f64 {
    round_dp(v, 2)
}

/// Round to the nearest integer, clamped into `u32`.
pub(crate) fn round_u32(v: f64) -> u32 {
    round_dp(v, 0).clamp(0.0, f64::from(u32::MAX)) as u32
}

/// Arithmetic mean; `0.0` for an empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Convert an f64 to Decimal preserving its precision.
pub(crate) fn f64_to_decimal(v: f64) -> Decimal {
    if !v.is_finite() {
        tracing::warn!("f64_to_decimal received non-finite value {}, defaulting to 0", v);
        return Decimal::ZERO;
    }
    Decimal::from_f64(v).unwrap_or(Decimal::ZERO)
}

/// Convert a Decimal to f64, defaulting to 0.0 for values that can't be represented.
pub(crate) fn dec_to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}
