//! Consumption and charge arithmetic
//!
//! Computed with `Decimal` and converted back to `f64` for storage.
//! No rounding is applied to amounts. Every step is checked: `None` means a
//! value that does not fit in `Decimal` or an overflowing result.

use rust_decimal::prelude::*;

/// Maximum accepted cumulative meter reading (m³)
pub const MAX_METER_READING: f64 = 1_000_000_000_000.0;

#[inline]
fn to_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64(value)
}

#[inline]
fn to_f64(value: Decimal) -> Option<f64> {
    value.to_f64()
}

/// `reading - previous`, may be negative
pub fn consumption(reading: f64, previous: f64) -> Option<f64> {
    to_decimal(reading)?
        .checked_sub(to_decimal(previous)?)
        .and_then(to_f64)
}

/// `consumed × rate`
pub fn charge(consumed: f64, rate: f64) -> Option<f64> {
    to_decimal(consumed)?
        .checked_mul(to_decimal(rate)?)
        .and_then(to_f64)
}
