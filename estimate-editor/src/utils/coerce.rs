//! Numeric coercion for user-entered values.
//!
//! Inline inputs are free text. Anything that does not parse becomes zero and
//! negative values are clamped, so the store never holds a negative amount.
//! Values above the entry limits are refused outright.

use crate::error::{EditorError, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

fn parse_decimal(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Largest quantity a row accepts.
pub const MAX_QUANTITY: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Largest unit cost or retail a row accepts.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

fn within(value: Decimal, limit: Decimal, field: &str) -> Result<Decimal> {
    if value > limit {
        return Err(EditorError::OutOfRange(format!(
            "{} {} exceeds {}",
            field, value, limit
        )));
    }
    Ok(value)
}

pub fn clamp_non_negative(value: Decimal) -> Decimal {
    if value.is_sign_negative() {
        Decimal::ZERO
    } else {
        value.normalize()
    }
}

/// Non-negative, rounded to cents.
pub fn clamp_money(value: Decimal) -> Decimal {
    clamp_non_negative(value).round_dp(2)
}

/// Quantity typed into a row: non-numeric is 0, negative is 0.
pub fn coerce_quantity(raw: &str) -> Result<Decimal> {
    let value = parse_decimal(raw).map(clamp_non_negative).unwrap_or(Decimal::ZERO);
    within(value, MAX_QUANTITY, "quantity")
}

/// Cost or retail typed into a row.
pub fn coerce_amount(raw: &str) -> Result<Decimal> {
    let value = parse_decimal(raw).map(clamp_money).unwrap_or(Decimal::ZERO);
    within(value, MAX_AMOUNT, "amount")
}

/// Quantity picked next to a suggestion: blank or garbage means 1, negative
/// means 0, fractions are truncated.
pub fn coerce_selection_quantity(raw: &str) -> u32 {
    match parse_decimal(raw) {
        None => 1,
        Some(value) if value.is_sign_negative() => 0,
        Some(value) => value.trunc().to_u32().unwrap_or(u32::MAX),
    }
}
