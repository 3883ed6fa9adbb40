//! Value normalization shared by invoices, receipts and callbacks.
//!
//! Robokassa compares signed strings byte-for-byte, so every amount and
//! timestamp is rendered exactly once, here, before it is stored.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use time::OffsetDateTime;
use time::macros::format_description;

use crate::error::InvalidValue;

/// A monetary amount as supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Amount {
    Float(f64),
    Decimal(Decimal),
    Text(String),
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Amount::Float(value)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::Decimal(value)
    }
}

impl From<i32> for Amount {
    fn from(value: i32) -> Self {
        Amount::Decimal(Decimal::from(value))
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount::Decimal(Decimal::from(value))
    }
}

impl From<u32> for Amount {
    fn from(value: u32) -> Self {
        Amount::Decimal(Decimal::from(value))
    }
}

impl From<&str> for Amount {
    fn from(value: &str) -> Self {
        Amount::Text(value.to_owned())
    }
}

impl From<String> for Amount {
    fn from(value: String) -> Self {
        Amount::Text(value)
    }
}

impl Amount {
    /// Parse into an exact decimal without rounding.
    pub fn to_decimal(&self) -> Result<Decimal, InvalidValue> {
        match self {
            Amount::Decimal(value) => Ok(*value),
            Amount::Float(value) => {
                if !value.is_finite() {
                    return Err(InvalidValue::NonFiniteAmount);
                }
                // Display yields the shortest text that round-trips, so 1.005
                // stays 1.005 instead of its binary neighbour.
                parse_text(&value.to_string())
            }
            Amount::Text(text) => parse_text(text),
        }
    }
}

fn parse_text(text: &str) -> Result<Decimal, InvalidValue> {
    let malformed = || InvalidValue::MalformedAmount(text.to_owned());
    let trimmed = text.trim();
    let numeric_chars = trimmed
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'));
    if trimmed.is_empty() || !numeric_chars {
        return Err(malformed());
    }
    if let Ok(value) = Decimal::from_str(trimmed).or_else(|_| Decimal::from_scientific(trimmed)) {
        return Ok(value);
    }
    // Numeric text that still does not fit a Decimal: magnitudes below one
    // only lose digits far past the cents, larger ones overflow.
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value.abs() < 1.0 => {
            Ok(Decimal::try_from(value).unwrap_or(Decimal::ZERO))
        }
        Ok(_) => Err(InvalidValue::AmountOutOfRange(trimmed.to_owned())),
        Err(_) => Err(malformed()),
    }
}

/// Render an amount with exactly two fractional digits and a `.` separator.
///
/// Rounds half away from zero. No grouping separators are ever emitted.
pub fn format_amount(amount: impl Into<Amount>) -> Result<String, InvalidValue> {
    let value = amount.into().to_decimal()?;
    Ok(render_decimal(value))
}

pub(crate) fn render_decimal(value: Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    format!("{rounded:.2}")
}

/// Render a point in time as `YYYY-MM-DDThh:mm:ss.fffffff±hh:mm`.
///
/// Fractional seconds are truncated to 100 ns ticks. The offset is always
/// numeric; UTC renders as `+00:00`.
pub fn format_timestamp(value: OffsetDateTime) -> Result<String, InvalidValue> {
    let formatted = value.format(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:7][offset_hour sign:mandatory]:[offset_minute]"
    ))?;
    Ok(formatted)
}
