//! Coercion of monetary input.
//!
//! Salaries and deductions arrive from forms and spreadsheets. Anything that
//! is not a finite, non-negative number is treated as zero rather than
//! rejected, so a payslip can always be produced.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Converts a floating point amount to a decimal.
///
/// NaN, infinities and negative values become zero.
///
/// # Examples
///
/// ```
/// use attendance_engine::calculation::coerce_amount;
/// use rust_decimal::Decimal;
///
/// assert_eq!(coerce_amount(1250.5), Decimal::new(12505, 1));
/// assert_eq!(coerce_amount(f64::NAN), Decimal::ZERO);
/// assert_eq!(coerce_amount(-10.0), Decimal::ZERO);
/// ```
pub fn coerce_amount(value: f64) -> Decimal {
    if !value.is_finite() {
        return Decimal::ZERO;
    }
    Decimal::from_f64(value).map_or(Decimal::ZERO, non_negative)
}

/// Clamps a decimal amount at zero.
pub fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

/// Parses an amount from text, returning zero when it is not a number.
pub fn parse_amount(raw: &str) -> Decimal {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_or(Decimal::ZERO, non_negative)
}

/// Serde helper that accepts a number, a numeric string or null.
///
/// Use with `#[serde(default, deserialize_with = "lenient_amount")]`.
pub fn lenient_amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(number) => match Decimal::from_str(&number.to_string()) {
            Ok(amount) => non_negative(amount),
            Err(_) => number.as_f64().map_or(Decimal::ZERO, coerce_amount),
        },
        Value::String(raw) => parse_amount(&raw),
        _ => Decimal::ZERO,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[derive(Debug, Deserialize)]
    struct Amount {
        #[serde(default, deserialize_with = "lenient_amount")]
        value: Decimal,
    }

    fn lenient(json: &str) -> Decimal {
        serde_json::from_str::<Amount>(json).unwrap().value
    }

    #[test]
    fn test_coerce_non_finite_to_zero() {
        assert_eq!(coerce_amount(f64::INFINITY), Decimal::ZERO);
        assert_eq!(coerce_amount(f64::NEG_INFINITY), Decimal::ZERO);
        assert_eq!(coerce_amount(f64::NAN), Decimal::ZERO);
    }

    #[test]
    fn test_coerce_keeps_valid_amounts() {
        assert_eq!(coerce_amount(0.0), Decimal::ZERO);
        assert_eq!(coerce_amount(3000.0), dec("3000"));
    }

    #[test]
    fn test_parse_amount_text() {
        assert_eq!(parse_amount(" 450.25 "), dec("450.25"));
        assert_eq!(parse_amount("1e3"), dec("1000"));
        assert_eq!(parse_amount("abc"), Decimal::ZERO);
        assert_eq!(parse_amount(""), Decimal::ZERO);
        assert_eq!(parse_amount("-5"), Decimal::ZERO);
    }

    #[test]
    fn test_lenient_amount_shapes() {
        assert_eq!(lenient(r#"{"value": 12.75}"#), dec("12.75"));
        assert_eq!(lenient(r#"{"value": 40}"#), dec("40"));
        assert_eq!(lenient(r#"{"value": "99.9"}"#), dec("99.9"));
        assert_eq!(lenient(r#"{"value": null}"#), Decimal::ZERO);
        assert_eq!(lenient(r#"{}"#), Decimal::ZERO);
        assert_eq!(lenient(r#"{"value": "Infinity"}"#), Decimal::ZERO);
        assert_eq!(lenient(r#"{"value": true}"#), Decimal::ZERO);
        assert_eq!(lenient(r#"{"value": [1]}"#), Decimal::ZERO);
    }
}
