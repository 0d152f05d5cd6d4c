//! Input validation applied before data reaches reconciliation or payroll.
//!
//! Malformed identifiers, contact details and timestamps are rejected with
//! [`EngineError::Validation`]; they are never coerced.

use chrono::{DateTime, NaiveDateTime};
use uuid::Uuid;
use validator::ValidateEmail;

use crate::error::{EngineError, EngineResult};

fn invalid(field: &str, message: impl Into<String>) -> EngineError {
    EngineError::Validation {
        field: field.to_string(),
        message: message.into(),
    }
}

/// Parses a UUID supplied as text.
///
/// ```
/// use attendance_engine::validation::parse_uuid;
///
/// assert!(parse_uuid("employee_id", "6f1c2b1e-3d4a-4c55-9e0f-0a1b2c3d4e5f").is_ok());
/// assert!(parse_uuid("employee_id", "emp-42").is_err());
/// ```
pub fn parse_uuid(field: &str, value: &str) -> EngineResult<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|e| invalid(field, e.to_string()))
}

/// Parses a punch or adjustment timestamp.
///
/// Accepts naive ISO-8601 local timestamps (`2026-01-15T09:00:00`, also with a
/// space separator) and RFC 3339 timestamps with an offset, in which case the
/// wall-clock part is kept.
pub fn parse_timestamp(field: &str, value: &str) -> EngineResult<NaiveDateTime> {
    let trimmed = value.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(with_offset.naive_local());
    }
    trimmed
        .parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S"))
        .map_err(|e| invalid(field, format!("'{trimmed}' is not an ISO-8601 timestamp: {e}")))
}

/// Checks an email address against the HTML5 email grammar.
///
/// ```
/// use attendance_engine::validation::validate_email;
///
/// assert!(validate_email("ama@example.com").is_ok());
/// assert!(validate_email("ama.example.com").is_err());
/// ```
pub fn validate_email(email: &str) -> EngineResult<()> {
    if email.validate_email() {
        Ok(())
    } else {
        Err(invalid("email", format!("'{email}' is not a valid email address")))
    }
}

/// Checks a phone number: optional leading `+`, then 9 to 15 digits.
/// Spaces, dashes and parentheses are allowed as separators.
pub fn validate_phone(phone: &str) -> EngineResult<()> {
    let body = phone.trim().strip_prefix('+').unwrap_or(phone.trim());
    let mut digits = 0;
    for c in body.chars() {
        match c {
            '0'..='9' => digits += 1,
            ' ' | '-' | '(' | ')' => {}
            other => return Err(invalid("phone", format!("unexpected character '{other}'"))),
        }
    }
    if !(9..=15).contains(&digits) {
        return Err(invalid("phone", format!("expected 9 to 15 digits, found {digits}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_uuid_names_field_on_error() {
        match parse_uuid("tenant_id", "nope") {
            Err(EngineError::Validation { field, .. }) => assert_eq!(field, "tenant_id"),
            _ => panic!("Expected Validation error"),
        }
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2026, 1, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(parse_timestamp("time", "2026-01-15T09:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp("time", "2026-01-15 09:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp("time", "2026-01-15T09:30:00Z").unwrap(), expected);
        assert_eq!(
            parse_timestamp("time", "2026-01-15T09:30:00-05:00").unwrap(),
            expected
        );
        assert!(parse_timestamp("time", "15/01/2026").is_err());
    }

    #[test]
    fn test_valid_emails() {
        assert!(validate_email("ama@example.com").is_ok());
        assert!(validate_email("first.last@mail.company.com.gh").is_ok());
    }

    #[test]
    fn test_invalid_emails() {
        assert!(validate_email("ama.example.com").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ama@").is_err());
        assert!(validate_email("ama@example..com").is_err());
        assert!(validate_email("ama @example.com").is_err());
        assert!(validate_email("a@b@example.com").is_err());
    }

    #[test]
    fn test_valid_phones() {
        assert!(validate_phone("+233 24 123 4567").is_ok());
        assert!(validate_phone("024-123-4567").is_ok());
        assert!(validate_phone("(030) 277 1234").is_ok());
    }

    #[test]
    fn test_invalid_phones() {
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("+233 24 ABC 4567").is_err());
        assert!(validate_phone("1234567890123456").is_err());
    }
}
