//! Field-level validation helpers shared by the request handlers.
//!
//! Each helper pushes a human-readable message into the caller's error list;
//! handlers collect them and reject the request with a 400 when non-empty.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Check that a required text field is present and non-blank.
pub fn require(errors: &mut Vec<String>, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(format!("{field} is required"));
    }
}

/// Check a required email field.
pub fn require_email(errors: &mut Vec<String>, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(format!("{field} is required"));
    } else if !is_valid_email(value) {
        errors.push(format!("{field} is not a valid email address"));
    }
}

/// Check an optional email field (only validated when present and non-blank).
pub fn optional_email(errors: &mut Vec<String>, field: &str, value: Option<&str>) {
    if let Some(value) = value
        && !value.trim().is_empty()
        && !is_valid_email(value)
    {
        errors.push(format!("{field} is not a valid email address"));
    }
}

/// Check that an amount is strictly positive and finite.
pub fn require_positive(errors: &mut Vec<String>, field: &str, value: f64) {
    if !value.is_finite() || value <= 0.0 {
        errors.push(format!("{field} must be greater than 0"));
    }
}

/// Check that an end date does not precede a start date.
pub fn require_date_order(
    errors: &mut Vec<String>,
    start_field: &str,
    start: NaiveDate,
    end_field: &str,
    end: NaiveDate,
) {
    if end < start {
        errors.push(format!("{end_field} cannot be earlier than {start_field}"));
    }
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("jane@example.com"));
        assert!(is_valid_email("j.doe+tag@sub.example.co"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("two words@example.com"));
        assert!(!is_valid_email("missing@tld"));
    }

    #[test]
    fn test_require_collects_messages() {
        let mut errors = Vec::new();
        require(&mut errors, "name", "  ");
        require_email(&mut errors, "email", "nope");
        require_positive(&mut errors, "amount", -3.0);
        assert_eq!(
            errors,
            vec![
                "name is required",
                "email is not a valid email address",
                "amount must be greater than 0",
            ]
        );
    }

    #[test]
    fn test_date_order() {
        let mut errors = Vec::new();
        let issue = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let due = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        require_date_order(&mut errors, "issue_date", issue, "due_date", due);
        assert_eq!(errors.len(), 1);
    }
}
