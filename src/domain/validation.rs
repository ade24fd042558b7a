// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Functions - Field Invariants
//!
//! Small composable checks shared by every command handler. Create and
//! update run the same functions, so a field accepted on create is accepted
//! on update and vice versa.

use chrono::NaiveDate;

use crate::errors::{DomainError, DomainResult};

/// Maximum length of names and other single-line text fields
pub const MAX_NAME_LENGTH: usize = 200;

/// Required, non-blank single-line text
pub fn require_text(field: &str, value: Option<&str>) -> DomainResult<String> {
    match value {
        Some(value) => text(field, value),
        None => Err(DomainError::required(field)),
    }
}

/// Non-blank single-line text, trimmed
pub fn text(field: &str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(field, "must not be blank"));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(DomainError::validation(
            field,
            format!("must be at most {MAX_NAME_LENGTH} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

/// Optional single-line text; present values must be non-blank
pub fn optional_text(field: &str, value: Option<&str>) -> DomainResult<Option<String>> {
    value.map(|v| text(field, v)).transpose()
}

/// Reference to another aggregate by id
pub fn reference(field: &str, value: &str) -> DomainResult<String> {
    let id = text(field, value)?;
    if id.chars().any(char::is_whitespace) {
        return Err(DomainError::validation(field, "ids cannot contain whitespace"));
    }
    Ok(id)
}

/// Tag set: trimmed, non-blank, duplicates removed, first occurrence wins
pub fn tags(values: &[String]) -> DomainResult<Vec<String>> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let tag = text("tags", value)?;
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    Ok(out)
}

/// Reference list with the same rules as [`tags`]
pub fn references(field: &str, values: &[String]) -> DomainResult<Vec<String>> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let id = reference(field, value)?;
        if !out.contains(&id) {
            out.push(id);
        }
    }
    Ok(out)
}

/// Confidence score in [0, 1]
pub fn confidence(value: f64) -> DomainResult<f64> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(DomainError::validation(
            "confidence",
            format!("{value} is outside [0, 1]"),
        ));
    }
    Ok(value)
}

/// Effective window; both ends optional, `from` must not follow `to`
pub fn effective_window(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> DomainResult<(Option<NaiveDate>, Option<NaiveDate>)> {
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(DomainError::validation(
                "effective_to",
                format!("{to} is before effective_from {from}"),
            ));
        }
    }
    Ok((from, to))
}

/// Reject a patch that changes nothing
pub fn non_empty_patch(is_empty: bool) -> DomainResult<()> {
    if is_empty {
        return Err(DomainError::validation("payload", "update contains no fields"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_require_text() {
        assert_eq!(require_text("name", Some("  CRM ")).unwrap(), "CRM");
        assert_eq!(
            require_text("name", None).unwrap_err(),
            DomainError::required("name")
        );
        assert!(require_text("name", Some("   ")).is_err());
    }

    #[test]
    fn test_text_length_limit() {
        let long = "x".repeat(MAX_NAME_LENGTH + 1);
        assert!(text("name", &long).is_err());
        assert!(text("name", &long[1..]).is_ok());
    }

    #[test]
    fn test_tags_are_deduplicated_in_order() {
        let input = vec!["crm".to_string(), " sales ".to_string(), "crm".to_string()];
        assert_eq!(tags(&input).unwrap(), vec!["crm", "sales"]);
        assert!(tags(&["".to_string()]).is_err());
    }

    #[test]
    fn test_reference_rejects_whitespace() {
        assert!(reference("parent_id", "org 1").is_err());
        assert_eq!(reference("parent_id", " org-1 ").unwrap(), "org-1");
    }

    #[test]
    fn test_confidence_bounds() {
        assert!(confidence(0.0).is_ok());
        assert!(confidence(1.0).is_ok());
        assert!(confidence(1.01).is_err());
        assert!(confidence(-0.1).is_err());
        assert!(confidence(f64::NAN).is_err());
    }

    #[test]
    fn test_effective_window() {
        let jan = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let feb = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        assert!(effective_window(Some(jan), Some(feb)).is_ok());
        assert!(effective_window(Some(feb), None).is_ok());
        assert!(effective_window(Some(feb), Some(jan)).is_err());
    }
}
