//! Shared input validation helpers.
//!
//! Reusable checks used by request validation in the engine crate and by the
//! pure ranking modules. All failures surface as `CoreError::Validation` with
//! the offending field named.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::CoreError;

static LANGUAGE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2,3}(-[A-Z]{2})?$").expect("valid regex"));

/// Validate that a value falls within `[0.0, 1.0]`.
///
/// Returns a `CoreError::Validation` naming the field if out of range.
pub fn validate_unit_range(value: f64, name: &str) -> Result<(), CoreError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(CoreError::Validation(format!(
            "{name} must be between 0.0 and 1.0, got {value}"
        )));
    }
    Ok(())
}

/// Validate that a value is finite and strictly positive.
pub fn validate_positive(value: f64, name: &str) -> Result<(), CoreError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CoreError::Validation(format!(
            "{name} must be positive, got {value}"
        )));
    }
    Ok(())
}

/// Validate that an integer count falls within `[min, max]`.
pub fn validate_count_range(value: i64, min: i64, max: i64, name: &str) -> Result<(), CoreError> {
    if !(min..=max).contains(&value) {
        return Err(CoreError::Validation(format!(
            "{name} must be between {min} and {max}, got {value}"
        )));
    }
    Ok(())
}

/// Validate that a string field is non-empty after trimming.
pub fn validate_non_empty(value: &str, name: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{name} must not be empty")));
    }
    Ok(())
}

/// Validate a BCP-47-style language tag of the form `xx` or `xx-YY`.
///
/// Only the primary subtag and an optional region subtag are accepted; that
/// covers every tag candidates declare in practice.
pub fn validate_language_tag(value: &str, name: &str) -> Result<(), CoreError> {
    if !LANGUAGE_TAG.is_match(value) {
        return Err(CoreError::Validation(format!(
            "{name} must be a language tag like 'en' or 'pt-BR', got '{value}'"
        )));
    }
    Ok(())
}

/// Primary subtag of a language tag (`"pt-BR"` -> `"pt"`).
pub fn language_primary(tag: &str) -> &str {
    tag.split('-').next().unwrap_or(tag)
}
