//! Input validation helpers shared by request DTOs.

use validator::ValidationErrors;

use crate::error::CoreError;

/// Companion name length bounds, in characters.
pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 50;

/// Convert `validator` failures into a single [`CoreError::Validation`].
///
/// Field errors are flattened to `field: message` pairs sorted by field so
/// the output is stable.
pub fn from_validation_errors(errors: ValidationErrors) -> CoreError {
    let mut parts: Vec<String> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let detail = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("{field}: {detail}")
        })
        .collect();
    parts.sort();
    CoreError::Validation(parts.join("; "))
}

/// Trim a companion name and check its length.
pub fn normalize_name(name: &str) -> Result<String, CoreError> {
    let trimmed = name.trim();
    let chars = trimmed.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&chars) {
        return Err(CoreError::Validation(format!(
            "Name must be between {NAME_MIN_CHARS} and {NAME_MAX_CHARS} characters"
        )));
    }
    Ok(trimmed.to_string())
}
