//! Input validation helpers shared by API handlers.

use crate::utils::{AppError, AppResult};

/// Maximum length for names (categories, products, customers)
pub const MAX_NAME_LEN: usize = 100;

/// Validate that a required text field is non-empty (after trimming) and
/// within the length limit.
pub fn validate_required_text(value: &str, field_name: &str, max_len: usize) -> AppResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{field_name} must not be empty")));
    }
    if trimmed.len() > max_len {
        return Err(AppError::validation(format!(
            "{field_name} must not exceed {max_len} characters"
        )));
    }
    Ok(())
}

/// Validate an optional text field (ignored when `None`).
pub fn validate_optional_text(
    value: &Option<String>,
    field_name: &str,
    max_len: usize,
) -> AppResult<()> {
    if let Some(v) = value {
        if v.len() > max_len {
            return Err(AppError::validation(format!(
                "{field_name} must not exceed {max_len} characters"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_required_text() {
        assert!(validate_required_text("   ", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text("Bebidas", "name", MAX_NAME_LEN).is_ok());
    }

    #[test]
    fn optional_text_is_only_checked_when_present() {
        assert!(validate_optional_text(&None, "note", 5).is_ok());
        assert!(validate_optional_text(&Some("toolong".into()), "note", 5).is_err());
    }
}
