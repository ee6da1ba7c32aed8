//! Validation helpers for DTOs.

use validator::{ValidateEmail, ValidationError};

/// Longest accepted team or owner name, in characters.
pub const MAX_NAME_LENGTH: usize = 60;

/// Validates a team or owner name: non-blank, at most [`MAX_NAME_LENGTH`]
/// characters once trimmed, no control characters.
///
/// # Examples
///
/// ```ignore
/// validate_display_name("Eagles FC")  // Ok
/// validate_display_name("   ")        // Err - blank
/// validate_display_name("Ea\tgles")   // Err - control character
/// ```
pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        let mut err = ValidationError::new("name_blank");
        err.message = Some("Name must not be blank".into());
        return Err(err);
    }

    let length = trimmed.chars().count();
    if length > MAX_NAME_LENGTH {
        let mut err = ValidationError::new("name_length");
        err.message = Some(
            format!("Name must be at most {MAX_NAME_LENGTH} characters (got {length})").into(),
        );
        return Err(err);
    }

    if trimmed.chars().any(char::is_control) {
        let mut err = ValidationError::new("name_format");
        err.message = Some("Name must not contain control characters".into());
        return Err(err);
    }

    Ok(())
}

/// Validates that a required free-text field is not blank.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Validates an optional email; a blank value counts as absent.
pub fn validate_optional_email(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.validate_email() {
        return Ok(());
    }
    let mut err = ValidationError::new("email");
    err.message = Some("Email address is not valid".into());
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_display_name_valid() {
        assert!(validate_display_name("Eagles").is_ok());
        assert!(validate_display_name("  Night Owls  ").is_ok());
        assert!(validate_display_name("Ünïcödé Ültras").is_ok());
        assert!(validate_display_name(&"x".repeat(MAX_NAME_LENGTH)).is_ok());
    }

    #[test]
    fn test_validate_display_name_blank() {
        assert!(validate_display_name("").is_err());
        assert!(validate_display_name("   ").is_err());
    }

    #[test]
    fn test_validate_display_name_invalid() {
        assert!(validate_display_name(&"x".repeat(MAX_NAME_LENGTH + 1)).is_err());
        assert!(validate_display_name("Ea\tgles").is_err());
        assert!(validate_display_name("Eagles\u{0}").is_err());
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Kickoff").is_ok());
        assert!(validate_not_blank(" \n").is_err());
    }

    #[test]
    fn test_validate_optional_email() {
        assert!(validate_optional_email("ann@example.com").is_ok());
        assert!(validate_optional_email("").is_ok());
        assert!(validate_optional_email("   ").is_ok());
        assert!(validate_optional_email("not-an-email").is_err());
    }
}
