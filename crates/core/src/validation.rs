//! Field rules shared by request DTOs.
//!
//! The functions here plug into `#[validate(custom(function = ...))]`.

use std::borrow::Cow;

use validator::ValidationError;

use crate::metadata::ProjectMetadata;

/// Maximum username length in characters.
pub const USERNAME_MAX_LENGTH: u64 = 150;

/// Maximum project name length in characters.
pub const PROJECT_NAME_MAX_LENGTH: u64 = 255;

pub const MSG_REQUIRED: &str = "This field is required.";
pub const MSG_USERNAME_TAKEN: &str = "A user with that username already exists.";
pub const MSG_BLANK: &str = "This field may not be blank.";
pub const MSG_NUL: &str = "Null characters are not allowed.";

/// Usernames may contain letters, digits and `@ . + - _`.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    validate_no_nul(username)?;
    let valid = username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
    if valid {
        Ok(())
    } else {
        Err(error(
            "username_chars",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        ))
    }
}

/// Rejects names that are empty once surrounding whitespace is removed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error("blank", MSG_BLANK))
    } else {
        Ok(())
    }
}

/// PostgreSQL text and JSONB cannot store U+0000.
pub fn validate_no_nul(value: &str) -> Result<(), ValidationError> {
    if value.contains('\0') {
        Err(error("null_characters", MSG_NUL))
    } else {
        Ok(())
    }
}

/// Project names: no NUL and not blank.
pub fn validate_project_name(name: &str) -> Result<(), ValidationError> {
    validate_no_nul(name)?;
    validate_not_blank(name)
}

/// Rejects metadata with a NUL in any key or string value, at any depth.
pub fn validate_metadata(metadata: &ProjectMetadata) -> Result<(), ValidationError> {
    if metadata.contains_nul() {
        Err(error("null_characters", MSG_NUL))
    } else {
        Ok(())
    }
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_letters_digits_and_symbols() {
        for name in ["testuser", "a.b", "first+last", "x_y-z", "me@host", "Ünïcödé"] {
            assert!(validate_username(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn rejects_spaces_and_symbols() {
        for name in ["has space", "semi;colon", "slash/", "quote'"] {
            let err = validate_username(name).unwrap_err();
            assert_eq!(err.code, "username_chars");
        }
    }

    #[test]
    fn nul_is_rejected_everywhere() {
        assert_eq!(validate_no_nul("a\0b").unwrap_err().code, "null_characters");
        assert!(validate_no_nul("plain").is_ok());
        assert_eq!(validate_username("nul\0").unwrap_err().code, "null_characters");
        assert_eq!(validate_project_name("a\0").unwrap_err().code, "null_characters");
        assert_eq!(validate_project_name(" ").unwrap_err().code, "blank");
    }

    #[test]
    fn metadata_nul_is_found_in_nested_keys_and_values() {
        let clean: ProjectMetadata =
            serde_json::from_value(serde_json::json!({ "a": { "b": ["c", 1] } })).unwrap();
        assert!(validate_metadata(&clean).is_ok());

        for doc in [
            serde_json::json!({ "k": "x\u{0000}y" }),
            serde_json::json!({ "k\u{0000}": 1 }),
            serde_json::json!({ "a": [{ "b": "\u{0000}" }] }),
        ] {
            let meta: ProjectMetadata = serde_json::from_value(doc).unwrap();
            assert_eq!(validate_metadata(&meta).unwrap_err().message.unwrap(), MSG_NUL);
        }
    }

    #[test]
    fn blank_check_trims() {
        assert!(validate_not_blank("Project").is_ok());
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("").is_err());
    }
}
