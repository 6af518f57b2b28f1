//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Minimum password length, in characters
pub const PASSWORD_MIN_LEN: usize = 6;
/// Maximum password length, in characters
pub const PASSWORD_MAX_LEN: usize = 100;
/// Maximum post size, in bytes of UTF-8
pub const POST_TEXT_MAX_BYTES: usize = 1_000_000;

/// A rejected input field
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), FieldError> {
    if email.is_empty() {
        return Err(FieldError::new("email", "Email is required"));
    }

    if email.len() > 254 {
        return Err(FieldError::new(
            "email",
            "Email must be at most 254 characters long",
        ));
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err(FieldError::new("email", "Invalid email format"));
    }

    Ok(())
}

fn validate_password_length(password: &str) -> Result<(), FieldError> {
    if password.is_empty() {
        return Err(FieldError::new("password", "Password is required"));
    }

    let length = password.chars().count();

    if length < PASSWORD_MIN_LEN {
        return Err(FieldError::new(
            "password",
            format!("Password must be at least {PASSWORD_MIN_LEN} characters long"),
        ));
    }

    if length > PASSWORD_MAX_LEN {
        return Err(FieldError::new(
            "password",
            format!("Password must be at most {PASSWORD_MAX_LEN} characters long"),
        ));
    }

    Ok(())
}

/// Validate a password chosen at signup
pub fn validate_password(password: &str) -> Result<(), FieldError> {
    validate_password_length(password)?;

    let mut has_upper = false;
    let mut has_lower = false;
    let mut has_digit = false;

    for c in password.chars() {
        if c.is_ascii_uppercase() {
            has_upper = true;
        } else if c.is_ascii_lowercase() {
            has_lower = true;
        } else if c.is_ascii_digit() {
            has_digit = true;
        }
    }

    if !has_upper {
        return Err(FieldError::new(
            "password",
            "Password must contain at least one uppercase letter",
        ));
    }

    if !has_lower {
        return Err(FieldError::new(
            "password",
            "Password must contain at least one lowercase letter",
        ));
    }

    if !has_digit {
        return Err(FieldError::new(
            "password",
            "Password must contain at least one digit",
        ));
    }

    Ok(())
}

/// Validate credentials submitted at login; strength is not re-checked
pub fn validate_login(email: &str, password: &str) -> Result<(), FieldError> {
    validate_email(email)?;
    validate_password_length(password)
}

/// Validate the body of a post
pub fn validate_post_text(text: &str) -> Result<(), FieldError> {
    if text.is_empty() {
        return Err(FieldError::new("text", "Text must not be empty"));
    }

    if text.len() > POST_TEXT_MAX_BYTES {
        return Err(FieldError::new(
            "text",
            format!("Text must be at most {POST_TEXT_MAX_BYTES} bytes"),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(validate_email("a@x.com").is_ok());
        assert!(validate_email("first.last+tag@sub.example.org").is_ok());
    }

    #[test]
    fn test_invalid_emails() {
        for email in ["", "plain", "a@b", "@x.com", "a b@x.com"] {
            let err = validate_email(email).unwrap_err();
            assert_eq!(err.field, "email", "{email}");
        }
        let long = format!("{}@x.com", "a".repeat(250));
        assert!(validate_email(&long).is_err());
    }

    #[test]
    fn test_password_strength() {
        assert!(validate_password("Abc123").is_ok());
        assert!(validate_password("correctHorse9").is_ok());

        let cases = [
            ("", "required"),
            ("Ab1", "at least 6"),
            ("abc123", "uppercase"),
            ("ABC123", "lowercase"),
            ("Abcdef", "digit"),
        ];
        for (password, expected) in cases {
            let err = validate_password(password).unwrap_err();
            assert_eq!(err.field, "password");
            assert!(err.message.contains(expected), "{password}: {}", err.message);
        }

        let long = format!("Ab1{}", "x".repeat(PASSWORD_MAX_LEN));
        assert!(validate_password(&long).is_err());
    }

    #[test]
    fn test_password_length_counts_characters() {
        // Six characters, more than six bytes
        assert!(validate_password("Ab1ééé").is_ok());
    }

    #[test]
    fn test_login_checks_shape_only() {
        assert!(validate_login("a@x.com", "weakpass").is_ok());
        assert_eq!(validate_login("nope", "weakpass").unwrap_err().field, "email");
        assert_eq!(validate_login("a@x.com", "123").unwrap_err().field, "password");
    }

    #[test]
    fn test_post_text_bounds() {
        assert!(validate_post_text("h").is_ok());
        assert!(validate_post_text(&"a".repeat(POST_TEXT_MAX_BYTES)).is_ok());
        assert_eq!(validate_post_text("").unwrap_err().field, "text");
        assert!(validate_post_text(&"a".repeat(POST_TEXT_MAX_BYTES + 1)).is_err());

        // 500,001 two-byte characters exceed the byte limit
        let multibyte = "é".repeat(500_001);
        assert!(validate_post_text(&multibyte).is_err());
    }

    #[test]
    fn test_field_error_is_an_error() {
        let err = validate_email("plain").unwrap_err();
        assert_eq!(err.to_string(), "email: Invalid email format");

        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert!(boxed.source().is_none());
    }
}
