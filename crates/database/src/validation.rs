//! Input validation for user-supplied fields.

use std::fmt;

use chrono_tz::Tz;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Not a known IANA timezone name.
    InvalidTimezone(String),
    /// Pairing code has the wrong shape.
    InvalidPairingCode(String),
    /// Value too long.
    TooLong { field: String, max: usize, actual: usize },
    /// Empty value where one is required.
    Empty(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidTimezone(tz) => write!(f, "Invalid timezone: {}", tz),
            ValidationError::InvalidPairingCode(msg) => write!(f, "Invalid pairing code: {}", msg),
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "{} is too long ({} chars, max {})", field, actual, max)
            }
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Maximum allowed length for display names.
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum allowed length for goal titles.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum allowed length for goal descriptions.
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// Length of generated pairing codes.
pub const PAIRING_CODE_LENGTH: usize = 8;

/// Maximum accepted length of a pairing code typed by a user.
pub const MAX_PAIRING_CODE_LENGTH: usize = 64;

/// Parse an IANA timezone name, returning the zone.
pub fn parse_timezone(tz: &str) -> Result<Tz, ValidationError> {
    let tz = tz.trim();
    if tz.is_empty() {
        return Err(ValidationError::Empty("timezone".to_string()));
    }
    tz.parse::<Tz>()
        .map_err(|_| ValidationError::InvalidTimezone(tz.to_string()))
}

/// Validate an IANA timezone name.
pub fn validate_timezone(tz: &str) -> Result<(), ValidationError> {
    parse_timezone(tz).map(|_| ())
}

fn validate_length(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Empty(field.to_string()));
    }
    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
            actual: len,
        });
    }
    Ok(())
}

/// Validate a display name.
pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    validate_length("name", name, MAX_NAME_LENGTH)
}

/// Validate a goal title and description.
pub fn validate_goal(title: &str, description: &str) -> Result<(), ValidationError> {
    validate_length("title", title, MAX_TITLE_LENGTH)?;
    validate_length("description", description, MAX_DESCRIPTION_LENGTH)
}

/// Validate a pairing code as typed into the chat.
///
/// Codes are opaque tokens: a single word of ASCII letters, digits, `-` or `_`.
pub fn validate_pairing_code(code: &str) -> Result<(), ValidationError> {
    let code = code.trim();
    validate_length("pairing code", code, MAX_PAIRING_CODE_LENGTH)?;
    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidPairingCode(
            "must be a single word of letters and digits".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_timezone() {
        assert!(validate_timezone("America/New_York").is_ok());
        assert!(validate_timezone("Asia/Kolkata").is_ok());
        assert!(validate_timezone(" Europe/Berlin ").is_ok());
        assert!(validate_timezone("UTC").is_ok());

        assert!(matches!(
            validate_timezone("Mars/Olympus"),
            Err(ValidationError::InvalidTimezone(_))
        ));
        assert!(matches!(
            validate_timezone("+05:00"),
            Err(ValidationError::InvalidTimezone(_))
        ));
        assert!(matches!(validate_timezone(""), Err(ValidationError::Empty(_))));
    }

    #[test]
    fn test_validate_display_name() {
        assert!(validate_display_name("Alice").is_ok());
        assert!(matches!(
            validate_display_name("   "),
            Err(ValidationError::Empty(_))
        ));
        let long = "a".repeat(MAX_NAME_LENGTH + 1);
        assert!(matches!(
            validate_display_name(&long),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_goal() {
        assert!(validate_goal("Run a marathon", "Finish under 4h").is_ok());
        assert!(validate_goal("", "desc").is_err());
        assert!(validate_goal("title", "").is_err());
    }

    #[test]
    fn test_validate_pairing_code() {
        assert!(validate_pairing_code("AB12CD34").is_ok());
        assert!(validate_pairing_code("abc-123_x").is_ok());
        assert!(matches!(
            validate_pairing_code("hello there"),
            Err(ValidationError::InvalidPairingCode(_))
        ));
        assert!(matches!(
            validate_pairing_code("I feel great!"),
            Err(ValidationError::InvalidPairingCode(_))
        ));
        assert!(validate_pairing_code(&"x".repeat(MAX_PAIRING_CODE_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::InvalidTimezone("Nowhere/City".to_string());
        assert_eq!(err.to_string(), "Invalid timezone: Nowhere/City");

        let err = ValidationError::TooLong {
            field: "name".to_string(),
            max: 10,
            actual: 20,
        };
        assert_eq!(err.to_string(), "name is too long (20 chars, max 10)");
    }
}
