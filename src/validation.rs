//! Character name validation for security and filesystem compatibility

use std::collections::HashSet;

/// Name validation errors with helpful messages
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("Name is too short (minimum {min} characters)")]
    TooShort { min: usize },

    #[error("Name is too long (maximum {max} characters)")]
    TooLong { max: usize },

    #[error("Name cannot start or end with whitespace")]
    InvalidWhitespace,

    #[error("Name contains invalid characters: {chars}")]
    InvalidCharacters { chars: String },

    #[error("Name contains path separators (/ or \\)")]
    PathTraversal,

    #[error("Name is reserved")]
    Reserved,
}

pub const MIN_NAME_LEN: usize = 2;
pub const MAX_NAME_LEN: usize = 24;

/// Generate safe filename from a character name using URL encoding
pub fn safe_filename(name: &str) -> String {
    use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
    utf8_percent_encode(name, NON_ALPHANUMERIC).to_string()
}

/// Names that would collide with device files or read like commands
fn reserved_names() -> HashSet<&'static str> {
    [
        "con", "prn", "aux", "nul", "com1", "com2", "com3", "com4", "lpt1", "lpt2", "lpt3",
        "start", "status", "quit", "save", "load", "new", "init", "templates",
    ]
    .into_iter()
    .collect()
}

/// Validate a character name for use as a save-file key.
pub fn validate_character_name(name: &str) -> Result<String, NameError> {
    if name.trim() != name {
        return Err(NameError::InvalidWhitespace);
    }
    let len = name.chars().count();
    if len < MIN_NAME_LEN {
        return Err(NameError::TooShort { min: MIN_NAME_LEN });
    }
    if len > MAX_NAME_LEN {
        return Err(NameError::TooLong { max: MAX_NAME_LEN });
    }
    if name.contains('/') || name.contains('\\') {
        return Err(NameError::PathTraversal);
    }
    let bad: String = name
        .chars()
        .filter(|c| c.is_control() || !(c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '\'' | '.')))
        .collect();
    if !bad.is_empty() {
        return Err(NameError::InvalidCharacters { chars: bad });
    }
    if reserved_names().contains(name.to_lowercase().as_str()) {
        return Err(NameError::Reserved);
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_filename() {
        assert_eq!(safe_filename("kade"), "kade");
        assert_eq!(safe_filename("Al Ray"), "Al%20Ray");
        assert_ne!(safe_filename("../etc/passwd"), "../etc/passwd");
        assert!(!safe_filename("a/b").contains('/'));
        assert!(!safe_filename("Dash-Name").contains('-'));
    }

    #[test]
    fn test_valid_names() {
        assert_eq!(validate_character_name("Kade"), Ok("Kade".to_string()));
        assert!(validate_character_name("Old Mags").is_ok());
        assert!(validate_character_name("Zoë").is_ok());
        assert!(validate_character_name("D'Arcy-7").is_ok());
    }

    #[test]
    fn test_invalid_names() {
        assert_eq!(validate_character_name("K"), Err(NameError::TooShort { min: 2 }));
        assert_eq!(
            validate_character_name(&"x".repeat(30)),
            Err(NameError::TooLong { max: MAX_NAME_LEN })
        );
        assert_eq!(validate_character_name(" Kade"), Err(NameError::InvalidWhitespace));
        assert_eq!(validate_character_name("../root"), Err(NameError::PathTraversal));
        assert!(matches!(
            validate_character_name("Ka<de>"),
            Err(NameError::InvalidCharacters { .. })
        ));
        assert_eq!(validate_character_name("CON"), Err(NameError::Reserved));
    }
}
