//! Validation of user-entered task and checklist names.

use crate::errors::{Result, TaskError};

/// Longest accepted name, in characters.
pub const MAX_NAME_LEN: usize = 100;

const FORBIDDEN: [&str; 7] = ["..", "/", "\\", "<", "&", "\"", "'"];

/// Trim and check a name typed by the user.
///
/// Accepts letters, digits, whitespace and `- _ . ( ) !`, up to
/// [`MAX_NAME_LEN`] characters. Path fragments and markup characters are
/// rejected outright.
pub fn validate_name(input: &str) -> Result<String> {
    let trimmed = input.trim();
    let len = trimmed.chars().count();
    if len == 0 {
        return Err(TaskError::InvalidInput("name is empty".into()));
    }
    if len > MAX_NAME_LEN {
        return Err(TaskError::InvalidInput(format!(
            "name is {len} characters, at most {MAX_NAME_LEN} allowed"
        )));
    }
    if let Some(bad) = FORBIDDEN.iter().find(|f| trimmed.contains(**f)) {
        return Err(TaskError::InvalidInput(format!("name may not contain {bad:?}")));
    }
    if let Some(bad) = trimmed.chars().find(|c| !is_allowed(*c)) {
        return Err(TaskError::InvalidInput(format!("name may not contain {bad:?}")));
    }
    Ok(trimmed.to_string())
}

fn is_allowed(c: char) -> bool {
    c.is_alphanumeric() || c.is_whitespace() || matches!(c, '-' | '_' | '.' | '(' | ')' | '!')
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn accepts_and_trims() {
        assert_eq!(validate_name("  Water plants (balcony)! ").unwrap(), "Water plants (balcony)!");
        assert_eq!(validate_name("Café_run-2.0").unwrap(), "Café_run-2.0");
    }

    #[test]
    fn rejects_empty_and_long() {
        assert_matches!(validate_name("   "), Err(TaskError::InvalidInput(_)));
        assert!(validate_name(&"a".repeat(MAX_NAME_LEN)).is_ok());
        assert!(validate_name(&"a".repeat(MAX_NAME_LEN + 1)).is_err());
        // Counted in characters, not bytes
        assert!(validate_name(&"é".repeat(MAX_NAME_LEN)).is_ok());
    }

    #[test]
    fn rejects_paths_and_markup() {
        for bad in ["../etc", "a/b", "a\\b", "<b>", "Tom & Jerry", "say \"hi\"", "it's", "a..b"] {
            assert!(validate_name(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn rejects_other_symbols() {
        for bad in ["50%", "a+b", "#tag", "x=y", "semi;colon"] {
            assert!(validate_name(bad).is_err(), "accepted {bad:?}");
        }
    }
}
