//! Settings error types.

use thiserror::Error;

/// Errors that can occur when reading or writing settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Failed to read or write the settings file.
    #[error("settings file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// The settings file exists but its content cannot be interpreted.
    #[error("malformed settings: {key}: {reason}")]
    Malformed {
        /// Offending key, or the raw line when no key could be split off.
        key: String,
        /// What was wrong with it.
        reason: String,
    },
}

impl SettingsError {
    pub(crate) fn malformed(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display() {
        let err = SettingsError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn malformed_display() {
        let err = SettingsError::malformed("lastDate", "expected YYYY-MM-DD");
        assert_eq!(
            err.to_string(),
            "malformed settings: lastDate: expected YYYY-MM-DD"
        );
    }

    #[test]
    fn io_error_from_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: SettingsError = io_err.into();
        assert!(matches!(err, SettingsError::Io(_)));
    }
}
