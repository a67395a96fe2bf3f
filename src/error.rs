//! Screening errors
//!
//! The biological model never fails: out-of-range values are clamped.
//! Only misuse by the caller (bad configuration, bad timeline input) and
//! file I/O around configs and reports surface as errors.

/// Errors raised by the screening core
#[derive(Debug, thiserror::Error)]
pub enum ScreenError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ScreenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_configuration() {
        let err = ScreenError::Configuration("population must be at least 1".into());
        assert_eq!(
            err.to_string(),
            "Configuration error: population must be at least 1"
        );
    }

    #[test]
    fn test_from_serde() {
        let parse: std::result::Result<u32, _> = serde_json::from_str("not json");
        let err: ScreenError = parse.unwrap_err().into();
        assert!(matches!(err, ScreenError::Serialization(_)));
    }
}
