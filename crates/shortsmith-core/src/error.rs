//! Error types for shortsmith

use thiserror::Error;

/// The main error type for shortsmith operations
#[derive(Debug, Error)]
pub enum ShortsError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Credential rejected: {0}")]
    CredentialRejected(String),

    #[error("Operation still running after {attempts} poll attempts")]
    PollTimeout { attempts: u32 },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Archive error: {0}")]
    Archive(String),
}

impl ShortsError {
    /// True when the failure means the API key is absent or was refused.
    ///
    /// Callers use this to decide whether to ask the host for a new key.
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            ShortsError::MissingCredential(_) | ShortsError::CredentialRejected(_)
        )
    }
}

/// Result type alias for shortsmith operations
pub type Result<T> = std::result::Result<T, ShortsError>;

impl From<toml::de::Error> for ShortsError {
    fn from(err: toml::de::Error) -> Self {
        ShortsError::TomlParse(err.to_string())
    }
}

impl From<serde_json::Error> for ShortsError {
    fn from(err: serde_json::Error) -> Self {
        ShortsError::Json(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_classification() {
        assert!(ShortsError::MissingCredential("no key".into()).is_credential_error());
        assert!(ShortsError::CredentialRejected("404".into()).is_credential_error());
        assert!(!ShortsError::Generation("boom".into()).is_credential_error());
        assert!(!ShortsError::PollTimeout { attempts: 3 }.is_credential_error());
    }

    #[test]
    fn test_display_messages() {
        let err = ShortsError::PollTimeout { attempts: 60 };
        assert_eq!(
            err.to_string(),
            "Operation still running after 60 poll attempts"
        );
        assert_eq!(ShortsError::Cancelled.to_string(), "Operation cancelled");
    }

    #[test]
    fn test_json_error_conversion() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: ShortsError = parse.unwrap_err().into();
        assert!(matches!(err, ShortsError::Json(_)));
    }
}
