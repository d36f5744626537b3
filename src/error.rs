use thiserror::Error;

/// Errors surfaced by the translation layer.
///
/// None of these ever reach a caller of `t()`; they are reported through
/// fallible operations (`languages()`, `set_current_language()`) and through
/// the status snapshot.
#[derive(Debug, Error)]
pub enum TranslationError {
    /// Transport-level failure (connection refused, timeout, TLS...).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote API answered with a non-2xx status.
    #[error("translation API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The remote API answered 2xx but the body was not what we expected.
    #[error("invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },

    /// Reading or writing the durable preference store failed.
    #[error("preference storage error: {0}")]
    Storage(String),

    /// A language code that the loaded registry does not know.
    #[error("unsupported language: '{0}'")]
    UnsupportedLanguage(String),

    /// A malformed (empty) language code.
    #[error("invalid language code: '{0}'")]
    InvalidLanguage(String),

    /// The provider was built outside a tokio runtime.
    #[error("no tokio runtime available to run background tasks")]
    NoRuntime,
}

impl TranslationError {
    /// HTTP status carried by an API error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            TranslationError::Api { status, .. } => Some(*status),
            TranslationError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TranslationError {
    fn from(e: std::io::Error) -> Self {
        TranslationError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for TranslationError {
    fn from(e: serde_json::Error) -> Self {
        TranslationError::Storage(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_includes_status_and_message() {
        let err = TranslationError::Api {
            status: 422,
            message: "Unsupported target".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("422"));
        assert!(msg.contains("Unsupported target"));
        assert_eq!(err.status(), Some(422));
    }

    #[test]
    fn test_storage_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: TranslationError = io.into();
        assert!(matches!(err, TranslationError::Storage(_)));
        assert!(err.to_string().contains("denied"));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_unsupported_language_display() {
        let err = TranslationError::UnsupportedLanguage("xx".to_string());
        assert_eq!(err.to_string(), "unsupported language: 'xx'");
    }
}
