//! Error types for the SES forwarder.
//!
//! Pipeline steps log storage and send errors, then fail the run with a
//! fixed message.

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Object storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Copy of {source_key} to {dest_key} failed: {reason}")]
    CopyFailed {
        source_key: String,
        dest_key: String,
        reason: String,
    },

    #[error("Read of {bucket}/{key} failed: {reason}")]
    ReadFailed {
        bucket: String,
        key: String,
        reason: String,
    },

    #[error("Object {bucket}/{key} not found")]
    NotFound { bucket: String, key: String },
}

/// Mail sending errors.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("Invalid send request: {0}")]
    InvalidRequest(String),

    #[error("Send from {sender} failed: {reason}")]
    Rejected { sender: String, reason: String },
}

/// Inbound event validation errors.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("Expected exactly one record, found {0}")]
    RecordCount(usize),

    #[error("Unexpected event source: {0:?}")]
    EventSource(Option<String>),

    #[error("Unexpected event version: {0:?}")]
    EventVersion(Option<String>),

    #[error("Malformed event: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_error_display() {
        let err = StorageError::ReadFailed {
            bucket: "mail".into(),
            key: "inbox/abc".into(),
            reason: "AccessDenied".into(),
        };
        assert_eq!(err.to_string(), "Read of mail/inbox/abc failed: AccessDenied");
    }

    #[test]
    fn config_error_display() {
        assert_eq!(
            ConfigError::MissingEnvVar("EMAIL_BUCKET".into()).to_string(),
            "Missing required environment variable: EMAIL_BUCKET"
        );
    }

    #[test]
    fn event_error_display() {
        assert_eq!(
            EventError::RecordCount(2).to_string(),
            "Expected exactly one record, found 2"
        );
        assert_eq!(
            EventError::EventSource(Some("aws:s3".into())).to_string(),
            "Unexpected event source: Some(\"aws:s3\")"
        );
    }
}
