//! Shared error type across carbon-registry crates.

use thiserror::Error;

/// Stable error codes (used in logs and HTTP error bodies).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Value field missing, unparseable, or not finite.
    InvalidValue,
    /// Timestamp field missing, unparseable, or not finite.
    InvalidTimestamp,
    /// Message had no whitespace-separated fields at all.
    EmptyMessage,
    /// Store reset could not complete.
    PurgeFailed,
    /// Snapshot encoding failed.
    SerializationFailed,
    /// Configuration rejected at load time.
    BadConfig,
    /// Transport datagram could not be framed.
    BadDatagram,
    /// Internal error.
    Internal,
}

impl ErrorKind {
    /// String representation used in logs and JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidValue => "INVALID_VALUE",
            ErrorKind::InvalidTimestamp => "INVALID_TIMESTAMP",
            ErrorKind::EmptyMessage => "EMPTY_MESSAGE",
            ErrorKind::PurgeFailed => "PURGE_FAILED",
            ErrorKind::SerializationFailed => "SERIALIZATION_FAILED",
            ErrorKind::BadConfig => "BAD_CONFIG",
            ErrorKind::BadDatagram => "BAD_DATAGRAM",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("incorrect value: '{message}' from: '{source_host}' - {reason}")]
    InvalidValue {
        message: String,
        source_host: String,
        reason: String,
    },
    #[error("incorrect timestamp: '{message}' from: '{source_host}' - {reason}")]
    InvalidTimestamp {
        message: String,
        source_host: String,
        reason: String,
    },
    #[error("empty message from: '{source_host}'")]
    EmptyMessage { source_host: String },
    #[error("purge failed: {0}")]
    PurgeFailed(String),
    #[error("serialization failed: {0}")]
    SerializationFailed(String),
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("bad datagram: {0}")]
    BadDatagram(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl RegistryError {
    /// Map an error to its stable code.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistryError::InvalidValue { .. } => ErrorKind::InvalidValue,
            RegistryError::InvalidTimestamp { .. } => ErrorKind::InvalidTimestamp,
            RegistryError::EmptyMessage { .. } => ErrorKind::EmptyMessage,
            RegistryError::PurgeFailed(_) => ErrorKind::PurgeFailed,
            RegistryError::SerializationFailed(_) => ErrorKind::SerializationFailed,
            RegistryError::BadConfig(_) => ErrorKind::BadConfig,
            RegistryError::BadDatagram(_) => ErrorKind::BadDatagram,
            RegistryError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// True for errors produced by the line parser (recoverable, record is dropped).
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidValue | ErrorKind::InvalidTimestamp | ErrorKind::EmptyMessage
        )
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(e: serde_json::Error) -> Self {
        RegistryError::SerializationFailed(e.to_string())
    }
}
