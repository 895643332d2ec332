//! Error types and handling for SGEX operations

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for SGEX operations
#[derive(Debug, Error)]
pub enum SgexError {
    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// HTTP transport failures talking to the repository host
    #[error("Network error: {source}")]
    NetworkError {
        #[from]
        source: reqwest::Error,
    },

    /// The repository host answered with an unexpected status
    #[error("Remote error ({status}) fetching '{path}': {message}")]
    RemoteError {
        status: u16,
        path: String,
        message: String,
    },

    /// Malformed `owner/repo` references and similar user input
    #[error("Invalid repository reference '{input}': {message}")]
    InvalidRepoRef { input: String, message: String },

    /// A concept code that the loaded code system does not define
    #[error("no concept with code '{code}' in {origin}")]
    ConceptNotFound { code: String, origin: String },

    /// Staging ground persistence errors
    #[error("Staging error: {message}")]
    StagingError { message: String },

    /// (De)serialization errors for persisted state and output
    #[error("Serialization error: {message}")]
    SerializationError { message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    InternalError { message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Io,
    Network,
    Remote,
    Input,
    Staging,
    Serialization,
    Internal,
}

impl SgexError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            SgexError::ConfigError { .. } => ErrorKind::Config,
            SgexError::IoError { .. } => ErrorKind::Io,
            SgexError::NetworkError { .. } => ErrorKind::Network,
            SgexError::RemoteError { .. } => ErrorKind::Remote,
            SgexError::InvalidRepoRef { .. } | SgexError::ConceptNotFound { .. } => {
                ErrorKind::Input
            }
            SgexError::StagingError { .. } => ErrorKind::Staging,
            SgexError::SerializationError { .. } => ErrorKind::Serialization,
            SgexError::InternalError { .. } => ErrorKind::Internal,
        }
    }

    /// Check if this error is recoverable (the caller can fall back to an empty view)
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Network | ErrorKind::Remote)
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    /// Create a remote error from a response status
    pub fn remote_error(status: u16, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RemoteError {
            status,
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn invalid_repo_ref(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRepoRef {
            input: input.into(),
            message: message.into(),
        }
    }

    pub fn concept_not_found(code: impl Into<String>, origin: impl Into<String>) -> Self {
        Self::ConceptNotFound {
            code: code.into(),
            origin: origin.into(),
        }
    }

    pub fn staging_error(message: impl Into<String>) -> Self {
        Self::StagingError {
            message: message.into(),
        }
    }

    pub fn serialization_error(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for SgexError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for SgexError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            message: err.to_string(),
        }
    }
}
