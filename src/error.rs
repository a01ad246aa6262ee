//! Error types for pdf-chat operations.
//!
//! This module provides the error hierarchy using `thiserror`. The three
//! user-facing kinds are configuration errors (missing credential),
//! invalid documents (unparseable PDF) and remote call failures; the rest
//! cover chunk limits, file I/O, CLI arguments and session state.

use thiserror::Error;

/// Result type alias for pdf-chat operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for pdf-chat operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (missing API key, bad settings).
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// The PDF could not be parsed or serialized.
    #[error("invalid document: {0}")]
    Document(#[from] DocumentError),

    /// The remote document API failed or returned something unusable.
    #[error("remote call failed: {0}")]
    Remote(#[from] RemoteError),

    /// Chunking-related errors (limits, strategies).
    #[error("chunking error: {0}")]
    Chunking(#[from] ChunkingError),

    /// I/O errors (file operations).
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// CLI command errors.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// Operation not valid in the current session state.
    #[error("invalid state: {message}")]
    InvalidState {
        /// Description of the invalid state.
        message: String,
    },
}

impl Error {
    /// Builds a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Builds an invalid-state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Stable machine-readable name of the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Config { .. } => "configuration",
            Self::Document(_) => "invalid_document",
            Self::Remote(_) => "remote_call",
            Self::Chunking(_) => "chunking",
            Self::Io(_) => "io",
            Self::Command(_) => "command",
            Self::InvalidState { .. } => "invalid_state",
        }
    }
}

/// Document-specific errors for PDF parsing and serialization.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The bytes could not be parsed as a PDF.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The page tree or catalog is missing or malformed.
    #[error("malformed page tree: {0}")]
    PageTree(String),

    /// Writing a page subset back out failed.
    #[error("failed to serialize pages {start}..{end}: {reason}")]
    Serialize {
        /// First page (zero-based) of the subset.
        start: usize,
        /// End page (exclusive) of the subset.
        end: usize,
        /// Reason for failure.
        reason: String,
    },
}

/// Remote API errors.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Network or transport failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status returned by the API.
    #[error("API returned status {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message extracted from the response body.
        message: String,
    },

    /// Response body did not have the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Chunking-specific errors.
#[derive(Error, Debug)]
pub enum ChunkingError {
    /// Invalid chunk configuration.
    #[error("invalid chunk configuration: {reason}")]
    InvalidConfig {
        /// Reason the configuration is invalid.
        reason: String,
    },

    /// Unknown sizing strategy.
    #[error("unknown sizing strategy: {name} (available: {available})")]
    UnknownStrategy {
        /// Name of the unknown strategy.
        name: String,
        /// Comma-separated names of the known strategies.
        available: String,
    },
}

/// I/O-specific errors for file operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path to the file that was not found.
        path: String,
    },

    /// Failed to read file.
    #[error("failed to read file: {path}: {reason}")]
    ReadFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Failed to write file.
    #[error("failed to write file: {path}: {reason}")]
    WriteFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Memory mapping error.
    #[error("memory mapping failed: {path}: {reason}")]
    MmapFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Directory creation error.
    #[error("failed to create directory: {path}: {reason}")]
    DirectoryFailed {
        /// Path to the directory.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Generic I/O error wrapper.
    #[error("I/O error: {0}")]
    Generic(String),
}

/// CLI command-specific errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Invalid argument provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(IoError::Generic(err.to_string()))
    }
}

impl From<lopdf::Error> for DocumentError {
    fn from(err: lopdf::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Self::Document(err.into())
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Remote(err.into())
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_state("no document loaded");
        assert_eq!(err.to_string(), "invalid state: no document loaded");
    }

    #[test]
    fn test_error_config() {
        let err = Error::config("ANTHROPIC_API_KEY is not set");
        assert_eq!(
            err.to_string(),
            "configuration error: ANTHROPIC_API_KEY is not set"
        );
        assert_eq!(err.kind(), "configuration");
    }

    #[test]
    fn test_document_error_display() {
        let err = DocumentError::Parse("bad header".to_string());
        assert_eq!(err.to_string(), "failed to parse PDF: bad header");

        let err = DocumentError::Serialize {
            start: 0,
            end: 3,
            reason: "disk full".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to serialize pages 0..3: disk full"
        );
    }

    #[test]
    fn test_remote_error_display() {
        let err = RemoteError::Api {
            status: 400,
            message: "messages: too long".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API returned status 400: messages: too long"
        );

        let err = RemoteError::MalformedResponse("no content".to_string());
        assert!(err.to_string().contains("no content"));
    }

    #[test]
    fn test_chunking_error_variants() {
        let err = ChunkingError::InvalidConfig {
            reason: "max_pages must be > 0".to_string(),
        };
        assert!(err.to_string().contains("max_pages"));

        let err = ChunkingError::UnknownStrategy {
            name: "foobar".to_string(),
            available: "estimated, exact".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unknown sizing strategy: foobar (available: estimated, exact)"
        );
    }

    #[test]
    fn test_io_error_variants() {
        let err = IoError::FileNotFound {
            path: "/tmp/missing.pdf".to_string(),
        };
        assert_eq!(err.to_string(), "file not found: /tmp/missing.pdf");

        let err = IoError::WriteFailed {
            path: "/tmp/out".to_string(),
            reason: "disk full".to_string(),
        };
        assert!(err.to_string().contains("disk full"));

        let err = IoError::MmapFailed {
            path: "/tmp/big".to_string(),
            reason: "out of memory".to_string(),
        };
        assert!(err.to_string().contains("memory mapping"));
    }

    #[test]
    fn test_error_kinds() {
        let err: Error = DocumentError::Parse(String::new()).into();
        assert_eq!(err.kind(), "invalid_document");

        let err: Error = RemoteError::Transport("timeout".to_string()).into();
        assert_eq!(err.kind(), "remote_call");

        let err: Error = CommandError::InvalidArgument("--chunk".to_string()).into();
        assert_eq!(err.kind(), "command");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_lopdf_error() {
        let err: Error = lopdf::Document::load_mem(b"not a pdf").unwrap_err().into();
        assert!(matches!(err, Error::Document(DocumentError::Parse(_))));
    }

    #[test]
    fn test_from_serde_json_error_to_remote_error() {
        let json_err: serde_json::Error = serde_json::from_str::<i32>("invalid").unwrap_err();
        let err: RemoteError = json_err.into();
        assert!(matches!(err, RemoteError::MalformedResponse(_)));
    }
}
