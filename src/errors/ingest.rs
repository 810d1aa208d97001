//! Ingestion error types
//!
//! Raised by the ingestion normalizer while turning uploaded bytes into a
//! tabular dataset. Every variant carries enough detail (file name, limit)
//! to build a user-facing message.
//!
//! # Examples
//!
//! ```rust
//! use sheetchart::errors::IngestError;
//!
//! let err = IngestError::Oversize { size: 11, limit: 10 };
//! assert_eq!(err.error_code(), "FILE_TOO_LARGE");
//! ```

use thiserror::Error;

/// Ingestion errors
#[derive(Error, Debug)]
pub enum IngestError {
    /// Neither the declared mime type nor the extension is recognized
    #[error("Unsupported file format: {file_name}")]
    UnsupportedFormat { file_name: String },

    /// Input exceeds the configured upload ceiling
    #[error("File is {size} bytes, exceeding the {limit} byte limit")]
    Oversize { size: usize, limit: usize },

    /// Zero bytes, or a container without a single row
    #[error("The file appears to be empty: {file_name}")]
    EmptyFile { file_name: String },

    /// The container could not be decoded
    #[error("Failed to parse {file_name}: {reason}")]
    Parse { file_name: String, reason: String },
}

impl IngestError {
    pub fn parse(file_name: impl Into<String>, reason: impl ToString) -> Self {
        IngestError::Parse {
            file_name: file_name.into(),
            reason: reason.to_string(),
        }
    }

    /// Check if this is a client error (400-series)
    pub fn is_client_error(&self) -> bool {
        // every ingestion failure stems from the uploaded bytes
        true
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            IngestError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            IngestError::Oversize { .. } => "FILE_TOO_LARGE",
            IngestError::EmptyFile { .. } => "EMPTY_FILE",
            IngestError::Parse { .. } => "PARSE_FAILED",
        }
    }
}
