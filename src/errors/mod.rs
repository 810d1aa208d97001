//! Domain-specific error types for sheetchart
//!
//! Every failure the core can produce is returned to the caller; nothing on
//! bad input is allowed to take the host process down.
//!
//! # Error Categories
//!
//! - **IngestError**: unsupported format, oversize input, empty files, malformed containers
//! - **ChartError**: chart request validation (title, axis fields, numeric axis)
//! - **RegistryError**: lookups, access-controlled removals
//! - **ConfigError**: configuration file and environment overrides
//!
//! `SheetchartError` wraps all of them for the `AppContext` flows that cross
//! more than one domain.
//!
//! # Examples
//!
//! ```rust
//! use sheetchart::errors::{ChartError, SheetchartError};
//!
//! let err: SheetchartError = ChartError::MissingTitle.into();
//! assert_eq!(err.error_code(), "MISSING_TITLE");
//! ```

pub mod chart;
pub mod config;
pub mod ingest;
pub mod registry;

pub use chart::ChartError;
pub use config::ConfigError;
pub use ingest::IngestError;
pub use registry::RegistryError;

use thiserror::Error;

/// Result type alias for ingestion
pub type IngestResult<T> = Result<T, IngestError>;

/// Result type alias for chart specification
pub type ChartResult<T> = Result<T, ChartError>;

/// Result type alias for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result type alias for cross-domain operations
pub type SheetchartResult<T> = Result<T, SheetchartError>;

/// Umbrella error for flows that span ingestion, charting and the registry
#[derive(Error, Debug)]
pub enum SheetchartError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Chart(#[from] ChartError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SheetchartError {
    pub fn error_code(&self) -> &'static str {
        match self {
            SheetchartError::Ingest(err) => err.error_code(),
            SheetchartError::Chart(err) => err.error_code(),
            SheetchartError::Registry(err) => err.error_code(),
            SheetchartError::Config(_) => "CONFIG_ERROR",
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            SheetchartError::Chart(err) => err.is_not_found(),
            SheetchartError::Registry(err) => err.is_not_found(),
            SheetchartError::Ingest(_) | SheetchartError::Config(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_result_alias() {
        let result: IngestResult<()> = Err(IngestError::EmptyFile {
            file_name: "empty.csv".to_string(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_chart_result_alias() {
        let result: ChartResult<()> = Err(ChartError::MissingTitle);
        assert!(result.is_err());
    }

    #[test]
    fn test_umbrella_keeps_domain_codes() {
        let err: SheetchartError = RegistryError::not_found("Chart", "42").into();
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Chart 42 not found");

        let err: SheetchartError = IngestError::Oversize { size: 2, limit: 1 }.into();
        assert_eq!(err.error_code(), "FILE_TOO_LARGE");
        assert!(!err.is_not_found());
    }
}
