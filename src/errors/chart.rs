//! Chart specification error types
//!
//! Validation failures always abort chart creation; nothing is registered
//! when one of these is returned.

use thiserror::Error;

use crate::dataset::DatasetId;

/// Chart specification errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChartError {
    /// Title is empty after trimming
    #[error("Chart title is required")]
    MissingTitle,

    /// Axis field is not one of the dataset columns
    #[error("Unknown field '{field}'")]
    UnknownField { field: String },

    /// No sampled value of the y field parses as a finite number
    #[error("Field '{field}' has no numeric values in the sampled rows")]
    NonNumericAxis { field: String },

    /// Referenced dataset is not registered
    #[error("Dataset {0} not found")]
    DatasetNotFound(DatasetId),
}

impl ChartError {
    /// Check if this is a client error (400-series)
    pub fn is_client_error(&self) -> bool {
        !self.is_not_found()
    }

    /// Check if this is a not found error (404)
    pub fn is_not_found(&self) -> bool {
        matches!(self, ChartError::DatasetNotFound(_))
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            ChartError::MissingTitle => "MISSING_TITLE",
            ChartError::UnknownField { .. } => "UNKNOWN_FIELD",
            ChartError::NonNumericAxis { .. } => "NON_NUMERIC_AXIS",
            ChartError::DatasetNotFound(_) => "NOT_FOUND",
        }
    }
}
