//! Registry error types

use thiserror::Error;

/// Registry lookup and mutation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No record with this id
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// Principal lacks the role required for the operation
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// A record with this id is already registered
    #[error("{entity} {id} already exists")]
    DuplicateId { entity: &'static str, id: String },
}

impl RegistryError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        RegistryError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        RegistryError::Forbidden(message.into())
    }

    /// Check if this is a not found error (404)
    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::NotFound { .. })
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            RegistryError::NotFound { .. } => "NOT_FOUND",
            RegistryError::Forbidden(_) => "FORBIDDEN",
            RegistryError::DuplicateId { .. } => "CONFLICT",
        }
    }
}
