//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the forest invariants.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("location not found: {0}")]
    NotFound(String),

    #[error("duplicate location id: {0}")]
    DuplicateId(String),

    #[error("location {id} declares parent {declared:?} but is contained in {actual:?}")]
    ParentMismatch {
        id: String,
        declared: Option<String>,
        actual: Option<String>,
    },
}

impl DomainError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// True for lookup misses, which callers usually recover from locally.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
