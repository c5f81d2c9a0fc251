//! Domain error types
//!
//! This module defines error types specific to domain operations,
//! including validation failures and identifier parsing errors.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// ID parsing error
    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    /// Invalid storage namespace (empty or missing trailing separator)
    #[error("Invalid namespace: {0}")]
    InvalidNamespace(String),

    /// Invalid remote resource name
    #[error("Invalid resource: {0}")]
    InvalidResource(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DomainError::InvalidNamespace("cache".to_string());
        assert_eq!(err.to_string(), "Invalid namespace: cache");

        let err = DomainError::InvalidId("nope".to_string());
        assert_eq!(err.to_string(), "Invalid ID format: nope");
    }

    #[test]
    fn test_error_equality() {
        let err1 = DomainError::InvalidResource("/audits".to_string());
        let err2 = DomainError::InvalidResource("/audits".to_string());
        let err3 = DomainError::InvalidResource("/other".to_string());

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }
}
