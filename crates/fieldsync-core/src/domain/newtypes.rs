//! Domain newtypes with validation
//!
//! This module provides strongly-typed wrappers for domain identifiers and
//! values. Each newtype ensures data validity at construction time.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

// ============================================================================
// UUID-based ID types
// ============================================================================

/// Identifier for a pending change awaiting remote application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeId(Uuid);

impl ChangeId {
    /// Create a new random ChangeId
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a ChangeId from an existing UUID
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID value
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ChangeId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ChangeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChangeId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| DomainError::InvalidId(format!("Invalid ChangeId: {e}")))
    }
}

impl From<Uuid> for ChangeId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

// ============================================================================
// Validated string types
// ============================================================================

/// A key prefix that partitions the durable store
///
/// Namespaces keep independent subsystems (the cache, the pending-change
/// queue, sync bookkeeping) from touching each other's keys. A valid
/// namespace is non-empty and ends with `:` so that prefix scans cannot
/// accidentally match a sibling namespace (`cache:` vs `cachemeta:`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Namespace(String);

impl Namespace {
    /// Create a validated namespace
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidNamespace` if the value is empty or
    /// does not end with `:`.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.is_empty() || !value.ends_with(':') {
            return Err(DomainError::InvalidNamespace(value));
        }
        Ok(Self(value))
    }

    /// Get the namespace as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build the full storage key for a logical key within this namespace
    #[must_use]
    pub fn key(&self, logical: &str) -> String {
        format!("{}{}", self.0, logical)
    }

    /// Strip this namespace from a full storage key
    ///
    /// Returns `None` if the key does not belong to this namespace.
    #[must_use]
    pub fn strip<'a>(&self, full_key: &'a str) -> Option<&'a str> {
        full_key.strip_prefix(self.0.as_str())
    }
}

impl Display for Namespace {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Namespace {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Namespace> for String {
    fn from(ns: Namespace) -> Self {
        ns.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_id_roundtrip() {
        let id = ChangeId::new();
        let parsed: ChangeId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_change_id_rejects_garbage() {
        let result = ChangeId::from_str("not-a-uuid");
        assert!(matches!(result, Err(DomainError::InvalidId(_))));
    }

    #[test]
    fn test_namespace_requires_trailing_separator() {
        assert!(Namespace::new("cache").is_err());
        assert!(Namespace::new("").is_err());
        assert!(Namespace::new("fieldsync:cache:").is_ok());
    }

    #[test]
    fn test_namespace_key_and_strip() {
        let ns = Namespace::new("fieldsync:cache:").unwrap();
        let full = ns.key("audits");
        assert_eq!(full, "fieldsync:cache:audits");
        assert_eq!(ns.strip(&full), Some("audits"));
        assert_eq!(ns.strip("fieldsync:queue:00001"), None);
    }
}
