//! Pending change records
//!
//! A [`PendingChange`] is a local mutation that still has to be applied to
//! the remote store. Changes are appended to the durable queue at mutation
//! time and removed one by one as the sync engine confirms remote
//! application. Replay order matters: an update may depend on the create
//! that precedes it, so the queue preserves FIFO order across restarts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::newtypes::ChangeId;

/// The kind of mutation to replay against the remote store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOperation {
    /// Create a new remote resource
    Create,
    /// Update an existing remote resource
    Update,
    /// Delete a remote resource
    Delete,
}

impl ChangeOperation {
    /// Stable lowercase name, used in logs
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ChangeOperation::Create => "create",
            ChangeOperation::Update => "update",
            ChangeOperation::Delete => "delete",
        }
    }
}

/// A local mutation awaiting remote application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingChange {
    /// Unique identifier, assigned at creation
    id: ChangeId,
    /// The operation to replay
    operation: ChangeOperation,
    /// Remote resource the operation targets (e.g. `/audits/42`)
    resource: String,
    /// Data needed to replay the operation; empty object for deletes
    payload: serde_json::Value,
    /// When the local mutation happened
    created_at: DateTime<Utc>,
}

impl PendingChange {
    /// Create a pending change stamped with a fresh id and the current time
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidResource` if `resource` is empty.
    pub fn new(
        operation: ChangeOperation,
        resource: impl Into<String>,
        payload: serde_json::Value,
    ) -> Result<Self, DomainError> {
        let resource = resource.into();
        if resource.is_empty() {
            return Err(DomainError::InvalidResource(
                "resource must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id: ChangeId::new(),
            operation,
            resource,
            payload,
            created_at: Utc::now(),
        })
    }

    /// The unique change identifier
    #[must_use]
    pub fn id(&self) -> &ChangeId {
        &self.id
    }

    /// The operation kind
    #[must_use]
    pub fn operation(&self) -> ChangeOperation {
        self.operation
    }

    /// The remote resource this change targets
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The replay payload
    #[must_use]
    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    /// When the local mutation was recorded
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_assigns_id_and_timestamp() {
        let before = Utc::now();
        let change = PendingChange::new(
            ChangeOperation::Create,
            "/audits",
            serde_json::json!({"title": "Warehouse walk-through"}),
        )
        .unwrap();
        let after = Utc::now();

        assert!(change.created_at() >= before && change.created_at() <= after);
        assert_eq!(change.operation(), ChangeOperation::Create);
        assert_eq!(change.resource(), "/audits");
    }

    #[test]
    fn test_empty_resource_rejected() {
        let result = PendingChange::new(ChangeOperation::Delete, "", serde_json::json!({}));
        assert!(matches!(result, Err(DomainError::InvalidResource(_))));
    }

    #[test]
    fn test_ids_are_unique() {
        let a = PendingChange::new(ChangeOperation::Update, "/a", serde_json::json!({})).unwrap();
        let b = PendingChange::new(ChangeOperation::Update, "/a", serde_json::json!({})).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_serde_roundtrip_preserves_identity() {
        let change = PendingChange::new(
            ChangeOperation::Delete,
            "/audits/7",
            serde_json::Value::Null,
        )
        .unwrap();
        let json = serde_json::to_string(&change).unwrap();
        let back: PendingChange = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id(), change.id());
        assert_eq!(back.created_at(), change.created_at());
        assert_eq!(back.operation(), ChangeOperation::Delete);
    }
}
