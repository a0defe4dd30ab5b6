//! Driven port for the transactional points ledger store.
//!
//! The persistence collaborator behind this port must provide a
//! point-in-time consistent multi-record read ([`LedgerStore::load_snapshot`])
//! and an atomic, all-or-nothing multi-record write
//! ([`LedgerStore::commit`]) guarded by per-record revisions. Optimistic
//! concurrency keeps unrelated users fully independent: a commit only fails
//! with [`LedgerStoreError::Conflict`] when one of its own records moved.

use async_trait::async_trait;

use crate::domain::{Allocation, GrocerId, Points, UserId};

/// Persistence errors raised by ledger store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerStoreError {
    /// Store connection could not be established.
    #[error("ledger store connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("ledger store query failed: {message}")]
    Query { message: String },
    /// A concurrent transaction moved one of the records between snapshot
    /// and commit; the caller should re-read and recompute.
    #[error("ledger commit conflicted with a concurrent transaction")]
    Conflict,
}

impl LedgerStoreError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// A user's balance as read inside a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserBalance {
    /// Points not currently allocated to any grocer.
    pub available: Points,
    /// Optimistic concurrency token for the user record.
    pub revision: i64,
}

/// A grocer's running total as read inside a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrocerTotal {
    /// Display name, denormalised onto new allocation records.
    pub name: String,
    /// Sum of all allocations currently assigned to the grocer.
    pub received: Points,
    /// Optimistic concurrency token for the grocer record.
    pub revision: i64,
}

/// Point-in-time view of the three records one reallocation touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSnapshot {
    /// The user's balance, if the user exists.
    pub user: Option<UserBalance>,
    /// The grocer's record, if the grocer exists.
    pub grocer: Option<GrocerTotal>,
    /// Points of the existing (user, grocer) allocation, if any.
    pub allocation: Option<Points>,
}

/// Reconciliation action for the allocation record within a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationWrite {
    /// No record exists and none is needed (zero requested, none present).
    Noop,
    /// First nonzero allocation for the pair.
    Create { points: Points, grocer_name: String },
    /// Replace the point quantity on the existing record.
    Update { points: Points },
    /// The user zeroed the allocation; remove the record.
    Delete,
}

/// Atomic write set for one reallocation.
///
/// Adapters apply all writes in a single transaction, failing with
/// [`LedgerStoreError::Conflict`], rolling back entirely, if either
/// expected revision no longer matches or a duplicate allocation record
/// appears concurrently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerCommit {
    pub user_id: UserId,
    pub grocer_id: GrocerId,
    /// New available balance for the user.
    pub new_available: Points,
    /// Revision the user record must still hold.
    pub expected_user_revision: i64,
    /// New received total for the grocer.
    pub new_received: Points,
    /// Revision the grocer record must still hold.
    pub expected_grocer_revision: i64,
    /// Reconciliation action for the (user, grocer) allocation record.
    pub allocation: AllocationWrite,
}

/// Port for ledger persistence adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Read the user balance, grocer record, and existing allocation for the
    /// pair in one consistent snapshot.
    async fn load_snapshot(
        &self,
        user_id: &UserId,
        grocer_id: &GrocerId,
    ) -> Result<LedgerSnapshot, LedgerStoreError>;

    /// Apply one reallocation's write set atomically.
    async fn commit(&self, commit: &LedgerCommit) -> Result<(), LedgerStoreError>;

    /// Read all allocation records for a user. Snapshot consistency is not
    /// required; ordering is irrelevant.
    async fn list_allocations(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Allocation>, LedgerStoreError>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn connection_error_formats_message() {
        let err = LedgerStoreError::connection("pool exhausted");
        assert!(err.to_string().contains("pool exhausted"));
    }

    #[rstest]
    fn query_error_formats_message() {
        let err = LedgerStoreError::query("broken sql");
        assert!(err.to_string().contains("broken sql"));
    }

    #[rstest]
    fn conflict_is_message_free() {
        let err = LedgerStoreError::Conflict;
        assert!(err.to_string().contains("concurrent"));
    }
}
