//! In-memory `LedgerStore` for integration tests.
//!
//! Reproduces the PostgreSQL adapter's optimistic-concurrency contract
//! (per-record revisions, compare-and-swap commits, all-or-nothing
//! application) over plain maps behind one mutex, so the engine's
//! transactional behaviour can be exercised without a database. Seeding and
//! inspection helpers stand in for the external provisioning collaborator.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ports::{
    AllocationWrite, GrocerTotal, LedgerCommit, LedgerSnapshot, LedgerStore, LedgerStoreError,
    UserBalance,
};
use crate::domain::{Allocation, Grocer, GrocerId, Points, User, UserId};

struct UserEntry {
    available: Points,
    revision: i64,
}

struct GrocerEntry {
    name: String,
    received: Points,
    revision: i64,
}

struct AllocationEntry {
    grocer_name: String,
    points: Points,
}

#[derive(Default)]
struct LedgerState {
    users: HashMap<Uuid, UserEntry>,
    grocers: HashMap<Uuid, GrocerEntry>,
    allocations: HashMap<(Uuid, Uuid), AllocationEntry>,
}

/// Map-backed ledger store with revision-checked commits.
#[derive(Default)]
pub struct MemoryLedgerStore {
    state: Mutex<LedgerState>,
}

impl MemoryLedgerStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        // A panicked test thread must not wedge every other test.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed a user record, standing in for external account provisioning.
    pub fn seed_user(&self, user: &User) {
        self.lock().users.insert(
            *user.id().as_uuid(),
            UserEntry {
                available: user.available_points(),
                revision: 0,
            },
        );
    }

    /// Seed a grocer record, standing in for external registration.
    pub fn seed_grocer(&self, grocer: &Grocer) {
        self.lock().grocers.insert(
            *grocer.id().as_uuid(),
            GrocerEntry {
                name: grocer.name().to_owned(),
                received: grocer.received_points(),
                revision: 0,
            },
        );
    }

    /// The user's current available balance, if the user exists.
    pub fn available_points(&self, user_id: &UserId) -> Option<i64> {
        self.lock()
            .users
            .get(user_id.as_uuid())
            .map(|entry| entry.available.value())
    }

    /// The grocer's current received total, if the grocer exists.
    pub fn received_points(&self, grocer_id: &GrocerId) -> Option<i64> {
        self.lock()
            .grocers
            .get(grocer_id.as_uuid())
            .map(|entry| entry.received.value())
    }

    /// Points currently allocated by the user to the grocer, if a record
    /// exists.
    pub fn allocated_points(&self, user_id: &UserId, grocer_id: &GrocerId) -> Option<i64> {
        self.lock()
            .allocations
            .get(&(*user_id.as_uuid(), *grocer_id.as_uuid()))
            .map(|entry| entry.points.value())
    }

    /// Number of allocation records across all users.
    pub fn allocation_count(&self) -> usize {
        self.lock().allocations.len()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn load_snapshot(
        &self,
        user_id: &UserId,
        grocer_id: &GrocerId,
    ) -> Result<LedgerSnapshot, LedgerStoreError> {
        let state = self.lock();

        Ok(LedgerSnapshot {
            user: state.users.get(user_id.as_uuid()).map(|entry| UserBalance {
                available: entry.available,
                revision: entry.revision,
            }),
            grocer: state
                .grocers
                .get(grocer_id.as_uuid())
                .map(|entry| GrocerTotal {
                    name: entry.name.clone(),
                    received: entry.received,
                    revision: entry.revision,
                }),
            allocation: state
                .allocations
                .get(&(*user_id.as_uuid(), *grocer_id.as_uuid()))
                .map(|entry| entry.points),
        })
    }

    async fn commit(&self, commit: &LedgerCommit) -> Result<(), LedgerStoreError> {
        let user_uuid = *commit.user_id.as_uuid();
        let grocer_uuid = *commit.grocer_id.as_uuid();
        let key = (user_uuid, grocer_uuid);

        let mut state = self.lock();

        // Validate every precondition before mutating anything, so a failed
        // commit observes all-or-nothing semantics.
        let user = state
            .users
            .get(&user_uuid)
            .ok_or_else(|| LedgerStoreError::query("user record missing at commit"))?;
        if user.revision != commit.expected_user_revision {
            return Err(LedgerStoreError::Conflict);
        }

        let grocer = state
            .grocers
            .get(&grocer_uuid)
            .ok_or_else(|| LedgerStoreError::query("grocer record missing at commit"))?;
        if grocer.revision != commit.expected_grocer_revision {
            return Err(LedgerStoreError::Conflict);
        }

        let allocation_exists = state.allocations.contains_key(&key);
        match &commit.allocation {
            AllocationWrite::Create { .. } if allocation_exists => {
                return Err(LedgerStoreError::Conflict);
            }
            AllocationWrite::Update { .. } | AllocationWrite::Delete if !allocation_exists => {
                return Err(LedgerStoreError::Conflict);
            }
            _ => {}
        }

        if let Some(user) = state.users.get_mut(&user_uuid) {
            user.available = commit.new_available;
            user.revision += 1;
        }
        if let Some(grocer) = state.grocers.get_mut(&grocer_uuid) {
            grocer.received = commit.new_received;
            grocer.revision += 1;
        }
        match &commit.allocation {
            AllocationWrite::Noop => {}
            AllocationWrite::Create {
                points,
                grocer_name,
            } => {
                state.allocations.insert(
                    key,
                    AllocationEntry {
                        grocer_name: grocer_name.clone(),
                        points: *points,
                    },
                );
            }
            AllocationWrite::Update { points } => {
                if let Some(entry) = state.allocations.get_mut(&key) {
                    entry.points = *points;
                }
            }
            AllocationWrite::Delete => {
                state.allocations.remove(&key);
            }
        }

        Ok(())
    }

    async fn list_allocations(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Allocation>, LedgerStoreError> {
        let state = self.lock();

        state
            .allocations
            .iter()
            .filter(|((user_uuid, _), _)| user_uuid == user_id.as_uuid())
            .map(|((user_uuid, grocer_uuid), entry)| {
                Allocation::new(
                    UserId::new(*user_uuid),
                    GrocerId::new(*grocer_uuid),
                    entry.grocer_name.clone(),
                    entry.points,
                )
                .map_err(|err| LedgerStoreError::query(format!("corrupt allocation record: {err}")))
            })
            .collect()
    }
}
