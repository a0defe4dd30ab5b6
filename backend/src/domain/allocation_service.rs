//! Points allocation domain services.
//!
//! [`AllocationCommandService`] is the transaction engine: given the total a
//! user wants assigned to one grocer, it computes the net delta against the
//! existing allocation, validates the user's available balance, and commits
//! the three record updates (user balance, grocer total, allocation record)
//! through the ledger store as one atomic unit. Points are conserved: a
//! reallocation only ever moves them between the user's available pool and
//! the grocer's received total.
//!
//! [`AllocationQueryService`] is the read path for a user's own allocations.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{
    AllocationCommand, AllocationPayload, AllocationQuery, AllocationWrite, LedgerCommit,
    LedgerSnapshot, LedgerStore, LedgerStoreError, ListAllocationsRequest,
    ListAllocationsResponse, ReallocatePointsRequest, ReallocatePointsResponse,
};
use crate::domain::{Error, Points};

/// Bounded number of read-recompute-commit rounds before a persistent
/// conflict is surfaced to the caller as retryable.
const MAX_COMMIT_ATTEMPTS: u32 = 3;

fn map_store_error(error: LedgerStoreError) -> Error {
    match error {
        LedgerStoreError::Connection { message } => {
            Error::service_unavailable(format!("ledger store unavailable: {message}"))
        }
        LedgerStoreError::Query { message } => {
            Error::internal(format!("ledger store error: {message}"))
        }
        LedgerStoreError::Conflict => {
            Error::conflict("reallocation conflicted with concurrent updates; retry the operation")
        }
    }
}

/// A validated reallocation, ready to commit.
struct ReallocationPlan {
    commit: LedgerCommit,
    response: ReallocatePointsResponse,
}

/// Compute and validate one reallocation against a snapshot.
///
/// Pure: all validation failures happen here, before any write. The
/// sufficiency check applies strictly to a positive delta; reducing or
/// zeroing an allocation never requires balance validation.
fn plan_reallocation(
    request: &ReallocatePointsRequest,
    snapshot: &LedgerSnapshot,
    requested: Points,
) -> Result<ReallocationPlan, Error> {
    let user = snapshot
        .user
        .as_ref()
        .ok_or_else(|| Error::not_found(format!("user {} not found", request.user_id)))?;
    let grocer = snapshot
        .grocer
        .as_ref()
        .ok_or_else(|| Error::not_found(format!("grocer {} not found", request.grocer_id)))?;

    let old_points = snapshot.allocation.unwrap_or(Points::ZERO);
    let delta = requested.delta_from(old_points);

    if delta > 0 && user.available.value() < delta {
        return Err(Error::insufficient_balance(user.available.value(), delta));
    }

    let new_available = user
        .available
        .apply_delta(-delta)
        .map_err(|err| Error::internal(format!("user balance update failed: {err}")))?;
    let new_received = grocer
        .received
        .apply_delta(delta)
        .map_err(|err| Error::internal(format!("grocer total update failed: {err}")))?;

    let allocation = match (requested.is_zero(), snapshot.allocation.is_some()) {
        (true, true) => AllocationWrite::Delete,
        (true, false) => AllocationWrite::Noop,
        (false, true) => AllocationWrite::Update { points: requested },
        (false, false) => AllocationWrite::Create {
            points: requested,
            grocer_name: grocer.name.clone(),
        },
    };

    let payload = (!requested.is_zero()).then(|| AllocationPayload {
        grocer_id: request.grocer_id,
        grocer_name: grocer.name.clone(),
        points: requested.value(),
    });

    Ok(ReallocationPlan {
        commit: LedgerCommit {
            user_id: request.user_id,
            grocer_id: request.grocer_id,
            new_available,
            expected_user_revision: user.revision,
            new_received,
            expected_grocer_revision: grocer.revision,
            allocation,
        },
        response: ReallocatePointsResponse {
            new_available: new_available.value(),
            allocation: payload,
        },
    })
}

/// Allocation transaction engine implementing the command driving port.
#[derive(Clone)]
pub struct AllocationCommandService<S> {
    store: Arc<S>,
}

impl<S> AllocationCommandService<S> {
    /// Create a new command service over the ledger store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S> AllocationCommand for AllocationCommandService<S>
where
    S: LedgerStore,
{
    async fn reallocate(
        &self,
        request: ReallocatePointsRequest,
    ) -> Result<ReallocatePointsResponse, Error> {
        // Reject malformed input before touching the store.
        let requested = Points::new(request.requested_points).map_err(|err| {
            Error::invalid_argument(format!("requested points must be a non-negative integer: {err}"))
        })?;

        let mut attempts = 0;
        loop {
            attempts += 1;

            let snapshot = self
                .store
                .load_snapshot(&request.user_id, &request.grocer_id)
                .await
                .map_err(map_store_error)?;

            let plan = plan_reallocation(&request, &snapshot, requested)?;

            match self.store.commit(&plan.commit).await {
                Ok(()) => return Ok(plan.response),
                Err(LedgerStoreError::Conflict) if attempts < MAX_COMMIT_ATTEMPTS => {
                    debug!(
                        user_id = %request.user_id,
                        grocer_id = %request.grocer_id,
                        attempts,
                        "ledger commit conflicted, retrying with a fresh snapshot"
                    );
                }
                Err(err) => return Err(map_store_error(err)),
            }
        }
    }
}

/// Allocation read surface implementing the query driving port.
#[derive(Clone)]
pub struct AllocationQueryService<S> {
    store: Arc<S>,
}

impl<S> AllocationQueryService<S> {
    /// Create a new query service over the ledger store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S> AllocationQuery for AllocationQueryService<S>
where
    S: LedgerStore,
{
    async fn list_allocations(
        &self,
        request: ListAllocationsRequest,
    ) -> Result<ListAllocationsResponse, Error> {
        let allocations = self
            .store
            .list_allocations(&request.user_id)
            .await
            .map_err(map_store_error)?;

        Ok(ListAllocationsResponse {
            allocations: allocations.into_iter().map(Into::into).collect(),
        })
    }
}

#[cfg(test)]
#[path = "allocation_service_tests.rs"]
mod tests;
