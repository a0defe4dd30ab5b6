//! Driving port for allocation listing reads.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::allocation_command::AllocationPayload;
use crate::domain::{Error, UserId};

/// Request to list a user's own allocation records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAllocationsRequest {
    pub user_id: UserId,
}

/// The user's current allocations, each with the denormalised grocer name.
/// Ordering carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAllocationsResponse {
    pub allocations: Vec<AllocationPayload>,
}

/// Driving port for the allocation query surface.
#[async_trait]
pub trait AllocationQuery: Send + Sync {
    /// Read all allocation records for the acting user.
    async fn list_allocations(
        &self,
        request: ListAllocationsRequest,
    ) -> Result<ListAllocationsResponse, Error>;
}
