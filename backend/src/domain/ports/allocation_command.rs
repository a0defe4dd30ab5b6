//! Driving port for point reallocation commands.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Allocation, Error, GrocerId, UserId};

/// Wire payload describing one allocation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationPayload {
    pub grocer_id: GrocerId,
    pub grocer_name: String,
    pub points: i64,
}

impl From<Allocation> for AllocationPayload {
    fn from(value: Allocation) -> Self {
        Self {
            grocer_id: *value.grocer_id(),
            grocer_name: value.grocer_name().to_owned(),
            points: value.points().value(),
        }
    }
}

/// Request to set a user's total allocation to one grocer.
///
/// `user_id` is the authenticated acting user supplied by the identity
/// collaborator. `requested_points` is the new desired total, not a delta;
/// it is kept as a raw integer so negative input surfaces as
/// `invalid_argument` rather than a deserialisation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReallocatePointsRequest {
    pub user_id: UserId,
    pub grocer_id: GrocerId,
    pub requested_points: i64,
}

/// Successful reallocation outcome.
///
/// `allocation` is `None` when the request zeroed the allocation (the record
/// no longer exists).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReallocatePointsResponse {
    pub new_available: i64,
    pub allocation: Option<AllocationPayload>,
}

/// Driving port for the allocation transaction engine.
#[async_trait]
pub trait AllocationCommand: Send + Sync {
    /// Atomically move the user's allocation to the grocer to the requested
    /// total, conserving points between the user's available balance and the
    /// grocer's received total.
    async fn reallocate(
        &self,
        request: ReallocatePointsRequest,
    ) -> Result<ReallocatePointsResponse, Error>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;
    use crate::domain::Points;

    #[rstest]
    fn payload_uses_camel_case_fields() {
        let request = ReallocatePointsRequest {
            user_id: UserId::random(),
            grocer_id: GrocerId::random(),
            requested_points: 30,
        };
        let value = serde_json::to_value(&request).expect("serialises");

        assert!(value.get("requestedPoints").is_some());
        assert!(value.get("grocerId").is_some());
    }

    #[rstest]
    fn payload_from_allocation_copies_denormalised_name() {
        let points = Points::new(30).expect("valid points");
        let allocation = Allocation::new(
            UserId::random(),
            GrocerId::random(),
            "Corner Greens",
            points,
        )
        .expect("valid allocation");

        let payload = AllocationPayload::from(allocation);
        assert_eq!(payload.grocer_name, "Corner Greens");
        assert_eq!(payload.points, 30);
    }
}
