//! Allocation: the current assignment of points from one user to one grocer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{GrocerId, Points, UserId};

/// Validation errors returned by [`Allocation::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationValidationError {
    /// Zero-point allocations are never persisted; the record is deleted
    /// instead.
    ZeroPoints,
    EmptyGrocerName,
}

impl fmt::Display for AllocationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroPoints => write!(f, "allocation records must hold a positive point quantity"),
            Self::EmptyGrocerName => write!(f, "allocation grocer name must not be empty"),
        }
    }
}

impl std::error::Error for AllocationValidationError {}

/// Current non-negative point assignment from one user to one grocer.
///
/// Keyed by the (user, grocer) pair, with at most one record per pair. Carries a
/// denormalised copy of the grocer's display name so listings need no join.
///
/// ## Invariants
/// - `points` is strictly positive: a record is created on the first nonzero
///   allocation and deleted when the user sets it back to zero.
/// - Only the allocation engine creates, updates, or deletes records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    user_id: UserId,
    grocer_id: GrocerId,
    grocer_name: String,
    points: Points,
}

impl Allocation {
    /// Fallible constructor enforcing the positive-points invariant.
    pub fn new(
        user_id: UserId,
        grocer_id: GrocerId,
        grocer_name: impl Into<String>,
        points: Points,
    ) -> Result<Self, AllocationValidationError> {
        if points.is_zero() {
            return Err(AllocationValidationError::ZeroPoints);
        }
        let grocer_name = grocer_name.into();
        if grocer_name.trim().is_empty() {
            return Err(AllocationValidationError::EmptyGrocerName);
        }

        Ok(Self {
            user_id,
            grocer_id,
            grocer_name,
            points,
        })
    }

    /// The allocating user.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// The grocer receiving the points.
    pub fn grocer_id(&self) -> &GrocerId {
        &self.grocer_id
    }

    /// Denormalised grocer display name.
    pub fn grocer_name(&self) -> &str {
        &self.grocer_name
    }

    /// Points currently assigned.
    pub fn points(&self) -> Points {
        self.points
    }
}
