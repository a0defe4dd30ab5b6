//! Point quantity value type.
//!
//! Every balance in the ledger (a user's available pool, a grocer's received
//! total, an allocation's assigned amount) is a non-negative integer number
//! of points. [`Points`] makes that invariant unrepresentable to break:
//! constructors reject negative values and all arithmetic is checked.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Errors raised by [`Points`] constructors and arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PointsError {
    /// A negative quantity was supplied where points are required.
    #[error("point quantities must be non-negative, got {value}")]
    Negative { value: i64 },
    /// Applying a delta would overflow the backing integer.
    #[error("point arithmetic overflowed")]
    Overflow,
}

/// Non-negative quantity of points.
///
/// Backed by `i64` to match the `BIGINT` columns in the persistence layer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "i64")]
pub struct Points(i64);

impl Points {
    /// The zero quantity.
    pub const ZERO: Self = Self(0);

    /// Validate and construct a quantity from a raw integer.
    pub fn new(value: i64) -> Result<Self, PointsError> {
        if value < 0 {
            return Err(PointsError::Negative { value });
        }
        Ok(Self(value))
    }

    /// The raw integer value.
    pub fn value(self) -> i64 {
        self.0
    }

    /// Whether this is the zero quantity.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Signed difference `self − old`.
    ///
    /// Both operands are non-negative, so the subtraction cannot overflow.
    pub fn delta_from(self, old: Self) -> i64 {
        self.0 - old.0
    }

    /// Apply a signed delta, failing on overflow or a negative result.
    pub fn apply_delta(self, delta: i64) -> Result<Self, PointsError> {
        let value = self.0.checked_add(delta).ok_or(PointsError::Overflow)?;
        Self::new(value)
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Points {
    type Error = PointsError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Points> for i64 {
    fn from(value: Points) -> Self {
        value.value()
    }
}
