//! User identity and point balance.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Points;

/// Validation errors returned by [`User`] constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyDisplayName,
    DisplayNameTooLong { max: usize },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDisplayName => write!(f, "display name must not be empty"),
            Self::DisplayNameTooLong { max } => {
                write!(f, "display name must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier.
///
/// Supplied by the identity collaborator after authentication; the ledger
/// trusts it completely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Wrap an already-issued identifier.
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for UserId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

/// Maximum allowed length for a display name.
pub const DISPLAY_NAME_MAX: usize = 64;

/// Point-holding user.
///
/// ## Invariants
/// - `display_name` is non-empty once trimmed and at most
///   [`DISPLAY_NAME_MAX`] characters.
/// - `available_points` is the user's single authoritative mutable balance:
///   the portion of their grant not currently allocated to any grocer. Only
///   the allocation engine decrements or increments it.
///
/// Account provisioning (credentials, roles, the initial grant) lives with an
/// external collaborator; this type carries only what the ledger touches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    display_name: String,
    available_points: Points,
}

impl User {
    /// Fallible constructor enforcing the display name invariant.
    pub fn new(
        id: UserId,
        display_name: impl Into<String>,
        available_points: Points,
    ) -> Result<Self, UserValidationError> {
        let display_name = display_name.into();
        if display_name.trim().is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }
        if display_name.chars().count() > DISPLAY_NAME_MAX {
            return Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }

        Ok(Self {
            id,
            display_name,
            available_points,
        })
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Display name shown alongside the user's allocations.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Points the user has not yet allocated to any grocer.
    pub fn available_points(&self) -> Points {
        self.available_points
    }
}
