//! Grocer identity and received point total.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Points;

/// Validation errors returned by [`Grocer`] constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrocerValidationError {
    EmptyName,
    NameTooLong { max: usize },
    EmptyLocation,
}

impl fmt::Display for GrocerValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "grocer name must not be empty"),
            Self::NameTooLong { max } => {
                write!(f, "grocer name must be at most {max} characters")
            }
            Self::EmptyLocation => write!(f, "grocer location must not be empty"),
        }
    }
}

impl std::error::Error for GrocerValidationError {}

/// Stable grocer identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GrocerId(Uuid);

impl GrocerId {
    /// Wrap an already-issued identifier.
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`GrocerId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for GrocerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for GrocerId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

/// Maximum allowed length for a grocer name.
pub const GROCER_NAME_MAX: usize = 128;

/// Participating merchant receiving distributed points.
///
/// ## Invariants
/// - `name` is non-empty once trimmed and at most [`GROCER_NAME_MAX`]
///   characters; unique across grocers at the schema level.
/// - `received_points` equals the sum of all allocation records referencing
///   this grocer after every committed transaction. Only the allocation
///   engine mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grocer {
    id: GrocerId,
    name: String,
    location: String,
    received_points: Points,
}

impl Grocer {
    /// Fallible constructor enforcing name and location invariants.
    pub fn new(
        id: GrocerId,
        name: impl Into<String>,
        location: impl Into<String>,
        received_points: Points,
    ) -> Result<Self, GrocerValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(GrocerValidationError::EmptyName);
        }
        if name.chars().count() > GROCER_NAME_MAX {
            return Err(GrocerValidationError::NameTooLong {
                max: GROCER_NAME_MAX,
            });
        }

        let location = location.into();
        if location.trim().is_empty() {
            return Err(GrocerValidationError::EmptyLocation);
        }

        Ok(Self {
            id,
            name,
            location,
            received_points,
        })
    }

    /// Stable grocer identifier.
    pub fn id(&self) -> &GrocerId {
        &self.id
    }

    /// Display name, denormalised onto allocation records for read efficiency.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Physical location shown in listings.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Sum of points currently allocated to this grocer by all users.
    pub fn received_points(&self) -> Points {
        self.received_points
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    fn build(name: &str, location: &str) -> Result<Grocer, GrocerValidationError> {
        Grocer::new(GrocerId::random(), name, location, Points::ZERO)
    }

    #[rstest]
    fn accepts_valid_grocer() {
        let grocer = build("Corner Greens", "12 Market Row").expect("valid grocer");
        assert_eq!(grocer.name(), "Corner Greens");
        assert_eq!(grocer.location(), "12 Market Row");
    }

    #[rstest]
    #[case("", "12 Market Row")]
    #[case("  ", "12 Market Row")]
    fn rejects_blank_name(#[case] name: &str, #[case] location: &str) {
        assert_eq!(build(name, location), Err(GrocerValidationError::EmptyName));
    }

    #[rstest]
    fn rejects_blank_location() {
        assert_eq!(
            build("Corner Greens", " "),
            Err(GrocerValidationError::EmptyLocation)
        );
    }

    #[rstest]
    fn rejects_overlong_name() {
        let name = "g".repeat(GROCER_NAME_MAX + 1);
        assert_eq!(
            build(&name, "12 Market Row"),
            Err(GrocerValidationError::NameTooLong {
                max: GROCER_NAME_MAX
            })
        );
    }
}
