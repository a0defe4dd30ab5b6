//! Domain primitives, aggregates, and services for the points ledger.
//!
//! Purpose: define strongly typed entities and the allocation transaction
//! engine, independent of any transport or storage technology. Keep types
//! immutable and document invariants and serialisation contracts (serde) in
//! each type's Rustdoc.
//!
//! Public surface:
//! - `Error` / `ErrorCode`: transport-agnostic failure taxonomy.
//! - `Points`: non-negative point quantity with checked arithmetic.
//! - `User`, `Grocer`, `Allocation`: the three ledger entities.
//! - `AllocationCommandService` / `AllocationQueryService`: engine and
//!   read path over the `ports::LedgerStore` boundary.

pub mod allocation;
pub mod allocation_service;
pub mod error;
pub mod grocer;
pub mod points;
pub mod ports;
pub mod user;

pub use self::allocation::{Allocation, AllocationValidationError};
pub use self::allocation_service::{AllocationCommandService, AllocationQueryService};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::grocer::{Grocer, GrocerId, GrocerValidationError};
pub use self::points::{Points, PointsError};
pub use self::user::{User, UserId, UserValidationError};
