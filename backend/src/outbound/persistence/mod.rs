//! PostgreSQL persistence adapter using Diesel ORM.
//!
//! Concrete implementation of the domain's `LedgerStore` port backed by
//! PostgreSQL via Diesel with async support through `diesel-async` and `bb8`
//! connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapter**: the store only translates between Diesel rows and
//!   domain types and enforces the commit-time revision checks. The delta
//!   and validation logic lives in the domain services.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) never leak to the domain layer.
//! - **Strongly typed errors**: all database errors are mapped to the port's
//!   `LedgerStoreError`.

mod diesel_ledger_store;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_ledger_store::DieselLedgerStore;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
