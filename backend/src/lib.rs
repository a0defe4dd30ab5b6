//! Points-allocation ledger backend library.
//!
//! A fixed pool of points earned by a user can be redistributed among
//! grocers without ever being created or destroyed: every reallocation moves
//! points between the user's available balance and a grocer's received
//! total, atomically, under optimistic concurrency.
//!
//! The crate is laid out hexagonally: [`domain`] holds the entities, the
//! transaction engine, and the ports; [`outbound`] holds the PostgreSQL
//! adapter. HTTP routing, authentication, and account management are
//! external collaborators that drive the domain ports.

pub mod domain;
pub mod outbound;

#[cfg(feature = "test-support")]
pub mod test_support;
