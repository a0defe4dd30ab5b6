//! Test utilities exposed behind the `test-support` feature.

mod memory_ledger_store;

pub use memory_ledger_store::MemoryLedgerStore;
