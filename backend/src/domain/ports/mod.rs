//! Domain ports and supporting types for the hexagonal boundary.

mod allocation_command;
mod allocation_query;
mod ledger_store;

pub use allocation_command::{
    AllocationCommand, AllocationPayload, ReallocatePointsRequest, ReallocatePointsResponse,
};
pub use allocation_query::{AllocationQuery, ListAllocationsRequest, ListAllocationsResponse};
#[cfg(test)]
pub use ledger_store::MockLedgerStore;
pub use ledger_store::{
    AllocationWrite, GrocerTotal, LedgerCommit, LedgerSnapshot, LedgerStore, LedgerStoreError,
    UserBalance,
};
