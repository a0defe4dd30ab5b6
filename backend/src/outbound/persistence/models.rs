//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{allocations, grocers, users};

/// Balance-and-revision projection of the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserBalanceRow {
    pub available_points: i64,
    pub revision: i64,
}

/// Name-total-revision projection of the grocers table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = grocers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GrocerTotalRow {
    pub name: String,
    pub received_points: i64,
    pub revision: i64,
}

/// Points projection of an existing allocation record.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = allocations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AllocationPointsRow {
    pub points: i64,
}

/// Row struct for listing a user's allocation records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = allocations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AllocationRow {
    pub user_id: Uuid,
    pub grocer_id: Uuid,
    pub grocer_name: String,
    pub points: i64,
    #[expect(dead_code, reason = "schema field for future audit trail support")]
    pub created_at: DateTime<Utc>,
    #[expect(dead_code, reason = "schema field for future audit trail support")]
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new allocation records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = allocations)]
pub(crate) struct NewAllocationRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub grocer_id: Uuid,
    pub grocer_name: &'a str,
    pub points: i64,
}
