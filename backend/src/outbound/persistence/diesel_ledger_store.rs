//! PostgreSQL-backed `LedgerStore` implementation using Diesel ORM.
//!
//! This adapter implements the domain's `LedgerStore` port. Snapshot reads
//! run inside a transaction so all three SELECTs observe consistent state;
//! commits run as a single transaction of revision-checked updates plus the
//! allocation insert/update/delete, so a lost revision race or duplicate
//! allocation rolls the whole write set back and surfaces as a conflict.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::ports::{
    AllocationWrite, GrocerTotal, LedgerCommit, LedgerSnapshot, LedgerStore, LedgerStoreError,
    UserBalance,
};
use crate::domain::{Allocation, GrocerId, Points, PointsError, UserId};

use super::models::{AllocationPointsRow, AllocationRow, GrocerTotalRow, NewAllocationRow, UserBalanceRow};
use super::pool::{DbPool, PoolError};
use super::schema::{allocations, grocers, users};

/// Diesel-backed implementation of the `LedgerStore` port.
#[derive(Clone)]
pub struct DieselLedgerStore {
    pool: DbPool,
}

impl DieselLedgerStore {
    /// Create a new store over the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to domain ledger store errors.
fn map_pool_error(error: PoolError) -> LedgerStoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            LedgerStoreError::connection(message)
        }
    }
}

/// Map Diesel errors to domain ledger store errors.
///
/// Unique violations and serialisation failures both mean a concurrent
/// transaction won the race; callers re-read and retry on `Conflict`.
fn map_diesel_error(error: diesel::result::Error) -> LedgerStoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
        | DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
            LedgerStoreError::Conflict
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            LedgerStoreError::connection("database connection error")
        }
        DieselError::NotFound => LedgerStoreError::query("record not found"),
        _ => LedgerStoreError::query("database error"),
    }
}

/// Error for a stored quantity that violates a domain invariant.
fn corrupt_value_error(column: &str, error: PointsError) -> LedgerStoreError {
    warn!(column, %error, "stored point quantity violates domain invariant");
    LedgerStoreError::query(format!("corrupt {column}: {error}"))
}

fn row_to_user_balance(row: UserBalanceRow) -> Result<UserBalance, LedgerStoreError> {
    let available = Points::new(row.available_points)
        .map_err(|err| corrupt_value_error("users.available_points", err))?;
    Ok(UserBalance {
        available,
        revision: row.revision,
    })
}

fn row_to_grocer_total(row: GrocerTotalRow) -> Result<GrocerTotal, LedgerStoreError> {
    let received = Points::new(row.received_points)
        .map_err(|err| corrupt_value_error("grocers.received_points", err))?;
    Ok(GrocerTotal {
        name: row.name,
        received,
        revision: row.revision,
    })
}

fn row_to_allocation(row: AllocationRow) -> Result<Allocation, LedgerStoreError> {
    let points =
        Points::new(row.points).map_err(|err| corrupt_value_error("allocations.points", err))?;
    Allocation::new(
        UserId::new(row.user_id),
        GrocerId::new(row.grocer_id),
        row.grocer_name,
        points,
    )
    .map_err(|err| LedgerStoreError::query(format!("corrupt allocation record: {err}")))
}

/// Outcome classification inside the commit transaction.
enum CommitTxError {
    /// A revision check matched zero rows or a guarded write found no record.
    Conflict,
    Diesel(diesel::result::Error),
}

impl From<diesel::result::Error> for CommitTxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn map_commit_error(error: CommitTxError) -> LedgerStoreError {
    match error {
        CommitTxError::Conflict => LedgerStoreError::Conflict,
        CommitTxError::Diesel(err) => map_diesel_error(err),
    }
}

#[async_trait]
impl LedgerStore for DieselLedgerStore {
    async fn load_snapshot(
        &self,
        user_id: &UserId,
        grocer_id: &GrocerId,
    ) -> Result<LedgerSnapshot, LedgerStoreError> {
        let user_uuid = *user_id.as_uuid();
        let grocer_uuid = *grocer_id.as_uuid();

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Read all three records in one transaction so the SELECTs observe a
        // consistent snapshot.
        let (user_row, grocer_row, allocation_row) = conn
            .transaction::<(
                Option<UserBalanceRow>,
                Option<GrocerTotalRow>,
                Option<AllocationPointsRow>,
            ), diesel::result::Error, _>(|conn| {
                async move {
                    let user = users::table
                        .find(user_uuid)
                        .select(UserBalanceRow::as_select())
                        .first(conn)
                        .await
                        .optional()?;

                    let grocer = grocers::table
                        .find(grocer_uuid)
                        .select(GrocerTotalRow::as_select())
                        .first(conn)
                        .await
                        .optional()?;

                    let allocation = allocations::table
                        .filter(allocations::user_id.eq(user_uuid))
                        .filter(allocations::grocer_id.eq(grocer_uuid))
                        .select(AllocationPointsRow::as_select())
                        .first(conn)
                        .await
                        .optional()?;

                    Ok((user, grocer, allocation))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(LedgerSnapshot {
            user: user_row.map(row_to_user_balance).transpose()?,
            grocer: grocer_row.map(row_to_grocer_total).transpose()?,
            allocation: allocation_row
                .map(|row| {
                    Points::new(row.points)
                        .map_err(|err| corrupt_value_error("allocations.points", err))
                })
                .transpose()?,
        })
    }

    async fn commit(&self, commit: &LedgerCommit) -> Result<(), LedgerStoreError> {
        let user_uuid = *commit.user_id.as_uuid();
        let grocer_uuid = *commit.grocer_id.as_uuid();
        let new_available = commit.new_available.value();
        let expected_user_revision = commit.expected_user_revision;
        let new_received = commit.new_received.value();
        let expected_grocer_revision = commit.expected_grocer_revision;
        let allocation_write = commit.allocation.clone();

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction::<(), CommitTxError, _>(|conn| {
            async move {
                let updated = diesel::update(
                    users::table.filter(
                        users::id
                            .eq(user_uuid)
                            .and(users::revision.eq(expected_user_revision)),
                    ),
                )
                .set((
                    users::available_points.eq(new_available),
                    users::revision.eq(expected_user_revision + 1),
                    users::updated_at.eq(diesel::dsl::now),
                ))
                .execute(conn)
                .await?;
                if updated == 0 {
                    return Err(CommitTxError::Conflict);
                }

                let updated = diesel::update(
                    grocers::table.filter(
                        grocers::id
                            .eq(grocer_uuid)
                            .and(grocers::revision.eq(expected_grocer_revision)),
                    ),
                )
                .set((
                    grocers::received_points.eq(new_received),
                    grocers::revision.eq(expected_grocer_revision + 1),
                    grocers::updated_at.eq(diesel::dsl::now),
                ))
                .execute(conn)
                .await?;
                if updated == 0 {
                    return Err(CommitTxError::Conflict);
                }

                match allocation_write {
                    AllocationWrite::Noop => {}
                    AllocationWrite::Create {
                        points,
                        grocer_name,
                    } => {
                        let row = NewAllocationRow {
                            id: Uuid::new_v4(),
                            user_id: user_uuid,
                            grocer_id: grocer_uuid,
                            grocer_name: &grocer_name,
                            points: points.value(),
                        };
                        diesel::insert_into(allocations::table)
                            .values(&row)
                            .execute(conn)
                            .await?;
                    }
                    AllocationWrite::Update { points } => {
                        let updated = diesel::update(
                            allocations::table.filter(
                                allocations::user_id
                                    .eq(user_uuid)
                                    .and(allocations::grocer_id.eq(grocer_uuid)),
                            ),
                        )
                        .set((
                            allocations::points.eq(points.value()),
                            allocations::updated_at.eq(diesel::dsl::now),
                        ))
                        .execute(conn)
                        .await?;
                        if updated == 0 {
                            return Err(CommitTxError::Conflict);
                        }
                    }
                    AllocationWrite::Delete => {
                        let deleted = diesel::delete(
                            allocations::table.filter(
                                allocations::user_id
                                    .eq(user_uuid)
                                    .and(allocations::grocer_id.eq(grocer_uuid)),
                            ),
                        )
                        .execute(conn)
                        .await?;
                        if deleted == 0 {
                            return Err(CommitTxError::Conflict);
                        }
                    }
                }

                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_commit_error)
    }

    async fn list_allocations(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Allocation>, LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<AllocationRow> = allocations::table
            .filter(allocations::user_id.eq(user_id.as_uuid()))
            .select(AllocationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_allocation).collect()
    }
}
