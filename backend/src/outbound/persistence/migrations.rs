//! Embedded schema migrations.
//!
//! Migrations are compiled into the binary and applied at startup, before
//! the pool serves traffic. `diesel_migrations` only speaks blocking
//! connections, so the run is wrapped in `spawn_blocking` over an
//! `AsyncConnectionWrapper` around the same pure-Rust connection type the
//! pool uses.

use diesel::Connection;
use diesel_async::AsyncPgConnection;
use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

/// All migrations under `backend/migrations/`, embedded at compile time.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Errors raised while applying migrations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MigrationError {
    /// The database could not be reached.
    #[error("migration connection failed: {message}")]
    Connection { message: String },
    /// A migration failed to apply.
    #[error("migration failed: {message}")]
    Migration { message: String },
    /// The blocking migration task was cancelled or panicked.
    #[error("migration task failed: {message}")]
    Task { message: String },
}

impl MigrationError {
    fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    fn migration(message: impl Into<String>) -> Self {
        Self::Migration {
            message: message.into(),
        }
    }

    fn task(message: impl Into<String>) -> Self {
        Self::Task {
            message: message.into(),
        }
    }
}

/// Apply all pending migrations against the given database.
///
/// # Errors
///
/// Returns [`MigrationError`] if the connection cannot be established or a
/// migration fails; already-applied migrations are skipped.
pub async fn run_pending_migrations(database_url: &str) -> Result<(), MigrationError> {
    let url = database_url.to_owned();

    tokio::task::spawn_blocking(move || {
        let mut conn = AsyncConnectionWrapper::<AsyncPgConnection>::establish(&url)
            .map_err(|err| MigrationError::connection(err.to_string()))?;

        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|err| MigrationError::migration(err.to_string()))?;

        info!(count = applied.len(), "applied pending migrations");
        Ok(())
    })
    .await
    .map_err(|err| MigrationError::task(err.to_string()))?
}
