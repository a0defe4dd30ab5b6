//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation; regenerate with `diesel print-schema` after schema changes.

diesel::table! {
    /// Point-holding user accounts.
    ///
    /// Provisioning (credentials, roles, initial grants) belongs to an
    /// external collaborator; the ledger only reads and conditionally
    /// rewrites `available_points` under the `revision` token.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Human-readable display name.
        display_name -> Varchar,
        /// Points not currently allocated to any grocer. Never negative.
        available_points -> Int8,
        /// Optimistic concurrency token, bumped by every committed write.
        revision -> Int8,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Participating grocers receiving distributed points.
    grocers (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique display name, denormalised onto allocation records.
        name -> Varchar,
        /// Physical location shown in listings.
        location -> Varchar,
        /// Sum of all allocations currently assigned. Never negative.
        received_points -> Int8,
        /// Optimistic concurrency token, bumped by every committed write.
        revision -> Int8,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Current point assignment from one user to one grocer.
    ///
    /// A unique index on (user_id, grocer_id) guarantees at most one record
    /// per pair; zero-point records are deleted rather than stored.
    allocations (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// The allocating user.
        user_id -> Uuid,
        /// The grocer receiving the points.
        grocer_id -> Uuid,
        /// Denormalised grocer display name for join-free listings.
        grocer_name -> Varchar,
        /// Strictly positive point quantity.
        points -> Int8,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(allocations -> users (user_id));
diesel::joinable!(allocations -> grocers (grocer_id));

diesel::allow_tables_to_appear_in_same_query!(users, grocers, allocations);
