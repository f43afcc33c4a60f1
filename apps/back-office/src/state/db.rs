//! # Database State
//!
//! Wraps the `Database` connection for use in commands.
//!
//! The `Database` from `silverline-db` holds a `SqlitePool`, which is
//! thread-safe. Commands can run queries concurrently without locking.

use silverline_db::Database;

/// Wrapper around `Database` handed to commands.
#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
}

impl DbState {
    /// Creates a new DbState wrapping the database connection.
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// Returns a reference to the inner Database.
    pub fn inner(&self) -> &Database {
        &self.db
    }
}
