//! Store connection wrapper.
//!
//! [`Store`] owns a DuckDB [`Connection`] and provides helpers for opening
//! and transacting against the database being migrated.

use crate::error::{MigrateError, MigrateResult};
use duckdb::Connection;
use std::path::Path;

/// Wrapper around the DuckDB connection migrations run against.
///
/// Single-threaded: each `up`/`down` batch runs to completion before the
/// next one starts.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the database at `path`.
    pub fn open(path: &Path) -> MigrateResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| MigrateError::Connection(format!("{e}: {}", path.display())))?;
        Ok(Self { conn })
    }

    /// Create an in-memory database.
    pub fn open_memory() -> MigrateResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| MigrateError::Connection(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Open from a location string (handles the `:memory:` special case).
    pub fn new(location: &str) -> MigrateResult<Self> {
        if location == ":memory:" {
            Self::open_memory()
        } else {
            Self::open(Path::new(location))
        }
    }

    /// Borrow the underlying DuckDB connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Execute `body` within a `BEGIN` / `COMMIT` transaction, rolling back on
    /// error.
    ///
    /// The transaction is also rolled back if `body` panics, so the
    /// connection never stays inside an open transaction.
    pub fn transaction<F, T>(&self, body: F) -> MigrateResult<T>
    where
        F: FnOnce(&Connection) -> MigrateResult<T>,
    {
        self.conn
            .execute_batch("BEGIN TRANSACTION")
            .map_err(|e| MigrateError::Transaction(format!("BEGIN failed: {e}")))?;

        let mut guard = RollbackGuard::new(&self.conn);
        let result = body(&self.conn);

        match &result {
            Ok(_) => {
                guard.disarm();
                if let Err(commit_err) = self.conn.execute_batch("COMMIT") {
                    let _ = self.conn.execute_batch("ROLLBACK");
                    return Err(MigrateError::Transaction(format!(
                        "COMMIT failed: {commit_err}"
                    )));
                }
            }
            Err(_) => guard.rollback(),
        }
        result
    }
}

/// Rolls back the open transaction when dropped, unless disarmed.
struct RollbackGuard<'a> {
    conn: &'a Connection,
    armed: bool,
}

impl<'a> RollbackGuard<'a> {
    fn new(conn: &'a Connection) -> Self {
        Self { conn, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }

    fn rollback(&mut self) {
        if self.armed {
            self.armed = false;
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                log::warn!("ROLLBACK failed: {e}");
            }
        }
    }
}

impl Drop for RollbackGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            log::warn!("Transaction abandoned mid-batch, rolling back");
            self.rollback();
        }
    }
}

#[cfg(test)]
#[path = "connection_test.rs"]
mod tests;
