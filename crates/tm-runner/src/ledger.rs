//! Ledger of applied migrations.
//!
//! One row per applied migration: `file` (the migration id, primary key) and
//! `applied` (unix seconds). A row's presence is the only thing that marks a
//! migration as applied. All reads and writes take the caller's connection so
//! they observe the batch transaction's uncommitted state.

use crate::error::{MigrateError, MigrateResult};
use crate::migration::Direction;
use chrono::{DateTime, Utc};
use duckdb::Connection;
use serde::Serialize;
use tm_core::config::{is_plain_identifier, DEFAULT_LEDGER_TABLE};
use tm_core::MigrationId;

/// A single ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    /// Migration identifier as stored.
    pub file: String,
    /// Unix timestamp (seconds) of when the migration was applied.
    pub applied: i64,
}

impl LedgerEntry {
    /// `applied` as a UTC datetime, if it is in range.
    pub fn applied_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.applied, 0)
    }
}

/// Access to the ledger table.
#[derive(Debug, Clone)]
pub struct Ledger {
    table: String,
    strict_reads: bool,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            table: DEFAULT_LEDGER_TABLE.to_string(),
            strict_reads: false,
        }
    }
}

impl Ledger {
    /// Ledger stored in `table`, which must be a plain identifier.
    pub fn new(table: &str) -> MigrateResult<Self> {
        if !is_plain_identifier(table) {
            return Err(MigrateError::InvalidTableName(table.to_string()));
        }
        Ok(Self {
            table: table.to_string(),
            strict_reads: false,
        })
    }

    /// Surface read failures from [`is_applied`](Self::is_applied) instead of
    /// reporting the migration as unapplied.
    pub fn with_strict_reads(mut self, strict: bool) -> Self {
        self.strict_reads = strict;
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn quoted(&self) -> String {
        format!("\"{}\"", self.table)
    }

    /// Create the ledger table if it does not exist.
    pub fn ensure_table(&self, conn: &Connection) -> MigrateResult<()> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (file VARCHAR(255) PRIMARY KEY NOT NULL, applied INTEGER NOT NULL)",
            self.quoted()
        );
        conn.execute_batch(&sql)
            .map_err(|e| MigrateError::Bootstrap {
                table: self.table.clone(),
                source: e,
            })
    }

    /// Whether `id` has a ledger row.
    ///
    /// A failed query counts as "not applied" unless strict reads are on.
    pub fn is_applied(&self, conn: &Connection, id: &MigrationId) -> MigrateResult<bool> {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE file = ?", self.quoted());
        match conn.query_row(&sql, duckdb::params![id.as_str()], |row| {
            row.get::<_, i64>(0)
        }) {
            Ok(count) => Ok(count > 0),
            Err(e) if self.strict_reads => Err(MigrateError::LedgerRead {
                id: id.clone(),
                source: e,
            }),
            Err(e) => {
                log::warn!("Ledger read for {id} failed, treating as not applied: {e}");
                Ok(false)
            }
        }
    }

    /// Insert the ledger row for `id`.
    pub fn record_applied(
        &self,
        conn: &Connection,
        id: &MigrationId,
        applied_at: i64,
    ) -> MigrateResult<()> {
        let sql = format!("INSERT INTO {} (file, applied) VALUES (?, ?)", self.quoted());
        conn.execute(&sql, duckdb::params![id.as_str(), applied_at])
            .map_err(|e| MigrateError::LedgerWrite {
                id: id.clone(),
                direction: Direction::Up,
                source: e,
            })?;
        Ok(())
    }

    /// Delete the ledger row for `id`.
    pub fn record_reverted(&self, conn: &Connection, id: &MigrationId) -> MigrateResult<()> {
        let sql = format!("DELETE FROM {} WHERE file = ?", self.quoted());
        conn.execute(&sql, duckdb::params![id.as_str()])
            .map_err(|e| MigrateError::LedgerWrite {
                id: id.clone(),
                direction: Direction::Down,
                source: e,
            })?;
        Ok(())
    }

    /// Every ledger row, ordered by `file`.
    pub fn entries(&self, conn: &Connection) -> MigrateResult<Vec<LedgerEntry>> {
        let sql = format!("SELECT file, applied FROM {} ORDER BY file", self.quoted());
        let mut stmt = conn.prepare(&sql)?;
        let entries = stmt
            .query_map([], |row| {
                Ok(LedgerEntry {
                    file: row.get(0)?,
                    applied: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
