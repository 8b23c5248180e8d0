//! Migration runner.
//!
//! [`Runner::up`] applies every unapplied migration in list order;
//! [`Runner::down`] reverts the most recently applied ones in reverse list
//! order. Each call is one batch: a single transaction wraps every unit
//! operation and its ledger update, so a failure anywhere rolls back the
//! whole call.

use crate::connection::Store;
use crate::error::{MigrateError, MigrateResult};
use crate::ledger::{Ledger, LedgerEntry};
use crate::migration::{Direction, Migration, MigrationList};
use chrono::{DateTime, Utc};
use duckdb::Connection;
use serde::Serialize;
use std::collections::HashMap;
use tm_core::config::DEFAULT_LEDGER_TABLE;
use tm_core::{Config, MigrationId};

/// Runner settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerOptions {
    /// Ledger table name.
    pub ledger_table: String,
    /// Fail instead of assuming "not applied" when a ledger read errors.
    pub strict_ledger_reads: bool,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            ledger_table: DEFAULT_LEDGER_TABLE.to_string(),
            strict_ledger_reads: false,
        }
    }
}

impl From<&Config> for RunnerOptions {
    fn from(config: &Config) -> Self {
        Self {
            ledger_table: config.ledger_table.clone(),
            strict_ledger_reads: config.strict_ledger_reads,
        }
    }
}

/// Apply-state of one registered migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    pub id: MigrationId,
    pub applied: bool,
    pub applied_at: Option<DateTime<Utc>>,
}

/// Apply-state of every registered migration, plus ledger rows that match
/// no registered migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub migrations: Vec<MigrationStatus>,
    pub orphans: Vec<LedgerEntry>,
}

impl StatusReport {
    pub fn applied_count(&self) -> usize {
        self.migrations.iter().filter(|m| m.applied).count()
    }

    pub fn pending_count(&self) -> usize {
        self.migrations.len() - self.applied_count()
    }
}

/// Executes a [`MigrationList`] against a [`Store`].
///
/// Construction creates the ledger table, so a `Runner` always has one.
pub struct Runner<'a> {
    store: &'a Store,
    migrations: MigrationList,
    ledger: Ledger,
}

impl<'a> Runner<'a> {
    /// Create a runner with default options.
    pub fn new(store: &'a Store, migrations: MigrationList) -> MigrateResult<Self> {
        Self::with_options(store, migrations, RunnerOptions::default())
    }

    /// Create a runner, bootstrapping the ledger table.
    pub fn with_options(
        store: &'a Store,
        migrations: MigrationList,
        options: RunnerOptions,
    ) -> MigrateResult<Self> {
        let ledger = Ledger::new(&options.ledger_table)?
            .with_strict_reads(options.strict_ledger_reads);
        ledger.ensure_table(store.conn())?;
        Ok(Self {
            store,
            migrations,
            ledger,
        })
    }

    pub fn migrations(&self) -> &MigrationList {
        &self.migrations
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Apply all unapplied migrations in list order.
    ///
    /// Returns the applied ids in order; empty when nothing was pending.
    pub fn up(&self) -> MigrateResult<Vec<MigrationId>> {
        let applied = self.store.transaction(|conn| {
            let mut applied = Vec::new();
            for migration in &self.migrations {
                if self.ledger.is_applied(conn, migration.id())? {
                    log::debug!("Skipping {} (already applied)", migration.id());
                    continue;
                }
                self.execute(conn, migration, Direction::Up)?;
                self.ledger
                    .record_applied(conn, migration.id(), Utc::now().timestamp())?;
                log::debug!("Applied {}", migration.id());
                applied.push(migration.id().clone());
            }
            Ok(applied)
        })?;

        log::info!("Applied {} migration(s)", applied.len());
        Ok(applied)
    }

    /// Revert up to `limit` applied migrations, newest (last registered)
    /// first. A negative `limit` reverts every applied migration.
    ///
    /// Returns the reverted ids in the order they were reverted.
    pub fn down(&self, limit: i64) -> MigrateResult<Vec<MigrationId>> {
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        if limit == 0 {
            return Ok(Vec::new());
        }

        let reverted = self.store.transaction(|conn| {
            let mut reverted = Vec::new();
            for migration in self.migrations.iter().rev() {
                if reverted.len() >= limit {
                    break;
                }
                if !self.ledger.is_applied(conn, migration.id())? {
                    continue;
                }
                self.execute(conn, migration, Direction::Down)?;
                self.ledger.record_reverted(conn, migration.id())?;
                log::debug!("Reverted {}", migration.id());
                reverted.push(migration.id().clone());
            }
            Ok(reverted)
        })?;

        log::info!("Reverted {} migration(s)", reverted.len());
        Ok(reverted)
    }

    /// Apply-state of every registered migration.
    pub fn status(&self) -> MigrateResult<StatusReport> {
        let entries = self.ledger.entries(self.store.conn())?;
        let by_file: HashMap<&str, &LedgerEntry> =
            entries.iter().map(|e| (e.file.as_str(), e)).collect();

        let migrations = self
            .migrations
            .iter()
            .map(|m| {
                let entry = by_file.get(m.id().as_str());
                MigrationStatus {
                    id: m.id().clone(),
                    applied: entry.is_some(),
                    applied_at: entry.and_then(|e| e.applied_at()),
                }
            })
            .collect();

        let orphans = entries
            .iter()
            .filter(|e| self.migrations.get(&e.file).is_none())
            .cloned()
            .collect();

        Ok(StatusReport {
            migrations,
            orphans,
        })
    }

    fn execute(
        &self,
        conn: &Connection,
        migration: &Migration,
        direction: Direction,
    ) -> MigrateResult<()> {
        migration
            .run(direction, conn)
            .map_err(|source| MigrateError::UnitExecution {
                id: migration.id().clone(),
                direction,
                source,
            })
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
