//! Migration units and the ordered list the runner executes.

use crate::error::{MigrateError, MigrateResult};
use duckdb::Connection;
use std::collections::HashSet;
use std::fmt;
use tm_core::{MigrationId, MigrationSource};

/// Error returned by a migration operation.
pub type UnitError = Box<dyn std::error::Error + Send + Sync>;

/// Result of a migration operation.
pub type UnitResult = Result<(), UnitError>;

/// A forward or backward migration operation.
///
/// Receives the connection with the batch transaction already open.
pub type MigrationFn = Box<dyn Fn(&Connection) -> UnitResult + Send + Sync>;

/// Which way a migration is being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// "applied" / "reverted", as used in ledger messages.
    pub fn past_tense(self) -> &'static str {
        match self {
            Direction::Up => "applied",
            Direction::Down => "reverted",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Up => "apply",
            Direction::Down => "revert",
        })
    }
}

/// A named pair of up/down operations.
pub struct Migration {
    id: MigrationId,
    up: MigrationFn,
    down: MigrationFn,
}

impl Migration {
    /// Build a migration from Rust closures.
    pub fn new<U, D>(id: MigrationId, up: U, down: D) -> Self
    where
        U: Fn(&Connection) -> UnitResult + Send + Sync + 'static,
        D: Fn(&Connection) -> UnitResult + Send + Sync + 'static,
    {
        Self {
            id,
            up: Box::new(up),
            down: Box::new(down),
        }
    }

    /// Build a migration that runs SQL scripts with `execute_batch`.
    ///
    /// A missing, blank, or comment-only down script makes the revert a no-op.
    pub fn from_sql(id: MigrationId, up_sql: impl Into<String>, down_sql: Option<String>) -> Self {
        let up_sql = up_sql.into();
        let down_sql = down_sql.filter(|sql| has_statements(sql));
        Self::new(
            id,
            move |conn| run_script(conn, &up_sql),
            move |conn| match &down_sql {
                Some(sql) => run_script(conn, sql),
                None => Ok(()),
            },
        )
    }

    /// Unique identifier.
    pub fn id(&self) -> &MigrationId {
        &self.id
    }

    /// Run the operation for `direction` against `conn`.
    pub fn run(&self, direction: Direction, conn: &Connection) -> UnitResult {
        match direction {
            Direction::Up => (self.up)(conn),
            Direction::Down => (self.down)(conn),
        }
    }
}

impl fmt::Debug for Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migration").field("id", &self.id).finish()
    }
}

impl From<MigrationSource> for Migration {
    fn from(source: MigrationSource) -> Self {
        Migration::from_sql(source.id, source.up_sql, source.down_sql)
    }
}

fn run_script(conn: &Connection, sql: &str) -> UnitResult {
    if !has_statements(sql) {
        return Ok(());
    }
    conn.execute_batch(sql)?;
    Ok(())
}

/// False for scripts made only of whitespace, `--` comments, and `;`.
fn has_statements(sql: &str) -> bool {
    sql.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with("--"))
        .any(|line| line.chars().any(|c| !c.is_whitespace() && c != ';'))
}

/// Immutable, order-preserving list of migrations.
///
/// Registration order is execution order for `up`; `down` walks it in
/// reverse. Identifiers are unique.
#[derive(Debug, Default)]
pub struct MigrationList {
    items: Vec<Migration>,
}

impl MigrationList {
    /// Build a list, rejecting duplicate identifiers.
    pub fn new(items: Vec<Migration>) -> MigrateResult<Self> {
        let mut seen = HashSet::with_capacity(items.len());
        for m in &items {
            if !seen.insert(m.id()) {
                return Err(MigrateError::DuplicateMigration { id: m.id().clone() });
            }
        }
        if items.windows(2).any(|w| w[0].id() > w[1].id()) {
            log::warn!("Migrations are not registered in ascending id order; down will follow registration order");
        }
        Ok(Self { items })
    }

    /// Build a list from migration files discovered on disk.
    pub fn from_sources(sources: Vec<MigrationSource>) -> MigrateResult<Self> {
        Self::new(sources.into_iter().map(Migration::from).collect())
    }

    /// All migrations, in forward order.
    pub fn items(&self) -> &[Migration] {
        &self.items
    }

    /// Migration at position `index`.
    pub fn item(&self, index: usize) -> Option<&Migration> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Migration> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Identifiers in forward order.
    pub fn ids(&self) -> Vec<&MigrationId> {
        self.items.iter().map(Migration::id).collect()
    }

    /// Look up a migration by id.
    pub fn get(&self, id: &str) -> Option<&Migration> {
        self.items.iter().find(|m| m.id().as_str() == id)
    }
}

impl<'a> IntoIterator for &'a MigrationList {
    type Item = &'a Migration;
    type IntoIter = std::slice::Iter<'a, Migration>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
