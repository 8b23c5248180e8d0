//! Error types for the migration runner.

use crate::migration::{Direction, UnitError};
use thiserror::Error;
use tm_core::MigrationId;

/// Migration runner errors.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// The ledger table could not be created; the runner is unusable (T001).
    #[error("[T001] Failed to create ledger table '{table}': {source}")]
    Bootstrap {
        table: String,
        source: duckdb::Error,
    },

    /// A migration's up or down operation failed (T002).
    #[error("[T002] Failed to {direction} migration {id}: {source}")]
    UnitExecution {
        id: MigrationId,
        direction: Direction,
        source: UnitError,
    },

    /// Recording applied/reverted state failed after the operation ran (T003).
    #[error("[T003] Failed to save {} migration info for {id}: {source}", .direction.past_tense())]
    LedgerWrite {
        id: MigrationId,
        direction: Direction,
        source: duckdb::Error,
    },

    /// Checking apply-state failed; only raised with strict ledger reads (T004).
    #[error("[T004] Failed to read ledger state for {id}: {source}")]
    LedgerRead {
        id: MigrationId,
        source: duckdb::Error,
    },

    /// BEGIN or COMMIT failed (T005).
    #[error("[T005] Migration transaction failed: {0}")]
    Transaction(String),

    /// The store could not be opened (T006).
    #[error("[T006] Database connection failed: {0}")]
    Connection(String),

    /// Two migrations were registered under one identifier (T007).
    #[error("[T007] Duplicate migration id: {id}")]
    DuplicateMigration { id: MigrationId },

    /// The ledger table name is not a plain SQL identifier (T008).
    #[error("[T008] Invalid ledger table name '{0}'")]
    InvalidTableName(String),

    /// DuckDB driver error with preserved source chain (T009).
    #[error("[T009] DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),
}

/// Result type alias for [`MigrateError`].
pub type MigrateResult<T> = Result<T, MigrateError>;
