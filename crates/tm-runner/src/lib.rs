//! Migration runner for Tidemark.
//!
//! Applies and reverts an ordered list of migrations against a DuckDB store.
//! A ledger table records which migrations have been applied, and every
//! `up`/`down` call runs as a single all-or-nothing transaction.

pub mod connection;
pub mod error;
pub mod ledger;
pub mod migration;
pub mod runner;

pub use connection::Store;
pub use error::{MigrateError, MigrateResult};
pub use ledger::{Ledger, LedgerEntry};
pub use migration::{Direction, Migration, MigrationList, UnitError, UnitResult};
pub use runner::{MigrationStatus, Runner, RunnerOptions, StatusReport};
pub use tm_core::MigrationId;
