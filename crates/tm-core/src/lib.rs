//! tm-core - Core library for Tidemark
//!
//! This crate provides the migration identifier type, project configuration
//! parsing, discovery of SQL migration files on disk, and the naming helpers
//! used when scaffolding new migrations.

pub mod config;
pub mod error;
pub mod migration_id;
pub mod scaffold;
pub mod source;

pub use config::{Config, DatabaseConfig};
pub use error::{CoreError, CoreResult};
pub use migration_id::MigrationId;
pub use scaffold::{migration_id_for, snake_case};
pub use source::{discover_migrations, MigrationSource};
