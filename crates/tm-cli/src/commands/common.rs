//! Shared project loading and prompting for CLI commands.

use anyhow::{Context, Result};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tm_core::{discover_migrations, Config};
use tm_runner::{MigrationList, Runner, RunnerOptions, Store};

use crate::cli::GlobalArgs;

/// A project directory and its resolved configuration.
pub(crate) struct Project {
    pub root: PathBuf,
    pub config: Config,
    database_override: Option<String>,
}

/// Load the project named by the global arguments.
///
/// An explicit `--config` must exist; otherwise a missing `tidemark.yml`
/// falls back to defaults.
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    let root = PathBuf::from(&global.project_dir);
    let config = match &global.config {
        Some(path) => Config::load(Path::new(path))
            .with_context(|| format!("Failed to load config from {path}"))?,
        None => Config::load_or_default(&root)
            .with_context(|| format!("Failed to load config in {}", root.display()))?,
    };
    Ok(Project {
        root,
        config,
        database_override: global.database.clone(),
    })
}

impl Project {
    /// Directory holding the migration files.
    pub fn migrations_dir(&self) -> PathBuf {
        self.config.migrations_dir_absolute(&self.root)
    }

    /// Database location, honouring `--database`.
    pub fn database_location(&self) -> String {
        match &self.database_override {
            Some(location) => location.clone(),
            None => self.config.database_path_absolute(&self.root),
        }
    }

    /// Open the database, creating its parent directory if needed.
    pub fn open_store(&self) -> Result<Store> {
        let location = self.database_location();
        if location != ":memory:" {
            if let Some(parent) = Path::new(&location).parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create directory: {}", parent.display())
                    })?;
                }
            }
        }
        log::debug!("Opening database {location}");
        Store::new(&location).with_context(|| format!("Failed to open database {location}"))
    }

    /// Every migration in the migrations directory, in id order.
    pub fn migration_list(&self) -> Result<MigrationList> {
        let dir = self.migrations_dir();
        let sources = discover_migrations(&dir)
            .with_context(|| format!("Failed to load migrations from {}", dir.display()))?;
        Ok(MigrationList::from_sources(sources)?)
    }

    /// Build a runner over `store` with this project's migrations.
    pub fn runner<'a>(&self, store: &'a Store) -> Result<Runner<'a>> {
        let runner = Runner::with_options(
            store,
            self.migration_list()?,
            RunnerOptions::from(&self.config),
        )?;
        Ok(runner)
    }
}

/// Ask a yes/no question, defaulting to "no".
///
/// `assume_yes` answers without prompting. Without it, a non-interactive
/// stdin is an error rather than a silent "no".
pub(crate) fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        anyhow::bail!("Cannot ask for confirmation on a non-interactive terminal; pass --yes");
    }
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .context("confirmation cancelled")
}
