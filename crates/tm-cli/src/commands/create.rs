//! Create command implementation - scaffolds a new pair of migration files

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use minijinja::{context, Environment};
use std::fs;
use std::path::PathBuf;
use tm_core::scaffold::{down_file_name, up_file_name};
use tm_core::{migration_id_for, MigrationId};

use crate::cli::{CreateArgs, GlobalArgs};
use crate::commands::common::{confirm, load_project};

const UP_TEMPLATE: &str = "\
-- Migration: {{ id }}
-- Created at: {{ created_at }}
--
-- Forward changes for \"{{ name }}\". Runs inside the batch transaction.
";

const DOWN_TEMPLATE: &str = "\
-- Migration: {{ id }}
-- Created at: {{ created_at }}
--
-- Reverts \"{{ name }}\". Leave empty if the change cannot be undone.
";

/// Execute the create command
pub(crate) fn execute(args: &CreateArgs, global: &GlobalArgs) -> Result<()> {
    let now = Utc::now();
    let id = migration_id_for(&args.name, now)?;

    let dir = match &args.dir {
        Some(dir) => PathBuf::from(dir),
        None => load_project(global)?.migrations_dir(),
    };
    let up_path = dir.join(up_file_name(&id));
    let down_path = dir.join(down_file_name(&id));

    for path in [&up_path, &down_path] {
        if path.exists() {
            anyhow::bail!("Migration file {} already exists", path.display());
        }
    }

    let prompt = format!("Do you really want to create migration {:?}?", up_path.display().to_string());
    if !confirm(&prompt, args.yes)? {
        println!("The command has been cancelled");
        return Ok(());
    }

    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let (up_sql, down_sql) = render_templates(&id, &args.name, now)?;
    for (path, content) in [(&up_path, up_sql), (&down_path, down_sql)] {
        fs::write(path, content)
            .with_context(|| format!("Failed to save migration file {}", path.display()))?;
        println!("Successfully created file {}", path.display());
    }
    Ok(())
}

/// Render the up and down file contents for a new migration.
fn render_templates(id: &MigrationId, name: &str, now: DateTime<Utc>) -> Result<(String, String)> {
    let env = Environment::new();
    let ctx = context! {
        id => id.as_str(),
        name => name,
        created_at => now.to_rfc3339(),
    };
    let up = env
        .render_str(UP_TEMPLATE, &ctx)
        .context("Failed to render up template")?;
    let down = env
        .render_str(DOWN_TEMPLATE, &ctx)
        .context("Failed to render down template")?;
    Ok((up, down))
}

#[cfg(test)]
#[path = "create_test.rs"]
mod tests;
