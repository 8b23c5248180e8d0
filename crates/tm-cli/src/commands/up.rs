//! Up command implementation

use anyhow::{Context, Result};

use crate::cli::GlobalArgs;
use crate::commands::common::load_project;

/// Execute the up command
pub(crate) fn execute(global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let store = project.open_store()?;
    let runner = project.runner(&store)?;

    let applied = runner.up().context("Migration up failed")?;

    if applied.is_empty() {
        println!("No new migrations to apply.");
    } else {
        for id in &applied {
            println!("Applied {id}");
        }
    }
    Ok(())
}
