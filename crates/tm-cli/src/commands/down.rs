//! Down command implementation

use anyhow::{Context, Result};

use crate::cli::{DownArgs, GlobalArgs};
use crate::commands::common::{confirm, load_project};

/// Execute the down command
pub(crate) fn execute(args: &DownArgs, global: &GlobalArgs) -> Result<()> {
    let revert_all = args.all || args.count < 0;
    if !revert_all && args.count == 0 {
        println!("No migrations to revert.");
        return Ok(());
    }

    let project = load_project(global)?;
    let store = project.open_store()?;
    let runner = project.runner(&store)?;

    let prompt = if revert_all {
        "Do you really want to revert all applied migrations?".to_string()
    } else {
        format!(
            "Do you really want to revert the last {} applied migration(s)?",
            args.count
        )
    };
    if !confirm(&prompt, args.yes)? {
        println!("The command has been cancelled");
        return Ok(());
    }

    let limit = if revert_all { -1 } else { args.count };
    let reverted = runner.down(limit).context("Migration down failed")?;

    if reverted.is_empty() {
        println!("No migrations to revert.");
    } else {
        for id in &reverted {
            println!("Reverted {id}");
        }
    }
    Ok(())
}
