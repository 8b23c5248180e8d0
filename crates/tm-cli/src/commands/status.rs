//! Status command implementation

use anyhow::{Context, Result};
use tm_runner::StatusReport;

use crate::cli::{GlobalArgs, StatusArgs, StatusOutput};
use crate::commands::common::load_project;

/// Execute the status command
pub(crate) fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let store = project.open_store()?;
    let runner = project.runner(&store)?;
    let report = runner.status().context("Failed to read migration status")?;

    match args.output {
        StatusOutput::Json => {
            let json = serde_json::to_string_pretty(&report)?;
            println!("{json}");
        }
        StatusOutput::Table => print!("{}", format_table(&report)),
    }
    Ok(())
}

/// Render the report as aligned text rows.
fn format_table(report: &StatusReport) -> String {
    let mut out = String::new();
    if report.migrations.is_empty() && report.orphans.is_empty() {
        out.push_str("No migrations found.\n");
        return out;
    }

    for m in &report.migrations {
        let state = if m.applied { "applied" } else { "pending" };
        let when = m
            .applied_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        out.push_str(&format!("{state:<8} {when:<19} {}\n", m.id));
    }
    for orphan in &report.orphans {
        let when = orphan
            .applied_at()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        out.push_str(&format!(
            "{:<8} {when:<19} {} (no matching migration file)\n",
            "missing", orphan.file
        ));
    }

    out.push_str(&format!(
        "\n{} applied, {} pending\n",
        report.applied_count(),
        report.pending_count()
    ));
    out
}

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;
