use super::*;
use chrono::{TimeZone, Utc};
use tm_runner::{LedgerEntry, MigrationId, MigrationStatus};

#[test]
fn test_format_table_empty() {
    let report = StatusReport {
        migrations: Vec::new(),
        orphans: Vec::new(),
    };
    assert_eq!(format_table(&report), "No migrations found.\n");
}

#[test]
fn test_format_table_rows() {
    let report = StatusReport {
        migrations: vec![
            MigrationStatus {
                id: MigrationId::new("1700000000_a"),
                applied: true,
                applied_at: Utc.timestamp_opt(1_700_000_000, 0).single(),
            },
            MigrationStatus {
                id: MigrationId::new("1700000100_b"),
                applied: false,
                applied_at: None,
            },
        ],
        orphans: vec![LedgerEntry {
            file: "1600000000_gone".to_string(),
            applied: 1_600_000_000,
        }],
    };

    let table = format_table(&report);
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines[0], "applied  2023-11-14 22:13:20 1700000000_a");
    assert_eq!(lines[1], format!("pending  {:<19} 1700000100_b", ""));
    assert!(lines[2].starts_with("missing "));
    assert!(lines[2].ends_with("1600000000_gone (no matching migration file)"));
    assert_eq!(lines[4], "1 applied, 1 pending");
}
