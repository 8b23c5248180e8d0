//! Naming helpers for new migrations.

use crate::error::{CoreError, CoreResult};
use crate::migration_id::MigrationId;
use crate::source::{DOWN_SUFFIX, UP_SUFFIX};
use chrono::{DateTime, Utc};

/// Convert a free-form name into a lowercase, underscore-separated slug.
///
/// Word boundaries are non-alphanumeric characters and lower-to-upper case
/// transitions, so `"AddEmail to-users"` becomes `"add_email_to_users"`.
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;
    for c in name.chars() {
        if !c.is_alphanumeric() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            prev = None;
            continue;
        }
        if c.is_uppercase()
            && prev.is_some_and(|p| p.is_lowercase() || p.is_numeric())
            && !out.ends_with('_')
        {
            out.push('_');
        }
        out.extend(c.to_lowercase());
        prev = Some(c);
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// Build the `<unix-timestamp>_<slug>` identifier for a new migration.
pub fn migration_id_for(name: &str, now: DateTime<Utc>) -> CoreResult<MigrationId> {
    let slug = snake_case(name);
    if slug.is_empty() {
        return Err(CoreError::InvalidMigrationName {
            name: name.to_string(),
            reason: "name must contain at least one letter or digit".to_string(),
        });
    }
    MigrationId::parse(format!("{}_{}", now.timestamp(), slug))
}

/// File name of the up script for `id`.
pub fn up_file_name(id: &MigrationId) -> String {
    format!("{id}{UP_SUFFIX}")
}

/// File name of the down script for `id`.
pub fn down_file_name(id: &MigrationId) -> String {
    format!("{id}{DOWN_SUFFIX}")
}

#[cfg(test)]
#[path = "scaffold_test.rs"]
mod tests;
