//! Discovery of SQL migration files on disk.
//!
//! A migrations directory holds one `<id>.up.sql` per migration and an
//! optional `<id>.down.sql`. Anything else ending in `.sql` is skipped with a
//! warning so a typo never silently becomes part of the ordered list.

use crate::error::{CoreError, CoreResult};
use crate::migration_id::MigrationId;
use crate::scaffold::up_file_name;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Suffix of forward migration scripts.
pub const UP_SUFFIX: &str = ".up.sql";

/// Suffix of backward migration scripts.
pub const DOWN_SUFFIX: &str = ".down.sql";

/// SQL scripts for one migration, as read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationSource {
    /// Identifier taken from the file name.
    pub id: MigrationId,
    /// Contents of `<id>.up.sql`.
    pub up_sql: String,
    /// Contents of `<id>.down.sql`, if present.
    pub down_sql: Option<String>,
}

/// Load every migration in `dir`, sorted by id.
///
/// A missing directory yields an empty list. A down script without a
/// matching up script is an error.
pub fn discover_migrations(dir: &Path) -> CoreResult<Vec<MigrationSource>> {
    if !dir.is_dir() {
        log::debug!("Migrations directory {} not found", dir.display());
        return Ok(Vec::new());
    }

    let dir_str = dir.to_str().ok_or_else(|| CoreError::InvalidPattern {
        pattern: dir.display().to_string(),
        reason: "path is not valid UTF-8".to_string(),
    })?;
    let pattern = format!("{}/*.sql", glob::Pattern::escape(dir_str));
    let paths = glob::glob(&pattern).map_err(|e| CoreError::InvalidPattern {
        pattern: pattern.clone(),
        reason: e.to_string(),
    })?;

    let mut ups: BTreeMap<MigrationId, PathBuf> = BTreeMap::new();
    let mut downs: BTreeMap<MigrationId, PathBuf> = BTreeMap::new();

    for entry in paths {
        let path = entry.map_err(|e| CoreError::IoWithPath {
            path: e.path().display().to_string(),
            source: e.into_error(),
        })?;
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            log::warn!("Skipping non UTF-8 file name: {}", path.display());
            continue;
        };

        if let Some(stem) = file_name.strip_suffix(UP_SUFFIX) {
            ups.insert(MigrationId::parse(stem)?, path);
        } else if let Some(stem) = file_name.strip_suffix(DOWN_SUFFIX) {
            downs.insert(MigrationId::parse(stem)?, path);
        } else {
            log::warn!(
                "Skipping {}: migration files must end in {UP_SUFFIX} or {DOWN_SUFFIX}",
                path.display()
            );
        }
    }

    if let Some(orphan) = downs.keys().find(|id| !ups.contains_key(*id)) {
        return Err(CoreError::MigrationFileMissing {
            id: orphan.to_string(),
            expected_path: dir.join(up_file_name(orphan)).display().to_string(),
        });
    }

    let mut sources = Vec::with_capacity(ups.len());
    for (id, up_path) in ups {
        let up_sql = read_script(&up_path)?;
        let down_sql = match downs.remove(&id) {
            Some(down_path) => Some(read_script(&down_path)?),
            None => None,
        };
        sources.push(MigrationSource {
            id,
            up_sql,
            down_sql,
        });
    }

    log::debug!(
        "Discovered {} migration(s) in {}",
        sources.len(),
        dir.display()
    );
    Ok(sources)
}

fn read_script(path: &Path) -> CoreResult<String> {
    std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
