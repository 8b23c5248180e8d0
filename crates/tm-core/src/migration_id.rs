//! Strongly-typed migration identifier.

use crate::error::{CoreError, CoreResult};
use serde::Serialize;
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

/// Maximum identifier length, bounded by the ledger's `VARCHAR(255)` key.
pub const MAX_ID_LEN: usize = 255;

/// Identifier of a single migration unit, e.g. `1700000000_create_users`.
///
/// Identifiers are the ledger's primary key, so they must be non-empty and
/// fit in the `file` column. The conventional shape is
/// `<unix-timestamp>_<slug>`, which keeps lexical order chronological, but
/// any non-empty string is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MigrationId(String);

impl<'de> serde::Deserialize<'de> for MigrationId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        MigrationId::parse(s).map_err(serde::de::Error::custom)
    }
}

impl MigrationId {
    /// Create a new `MigrationId`, panicking if the id is invalid.
    ///
    /// Prefer [`parse`](Self::parse) when handling untrusted input.
    pub fn new(id: impl Into<String>) -> Self {
        match Self::parse(id) {
            Ok(id) => id,
            Err(e) => panic!("{e}"),
        }
    }

    /// Validate and wrap a migration identifier.
    pub fn parse(id: impl Into<String>) -> CoreResult<Self> {
        let s = id.into();
        let reason = if s.is_empty() {
            Some("must not be empty".to_string())
        } else if s.len() > MAX_ID_LEN {
            Some(format!("longer than {MAX_ID_LEN} bytes"))
        } else if s.chars().any(char::is_whitespace) {
            Some("must not contain whitespace".to_string())
        } else {
            None
        };
        match reason {
            Some(reason) => Err(CoreError::InvalidMigrationId { id: s, reason }),
            None => Ok(Self(s)),
        }
    }

    /// Leading unix timestamp, if the id follows the `<ts>_<slug>` shape.
    pub fn timestamp(&self) -> Option<i64> {
        let (prefix, _) = self.0.split_once('_')?;
        prefix.parse().ok()
    }

    /// Portion after the timestamp prefix, or the whole id if there is none.
    pub fn slug(&self) -> &str {
        match self.0.split_once('_') {
            Some((prefix, rest)) if prefix.parse::<i64>().is_ok() => rest,
            _ => &self.0,
        }
    }

    /// Return the underlying id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for MigrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MigrationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for MigrationId {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for MigrationId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MigrationId {
    type Error = CoreError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for MigrationId {
    type Error = CoreError;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl PartialEq<str> for MigrationId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for MigrationId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<String> for MigrationId {
    fn eq(&self, other: &String) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
#[path = "migration_id_test.rs"]
mod tests;
