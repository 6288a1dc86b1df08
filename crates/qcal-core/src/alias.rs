//! Persisted mapping from calendar aliases to calendar IDs.
//!
//! The alias file is a flat JSON object (`{"workout": "abc@group.calendar.
//! google.com"}`). Keys are normalized to lowercase when inserted so the
//! file can never accumulate duplicates differing only by case.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;

/// Errors from loading or saving the alias file.
#[derive(Debug, Error)]
pub enum AliasStoreError {
    /// The alias file exists but is not a flat JSON object of strings.
    #[error("invalid alias file {path}: {reason}")]
    Format { path: PathBuf, reason: String },

    /// Reading or writing the alias file failed.
    #[error("alias file {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Insertion-ordered mapping from alias name to calendar ID.
///
/// Keys are lowercased on insert; inserting an existing alias overwrites
/// its calendar ID without changing its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasMap {
    entries: Vec<(String, String)>,
}

impl AliasMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites an alias. The name is lowercased.
    pub fn insert(&mut self, alias: impl Into<String>, calendar_id: impl Into<String>) {
        let alias = alias.into().to_lowercase();
        let calendar_id = calendar_id.into();
        if let Some(entry) = self.entries.iter_mut().find(|(name, _)| *name == alias) {
            entry.1 = calendar_id;
        } else {
            self.entries.push((alias, calendar_id));
        }
    }

    /// Looks up a calendar ID. The lookup is case-insensitive.
    pub fn get(&self, alias: &str) -> Option<&str> {
        let alias = alias.to_lowercase();
        self.entries
            .iter()
            .find(|(name, _)| *name == alias)
            .map(|(_, id)| id.as_str())
    }

    /// Removes an alias, returning its calendar ID if it was present.
    pub fn remove(&mut self, alias: &str) -> Option<String> {
        let alias = alias.to_lowercase();
        let index = self.entries.iter().position(|(name, _)| *name == alias)?;
        Some(self.entries.remove(index).1)
    }

    /// Alias names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// `(alias, calendar_id)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, id)| (name.as_str(), id.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<A: Into<String>, C: Into<String>> FromIterator<(A, C)> for AliasMap {
    fn from_iter<I: IntoIterator<Item = (A, C)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (alias, calendar_id) in iter {
            map.insert(alias, calendar_id);
        }
        map
    }
}

/// File-backed store for the alias mapping.
#[derive(Debug, Clone)]
pub struct AliasStore {
    path: PathBuf,
}

impl AliasStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted mapping. A missing file is an empty mapping,
    /// not an error.
    pub fn load(&self) -> Result<AliasMap, AliasStoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(AliasMap::new()),
            Err(err) => {
                return Err(AliasStoreError::Storage {
                    path: self.path.clone(),
                    source: err,
                });
            }
        };

        let object: Map<String, Value> =
            serde_json::from_str(&raw).map_err(|err| AliasStoreError::Format {
                path: self.path.clone(),
                reason: err.to_string(),
            })?;

        let mut aliases = AliasMap::new();
        for (alias, value) in object {
            let Value::String(calendar_id) = value else {
                return Err(AliasStoreError::Format {
                    path: self.path.clone(),
                    reason: format!("value for alias '{alias}' is not a string"),
                });
            };
            aliases.insert(alias, calendar_id);
        }

        tracing::debug!(count = aliases.len(), path = %self.path.display(), "loaded aliases");
        Ok(aliases)
    }

    /// Writes the full mapping, replacing prior contents.
    ///
    /// The data goes to a temporary file first and is renamed into place,
    /// so a concurrent `load` never observes a partial write.
    pub fn save(&self, aliases: &AliasMap) -> Result<(), AliasStoreError> {
        let storage_err = |source| AliasStoreError::Storage {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(storage_err)?;
        }

        let object: Map<String, Value> = aliases
            .iter()
            .map(|(alias, id)| (alias.to_string(), Value::String(id.to_string())))
            .collect();
        let mut raw = serde_json::to_string_pretty(&object).map_err(|err| {
            AliasStoreError::Format {
                path: self.path.clone(),
                reason: err.to_string(),
            }
        })?;
        raw.push('\n');

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw).map_err(storage_err)?;
        fs::rename(&tmp, &self.path).map_err(storage_err)?;

        tracing::debug!(count = aliases.len(), path = %self.path.display(), "saved aliases");
        Ok(())
    }
}
