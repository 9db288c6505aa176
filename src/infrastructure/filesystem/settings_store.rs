use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::common::error::DgitError;
use crate::common::result::{DgitResult, ResultExt};

/// Persistent key/value store
///
/// Its total size is what the storage quota is computed from.
pub trait KeyValueStore: Send + Sync {
    /// Every stored entry
    fn entries(&self) -> DgitResult<Vec<(String, String)>>;

    fn get(&self, key: &str) -> DgitResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> DgitResult<()>;
}

/// KeyValueStore backed by a JSON object file
///
/// The file is re-read on every call; the last writer wins.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> DgitResult<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let content = fs::read_to_string(&self.path).with_filesystem_error(
            "Failed to read settings file",
            Some(self.path.clone()),
        )?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content)? {
            Value::Object(map) => Ok(map),
            _ => Err(DgitError::config_error(format!(
                "Settings file {} does not contain a JSON object",
                self.path.display()
            ))),
        }
    }

    fn store(&self, map: &Map<String, Value>) -> DgitResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_filesystem_error(
                "Failed to create settings directory",
                Some(parent.to_path_buf()),
            )?;
        }

        let content = serde_json::to_string_pretty(map)?;
        fs::write(&self.path, content)
            .with_filesystem_error("Failed to write settings file", Some(self.path.clone()))
    }
}

fn value_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

impl KeyValueStore for JsonSettingsStore {
    fn entries(&self) -> DgitResult<Vec<(String, String)>> {
        Ok(self
            .load()?
            .into_iter()
            .map(|(key, value)| (key, value_to_string(value)))
            .collect())
    }

    fn get(&self, key: &str) -> DgitResult<Option<String>> {
        Ok(self.load()?.remove(key).map(value_to_string))
    }

    fn set(&self, key: &str, value: &str) -> DgitResult<()> {
        let mut map = self.load()?;
        map.insert(key.to_string(), Value::String(value.to_string()));
        self.store(&map)
    }
}
