use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::StudioError;

pub const RECENT_PROJECTS_KEY: &str = "recentProjects";
pub const LAST_FILE_NAME_KEY: &str = "lastFileName";
pub const MAX_RECENT_PROJECTS: usize = 10;

/// Flat key/value settings persisted as one JSON object.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    values: BTreeMap<String, Value>,
}

impl SettingsStore {
    /// Load settings from `path`. A missing file is an empty store.
    pub fn load(path: &Path) -> Result<Self, StudioError> {
        let values = match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| StudioError::parse(format!("settings {}", path.display()), e))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(StudioError::io(path, e)),
        };

        Ok(Self {
            path: path.to_path_buf(),
            values,
        })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    pub fn save(&self) -> Result<(), StudioError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StudioError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(&self.values)
            .map_err(|e| StudioError::serialize("settings", e))?;
        std::fs::write(&self.path, json).map_err(|e| StudioError::io(&self.path, e))
    }

    /// Recently opened project paths, most recent first.
    pub fn recent_projects(&self) -> Vec<String> {
        self.get(RECENT_PROJECTS_KEY)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Move `path` to the front of the recent list, dropping duplicates and
    /// anything past the cap.
    pub fn push_recent_project(&mut self, path: &str) {
        let mut recent = self.recent_projects();
        recent.retain(|p| p != path);
        recent.insert(0, path.to_string());
        recent.truncate(MAX_RECENT_PROJECTS);

        self.set(
            RECENT_PROJECTS_KEY,
            Value::Array(recent.into_iter().map(Value::String).collect()),
        );
    }

    pub fn last_file_name(&self) -> Option<&str> {
        self.get(LAST_FILE_NAME_KEY).and_then(Value::as_str)
    }

    pub fn set_last_file_name(&mut self, name: &str) {
        self.set(LAST_FILE_NAME_KEY, Value::String(name.to_string()));
    }
}
