use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StudioError;

/// Everything captured from the device right after an action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceArtifacts {
    #[serde(default)]
    pub session_details: Value,
    #[serde(default)]
    pub screenshot_base64: String,
    #[serde(default)]
    pub page_source: String,
    #[serde(default)]
    pub current_context: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingEntry {
    /// Milliseconds since the Unix epoch
    pub action_time: i64,
    /// The user action that preceded the capture (driver command shape)
    #[serde(default)]
    pub action: Value,
    pub device_artifacts: DeviceArtifacts,
    /// Set by recorders that flag redundant entries instead of dropping them.
    /// Read for compatibility; condensing here always drops.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_condensed: Option<bool>,
}

/// Load a recording: a JSON array of entries.
pub fn load_recording(path: &Path) -> Result<Vec<RecordingEntry>, StudioError> {
    let content = std::fs::read_to_string(path).map_err(|e| StudioError::io(path, e))?;
    let entries: Vec<RecordingEntry> = serde_json::from_str(&content)
        .map_err(|e| StudioError::parse(format!("recording {}", path.display()), e))?;

    tracing::info!(path = %path.display(), entries = entries.len(), "loaded recording");
    Ok(entries)
}

pub fn save_recording(path: &Path, entries: &[RecordingEntry]) -> Result<(), StudioError> {
    let json = serde_json::to_string_pretty(entries)
        .map_err(|e| StudioError::serialize("recording", e))?;
    std::fs::write(path, json).map_err(|e| StudioError::io(path, e))
}
