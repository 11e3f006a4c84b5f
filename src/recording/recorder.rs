use serde_json::Value;

use crate::device::capture::capture_artifacts;
use crate::device::driver::DeviceDriver;
use crate::error::StudioError;
use crate::recording::condenser::{CondenseOptions, CondenseResult, condense_recording};
use crate::recording::recording_model::RecordingEntry;

/// Accumulates device snapshots taken after each user action.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    entries: Vec<RecordingEntry>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the device after `action` and append the entry, stamped now.
    pub fn record(
        &mut self,
        driver: &mut dyn DeviceDriver,
        action: Value,
    ) -> Result<&RecordingEntry, StudioError> {
        let now = chrono::Utc::now().timestamp_millis();
        self.record_at(driver, action, now)
    }

    /// Capture and append with an explicit timestamp. Entries stay ordered:
    /// a time earlier than the last entry is raised to it.
    pub fn record_at(
        &mut self,
        driver: &mut dyn DeviceDriver,
        action: Value,
        action_time: i64,
    ) -> Result<&RecordingEntry, StudioError> {
        let device_artifacts = capture_artifacts(driver)?;
        let action_time = self
            .entries
            .last()
            .map_or(action_time, |last| action_time.max(last.action_time));

        self.entries.push(RecordingEntry {
            action_time,
            action,
            device_artifacts,
            is_condensed: None,
        });
        tracing::debug!(count = self.entries.len(), action_time, "recorded entry");

        Ok(&self.entries[self.entries.len() - 1])
    }

    pub fn entries(&self) -> &[RecordingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Stop recording and condense what was captured.
    pub fn finish(self, options: &CondenseOptions) -> CondenseResult {
        condense_recording(&self.entries, options)
    }
}
