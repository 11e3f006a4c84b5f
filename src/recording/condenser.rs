use serde::{Deserialize, Serialize};

use crate::recording::recording_model::RecordingEntry;

/// Byte length of the slices compared by the fuzzy screenshot check.
pub const SCREENSHOT_CHUNK_SIZE: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CondenseOptions {
    #[serde(default = "default_true")]
    pub check_xml: bool,
    #[serde(default = "default_true")]
    pub check_screenshot: bool,
    /// 1.0 = screenshots must be byte-identical to count as unchanged
    #[serde(default = "default_threshold")]
    pub screenshot_threshold: f64,
}

impl Default for CondenseOptions {
    fn default() -> Self {
        Self {
            check_xml: true,
            check_screenshot: true,
            screenshot_threshold: 1.0,
        }
    }
}

impl CondenseOptions {
    /// Threshold actually applied. NaN and values outside `0.0..=1.0` fall
    /// back to exact comparison.
    pub fn effective_threshold(&self) -> f64 {
        if (0.0..=1.0).contains(&self.screenshot_threshold) {
            self.screenshot_threshold
        } else {
            1.0
        }
    }
}

fn default_true() -> bool { true }
fn default_threshold() -> f64 { 1.0 }

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CondenseStats {
    pub initial_state_count: usize,
    pub final_state_count: usize,
    pub removed_state_count: usize,
    /// Kept entries whose page source differed from the previous kept entry
    pub xml_changed_count: usize,
    /// Kept entries whose screenshot differed from the previous kept entry
    pub screenshot_changed_count: usize,
    /// Entries dropped because nothing checked had changed
    pub unchanged_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CondenseResult {
    pub entries: Vec<RecordingEntry>,
    pub stats: CondenseStats,
}

/// Coarse screenshot comparison.
///
/// At a threshold of 1.0 or more (or one that is negative or NaN) this is
/// plain equality. Below it, a relative length difference larger than
/// `1 - threshold` counts as a change outright; otherwise both strings are
/// cut into fixed-size chunks and compared pairwise, and the screenshot
/// changed when the fraction of identical chunks (over the longer input)
/// falls under the threshold.
pub fn screenshot_changed(before: &str, after: &str, threshold: f64) -> bool {
    if !(0.0..1.0).contains(&threshold) {
        return before != after;
    }
    if before == after {
        return false;
    }

    let (a, b) = (before.as_bytes(), after.as_bytes());
    let longer = a.len().max(b.len());

    let length_difference = a.len().abs_diff(b.len()) as f64 / longer as f64;
    if length_difference > 1.0 - threshold {
        return true;
    }

    let total_chunks = longer.div_ceil(SCREENSHOT_CHUNK_SIZE);
    let identical = a
        .chunks(SCREENSHOT_CHUNK_SIZE)
        .zip(b.chunks(SCREENSHOT_CHUNK_SIZE))
        .filter(|(x, y)| x == y)
        .count();

    (identical as f64 / total_chunks as f64) < threshold
}

/// What changed between a baseline entry and a candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeVerdict {
    pub xml_changed: bool,
    pub screenshot_changed: bool,
}

impl ChangeVerdict {
    pub fn any(&self) -> bool {
        self.xml_changed || self.screenshot_changed
    }
}

/// Compare a candidate entry with the baseline under the enabled checks.
pub fn compare_entries(
    baseline: &RecordingEntry,
    candidate: &RecordingEntry,
    options: &CondenseOptions,
) -> ChangeVerdict {
    let before = &baseline.device_artifacts;
    let after = &candidate.device_artifacts;

    ChangeVerdict {
        xml_changed: options.check_xml && before.page_source != after.page_source,
        screenshot_changed: options.check_screenshot
            && screenshot_changed(
                &before.screenshot_base64,
                &after.screenshot_base64,
                options.effective_threshold(),
            ),
    }
}

/// Drop recording entries that show no observable change.
///
/// The first entry is always kept. Every later entry is compared with the
/// last entry that was kept, not its immediate predecessor.
pub fn condense_recording(entries: &[RecordingEntry], options: &CondenseOptions) -> CondenseResult {
    if !(0.0..=1.0).contains(&options.screenshot_threshold) {
        tracing::warn!(
            threshold = options.screenshot_threshold,
            "screenshot threshold outside 0..=1, comparing screenshots exactly"
        );
    }

    let mut stats = CondenseStats {
        initial_state_count: entries.len(),
        ..Default::default()
    };
    let mut kept: Vec<RecordingEntry> = Vec::with_capacity(entries.len());

    for entry in entries {
        let Some(baseline) = kept.last() else {
            kept.push(entry.clone());
            continue;
        };

        let verdict = compare_entries(baseline, entry, options);
        if verdict.xml_changed {
            stats.xml_changed_count += 1;
        }
        if verdict.screenshot_changed {
            stats.screenshot_changed_count += 1;
        }

        if verdict.any() {
            kept.push(entry.clone());
        } else {
            stats.unchanged_count += 1;
        }
    }

    for entry in &mut kept {
        entry.is_condensed = None;
    }

    stats.final_state_count = kept.len();
    stats.removed_state_count = stats.initial_state_count - stats.final_state_count;

    tracing::info!(
        initial = stats.initial_state_count,
        removed = stats.removed_state_count,
        xml_changed = stats.xml_changed_count,
        screenshot_changed = stats.screenshot_changed_count,
        "condensed recording"
    );

    CondenseResult {
        entries: kept,
        stats,
    }
}
