use std::path::Path;

use crate::error::StudioError;
use crate::locator::validation::{locator_source, parse_locators, validate_locators};
use crate::project::project_model::Platform;
use crate::project::settings::SettingsStore;
use crate::project::store::ProjectSession;
use crate::recording::condenser::{CondenseOptions, condense_recording};
use crate::recording::recording_model::{load_recording, save_recording};
use crate::report::console::{
    format_condense_summary, format_locator_report, format_page_tree, format_rendering,
    format_xpath_result,
};
use crate::tree::tree_builder::build_page_tree;
use crate::xpath::evaluator::XPathVersion;
use crate::xpath::highlighter::XPathHighlighter;

// ============================================================================
// tree subcommand
// ============================================================================

pub fn cmd_tree(
    project_path: &str,
    search: &str,
    settings_path: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    let session = open_project(project_path, settings_path)?;
    let tree = build_page_tree(&session.project.pages, search);
    Ok(format_page_tree(&tree))
}

// ============================================================================
// xpath subcommand
// ============================================================================

pub fn cmd_xpath(
    source_path: &str,
    query: &str,
    version: &str,
    json: bool,
    expand_all: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    let xml = std::fs::read_to_string(source_path).map_err(|e| StudioError::io(source_path, e))?;
    let version = XPathVersion::parse(version).unwrap_or_else(|| {
        tracing::warn!(version, "unknown XPath version, using 1.0");
        XPathVersion::V1
    });

    let mut highlighter = XPathHighlighter::new(&xml, query, version)?;

    if json {
        return Ok(serde_json::to_string_pretty(highlighter.result())?);
    }

    if expand_all {
        highlighter.expand_all();
    }

    let mut out = format_xpath_result(highlighter.result());
    out.push('\n');
    out.push_str(&format_rendering(&highlighter.render()));
    Ok(out)
}

// ============================================================================
// condense subcommand
// ============================================================================

pub fn cmd_condense(
    recording_path: &str,
    output: Option<&str>,
    options: &CondenseOptions,
    verbose: u8,
) -> Result<String, Box<dyn std::error::Error>> {
    let entries = load_recording(Path::new(recording_path))?;
    let result = condense_recording(&entries, options);

    if let Some(path) = output {
        save_recording(Path::new(path), &result.entries)?;
        if verbose > 0 {
            eprintln!("  Wrote: {}", path);
        }
    }

    Ok(format_condense_summary(&result.stats))
}

// ============================================================================
// validate subcommand
// ============================================================================

#[allow(clippy::too_many_arguments)]
pub fn cmd_validate(
    project_path: &str,
    page_id: &str,
    state_id: Option<&str>,
    platform: &str,
    locators_path: &str,
    promote: bool,
    output: Option<&str>,
    settings_path: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    let platform = Platform::parse(platform)
        .ok_or_else(|| StudioError::Validation(format!("unknown platform '{}'", platform)))?;

    let session = open_project(project_path, settings_path)?;
    let page = session
        .project
        .page(page_id)
        .ok_or_else(|| StudioError::PageNotFound(page_id.to_string()))?;
    let source = locator_source(page, state_id, platform)?;

    let blob =
        std::fs::read_to_string(locators_path).map_err(|e| StudioError::io(locators_path, e))?;
    let mut locators = parse_locators(&blob)?;
    let summary = validate_locators(&mut locators, source, promote);

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&locators)
            .map_err(|e| StudioError::serialize("locators", e))?;
        std::fs::write(path, json).map_err(|e| StudioError::io(path, e))?;
    }

    Ok(format_locator_report(&locators, &summary))
}

// ============================================================================
// recent subcommand
// ============================================================================

pub fn cmd_recent(settings_path: &str) -> Result<String, Box<dyn std::error::Error>> {
    let settings = SettingsStore::load(Path::new(settings_path))?;
    let recent = settings.recent_projects();

    if recent.is_empty() {
        return Ok("No recent projects\n".to_string());
    }

    Ok(recent
        .iter()
        .enumerate()
        .map(|(i, path)| format!("{:>2}. {}\n", i + 1, path))
        .collect())
}

// ============================================================================
// Helpers
// ============================================================================

/// Open a project and remember it in the local settings. Failing to update
/// settings is logged, not fatal.
fn open_project(
    project_path: &str,
    settings_path: &str,
) -> Result<ProjectSession, Box<dyn std::error::Error>> {
    let session = ProjectSession::open(Path::new(project_path))?;

    if let Err(e) = remember_project(project_path, settings_path) {
        tracing::warn!(error = %e, "could not update recent projects");
    }

    Ok(session)
}

fn remember_project(project_path: &str, settings_path: &str) -> Result<(), StudioError> {
    let mut settings = SettingsStore::load(Path::new(settings_path))?;
    settings.push_recent_project(project_path);

    if let Some(name) = Path::new(project_path).file_name().and_then(|n| n.to_str()) {
        settings.set_last_file_name(name);
    }
    settings.save()
}
