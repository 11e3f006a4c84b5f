use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::StudioError;
use crate::project::project_model::Project;

// ============================================================================
// Project file I/O
// ============================================================================

/// Load a project file. The `version` field is not checked.
///
/// A page with several default states keeps only the first as default.
/// Duplicate page ids are logged and left in place.
pub fn load_project(path: &Path) -> Result<Project, StudioError> {
    let content = std::fs::read_to_string(path).map_err(|e| StudioError::io(path, e))?;
    let mut project: Project = serde_json::from_str(&content)
        .map_err(|e| StudioError::parse(format!("project {}", path.display()), e))?;
    normalize_loaded(&mut project);

    tracing::info!(path = %path.display(), pages = project.pages.len(), "loaded project");
    Ok(project)
}

fn normalize_loaded(project: &mut Project) {
    let mut seen = HashSet::new();
    for page in &mut project.pages {
        if !seen.insert(page.id.clone()) {
            tracing::warn!(page_id = %page.id, "duplicate page id in project file");
        }

        let mut found_default = false;
        for state in &mut page.states {
            if !state.is_default {
                continue;
            }
            if found_default {
                tracing::warn!(
                    page_id = %page.id,
                    state_id = %state.id,
                    "page has more than one default state, clearing"
                );
                state.is_default = false;
            }
            found_default = true;
        }
    }
}

pub fn project_to_json(project: &Project) -> Result<String, StudioError> {
    serde_json::to_string_pretty(project).map_err(|e| StudioError::serialize("project", e))
}

pub fn save_project(path: &Path, project: &Project) -> Result<(), StudioError> {
    let json = project_to_json(project)?;
    std::fs::write(path, json).map_err(|e| StudioError::io(path, e))?;

    tracing::info!(path = %path.display(), pages = project.pages.len(), "saved project");
    Ok(())
}

// ============================================================================
// ProjectSession: open project plus its last-saved snapshot
// ============================================================================

/// An open project together with where it lives on disk and what was last
/// written there. Unsaved changes are detected by comparing serializations.
#[derive(Debug, Clone)]
pub struct ProjectSession {
    pub project: Project,
    path: Option<PathBuf>,
    last_saved: Option<String>,
}

impl ProjectSession {
    /// Start a new, never-saved project.
    pub fn new() -> Self {
        Self {
            project: Project::new(),
            path: None,
            last_saved: None,
        }
    }

    pub fn open(path: &Path) -> Result<Self, StudioError> {
        let project = load_project(path)?;
        let snapshot = project_to_json(&project)?;

        Ok(Self {
            project,
            path: Some(path.to_path_buf()),
            last_saved: Some(snapshot),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Save to the current path. A session that was never saved needs
    /// `save_as` first.
    pub fn save(&mut self) -> Result<(), StudioError> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| StudioError::Validation("no file chosen for this project".into()))?;
        self.save_as(&path)
    }

    pub fn save_as(&mut self, path: &Path) -> Result<(), StudioError> {
        let json = project_to_json(&self.project)?;
        std::fs::write(path, &json).map_err(|e| StudioError::io(path, e))?;

        tracing::info!(path = %path.display(), "saved project");
        self.path = Some(path.to_path_buf());
        self.last_saved = Some(json);
        Ok(())
    }

    /// True when the in-memory project differs from what was last saved.
    /// A never-saved project is dirty once it has any page.
    pub fn is_dirty(&self) -> bool {
        match &self.last_saved {
            Some(saved) => match project_to_json(&self.project) {
                Ok(current) => &current != saved,
                Err(_) => true,
            },
            None => !self.project.pages.is_empty(),
        }
    }
}

impl Default for ProjectSession {
    fn default() -> Self {
        Self::new()
    }
}
