use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StudioError;

pub const PROJECT_FORMAT_VERSION: &str = "1.0";

// ============================================================================
// Persisted project model (camelCase JSON, compatible with saved projects)
// ============================================================================

/// Target OS of a captured state version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
}

impl Platform {
    /// Parse a platform name such as `iOS` or `Android`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "ios" => Some(Platform::Ios),
            "android" => Some(Platform::Android),
            _ => None,
        }
    }

    /// Read the platform from driver session details.
    ///
    /// Looks at `platformName` at the top level first, then under
    /// `capabilities` (the W3C session shape).
    pub fn from_session(session: &Value) -> Option<Self> {
        session
            .get("platformName")
            .or_else(|| session.get("capabilities").and_then(|c| c.get("platformName")))
            .and_then(Value::as_str)
            .and_then(Platform::parse)
    }
}

/// One captured snapshot of a state on a single OS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateVersion {
    /// Base64-encoded PNG
    pub screen_shot: String,
    pub page_source: String,
    #[serde(default)]
    pub context_name: String,
    #[serde(default)]
    pub session_details: Value,
    pub time_stamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateVersions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ios: Option<StateVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub android: Option<StateVersion>,
}

impl StateVersions {
    pub fn get(&self, platform: Platform) -> Option<&StateVersion> {
        match platform {
            Platform::Ios => self.ios.as_ref(),
            Platform::Android => self.android.as_ref(),
        }
    }

    /// Store a version for the platform, replacing any previous capture.
    pub fn set(&mut self, platform: Platform, version: StateVersion) {
        match platform {
            Platform::Ios => self.ios = Some(version),
            Platform::Android => self.android = Some(version),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ios.is_none() && self.android.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub versions: StateVersions,
}

/// A user-defined screen being modelled for test automation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Slash-delimited grouping path, e.g. `Auth/Login`
    #[serde(default)]
    pub module: String,
    #[serde(default)]
    pub states: Vec<State>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<Value>,
}

impl Page {
    pub fn state(&self, state_id: &str) -> Option<&State> {
        self.states.iter().find(|s| s.id == state_id)
    }

    pub fn default_state(&self) -> Option<&State> {
        self.states.iter().find(|s| s.is_default)
    }

    fn state_mut(&mut self, state_id: &str) -> Result<&mut State, StudioError> {
        let page_id = self.id.clone();
        self.states
            .iter_mut()
            .find(|s| s.id == state_id)
            .ok_or_else(|| StudioError::StateNotFound {
                page: page_id,
                state: state_id.to_string(),
            })
    }
}

/// Project file root: `{version, createdAt, pages}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Form inputs
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct NewPage {
    pub name: String,
    pub description: String,
    pub module: String,
}

/// Fields to change on an existing page; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct PageEdit {
    pub name: Option<String>,
    pub description: Option<String>,
    pub module: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewState {
    pub title: String,
    pub description: String,
}

/// Normalize a module path: trim each segment and drop empty ones.
pub fn normalize_module(module: &str) -> String {
    module_segments(module).join("/")
}

pub fn module_segments(module: &str) -> Vec<&str> {
    module
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn require(field: &str, value: &str) -> Result<String, StudioError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StudioError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

// ============================================================================
// Project operations
// ============================================================================

impl Project {
    pub fn new() -> Self {
        Self {
            version: PROJECT_FORMAT_VERSION.to_string(),
            created_at: now_timestamp(),
            pages: Vec::new(),
        }
    }

    pub fn page(&self, page_id: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == page_id)
    }

    fn page_mut(&mut self, page_id: &str) -> Result<&mut Page, StudioError> {
        self.pages
            .iter_mut()
            .find(|p| p.id == page_id)
            .ok_or_else(|| StudioError::PageNotFound(page_id.to_string()))
    }

    /// Create a page with a fresh id. The name is required.
    pub fn add_page(&mut self, new_page: NewPage) -> Result<&Page, StudioError> {
        let name = require("Page name", &new_page.name)?;

        let mut id = new_id();
        while self.page(&id).is_some() {
            id = new_id();
        }

        tracing::debug!(page_id = %id, %name, "adding page");
        self.pages.push(Page {
            id,
            name,
            description: new_page.description.trim().to_string(),
            module: normalize_module(&new_page.module),
            states: Vec::new(),
            ai_analysis: None,
        });

        Ok(&self.pages[self.pages.len() - 1])
    }

    pub fn update_page(&mut self, page_id: &str, edit: PageEdit) -> Result<&Page, StudioError> {
        let name = edit.name.as_deref().map(|n| require("Page name", n)).transpose()?;
        let page = self.page_mut(page_id)?;

        if let Some(name) = name {
            page.name = name;
        }
        if let Some(description) = edit.description {
            page.description = description.trim().to_string();
        }
        if let Some(module) = edit.module {
            page.module = normalize_module(&module);
        }

        Ok(&*page)
    }

    /// Remove a page and all of its states.
    pub fn delete_page(&mut self, page_id: &str) -> Result<Page, StudioError> {
        let idx = self
            .pages
            .iter()
            .position(|p| p.id == page_id)
            .ok_or_else(|| StudioError::PageNotFound(page_id.to_string()))?;

        tracing::debug!(page_id, "deleting page");
        Ok(self.pages.remove(idx))
    }

    /// Create an empty state. The first state of a page becomes its default.
    pub fn add_state(&mut self, page_id: &str, new_state: NewState) -> Result<&State, StudioError> {
        let title = require("State title", &new_state.title)?;
        let page = self.page_mut(page_id)?;

        let mut id = new_id();
        while page.state(&id).is_some() {
            id = new_id();
        }

        let is_default = page.default_state().is_none();
        page.states.push(State {
            id,
            title,
            description: new_state.description.trim().to_string(),
            is_default,
            versions: StateVersions::default(),
        });

        Ok(&page.states[page.states.len() - 1])
    }

    pub fn update_state(
        &mut self,
        page_id: &str,
        state_id: &str,
        title: Option<String>,
        description: Option<String>,
    ) -> Result<&State, StudioError> {
        let title = title.as_deref().map(|t| require("State title", t)).transpose()?;
        let state = self.page_mut(page_id)?.state_mut(state_id)?;

        if let Some(title) = title {
            state.title = title;
        }
        if let Some(description) = description {
            state.description = description.trim().to_string();
        }

        Ok(&*state)
    }

    /// Add or overwrite the captured version of a state for one OS.
    pub fn capture_state_version(
        &mut self,
        page_id: &str,
        state_id: &str,
        platform: Platform,
        version: StateVersion,
    ) -> Result<&State, StudioError> {
        let state = self.page_mut(page_id)?.state_mut(state_id)?;

        tracing::info!(page_id, state_id, ?platform, "captured state version");
        state.versions.set(platform, version);

        Ok(&*state)
    }

    /// Delete a state. If it was the default, the first remaining state
    /// takes over.
    pub fn delete_state(&mut self, page_id: &str, state_id: &str) -> Result<State, StudioError> {
        let page = self.page_mut(page_id)?;
        let idx = page
            .states
            .iter()
            .position(|s| s.id == state_id)
            .ok_or_else(|| StudioError::StateNotFound {
                page: page_id.to_string(),
                state: state_id.to_string(),
            })?;

        let removed = page.states.remove(idx);
        if removed.is_default {
            if let Some(first) = page.states.first_mut() {
                first.is_default = true;
            }
        }

        Ok(removed)
    }

    /// Mark one state as the page default, clearing every other flag.
    pub fn set_default_state(&mut self, page_id: &str, state_id: &str) -> Result<(), StudioError> {
        let page = self.page_mut(page_id)?;
        page.state_mut(state_id)?;

        for state in &mut page.states {
            state.is_default = state.id == state_id;
        }

        Ok(())
    }
}
