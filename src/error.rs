use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StudioError {
    /// Reading or writing a project, recording, settings or config file failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON parsing failed (project file, recording, locator blob)
    #[error("JSON parse error ({context}): {source}")]
    JsonParse {
        context: String,
        source: serde_json::Error,
    },

    /// JSON serialization failed
    #[error("JSON serialize error ({context}): {source}")]
    JsonSerialize {
        context: String,
        source: serde_json::Error,
    },

    /// A required form field was missing or blank
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Page '{0}' not found")]
    PageNotFound(String),

    #[error("State '{state}' not found on page '{page}'")]
    StateNotFound { page: String, state: String },

    /// The device driver failed to produce an artifact
    #[error("Device call '{call}' failed: {message}")]
    Device { call: &'static str, message: String },

    /// A page/state has no captured source to work against
    #[error("Missing state: {0}")]
    MissingState(String),
}

impl StudioError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StudioError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(context: impl Into<String>, source: serde_json::Error) -> Self {
        StudioError::JsonParse {
            context: context.into(),
            source,
        }
    }

    pub fn serialize(context: impl Into<String>, source: serde_json::Error) -> Self {
        StudioError::JsonSerialize {
            context: context.into(),
            source,
        }
    }
}
