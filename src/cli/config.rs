use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::error::StudioError;
use crate::recording::condenser::CondenseOptions;

pub const DEFAULT_CONFIG_PATH: &str = "page-studio.yaml";
pub const DEFAULT_SETTINGS_PATH: &str = ".page-studio/settings.json";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "page-studio",
    version,
    about = "Page modelling, XPath locators and session recordings for mobile test automation"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: page-studio.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Path to the local settings file (recent projects, last file name)
    #[arg(long, global = true)]
    pub settings: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the module tree of a project's pages
    Tree {
        /// Project JSON file
        #[arg(long)]
        project: String,

        /// Only show pages whose name, description or module contains this
        #[arg(long, default_value = "")]
        search: String,
    },

    /// Evaluate an XPath against an XML page source and show the matches
    Xpath {
        /// XML file to evaluate against
        #[arg(long)]
        source: String,

        /// XPath expression
        #[arg(long)]
        query: String,

        /// Requested XPath version (informational; 1.0 is always used)
        #[arg(long)]
        xpath_version: Option<String>,

        /// Print the evaluation result as JSON instead of the document view
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Expand every node of the document view
        #[arg(long, default_value_t = false)]
        expand_all: bool,
    },

    /// Drop unchanged consecutive entries from a recording
    Condense {
        /// Recording JSON file (array of entries)
        #[arg(long)]
        recording: String,

        /// Where to write the condensed recording (default: summary only)
        #[arg(short, long)]
        output: Option<String>,

        /// Ignore page-source changes
        #[arg(long, default_value_t = false)]
        no_xml: bool,

        /// Ignore screenshot changes
        #[arg(long, default_value_t = false)]
        no_screenshot: bool,

        /// Screenshot similarity threshold (1.0 = exact match)
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Check locators against a captured state of a page
    Validate {
        /// Project JSON file
        #[arg(long)]
        project: String,

        /// Page id
        #[arg(long)]
        page: String,

        /// State id (default: the page's default state)
        #[arg(long)]
        state: Option<String>,

        /// Platform of the capture: android or ios
        #[arg(long, default_value = "android")]
        platform: String,

        /// Locator JSON file
        #[arg(long)]
        locators: String,

        /// Switch ambiguous locators to a unique alternative xpath
        #[arg(long, default_value_t = false)]
        promote: bool,

        /// Write the refreshed locators here
        #[arg(short, long)]
        output: Option<String>,
    },

    /// List recently opened projects
    Recent,
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `page-studio.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub condense: CondenseConfig,
    #[serde(default)]
    pub xpath: XPathConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CondenseConfig {
    #[serde(default = "default_true")]
    pub check_xml: bool,

    #[serde(default = "default_true")]
    pub check_screenshot: bool,

    #[serde(default = "default_threshold")]
    pub screenshot_threshold: f64,
}

impl Default for CondenseConfig {
    fn default() -> Self {
        Self {
            check_xml: true,
            check_screenshot: true,
            screenshot_threshold: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XPathConfig {
    #[serde(default = "default_version")]
    pub version: String,
}

impl Default for XPathConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsConfig {
    pub path: Option<String>,
}

// Serde default helpers
fn default_true() -> bool { true }
fn default_threshold() -> f64 { 1.0 }
fn default_version() -> String { "1.0".to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = config_path, error = %e, "ignoring malformed config");
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

// ============================================================================
// Config Builders (merge CLI args with config file)
// ============================================================================

/// Build condense options: CLI flags override the config file. The
/// threshold must be a number in `0.0..=1.0`.
pub fn build_condense_options(
    config: &CondenseConfig,
    no_xml: bool,
    no_screenshot: bool,
    threshold: Option<f64>,
) -> Result<CondenseOptions, StudioError> {
    let screenshot_threshold = threshold.unwrap_or(config.screenshot_threshold);
    if !(0.0..=1.0).contains(&screenshot_threshold) {
        return Err(StudioError::Validation(format!(
            "screenshot threshold must be between 0 and 1, got {}",
            screenshot_threshold
        )));
    }

    Ok(CondenseOptions {
        check_xml: config.check_xml && !no_xml,
        check_screenshot: config.check_screenshot && !no_screenshot,
        screenshot_threshold,
    })
}

/// Settings file path: CLI > config file > default.
pub fn resolve_settings_path(cli: Option<&str>, config: &AppConfig) -> String {
    cli.or(config.settings.path.as_deref())
        .unwrap_or(DEFAULT_SETTINGS_PATH)
        .to_string()
}
