mod common;

use clap::Parser;
use common::{LOGIN_XML, captured_page, entry, page};
use page_studio::cli::commands::{cmd_condense, cmd_recent, cmd_tree, cmd_validate, cmd_xpath};
use page_studio::cli::config::{
    AppConfig, Cli, Commands, DEFAULT_SETTINGS_PATH, build_condense_options, load_config,
    resolve_settings_path,
};
use page_studio::StudioError;
use page_studio::project::project_model::Project;
use page_studio::project::store::save_project;
use page_studio::recording::condenser::CondenseOptions;
use page_studio::recording::recording_model::{load_recording, save_recording};
use page_studio::xpath::evaluator::XPathResult;

// ============================================================================
// CLI Argument Parsing Tests
// ============================================================================

#[test]
fn cli_parse_tree() {
    let cli = Cli::parse_from(["page-studio", "tree", "--project", "p.json"]);
    match cli.command {
        Commands::Tree { project, search } => {
            assert_eq!(project, "p.json");
            assert_eq!(search, "");
        }
        _ => panic!("Expected Tree command"),
    }
}

#[test]
fn cli_parse_xpath_all_args() {
    let cli = Cli::parse_from([
        "page-studio",
        "xpath",
        "--source",
        "screen.xml",
        "--query",
        "//button",
        "--xpath-version",
        "2.0",
        "--json",
        "--expand-all",
    ]);
    match cli.command {
        Commands::Xpath {
            source,
            query,
            xpath_version,
            json,
            expand_all,
        } => {
            assert_eq!(source, "screen.xml");
            assert_eq!(query, "//button");
            assert_eq!(xpath_version.as_deref(), Some("2.0"));
            assert!(json);
            assert!(expand_all);
        }
        _ => panic!("Expected Xpath command"),
    }
}

#[test]
fn cli_parse_condense() {
    let cli = Cli::parse_from([
        "page-studio",
        "condense",
        "--recording",
        "rec.json",
        "-o",
        "out.json",
        "--no-xml",
        "--threshold",
        "0.8",
    ]);
    match cli.command {
        Commands::Condense {
            recording,
            output,
            no_xml,
            no_screenshot,
            threshold,
        } => {
            assert_eq!(recording, "rec.json");
            assert_eq!(output.as_deref(), Some("out.json"));
            assert!(no_xml);
            assert!(!no_screenshot);
            assert_eq!(threshold, Some(0.8));
        }
        _ => panic!("Expected Condense command"),
    }
}

#[test]
fn cli_parse_validate_defaults() {
    let cli = Cli::parse_from([
        "page-studio",
        "validate",
        "--project",
        "p.json",
        "--page",
        "p1",
        "--locators",
        "loc.json",
    ]);
    match cli.command {
        Commands::Validate {
            state,
            platform,
            promote,
            output,
            ..
        } => {
            assert!(state.is_none());
            assert_eq!(platform, "android");
            assert!(!promote);
            assert!(output.is_none());
        }
        _ => panic!("Expected Validate command"),
    }
}

#[test]
fn cli_parse_global_flags() {
    let cli = Cli::parse_from(["page-studio", "-vv", "recent", "--settings", "s.json"]);
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.settings.as_deref(), Some("s.json"));
    assert!(matches!(cli.command, Commands::Recent));
}

// ============================================================================
// Config File Tests
// ============================================================================

#[test]
fn config_load_missing_file() {
    let config = load_config(Some("nonexistent_file_that_does_not_exist.yaml"));
    assert!(config.condense.check_xml);
    assert!(config.condense.check_screenshot);
    assert_eq!(config.condense.screenshot_threshold, 1.0);
    assert_eq!(config.xpath.version, "1.0");
    assert!(config.settings.path.is_none());
}

#[test]
fn config_partial_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page-studio.yaml");
    std::fs::write(
        &path,
        "condense:\n  screenshot_threshold: 0.95\nsettings:\n  path: /tmp/studio.json\n",
    )
    .unwrap();

    let config = load_config(path.to_str());
    assert_eq!(config.condense.screenshot_threshold, 0.95);
    assert!(config.condense.check_xml);
    assert_eq!(config.xpath.version, "1.0");
    assert_eq!(config.settings.path.as_deref(), Some("/tmp/studio.json"));
}

#[test]
fn config_malformed_yaml_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page-studio.yaml");
    std::fs::write(&path, "condense: [not, a, map").unwrap();

    let config = load_config(path.to_str());
    assert_eq!(config.condense.screenshot_threshold, 1.0);
}

#[test]
fn cli_flags_override_config() {
    let mut config = AppConfig::default();
    config.condense.screenshot_threshold = 0.9;
    config.condense.check_screenshot = false;

    let from_config = build_condense_options(&config.condense, false, false, None).unwrap();
    assert_eq!(
        from_config,
        CondenseOptions {
            check_xml: true,
            check_screenshot: false,
            screenshot_threshold: 0.9,
        }
    );

    let overridden = build_condense_options(&config.condense, true, false, Some(0.5)).unwrap();
    assert!(!overridden.check_xml);
    assert_eq!(overridden.screenshot_threshold, 0.5);
}

#[test]
fn out_of_range_threshold_is_rejected() {
    let mut config = AppConfig::default();
    for bad in [f64::NAN, -0.5, 1.5, f64::INFINITY] {
        assert!(
            matches!(
                build_condense_options(&config.condense, false, false, Some(bad)),
                Err(StudioError::Validation(_))
            ),
            "threshold {} accepted",
            bad
        );
    }

    config.condense.screenshot_threshold = -1.0;
    assert!(build_condense_options(&config.condense, false, false, None).is_err());
    assert!(build_condense_options(&config.condense, false, false, Some(0.0)).is_ok());
}

#[test]
fn settings_path_precedence() {
    let mut config = AppConfig::default();
    assert_eq!(resolve_settings_path(None, &config), DEFAULT_SETTINGS_PATH);

    config.settings.path = Some("from-config.json".into());
    assert_eq!(resolve_settings_path(None, &config), "from-config.json");
    assert_eq!(resolve_settings_path(Some("cli.json"), &config), "cli.json");
}

// ============================================================================
// Command Tests
// ============================================================================

#[test]
fn tree_command_prints_modules_and_remembers_project() {
    let dir = tempfile::tempdir().unwrap();
    let project_path = dir.path().join("shop.json");
    let settings_path = dir.path().join("settings.json");

    let mut project = Project::new();
    project.pages.push(page("1", "Login", "Auth"));
    project.pages.push(page("2", "Home", ""));
    save_project(&project_path, &project).unwrap();

    let project_arg = project_path.to_str().unwrap();
    let settings_arg = settings_path.to_str().unwrap();

    let output = cmd_tree(project_arg, "", settings_arg).unwrap();
    assert!(output.starts_with("=== Pages: 2 ==="));
    assert!(output.contains("\u{25b8} Auth (1)\n    \u{2022} Login [1]"));
    assert!(output.contains("\u{25b8} Uncategorized (1)\n    \u{2022} Home [2]"));

    let filtered = cmd_tree(project_arg, "zzz", settings_arg).unwrap();
    assert!(filtered.contains("(no matching pages)"));

    let recent = cmd_recent(settings_arg).unwrap();
    assert_eq!(recent, format!(" 1. {}\n", project_arg));
}

#[test]
fn recent_command_without_history() {
    let dir = tempfile::tempdir().unwrap();
    let settings = dir.path().join("settings.json");
    assert_eq!(cmd_recent(settings.to_str().unwrap()).unwrap(), "No recent projects\n");
}

#[test]
fn xpath_command_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("screen.xml");
    std::fs::write(&source, LOGIN_XML).unwrap();

    let json = cmd_xpath(source.to_str().unwrap(), "//button", "1.0", true, false).unwrap();
    let result: XPathResult = serde_json::from_str(&json).unwrap();

    assert!(result.is_valid);
    assert_eq!(result.number_of_matches, 2);
    assert!(json.contains("\"matchingNodes\""));
}

#[test]
fn xpath_command_renders_document_view() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("screen.xml");
    std::fs::write(&source, LOGIN_XML).unwrap();

    let output = cmd_xpath(source.to_str().unwrap(), "//label", "3.0", false, false).unwrap();
    assert!(output.starts_with("XPath: //label\n  Matches: 1\n    /hierarchy/layout/label\n"));
    assert!(output.contains("6 >       <label"));

    let broken = dir.path().join("broken.xml");
    std::fs::write(&broken, "<a><b></a>").unwrap();
    assert!(cmd_xpath(broken.to_str().unwrap(), "//b", "1.0", false, false).is_err());
}

#[test]
fn condense_command_writes_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("recording.json");
    let output = dir.path().join("condensed.json");
    save_recording(&input, &[entry("A", "1"), entry("A", "1"), entry("B", "1")]).unwrap();

    let summary = cmd_condense(
        input.to_str().unwrap(),
        output.to_str(),
        &CondenseOptions::default(),
        0,
    )
    .unwrap();

    assert!(summary.starts_with("=== Condensed: 3 -> 2 entries (1 removed) ==="));
    assert_eq!(load_recording(&output).unwrap().len(), 2);
}

#[test]
fn validate_command_reports_and_writes_locators() {
    let dir = tempfile::tempdir().unwrap();
    let project_path = dir.path().join("project.json");
    let locators_path = dir.path().join("locators.json");
    let output_path = dir.path().join("validated.json");
    let settings_path = dir.path().join("settings.json");

    let mut project = Project::new();
    project.pages.push(captured_page("p1", LOGIN_XML));
    save_project(&project_path, &project).unwrap();
    std::fs::write(
        &locators_path,
        r#"[{"devName": "login", "xpath": "//button[@id='login']"},
            {"devName": "buttons", "xpath": "//button", "alternativeXpaths": ["//button[2]"]}]"#,
    )
    .unwrap();

    let report = cmd_validate(
        project_path.to_str().unwrap(),
        "p1",
        None,
        "Android",
        locators_path.to_str().unwrap(),
        true,
        output_path.to_str(),
        settings_path.to_str().unwrap(),
    )
    .unwrap();

    assert!(report.contains("2 unique"), "report: {}", report);
    assert!(report.contains("1 promoted"));

    let written = std::fs::read_to_string(&output_path).unwrap();
    assert!(written.contains("\"xpathExpression\": \"//button[2]\""));

    let bad_platform = cmd_validate(
        project_path.to_str().unwrap(),
        "p1",
        None,
        "windows",
        locators_path.to_str().unwrap(),
        false,
        None,
        settings_path.to_str().unwrap(),
    );
    assert!(bad_platform.is_err());
}
