mod common;

use common::{LOGIN_XML, captured_page, page};
use page_studio::StudioError;
use page_studio::locator::locator_model::{Locator, LocatorSummary};
use page_studio::locator::validation::{
    locator_source, parse_locators, validate_locator, validate_locators,
};
use page_studio::project::project_model::Platform;

// =========================================================================
// Parsing
// =========================================================================

#[test]
fn parses_bare_array_with_string_xpaths() {
    let locators = parse_locators(
        r#"[
            {"devName": "loginButton", "description": "Submit", "xpath": "//button[@id='login']"},
            {"devName": "welcome", "xpath": "//label"}
        ]"#,
    )
    .unwrap();

    assert_eq!(locators.len(), 2);
    assert_eq!(locators[0].dev_name, "loginButton");
    assert_eq!(locators[0].expression(), "//button[@id='login']");
    assert!(!locators[0].xpath.is_valid, "not validated yet");
    assert_eq!(locators[1].description, "");
}

#[test]
fn parses_wrapped_object_inside_code_fence() {
    let blob = "```json\n{\"locators\": [{\"devName\": \"cancel\", \"xpath\": {\"xpathExpression\": \"//button[2]\", \"numberOfMatches\": 1, \"isValid\": true, \"matchingNodes\": []}}]}\n```";
    let locators = parse_locators(blob).unwrap();

    assert_eq!(locators.len(), 1);
    assert_eq!(locators[0].expression(), "//button[2]");
    assert!(locators[0].xpath.is_valid);
}

#[test]
fn top_level_alternatives_attach_to_xpath() {
    let locators = parse_locators(
        r#"[{"devName": "a", "xpath": "//button", "alternativeXpaths": ["//button[1]"]}]"#,
    )
    .unwrap();
    assert_eq!(
        locators[0].xpath.alternative_xpaths,
        Some(vec!["//button[1]".to_string()])
    );
}

#[test]
fn malformed_blob_is_a_parse_error() {
    assert!(matches!(
        parse_locators("here are your locators"),
        Err(StudioError::JsonParse { .. })
    ));
}

// =========================================================================
// Validation
// =========================================================================

#[test]
fn summary_counts_each_outcome() {
    let mut locators = vec![
        Locator::new("login", "", "//button[@id='login']"),
        Locator::new("buttons", "", "//button"),
        Locator::new("missing", "", "//checkbox"),
        Locator::new("broken", "", "//button["),
    ];
    let summary = validate_locators(&mut locators, LOGIN_XML, false);

    assert_eq!(
        summary,
        LocatorSummary {
            total: 4,
            unique: 1,
            ambiguous: 1,
            unmatched: 1,
            invalid: 1,
            promoted: 0,
        }
    );
    assert_eq!(locators[0].xpath.matching_nodes, vec!["/hierarchy/layout/button[1]"]);
    assert_eq!(locators[1].xpath.number_of_matches, 2);
    assert!(locators[3].xpath.error.is_some());
}

#[test]
fn promotion_switches_to_first_unique_alternative() {
    let mut locator = Locator::new("cancel", "", "//button");
    locator.xpath.alternative_xpaths = Some(vec![
        "//*[@text]".to_string(),
        "//button[@text='Cancel']".to_string(),
        "//button[2]".to_string(),
    ]);

    let summary = validate_locators(std::slice::from_mut(&mut locator), LOGIN_XML, true);

    assert_eq!(summary.promoted, 1);
    assert_eq!(summary.unique, 1);
    assert_eq!(locator.expression(), "//button[@text='Cancel']");
    assert_eq!(
        locator.xpath.alternative_xpaths,
        Some(vec![
            "//button".to_string(),
            "//*[@text]".to_string(),
            "//button[2]".to_string(),
        ])
    );
}

#[test]
fn without_promotion_alternatives_are_kept_as_is() {
    let alternatives = vec!["//button[1]".to_string()];
    let mut locator = Locator::new("any", "", "//button");
    locator.xpath.alternative_xpaths = Some(alternatives.clone());

    let summary = validate_locators(std::slice::from_mut(&mut locator), LOGIN_XML, false);

    assert_eq!(summary.ambiguous, 1);
    assert_eq!(locator.expression(), "//button");
    assert_eq!(locator.xpath.alternative_xpaths, Some(alternatives));
}

#[test]
fn invalid_page_source_marks_everything_invalid() {
    let mut locators = vec![Locator::new("a", "", "//a"), Locator::new("b", "", "/")];
    let summary = validate_locators(&mut locators, "<a><b></a>", true);

    assert_eq!(summary.invalid, 2);
    assert!(locators.iter().all(|l| !l.xpath.is_valid));
}

#[test]
fn single_locator_refresh() {
    let mut locator = Locator::new("welcome", "", "//label[@text='Welcome']");
    validate_locator(&mut locator, LOGIN_XML);
    assert!(locator.xpath.is_unique());
}

// =========================================================================
// Source resolution
// =========================================================================

#[test]
fn source_comes_from_default_state() {
    let p = captured_page("p1", LOGIN_XML);
    assert_eq!(locator_source(&p, None, Platform::Android).unwrap(), LOGIN_XML);
    assert_eq!(locator_source(&p, Some("s1"), Platform::Android).unwrap(), LOGIN_XML);
}

#[test]
fn missing_capture_or_state_is_reported() {
    let p = captured_page("p1", LOGIN_XML);
    assert!(matches!(
        locator_source(&p, None, Platform::Ios),
        Err(StudioError::MissingState(_))
    ));
    assert!(matches!(
        locator_source(&p, Some("nope"), Platform::Android),
        Err(StudioError::StateNotFound { .. })
    ));

    let empty = page("p2", "Home", "");
    assert!(matches!(
        locator_source(&empty, None, Platform::Android),
        Err(StudioError::MissingState(_))
    ));
}

#[test]
fn locator_json_uses_camel_case() {
    let mut locator = Locator::new("welcome", "Greeting", "//label");
    validate_locator(&mut locator, LOGIN_XML);

    let json = serde_json::to_value(&locator).unwrap();
    assert_eq!(json["devName"], "welcome");
    assert_eq!(json["xpath"]["xpathExpression"], "//label");
    assert_eq!(json["xpath"]["numberOfMatches"], 1);
    assert_eq!(json["xpath"]["isValid"], true);
}
