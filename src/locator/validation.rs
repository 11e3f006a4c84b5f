use serde::Deserialize;
use sxd_document::Package;

use crate::error::StudioError;
use crate::locator::locator_model::{Locator, LocatorSummary};
use crate::project::project_model::{Page, Platform};
use crate::xpath::evaluator::{XPathError, XPathResult, evaluate_in, parse_document};

// ============================================================================
// Parsing locator blobs
// ============================================================================

/// `xpath` may be a full result object or just the expression.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawXPath {
    Full(XPathResult),
    Expression(String),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLocator {
    dev_name: String,
    #[serde(default)]
    description: String,
    xpath: RawXPath,
    #[serde(default)]
    alternative_xpaths: Option<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLocatorList {
    List(Vec<RawLocator>),
    Wrapped { locators: Vec<RawLocator> },
}

/// Strip a surrounding Markdown code fence (```json ... ```), if any.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Read locators from a JSON blob: a bare array or `{"locators": [...]}`,
/// optionally wrapped in a code fence.
pub fn parse_locators(text: &str) -> Result<Vec<Locator>, StudioError> {
    let raw: RawLocatorList = serde_json::from_str(strip_code_fence(text))
        .map_err(|e| StudioError::parse("locators", e))?;

    let list = match raw {
        RawLocatorList::List(list) => list,
        RawLocatorList::Wrapped { locators } => locators,
    };

    Ok(list
        .into_iter()
        .map(|raw| {
            let mut locator = match raw.xpath {
                RawXPath::Full(xpath) => Locator {
                    dev_name: raw.dev_name,
                    description: raw.description,
                    xpath,
                },
                RawXPath::Expression(expr) => Locator::new(&raw.dev_name, &raw.description, &expr),
            };
            if raw.alternative_xpaths.is_some() {
                locator.xpath.alternative_xpaths = raw.alternative_xpaths;
            }
            locator
        })
        .collect())
}

// ============================================================================
// Resolving the source to validate against
// ============================================================================

/// Page source of a page's state for one OS. Without a state id the
/// default state is used.
pub fn locator_source<'p>(
    page: &'p Page,
    state_id: Option<&str>,
    platform: Platform,
) -> Result<&'p str, StudioError> {
    let state = match state_id {
        Some(id) => page.state(id).ok_or_else(|| StudioError::StateNotFound {
            page: page.id.clone(),
            state: id.to_string(),
        })?,
        None => page
            .default_state()
            .ok_or_else(|| StudioError::MissingState(format!("page '{}' has no default state", page.name)))?,
    };

    state
        .versions
        .get(platform)
        .map(|v| v.page_source.as_str())
        .ok_or_else(|| {
            StudioError::MissingState(format!(
                "state '{}' has no {:?} capture",
                state.title, platform
            ))
        })
}

// ============================================================================
// Validation
// ============================================================================

fn check(parsed: &Result<Package, XPathError>, expression: &str) -> XPathResult {
    match parsed {
        Ok(package) => match evaluate_in(&package.as_document(), expression) {
            Ok(nodes) => XPathResult::valid(expression, nodes),
            Err(e) => XPathResult::invalid(expression, &e),
        },
        Err(e) => XPathResult::invalid(expression, e),
    }
}

/// Refresh a batch of locators against one page source.
///
/// Each primary expression is re-evaluated and its match metadata replaced;
/// alternatives are kept. With `promote_alternatives`, a locator whose
/// primary expression is not unique switches to its first alternative that
/// matches exactly one node (the old primary becomes an alternative).
pub fn validate_locators(
    locators: &mut [Locator],
    page_source: &str,
    promote_alternatives: bool,
) -> LocatorSummary {
    let parsed = parse_document(page_source);

    let mut summary = LocatorSummary {
        total: locators.len(),
        ..Default::default()
    };

    for locator in locators.iter_mut() {
        let alternatives = locator.xpath.alternative_xpaths.take();
        let mut result = check(&parsed, locator.expression());

        if promote_alternatives && !result.is_unique() {
            let better = alternatives.iter().flatten().find_map(|alt| {
                let candidate = check(&parsed, alt);
                candidate.is_unique().then_some(candidate)
            });

            if let Some(candidate) = better {
                tracing::info!(
                    locator = %locator.dev_name,
                    from = %result.xpath_expression,
                    to = %candidate.xpath_expression,
                    "promoted alternative xpath"
                );
                let previous = result.xpath_expression.clone();
                result = candidate;
                let mut rest: Vec<String> = alternatives
                    .iter()
                    .flatten()
                    .filter(|alt| **alt != result.xpath_expression)
                    .cloned()
                    .collect();
                rest.insert(0, previous);
                result.alternative_xpaths = Some(rest);
                summary.promoted += 1;
            } else {
                result.alternative_xpaths = alternatives;
            }
        } else {
            result.alternative_xpaths = alternatives;
        }

        match (result.is_valid, result.number_of_matches) {
            (false, _) => summary.invalid += 1,
            (true, 0) => summary.unmatched += 1,
            (true, 1) => summary.unique += 1,
            (true, _) => summary.ambiguous += 1,
        }

        locator.xpath = result;
    }

    tracing::info!(
        total = summary.total,
        unique = summary.unique,
        invalid = summary.invalid,
        "validated locators"
    );
    summary
}

/// Refresh one locator against a page source.
pub fn validate_locator(locator: &mut Locator, page_source: &str) {
    validate_locators(std::slice::from_mut(locator), page_source, false);
}
