use serde::{Deserialize, Serialize};

use crate::xpath::evaluator::XPathResult;

/// A named element locator with its XPath and match metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Locator {
    pub dev_name: String,
    #[serde(default)]
    pub description: String,
    pub xpath: XPathResult,
}

impl Locator {
    pub fn new(dev_name: &str, description: &str, expression: &str) -> Self {
        Self {
            dev_name: dev_name.to_string(),
            description: description.to_string(),
            xpath: XPathResult {
                xpath_expression: expression.to_string(),
                number_of_matches: 0,
                is_valid: false,
                matching_nodes: Vec::new(),
                alternative_xpaths: None,
                error: None,
            },
        }
    }

    pub fn expression(&self) -> &str {
        &self.xpath.xpath_expression
    }
}

/// Outcome counts of validating a batch of locators.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LocatorSummary {
    pub total: usize,
    /// Valid and matching exactly one node
    pub unique: usize,
    /// Valid but matching more than one node
    pub ambiguous: usize,
    /// Valid but matching nothing
    pub unmatched: usize,
    pub invalid: usize,
    /// Locators whose primary expression was replaced by an alternative
    pub promoted: usize,
}
