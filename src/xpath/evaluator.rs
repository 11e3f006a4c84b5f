use serde::{Deserialize, Serialize};
use sxd_document::dom::Document;
use sxd_xpath::{Context, Factory, Value};
use thiserror::Error;

use crate::xpath::path::node_path;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum XPathError {
    #[error("XML document could not be parsed: {0}")]
    Document(String),

    #[error("XPath expression is empty")]
    Empty,

    #[error("Invalid XPath expression: {0}")]
    Syntax(String),

    #[error("XPath evaluation failed: {0}")]
    Evaluation(String),

    /// The expression evaluated to a number, string or boolean
    #[error("XPath result is a {0}, not a node-set")]
    NotANodeSet(&'static str),
}

/// XPath dialect the caller asked for. Only informational: every query is
/// evaluated with the XPath 1.0 engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum XPathVersion {
    #[default]
    #[serde(rename = "1.0")]
    V1,
    #[serde(rename = "2.0")]
    V2,
    #[serde(rename = "3.0")]
    V3,
}

impl XPathVersion {
    pub fn parse(version: &str) -> Option<Self> {
        match version.trim() {
            "1" | "1.0" => Some(XPathVersion::V1),
            "2" | "2.0" => Some(XPathVersion::V2),
            "3" | "3.0" | "3.1" => Some(XPathVersion::V3),
            _ => None,
        }
    }
}

/// Match metadata for one XPath expression against one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XPathResult {
    pub xpath_expression: String,
    #[serde(default)]
    pub number_of_matches: usize,
    #[serde(default)]
    pub is_valid: bool,
    /// Canonical paths of the matched nodes, in document order
    #[serde(default)]
    pub matching_nodes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_xpaths: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl XPathResult {
    pub fn valid(expression: &str, matching_nodes: Vec<String>) -> Self {
        Self {
            xpath_expression: expression.to_string(),
            number_of_matches: matching_nodes.len(),
            is_valid: true,
            matching_nodes,
            alternative_xpaths: None,
            error: None,
        }
    }

    pub fn invalid(expression: &str, error: &XPathError) -> Self {
        Self {
            xpath_expression: expression.to_string(),
            number_of_matches: 0,
            is_valid: false,
            matching_nodes: Vec::new(),
            alternative_xpaths: None,
            error: Some(error.to_string()),
        }
    }

    /// Valid and matching exactly one node.
    pub fn is_unique(&self) -> bool {
        self.is_valid && self.number_of_matches == 1
    }
}

pub fn parse_document(xml: &str) -> Result<sxd_document::Package, XPathError> {
    sxd_document::parser::parse(xml).map_err(|e| XPathError::Document(format!("{:?}", e)))
}

/// Evaluate `expression` against an already parsed document and return the
/// canonical paths of the matched nodes in document order.
pub fn evaluate_in(document: &Document<'_>, expression: &str) -> Result<Vec<String>, XPathError> {
    if expression.trim().is_empty() {
        return Err(XPathError::Empty);
    }

    let factory = Factory::new();
    let xpath = factory
        .build(expression)
        .map_err(|e| XPathError::Syntax(e.to_string()))?
        .ok_or(XPathError::Empty)?;

    let context = Context::new();
    let value = xpath
        .evaluate(&context, document.root())
        .map_err(|e| XPathError::Evaluation(e.to_string()))?;

    match value {
        Value::Nodeset(nodes) => Ok(nodes.document_order().iter().map(node_path).collect()),
        Value::Boolean(_) => Err(XPathError::NotANodeSet("boolean")),
        Value::Number(_) => Err(XPathError::NotANodeSet("number")),
        Value::String(_) => Err(XPathError::NotANodeSet("string")),
    }
}

/// Parse `xml` and evaluate `expression` against it.
pub fn evaluate(xml: &str, expression: &str) -> Result<Vec<String>, XPathError> {
    let package = parse_document(xml)?;
    let document = package.as_document();
    evaluate_in(&document, expression)
}

/// Evaluate-only entry point. Never fails: a malformed document or
/// expression comes back as `isValid: false` with no matches.
pub fn evaluate_xpath(xml: &str, expression: &str) -> XPathResult {
    match evaluate(xml, expression) {
        Ok(nodes) => XPathResult::valid(expression, nodes),
        Err(e) => {
            tracing::debug!(expression, error = %e, "xpath evaluation failed");
            XPathResult::invalid(expression, &e)
        }
    }
}
