use std::collections::{BTreeMap, HashSet};
use std::thread::sleep;
use std::time::Duration;

use sxd_document::Package;
use sxd_xpath::nodeset::Node;

use crate::xpath::evaluator::{
    XPathError, XPathResult, XPathVersion, evaluate_in, parse_document,
};
use crate::xpath::path::node_path;

/// Depth (document = 0) down to which element nodes start expanded.
const INITIAL_EXPANDED_DEPTH: usize = 1;

// ============================================================================
// Renderable document tree
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct XmlAttribute {
    pub name: String,
    pub value: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum XmlNodeKind {
    Document,
    Element {
        name: String,
        attributes: Vec<XmlAttribute>,
    },
    Text(String),
    Comment(String),
    ProcessingInstruction {
        target: String,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct XmlNode {
    pub path: String,
    pub kind: XmlNodeKind,
    pub children: Vec<XmlNode>,
    /// Paths of whitespace-only text children, which get no line of their
    /// own and show on this node's line
    pub blank_text: Vec<String>,
}

impl XmlNode {
    fn from_node(node: &Node<'_>) -> Option<Self> {
        let kind = match node {
            Node::Root(_) => XmlNodeKind::Document,
            Node::Element(element) => XmlNodeKind::Element {
                name: node.prefixed_name().unwrap_or_default(),
                attributes: element
                    .attributes()
                    .into_iter()
                    .map(|attr| {
                        let attr_node = Node::Attribute(attr);
                        XmlAttribute {
                            name: attr_node.prefixed_name().unwrap_or_default(),
                            value: attr.value().to_string(),
                            path: node_path(&attr_node),
                        }
                    })
                    .collect(),
            },
            Node::Text(_) => {
                let text = node.string_value();
                if text.trim().is_empty() {
                    return None;
                }
                XmlNodeKind::Text(text.trim().to_string())
            }
            Node::Comment(_) => XmlNodeKind::Comment(node.string_value()),
            Node::ProcessingInstruction(_) => XmlNodeKind::ProcessingInstruction {
                target: node.prefixed_name().unwrap_or_default(),
                value: node.string_value(),
            },
            Node::Attribute(_) | Node::Namespace(_) => return None,
        };

        let mut children = Vec::new();
        let mut blank_text = Vec::new();
        for child in node.children() {
            if matches!(child, Node::Text(_)) && child.string_value().trim().is_empty() {
                blank_text.push(node_path(&child));
            } else if let Some(rendered) = XmlNode::from_node(&child) {
                children.push(rendered);
            }
        }

        Some(XmlNode {
            path: node_path(node),
            kind,
            children,
            blank_text,
        })
    }

    fn is_expandable(&self) -> bool {
        !self.children.is_empty()
    }

    /// True when `path` is this node, one of its attributes or one of its
    /// whitespace-only text children.
    fn owns_path(&self, path: &str) -> bool {
        if self.path == path || self.blank_text.iter().any(|p| p == path) {
            return true;
        }
        match &self.kind {
            XmlNodeKind::Element { attributes, .. } => attributes.iter().any(|a| a.path == path),
            _ => false,
        }
    }

    /// Paths of the nodes above the node owning `path`, outermost first.
    fn ancestors_of(&self, path: &str) -> Option<Vec<String>> {
        if self.owns_path(path) {
            return Some(Vec::new());
        }
        for child in &self.children {
            if let Some(mut chain) = child.ancestors_of(path) {
                chain.insert(0, self.path.clone());
                return Some(chain);
            }
        }
        None
    }

    fn collect_expandable(&self, depth: usize, max_depth: Option<usize>, out: &mut HashSet<String>) {
        if !self.is_expandable() || max_depth.is_some_and(|max| depth > max) {
            return;
        }
        out.insert(self.path.clone());
        for child in &self.children {
            child.collect_expandable(depth + 1, max_depth, out);
        }
    }
}

// ============================================================================
// Rendering output
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedLine {
    /// 1-based
    pub line_number: usize,
    pub path: String,
    pub depth: usize,
    pub text: String,
    pub highlighted: bool,
    pub expandable: bool,
    pub expanded: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rendering {
    pub lines: Vec<RenderedLine>,
    /// Line showing each visible node; attributes map to their element's line
    pub line_for_path: BTreeMap<String, usize>,
}

impl Rendering {
    pub fn highlighted_lines(&self) -> Vec<&RenderedLine> {
        self.lines.iter().filter(|l| l.highlighted).collect()
    }
}

/// Something that can bring a rendered line into view, e.g. a scrolling
/// viewport. Returns false when the line is not present yet.
pub trait ScrollTarget {
    fn scroll_to_line(&mut self, line: usize) -> bool;
}

#[derive(Debug, Clone)]
pub struct RevealPolicy {
    pub retries: u32,
    pub base_delay: Duration,
}

impl Default for RevealPolicy {
    fn default() -> Self {
        Self {
            retries: 5,
            base_delay: Duration::from_millis(100),
        }
    }
}

// ============================================================================
// XPathHighlighter: view state over one parsed document
// ============================================================================

/// Renders an XML document as an expandable tree with the nodes matched by
/// an XPath expression highlighted.
pub struct XPathHighlighter {
    package: Package,
    root: XmlNode,
    version: XPathVersion,
    result: XPathResult,
    matches: HashSet<String>,
    expanded: HashSet<String>,
}

impl XPathHighlighter {
    /// Parse `xml` and highlight the matches of `expression`.
    ///
    /// A malformed document is an error. A malformed expression is not: the
    /// highlighter renders the document with no matches and an invalid
    /// result.
    pub fn new(xml: &str, expression: &str, version: XPathVersion) -> Result<Self, XPathError> {
        let package = parse_document(xml)?;
        let root = {
            let document = package.as_document();
            XmlNode::from_node(&Node::Root(document.root()))
                .ok_or_else(|| XPathError::Document("document has no root".into()))?
        };

        let mut expanded = HashSet::new();
        root.collect_expandable(0, Some(INITIAL_EXPANDED_DEPTH), &mut expanded);

        let mut highlighter = Self {
            package,
            root,
            version,
            result: XPathResult::valid(expression, Vec::new()),
            matches: HashSet::new(),
            expanded,
        };
        highlighter.set_expression(expression);
        Ok(highlighter)
    }

    /// Re-run a query against the loaded document and expand the ancestors
    /// of its first match.
    pub fn set_expression(&mut self, expression: &str) {
        if self.version != XPathVersion::V1 {
            tracing::debug!(version = ?self.version, "evaluating with the XPath 1.0 engine");
        }

        self.result = self.evaluate_only(expression);
        self.matches = self.result.matching_nodes.iter().cloned().collect();

        if let Some(first) = self.result.matching_nodes.first() {
            if let Some(chain) = self.root.ancestors_of(first) {
                self.expanded.extend(chain);
            }
        }
    }

    /// Evaluate another expression against the same document without
    /// touching highlight or expansion state.
    pub fn evaluate_only(&self, expression: &str) -> XPathResult {
        let document = self.package.as_document();
        match evaluate_in(&document, expression) {
            Ok(nodes) => XPathResult::valid(expression, nodes),
            Err(e) => XPathResult::invalid(expression, &e),
        }
    }

    pub fn result(&self) -> &XPathResult {
        &self.result
    }

    pub fn version(&self) -> XPathVersion {
        self.version
    }

    pub fn document(&self) -> &XmlNode {
        &self.root
    }

    pub fn is_expanded(&self, path: &str) -> bool {
        self.expanded.contains(path)
    }

    /// Flip a node between expanded and collapsed.
    pub fn toggle(&mut self, path: &str) {
        if !self.expanded.remove(path) {
            self.expanded.insert(path.to_string());
        }
    }

    pub fn expand_all(&mut self) {
        self.root.collect_expandable(0, None, &mut self.expanded);
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    pub fn render(&self) -> Rendering {
        let mut rendering = Rendering::default();
        self.render_node(&self.root, 0, &mut rendering);
        rendering
    }

    fn push_line(&self, node: &XmlNode, depth: usize, text: String, out: &mut Rendering) -> usize {
        let line_number = out.lines.len() + 1;
        let highlighted = self.matches.contains(&node.path)
            || node.blank_text.iter().any(|p| self.matches.contains(p))
            || match &node.kind {
                XmlNodeKind::Element { attributes, .. } => {
                    attributes.iter().any(|a| self.matches.contains(&a.path))
                }
                _ => false,
            };

        out.lines.push(RenderedLine {
            line_number,
            path: node.path.clone(),
            depth,
            text,
            highlighted,
            expandable: node.is_expandable(),
            expanded: self.is_expanded(&node.path),
        });
        line_number
    }

    fn render_node(&self, node: &XmlNode, depth: usize, out: &mut Rendering) {
        let expanded = node.is_expandable() && self.is_expanded(&node.path);

        let line = match &node.kind {
            XmlNodeKind::Document => self.push_line(node, depth, "#document".to_string(), out),
            XmlNodeKind::Element { name, attributes } => {
                let attrs: String = attributes
                    .iter()
                    .map(|a| format!(" {}=\"{}\"", a.name, a.value))
                    .collect();
                let text = if !node.is_expandable() {
                    format!("<{}{}/>", name, attrs)
                } else if expanded {
                    format!("<{}{}>", name, attrs)
                } else {
                    format!("<{}{}>\u{2026}</{}>", name, attrs, name)
                };
                let line = self.push_line(node, depth, text, out);
                for attr in attributes {
                    out.line_for_path.insert(attr.path.clone(), line);
                }
                line
            }
            XmlNodeKind::Text(text) => self.push_line(node, depth, text.clone(), out),
            XmlNodeKind::Comment(text) => {
                self.push_line(node, depth, format!("<!--{}-->", text), out)
            }
            XmlNodeKind::ProcessingInstruction { target, value } => {
                self.push_line(node, depth, format!("<?{} {}?>", target, value), out)
            }
        };
        out.line_for_path.insert(node.path.clone(), line);
        for path in &node.blank_text {
            out.line_for_path.insert(path.clone(), line);
        }

        if !expanded {
            return;
        }

        for child in &node.children {
            self.render_node(child, depth + 1, out);
        }

        if let XmlNodeKind::Element { name, .. } = &node.kind {
            let line_number = out.lines.len() + 1;
            out.lines.push(RenderedLine {
                line_number,
                path: node.path.clone(),
                depth,
                text: format!("</{}>", name),
                highlighted: false,
                expandable: false,
                expanded: false,
            });
        }
    }

    /// Line of the first match in the current rendering, if visible.
    pub fn first_match_line(&self) -> Option<usize> {
        let first = self.result.matching_nodes.first()?;
        self.render().line_for_path.get(first).copied()
    }

    /// Scroll the first match into view, retrying with a growing delay while
    /// the target reports the line is not there yet.
    pub fn reveal_first_match(&self, target: &mut dyn ScrollTarget, policy: &RevealPolicy) -> bool {
        let Some(line) = self.first_match_line() else {
            return false;
        };

        if target.scroll_to_line(line) {
            return true;
        }

        for attempt in 1..=policy.retries {
            sleep(policy.base_delay * attempt);
            if target.scroll_to_line(line) {
                tracing::debug!(line, attempt, "revealed first match");
                return true;
            }
        }

        tracing::warn!(line, retries = policy.retries, "could not reveal first match");
        false
    }
}
