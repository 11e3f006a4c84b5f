use crate::locator::locator_model::{Locator, LocatorSummary};
use crate::recording::condenser::CondenseStats;
use crate::tree::tree_builder::{PageTree, TreeNode, TreeNodeKind};
use crate::xpath::evaluator::XPathResult;
use crate::xpath::highlighter::Rendering;

// ============================================================================
// Console reporter: formatted terminal output
// ============================================================================

/// Format a page tree for terminal output.
///
/// Produces output like:
/// ```text
/// === Pages: 2 ===
///
/// ▸ Auth (1)
///     • Login [3f2a...]
/// ▸ Uncategorized (1)
///     • Home [9c1d...]
/// ```
pub fn format_page_tree(tree: &PageTree) -> String {
    let total: usize = tree.roots.iter().map(TreeNode::page_count).sum();
    let mut out = format!("=== Pages: {} ===\n\n", total);

    if tree.roots.is_empty() {
        out.push_str("(no matching pages)\n");
        return out;
    }

    for root in &tree.roots {
        format_tree_node(root, 0, &mut out);
    }
    out
}

fn format_tree_node(node: &TreeNode, depth: usize, out: &mut String) {
    let indent = "    ".repeat(depth);
    match node.kind {
        TreeNodeKind::Module => {
            out.push_str(&format!(
                "{}\u{25b8} {} ({})\n",
                indent,
                node.title,
                node.page_count()
            ));
        }
        TreeNodeKind::Page => {
            out.push_str(&format!(
                "{}\u{2022} {} [{}]\n",
                indent,
                node.title,
                node.page_id.as_deref().unwrap_or("?")
            ));
        }
    }

    for child in &node.children {
        format_tree_node(child, depth + 1, out);
    }
}

/// Numbered document lines; highlighted lines are marked with `>`.
pub fn format_rendering(rendering: &Rendering) -> String {
    let width = rendering.lines.len().to_string().len();
    let mut out = String::new();

    for line in &rendering.lines {
        let marker = if line.highlighted { '>' } else { ' ' };
        out.push_str(&format!(
            "{:>width$} {} {}{}\n",
            line.line_number,
            marker,
            "  ".repeat(line.depth),
            line.text,
            width = width
        ));
    }
    out
}

pub fn format_xpath_result(result: &XPathResult) -> String {
    let mut out = format!("XPath: {}\n", result.xpath_expression);

    if !result.is_valid {
        out.push_str(&format!(
            "  [INVALID] {}\n",
            result.error.as_deref().unwrap_or("expression could not be evaluated")
        ));
        return out;
    }

    out.push_str(&format!("  Matches: {}\n", result.number_of_matches));
    for path in &result.matching_nodes {
        out.push_str(&format!("    {}\n", path));
    }
    out
}

pub fn format_condense_summary(stats: &CondenseStats) -> String {
    format!(
        "=== Condensed: {} -> {} entries ({} removed) ===\n  xml changed: {}\n  screenshot changed: {}\n  unchanged: {}\n",
        stats.initial_state_count,
        stats.final_state_count,
        stats.removed_state_count,
        stats.xml_changed_count,
        stats.screenshot_changed_count,
        stats.unchanged_count
    )
}

pub fn format_locator_report(locators: &[Locator], summary: &LocatorSummary) -> String {
    let mut out = String::new();

    for locator in locators {
        let status = match (locator.xpath.is_valid, locator.xpath.number_of_matches) {
            (false, _) => "INVALID".to_string(),
            (true, 1) => "\u{2713} UNIQUE".to_string(),
            (true, n) => format!("\u{2717} {} MATCHES", n),
        };
        out.push_str(&format!(
            "{:<14} {}  {}\n",
            status,
            locator.dev_name,
            locator.expression()
        ));
        if let Some(error) = &locator.xpath.error {
            out.push_str(&format!("    [ERROR] {}\n", error));
        }
    }

    out.push_str(&format!(
        "\n=== Locators: {} unique, {} ambiguous, {} unmatched, {} invalid ({} total",
        summary.unique, summary.ambiguous, summary.unmatched, summary.invalid, summary.total
    ));
    if summary.promoted > 0 {
        out.push_str(&format!(", {} promoted", summary.promoted));
    }
    out.push_str(") ===\n");
    out
}
