use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::project::project_model::{Page, module_segments};

pub const UNCATEGORIZED_TITLE: &str = "Uncategorized";
pub const UNCATEGORIZED_KEY: &str = "module:__uncategorized__";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TreeNodeKind {
    Module,
    Page,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    /// `module:<cumulative path>` or `page:<id>`
    pub key: String,
    pub title: String,
    pub kind: TreeNodeKind,
    pub page_id: Option<String>,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Number of page leaves below (and including) this node.
    pub fn page_count(&self) -> usize {
        match self.kind {
            TreeNodeKind::Page => 1,
            TreeNodeKind::Module => self.children.iter().map(TreeNode::page_count).sum(),
        }
    }
}

/// Display forest for the page list plus the module keys to expand so that
/// every search match is visible.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageTree {
    pub roots: Vec<TreeNode>,
    pub expanded_keys: BTreeSet<String>,
}

impl PageTree {
    /// Depth-first iterator over every node.
    pub fn walk(&self) -> Vec<&TreeNode> {
        fn visit<'a>(node: &'a TreeNode, out: &mut Vec<&'a TreeNode>) {
            out.push(node);
            for child in &node.children {
                visit(child, out);
            }
        }

        let mut out = Vec::new();
        for root in &self.roots {
            visit(root, &mut out);
        }
        out
    }
}

pub fn module_key(path: &str) -> String {
    format!("module:{}", path)
}

pub fn page_key(page_id: &str) -> String {
    format!("page:{}", page_id)
}

// ============================================================================
// Intermediate grouping
// ============================================================================

/// Module node under construction. Children are keyed by segment name so a
/// cumulative path is only ever created once.
struct ModuleGroup<'p> {
    key: String,
    title: String,
    synthetic: bool,
    modules: BTreeMap<String, ModuleGroup<'p>>,
    pages: Vec<&'p Page>,
}

impl<'p> ModuleGroup<'p> {
    fn new(key: String, title: &str) -> Self {
        Self {
            key,
            title: title.to_string(),
            synthetic: false,
            modules: BTreeMap::new(),
            pages: Vec::new(),
        }
    }
}

fn group_pages(pages: &[Page]) -> BTreeMap<String, ModuleGroup<'_>> {
    let mut roots: BTreeMap<String, ModuleGroup<'_>> = BTreeMap::new();

    for page in pages {
        let segments = module_segments(&page.module);

        if segments.is_empty() {
            let group = roots
                .entry(UNCATEGORIZED_KEY.to_string())
                .or_insert_with(|| {
                    let mut g = ModuleGroup::new(UNCATEGORIZED_KEY.to_string(), UNCATEGORIZED_TITLE);
                    g.synthetic = true;
                    g
                });
            group.pages.push(page);
            continue;
        }

        insert_page(&mut roots, "", &segments, page);
    }

    roots
}

fn insert_page<'p>(
    level: &mut BTreeMap<String, ModuleGroup<'p>>,
    prefix: &str,
    segments: &[&str],
    page: &'p Page,
) {
    let Some((segment, rest)) = segments.split_first() else {
        return;
    };

    let path = if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{}/{}", prefix, segment)
    };
    let key = module_key(&path);
    let group = level
        .entry(key.clone())
        .or_insert_with(|| ModuleGroup::new(key, segment));

    if rest.is_empty() {
        group.pages.push(page);
    } else {
        insert_page(&mut group.modules, &path, rest, page);
    }
}

// ============================================================================
// Filtering + conversion
// ============================================================================

fn page_matches(page: &Page, term: &str) -> bool {
    term.is_empty()
        || page.name.to_lowercase().contains(term)
        || page.description.to_lowercase().contains(term)
        || page.module.to_lowercase().contains(term)
}

/// Convert a group into a tree node, or `None` when nothing in it survives
/// the filter. Keys of modules leading to matches go into `expanded`.
fn build_node(
    group: ModuleGroup<'_>,
    term: &str,
    expanded: &mut BTreeSet<String>,
) -> Option<TreeNode> {
    let mut children: Vec<TreeNode> = group
        .modules
        .into_values()
        .filter_map(|child| build_node(child, term, expanded))
        .collect();

    children.extend(
        group
            .pages
            .into_iter()
            .filter(|page| page_matches(page, term))
            .map(|page| TreeNode {
                key: page_key(&page.id),
                title: page.name.clone(),
                kind: TreeNodeKind::Page,
                page_id: Some(page.id.clone()),
                children: Vec::new(),
            }),
    );

    let name_matches =
        !group.synthetic && !term.is_empty() && group.title.to_lowercase().contains(term);
    let keep = if term.is_empty() {
        !children.is_empty() || !group.synthetic
    } else {
        name_matches || !children.is_empty()
    };

    if !keep {
        return None;
    }

    if !term.is_empty() && !children.is_empty() {
        expanded.insert(group.key.clone());
    }

    children.sort_by(compare_nodes);

    Some(TreeNode {
        key: group.key,
        title: group.title,
        kind: TreeNodeKind::Module,
        page_id: None,
        children,
    })
}

/// Modules before pages, then case-insensitive title, then key for a total
/// order.
fn compare_nodes(a: &TreeNode, b: &TreeNode) -> Ordering {
    let rank = |n: &TreeNode| match n.kind {
        TreeNodeKind::Module => 0,
        TreeNodeKind::Page => 1,
    };

    rank(a)
        .cmp(&rank(b))
        .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
        .then_with(|| a.key.cmp(&b.key))
}

/// Group pages into a module forest and filter it by `search`.
///
/// Module path segments become module nodes keyed by cumulative path; pages
/// without a module land under a synthetic "Uncategorized" node. With a
/// non-blank search term only matching pages and the modules leading to them
/// (or modules whose own name matches) are kept, and `expanded_keys` holds
/// the module keys that reveal the matches.
pub fn build_page_tree(pages: &[Page], search: &str) -> PageTree {
    let term = search.trim().to_lowercase();
    let mut expanded_keys = BTreeSet::new();

    let mut roots: Vec<TreeNode> = group_pages(pages)
        .into_values()
        .filter_map(|group| build_node(group, &term, &mut expanded_keys))
        .collect();
    roots.sort_by(compare_nodes);

    tracing::debug!(
        pages = pages.len(),
        roots = roots.len(),
        expanded = expanded_keys.len(),
        "built page tree"
    );

    PageTree {
        roots,
        expanded_keys,
    }
}
