use sxd_xpath::nodeset::Node;

/// Step name used for a node in its canonical path.
fn step_name(node: &Node<'_>) -> String {
    match node {
        Node::Element(_) => node.prefixed_name().unwrap_or_default(),
        Node::Text(_) => "text()".to_string(),
        Node::Comment(_) => "comment()".to_string(),
        Node::ProcessingInstruction(_) => "processing-instruction()".to_string(),
        Node::Attribute(_) => format!("@{}", node.prefixed_name().unwrap_or_default()),
        Node::Namespace(_) => format!("namespace::{}", node.prefixed_name().unwrap_or_default()),
        Node::Root(_) => String::new(),
    }
}

/// Path of the parent, as a prefix for a child step. The document root
/// contributes nothing so top-level elements read `/name`.
fn parent_prefix(parent: Option<Node<'_>>) -> String {
    match parent {
        Some(Node::Root(_)) | None => String::new(),
        Some(p) => node_path(&p),
    }
}

/// Canonical location path of a node.
///
/// Elements carry a 1-based `[n]` position among siblings with the same
/// name; the index is omitted when the element is the only one. Text,
/// comment and processing-instruction steps are indexed among siblings of
/// the same kind in the same way. The document root is `/`.
pub fn node_path(node: &Node<'_>) -> String {
    let parent = node.parent();

    match node {
        Node::Root(_) => "/".to_string(),
        Node::Attribute(_) | Node::Namespace(_) => {
            format!("{}/{}", parent_prefix(parent), step_name(node))
        }
        _ => {
            let step = step_name(node);
            let siblings: Vec<Node<'_>> = parent
                .map(|p| {
                    p.children()
                        .into_iter()
                        .filter(|sib| same_kind(sib, node) && step_name(sib) == step)
                        .collect()
                })
                .unwrap_or_default();

            let index = if siblings.len() > 1 {
                siblings
                    .iter()
                    .position(|sib| sib == node)
                    .map(|i| format!("[{}]", i + 1))
                    .unwrap_or_default()
            } else {
                String::new()
            };

            format!("{}/{}{}", parent_prefix(parent), step, index)
        }
    }
}

fn same_kind(a: &Node<'_>, b: &Node<'_>) -> bool {
    matches!(
        (a, b),
        (Node::Element(_), Node::Element(_))
            | (Node::Text(_), Node::Text(_))
            | (Node::Comment(_), Node::Comment(_))
            | (Node::ProcessingInstruction(_), Node::ProcessingInstruction(_))
    )
}
