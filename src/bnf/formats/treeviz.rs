//! Treeviz formatter for parse trees
//!
//! One line per node, nesting drawn with box connectors:
//!
//! ```text
//! ○ Expr
//! ├─ ○ Term
//! │ └─ " a
//! ├─ " +
//! └─ ○ Term
//!   └─ " a
//! ```
//!
//! Icons: `○` rule, `"` literal leaf, `/` regex leaf. Leaf text is escaped and truncated to
//! 30 characters.

use super::registry::{AstFormatter, FormatError};
use crate::bnf::ast::{AstNode, REGEX, TERMINAL};

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        s.to_string()
    }
}

fn get_icon(node_type: &str) -> &'static str {
    match node_type {
        TERMINAL => "\"",
        REGEX => "/",
        _ => "○",
    }
}

fn label(node: &AstNode) -> String {
    if node.is_leaf() {
        truncate(&node.value.escape_debug().to_string(), 30)
    } else {
        node.node_type.clone()
    }
}

fn format_node(node: &AstNode, prefix: &str, is_last: bool, output: &mut String) {
    let connector = if is_last { "└─" } else { "├─" };
    output.push_str(&format!(
        "{}{} {} {}\n",
        prefix,
        connector,
        get_icon(&node.node_type),
        label(node)
    ));

    let child_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
    format_children(node, &child_prefix, output);
}

fn format_children(node: &AstNode, prefix: &str, output: &mut String) {
    let count = node.children.len();
    for (i, child) in node.children.iter().enumerate() {
        format_node(child, prefix, i + 1 == count, output);
    }
}

pub fn to_treeviz_str(tree: &AstNode) -> String {
    let mut output = format!("{} {}\n", get_icon(&tree.node_type), label(tree));
    format_children(tree, "", &mut output);
    output
}

/// Formatter implementation for treeviz format
pub struct TreevizFormatter;

impl AstFormatter for TreevizFormatter {
    fn name(&self) -> &str {
        "treeviz"
    }

    fn serialize(&self, tree: &AstNode) -> Result<String, FormatError> {
        Ok(to_treeviz_str(tree))
    }

    fn description(&self) -> &str {
        "Visual tree, one line per node"
    }
}
