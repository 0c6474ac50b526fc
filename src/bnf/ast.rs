//! Parse tree produced by a successful match
//!
//! Leaves carry the matched text and one of the sentinel types [`TERMINAL`] or [`REGEX`].
//! Internal nodes carry the name of the rule that produced them and their children in input
//! order. Trees are built bottom-up during matching and never mutated afterwards.

use serde::Serialize;
use std::fmt;

/// Node type of a leaf produced by a literal
pub const TERMINAL: &str = "TERMINAL";

/// Node type of a leaf produced by a regex atom
pub const REGEX: &str = "REGEX";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AstNode {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AstNode>,
}

impl AstNode {
    pub fn terminal(value: impl Into<String>) -> Self {
        Self::leaf(TERMINAL, value)
    }

    pub fn regex(value: impl Into<String>) -> Self {
        Self::leaf(REGEX, value)
    }

    /// Internal node for a rule
    pub fn rule(name: impl Into<String>, children: Vec<AstNode>) -> Self {
        Self {
            node_type: name.into(),
            value: String::new(),
            children,
        }
    }

    fn leaf(node_type: &str, value: impl Into<String>) -> Self {
        Self {
            node_type: node_type.to_string(),
            value: value.into(),
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.node_type == TERMINAL || self.node_type == REGEX
    }

    /// Concatenation of every leaf value below this node, i.e. the input span it covers
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if self.is_leaf() {
            out.push_str(&self.value);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// Depth-first search for the first node of the given type
    pub fn find(&self, node_type: &str) -> Option<&AstNode> {
        if self.node_type == node_type {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(node_type))
    }
}

/// S-expression form: leaves render as their quoted text, rules as `(Name child ...)`
impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_leaf() {
            return write!(f, "{:?}", self.value);
        }
        write!(f, "({}", self.node_type)?;
        for child in &self.children {
            write!(f, " {}", child)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AstNode {
        AstNode::rule(
            "S",
            vec![
                AstNode::terminal("a"),
                AstNode::rule("T", vec![AstNode::regex("bc")]),
            ],
        )
    }

    #[test]
    fn test_display_sexpr() {
        assert_eq!(sample().to_string(), r#"(S "a" (T "bc"))"#);
    }

    #[test]
    fn test_display_escapes_leaf_text() {
        let node = AstNode::rule("Q", vec![AstNode::terminal("\"\n")]);
        assert_eq!(node.to_string(), r#"(Q "\"\n")"#);
    }

    #[test]
    fn test_empty_rule_display() {
        assert_eq!(AstNode::rule("E", vec![]).to_string(), "(E)");
    }

    #[test]
    fn test_text_concatenates_leaves() {
        assert_eq!(sample().text(), "abc");
    }

    #[test]
    fn test_find() {
        let tree = sample();
        assert_eq!(tree.find("T").map(|n| n.children.len()), Some(1));
        assert!(tree.find("missing").is_none());
        assert!(tree.find(REGEX).is_some());
    }

    #[test]
    fn test_serialize_skips_empty_fields() {
        let json = serde_json::to_string(&AstNode::terminal("x")).unwrap();
        assert_eq!(json, r#"{"type":"TERMINAL","value":"x"}"#);
    }
}
