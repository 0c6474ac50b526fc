//! serde-backed formats
//!
//! Leaves serialize as `{"type": "TERMINAL", "value": "a"}`, rules as
//! `{"type": "Name", "children": [...]}`.

use super::registry::{AstFormatter, FormatError};
use crate::bnf::ast::AstNode;

pub struct JsonFormatter;

impl AstFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn serialize(&self, tree: &AstNode) -> Result<String, FormatError> {
        serde_json::to_string_pretty(tree)
            .map_err(|e| FormatError::SerializationError(e.to_string()))
    }

    fn description(&self) -> &str {
        "Pretty-printed JSON"
    }
}

pub struct YamlFormatter;

impl AstFormatter for YamlFormatter {
    fn name(&self) -> &str {
        "yaml"
    }

    fn serialize(&self, tree: &AstNode) -> Result<String, FormatError> {
        serde_yaml::to_string(tree).map_err(|e| FormatError::SerializationError(e.to_string()))
    }

    fn description(&self) -> &str {
        "YAML document"
    }
}
