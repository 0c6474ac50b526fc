use super::registry::{AstFormatter, FormatError};
use crate::bnf::ast::AstNode;

/// `(Rule child ...)` with quoted leaves, on a single line
pub struct SexprFormatter;

impl AstFormatter for SexprFormatter {
    fn name(&self) -> &str {
        "sexpr"
    }

    fn serialize(&self, tree: &AstNode) -> Result<String, FormatError> {
        Ok(tree.to_string())
    }

    fn description(&self) -> &str {
        "S-expression, one line"
    }
}
