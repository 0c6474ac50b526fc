//! Output formats for parse trees
//!
//! - `sexpr`: the compact `(Rule child ...)` form, the same as `AstNode`'s `Display`
//! - `treeviz`: one line per node with box-drawing connectors
//! - `json`, `yaml`: serde serialization of the tree

pub mod registry;
pub mod serde_formats;
pub mod sexpr;
pub mod treeviz;

pub use registry::{AstFormatter, FormatError, FormatRegistry, FORMATS};
pub use serde_formats::{JsonFormatter, YamlFormatter};
pub use sexpr::SexprFormatter;
pub use treeviz::{to_treeviz_str, TreevizFormatter};
