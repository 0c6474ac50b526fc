//! Packrat matching engine
//!
//! [`Context`] owns all per-call state: the memo table keyed by `(NodeId, position)`, the
//! per-position active counters that guard left-recursion growth, the rule call stack and
//! the farthest-failure record. Node semantics live in `variants`; they only ever evaluate
//! children through [`Context::eval`].
//!
//! Nesting in the grammar becomes nesting on the call stack: right recursion over `n`
//! characters is `n` levels deep. Evaluation and tree building move onto heap-allocated
//! stack segments (via `stacker`) when the current stack runs low, so deep inputs are
//! bounded by memory rather than by the size of the calling thread's stack.

mod context;
mod result;
mod variants;

pub use context::Context;
pub use result::{Fragments, MatchResult, Matches};

/// Remaining stack below which evaluation continues on a fresh segment
pub(crate) const RED_ZONE: usize = 128 * 1024;
/// Size of each additional stack segment
pub(crate) const STACK_SEGMENT: usize = 2 * 1024 * 1024;
