//! Error types for sym_ast crate.

use thiserror::Error;

/// Errors that can occur while building expression trees.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AstError {
    /// A factory was called with arguments that cannot form a valid node
    /// (e.g. an n-ary branch with zero children).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
