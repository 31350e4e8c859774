//! Immutable expression tree, lexical context and traversal utilities.

pub mod context;
pub mod error;
pub mod expression;
pub mod metadata;
pub mod ordering;
pub mod qualifier;
pub mod signature;
pub mod symbol;
pub mod traversal;

pub use context::{free_variables, traverse_with_context, Context};
pub use error::AstError;
pub use expression::{Expr, Node};
pub use metadata::{MetaKey, NodeMetadata};
pub use ordering::{compare_children, compare_expr, is_canonically_sorted};
pub use qualifier::{QualifierDef, QualifierTable};
pub use signature::{NodeKind, Signature};
pub use symbol::{Builtin, Symbol, REFERENCE_PREFIX, REST_REFERENCE_PREFIX};
pub use traversal::{
    count_all_nodes, count_nodes_and_max_depth, deep_equals, map_children, map_symbol, recur_map,
    traverse, traverse_post_order, try_map_children,
};
