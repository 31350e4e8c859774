//! Structural signatures used for rule dispatch.
//!
//! [`NodeKind`] is a one-to-one mapping to `Expr` discriminants and doubles as
//! the kind rank of the canonical node order. [`Signature`] pairs a kind with
//! the node's head symbol (or leaf name) and is the key of the dispatch index.

use crate::expression::Expr;
use crate::symbol::Symbol;
use std::fmt;

// =============================================================================
// NodeKind enum
// =============================================================================

/// Kind of an expression node.
///
/// The discriminant order is the rank used by the canonical node order:
/// numbers sort first, n-ary branches last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum NodeKind {
    Number = 0,
    Symbol = 1,
    Opaque = 2,
    Unary = 3,
    Binary = 4,
    Ternary = 5,
    NAry = 6,
}

impl NodeKind {
    /// Total number of variants (used for iteration bounds).
    pub const COUNT: usize = 7;

    /// Exhaustive: adding an `Expr` variant without updating this is a
    /// compile error.
    #[inline]
    pub fn from_expr(expr: &Expr) -> Self {
        match expr {
            Expr::Number(..) => Self::Number,
            Expr::Symbol(..) => Self::Symbol,
            Expr::Opaque(..) => Self::Opaque,
            Expr::Unary(..) => Self::Unary,
            Expr::Binary(..) => Self::Binary,
            Expr::Ternary(..) => Self::Ternary,
            Expr::NAry(..) => Self::NAry,
        }
    }

    #[inline]
    pub const fn rank(self) -> u8 {
        self as u8
    }

    #[inline]
    pub const fn is_leaf(self) -> bool {
        matches!(self, Self::Number | Self::Symbol | Self::Opaque)
    }

    /// Child count of the fixed-arity branch kinds.
    pub const fn fixed_arity(self) -> Option<usize> {
        match self {
            Self::Unary => Some(1),
            Self::Binary => Some(2),
            Self::Ternary => Some(3),
            _ => None,
        }
    }

    /// Fixed-arity branch kind for a child count.
    pub const fn for_fixed_arity(arity: usize) -> Option<Self> {
        match arity {
            1 => Some(Self::Unary),
            2 => Some(Self::Binary),
            3 => Some(Self::Ternary),
            _ => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Number => "Number",
            Self::Symbol => "Symbol",
            Self::Opaque => "Opaque",
            Self::Unary => "Unary",
            Self::Binary => "Binary",
            Self::Ternary => "Ternary",
            Self::NAry => "NAry",
        })
    }
}

// =============================================================================
// Signature
// =============================================================================

/// (kind, head) pair identifying which rules could possibly apply to a node.
///
/// `head` is the symbol name for symbol leaves, the tag for opaque leaves,
/// the head symbol for branches and `None` for numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub kind: NodeKind,
    pub head: Option<Symbol>,
}

impl Signature {
    pub fn new(kind: NodeKind, head: Option<Symbol>) -> Self {
        Self { kind, head }
    }

    pub fn of(expr: &Expr) -> Self {
        let head = match expr {
            Expr::Number(_) => None,
            Expr::Symbol(s) | Expr::Opaque(s) => Some(s.clone()),
            Expr::Unary(h, _) | Expr::Binary(h, _) | Expr::Ternary(h, _) | Expr::NAry(h, _) => {
                Some(h.clone())
            }
        };
        Self {
            kind: NodeKind::from_expr(expr),
            head,
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.head {
            Some(h) => write!(f, "{}:{}", self.kind, h),
            None => write!(f, "{}", self.kind),
        }
    }
}
