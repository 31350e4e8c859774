use crate::error::AstError;
use crate::signature::{NodeKind, Signature};
use crate::symbol::{Builtin, Symbol, REFERENCE_PREFIX, REST_REFERENCE_PREFIX};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::fmt;
use std::sync::Arc;

/// Shared handle to an immutable expression node.
///
/// Rewriting never mutates a node in place: it builds new nodes and shares
/// every unchanged subtree with the input.
pub type Node = Arc<Expr>;

/// Expression tree node.
///
/// Structural equality (`==`) compares kind, head and children recursively.
/// Metadata attached through [`crate::metadata::NodeMetadata`] lives outside
/// the node and never participates in equality, hashing or ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    /// Exact rational leaf.
    Number(BigRational),
    /// Named symbol leaf.
    Symbol(Symbol),
    /// Opaque tagged leaf (e.g. `Undefined`).
    Opaque(Symbol),
    Unary(Symbol, [Node; 1]),
    Binary(Symbol, [Node; 2]),
    Ternary(Symbol, [Node; 3]),
    /// Branch with one or more ordered children.
    NAry(Symbol, Vec<Node>),
}

impl Expr {
    // Helper constructors for cleaner code

    pub fn num(n: i64) -> Node {
        Arc::new(Expr::Number(BigRational::from_integer(BigInt::from(n))))
    }

    /// Build `numer/denom`.
    ///
    /// # Panics
    /// Panics if `denom` is zero.
    pub fn rational(numer: i64, denom: i64) -> Node {
        Arc::new(Expr::Number(BigRational::new(
            BigInt::from(numer),
            BigInt::from(denom),
        )))
    }

    pub fn number(value: BigRational) -> Node {
        Arc::new(Expr::Number(value))
    }

    pub fn sym(name: &str) -> Node {
        Arc::new(Expr::Symbol(Symbol::new(name)))
    }

    pub fn opaque(tag: &str) -> Node {
        Arc::new(Expr::Opaque(Symbol::new(tag)))
    }

    /// Pattern placeholder `$name`.
    pub fn reference(name: &str) -> Node {
        Arc::new(Expr::Symbol(Symbol::from(format!(
            "{}{}",
            REFERENCE_PREFIX, name
        ))))
    }

    /// Pattern placeholder `$$name` for the unclaimed children of a
    /// commutative branch.
    pub fn rest_reference(name: &str) -> Node {
        Arc::new(Expr::Symbol(Symbol::from(format!(
            "{}{}",
            REST_REFERENCE_PREFIX, name
        ))))
    }

    pub fn unary(head: impl Into<Symbol>, arg: Node) -> Node {
        Arc::new(Expr::Unary(head.into(), [arg]))
    }

    pub fn binary(head: impl Into<Symbol>, lhs: Node, rhs: Node) -> Node {
        Arc::new(Expr::Binary(head.into(), [lhs, rhs]))
    }

    pub fn ternary(head: impl Into<Symbol>, a: Node, b: Node, c: Node) -> Node {
        Arc::new(Expr::Ternary(head.into(), [a, b, c]))
    }

    /// Build an n-ary branch. Fails on an empty child list.
    pub fn nary(head: impl Into<Symbol>, children: Vec<Node>) -> Result<Node, AstError> {
        let head = head.into();
        if children.is_empty() {
            return Err(AstError::InvalidArgument(format!(
                "n-ary branch '{}' needs at least one child",
                head
            )));
        }
        Ok(Arc::new(Expr::NAry(head, children)))
    }

    pub fn add(lhs: Node, rhs: Node) -> Node {
        Arc::new(Expr::NAry(Builtin::Sum.symbol(), vec![lhs, rhs]))
    }

    pub fn mul(lhs: Node, rhs: Node) -> Node {
        Arc::new(Expr::NAry(Builtin::Product.symbol(), vec![lhs, rhs]))
    }

    pub fn sum(terms: Vec<Node>) -> Result<Node, AstError> {
        Expr::nary(Builtin::Sum, terms)
    }

    pub fn product(factors: Vec<Node>) -> Result<Node, AstError> {
        Expr::nary(Builtin::Product, factors)
    }

    pub fn pow(base: Node, exp: Node) -> Node {
        Expr::binary(Builtin::Power, base, exp)
    }

    /// `-x` is represented as `Product(-1, x)`.
    pub fn neg(expr: Node) -> Node {
        Expr::mul(Expr::num(-1), expr)
    }

    pub fn sin(arg: Node) -> Node {
        Expr::unary(Builtin::Sin, arg)
    }

    pub fn cos(arg: Node) -> Node {
        Expr::unary(Builtin::Cos, arg)
    }

    pub fn tan(arg: Node) -> Node {
        Expr::unary(Builtin::Tan, arg)
    }

    pub fn pi() -> Node {
        Arc::new(Expr::Symbol(Builtin::Pi.symbol()))
    }

    pub fn e() -> Node {
        Arc::new(Expr::Symbol(Builtin::E.symbol()))
    }

    pub fn imaginary_unit() -> Node {
        Arc::new(Expr::Symbol(Builtin::I.symbol()))
    }

    pub fn undefined() -> Node {
        Arc::new(Expr::Opaque(Builtin::Undefined.symbol()))
    }
}

impl Expr {
    #[inline]
    pub fn kind(&self) -> NodeKind {
        NodeKind::from_expr(self)
    }

    #[inline]
    pub fn signature(&self) -> Signature {
        Signature::of(self)
    }

    /// Head symbol of a branch (`None` for leaves).
    pub fn head(&self) -> Option<&Symbol> {
        match self {
            Expr::Number(_) | Expr::Symbol(_) | Expr::Opaque(_) => None,
            Expr::Unary(h, _) | Expr::Binary(h, _) | Expr::Ternary(h, _) | Expr::NAry(h, _) => {
                Some(h)
            }
        }
    }

    /// Ordered children (empty for leaves).
    pub fn children(&self) -> &[Node] {
        match self {
            Expr::Number(_) | Expr::Symbol(_) | Expr::Opaque(_) => &[],
            Expr::Unary(_, c) => &c[..],
            Expr::Binary(_, c) => &c[..],
            Expr::Ternary(_, c) => &c[..],
            Expr::NAry(_, c) => &c[..],
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.kind().is_leaf()
    }

    pub fn as_number(&self) -> Option<&BigRational> {
        match self {
            Expr::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Expr::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// True if this is a branch with the given head.
    pub fn has_head(&self, builtin: Builtin) -> bool {
        self.head().is_some_and(|h| h.is(builtin))
    }

    /// True if this is the symbol leaf naming the given builtin.
    pub fn is_symbol(&self, builtin: Builtin) -> bool {
        matches!(self, Expr::Symbol(s) if s.is(builtin))
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Number(n) if n.is_zero())
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Number(n) if n.is_one())
    }

    /// Placeholder symbol leaf (`$r` or `$$r`).
    pub fn is_reference(&self) -> bool {
        matches!(self, Expr::Symbol(s) if s.is_reference())
    }
}

// =============================================================================
// Display
// =============================================================================

impl Expr {
    fn precedence(&self) -> u8 {
        match self {
            Expr::NAry(h, _) if h.is(Builtin::Sum) => 1,
            Expr::NAry(h, _) if h.is(Builtin::Product) => 2,
            Expr::Number(n) if !n.is_integer() || n.is_negative() => 2,
            Expr::Binary(h, _) if h.is(Builtin::Power) => 3,
            _ => 5,
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, operand: &Expr, min_prec: u8) -> fmt::Result {
    if operand.precedence() < min_prec {
        write!(f, "({})", operand)
    } else {
        write!(f, "{}", operand)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => {
                if n.is_integer() {
                    write!(f, "{}", n.numer())
                } else {
                    write!(f, "{}/{}", n.numer(), n.denom())
                }
            }
            Expr::Symbol(s) => write!(f, "{}", s),
            Expr::Opaque(tag) => write!(f, "<{}>", tag),
            Expr::NAry(h, children) if h.is(Builtin::Sum) || h.is(Builtin::Product) => {
                let sep = if h.is(Builtin::Sum) { " + " } else { " * " };
                let my_prec = self.precedence();
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(sep)?;
                    }
                    // Strictly greater: a nested Sum inside a Sum keeps its parens.
                    write_operand(f, child, my_prec + 1)?;
                }
                Ok(())
            }
            Expr::Binary(h, [base, exp]) if h.is(Builtin::Power) => {
                write_operand(f, base, 4)?;
                f.write_str("^")?;
                write_operand(f, exp, 4)
            }
            _ => {
                // Safe: every non-leaf variant has a head.
                let head = self.head().map(Symbol::as_str).unwrap_or_default();
                write!(f, "{}(", head)?;
                for (i, child) in self.children().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", child)?;
                }
                f.write_str(")")
            }
        }
    }
}
