//! Composable pattern matchers.
//!
//! A [`Matcher`] tests a node and threads [`Bindings`] through the match.
//! Matching is pure: the input bindings are never mutated, a successful
//! match returns extended bindings and a failed match returns `None`.
//!
//! # Capability classes
//!
//! - Leaf matchers: `Anything`, `Nothing`, `AnyNumber`, `AnySymbol`,
//!   `Exact`, `Bind`
//! - Transparent wrappers: `Named`, `Precondition`, `Postcondition`
//! - Branch matchers: `Fixed` (1..=3 children), `Ordered` (n-ary, positional)
//!   and `Commutative` (n-ary, unordered, optional remainder)

mod commutative;
mod compile;
mod order;

pub use commutative::CommutativeMatcher;
pub use compile::compile_pattern;
pub use order::{chain_decomposition, SortRange};

use crate::bindings::Bindings;
use crate::engine::Calculator;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use sym_ast::{deep_equals, Context, Expr, Node, NodeKind, Symbol};

// =============================================================================
// MatchContext
// =============================================================================

/// Lexical context of a match plus the calculator driving it.
///
/// Conditions and replacement builders use the calculator handle to consult
/// options (e.g. the number domain) or to run nested matches.
#[derive(Clone)]
pub struct MatchContext<'a> {
    scope: Context<'a>,
    calculator: &'a Calculator,
}

impl<'a> MatchContext<'a> {
    /// Root context (depth 0, nothing bound).
    pub fn root(calculator: &'a Calculator) -> Self {
        Self {
            scope: Context::root(calculator.qualifiers()),
            calculator,
        }
    }

    pub fn from_scope(calculator: &'a Calculator, scope: Context<'a>) -> Self {
        Self { scope, calculator }
    }

    /// Context for child `child_index` of `parent`.
    pub fn enter(&self, parent: &Expr, child_index: usize) -> Self {
        Self {
            scope: self.scope.enter(parent, child_index),
            calculator: self.calculator,
        }
    }

    pub fn scope(&self) -> &Context<'a> {
        &self.scope
    }

    pub fn calculator(&self) -> &'a Calculator {
        self.calculator
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.scope.depth()
    }

    pub fn is_bound(&self, name: &Symbol) -> bool {
        self.scope.is_bound(name)
    }
}

impl fmt::Debug for MatchContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchContext")
            .field("depth", &self.scope.depth())
            .field("bound", &self.scope.bound_names())
            .finish()
    }
}

// =============================================================================
// Matcher
// =============================================================================

/// Externally supplied check over node, context and bindings.
pub type Condition = Arc<dyn Fn(&Node, &MatchContext<'_>, &Bindings) -> bool + Send + Sync>;

#[derive(Clone)]
pub enum Matcher {
    Anything,
    /// Matches nothing. Never stored by the dispatch index.
    Nothing,
    AnyNumber,
    AnySymbol,
    /// Structural equality to a fixed node.
    Exact(Node),
    /// Bind the node to a reference name (or check an existing binding).
    Bind(Symbol),
    /// Match the inner matcher and also bind the matched node.
    Named(Symbol, Box<Matcher>),
    /// Checked against the incoming bindings before the inner match.
    Precondition(Box<Matcher>, Condition),
    /// Checked against the inner match's bindings.
    Postcondition(Box<Matcher>, Condition),
    /// Unary/binary/ternary branch; arity is `children.len()`.
    Fixed { head: Symbol, children: Vec<Matcher> },
    /// N-ary branch matched positionally.
    Ordered { head: Symbol, children: Vec<Matcher> },
    Commutative(CommutativeMatcher),
}

impl Matcher {
    pub fn exact(node: Node) -> Self {
        Matcher::Exact(node)
    }

    pub fn bind(name: impl Into<Symbol>) -> Self {
        Matcher::Bind(name.into())
    }

    pub fn named(name: impl Into<Symbol>, inner: Matcher) -> Self {
        Matcher::Named(name.into(), Box::new(inner))
    }

    pub fn fixed(head: impl Into<Symbol>, children: Vec<Matcher>) -> Self {
        debug_assert!((1..=3).contains(&children.len()));
        Matcher::Fixed {
            head: head.into(),
            children,
        }
    }

    pub fn ordered(head: impl Into<Symbol>, children: Vec<Matcher>) -> Self {
        Matcher::Ordered {
            head: head.into(),
            children,
        }
    }

    pub fn commutative(head: impl Into<Symbol>, children: Vec<Matcher>, rest: Option<Matcher>) -> Self {
        Matcher::Commutative(CommutativeMatcher::new(head, children, rest))
    }

    pub fn with_precondition<F>(self, cond: F) -> Self
    where
        F: Fn(&Node, &MatchContext<'_>, &Bindings) -> bool + Send + Sync + 'static,
    {
        Matcher::Precondition(Box::new(self), Arc::new(cond))
    }

    pub fn with_postcondition<F>(self, cond: F) -> Self
    where
        F: Fn(&Node, &MatchContext<'_>, &Bindings) -> bool + Send + Sync + 'static,
    {
        Matcher::Postcondition(Box::new(self), Arc::new(cond))
    }

    /// Test `node`, extending `bindings` on success.
    pub fn match_node(&self, node: &Node, ctx: &MatchContext<'_>, bindings: &Bindings) -> Option<Bindings> {
        match self {
            Matcher::Anything => Some(bindings.clone()),
            Matcher::Nothing => None,
            Matcher::AnyNumber => matches!(node.as_ref(), Expr::Number(_)).then(|| bindings.clone()),
            Matcher::AnySymbol => matches!(node.as_ref(), Expr::Symbol(_)).then(|| bindings.clone()),
            Matcher::Exact(target) => deep_equals(target, node).then(|| bindings.clone()),
            Matcher::Bind(name) => bindings.with(name, node),
            Matcher::Named(name, inner) => inner.match_node(node, ctx, bindings)?.with(name, node),
            Matcher::Precondition(inner, cond) => {
                if cond(node, ctx, bindings) {
                    inner.match_node(node, ctx, bindings)
                } else {
                    None
                }
            }
            Matcher::Postcondition(inner, cond) => {
                let out = inner.match_node(node, ctx, bindings)?;
                cond(node, ctx, &out).then_some(out)
            }
            Matcher::Fixed { head, children } => {
                let same_shape = NodeKind::for_fixed_arity(children.len()) == Some(node.kind());
                if !same_shape || node.head() != Some(head) {
                    return None;
                }
                match_positional(node, children, ctx, bindings)
            }
            Matcher::Ordered { head, children } => match node.as_ref() {
                Expr::NAry(h, args) if h == head && args.len() == children.len() => {
                    match_positional(node, children, ctx, bindings)
                }
                _ => None,
            },
            Matcher::Commutative(c) => c.match_node(node, ctx, bindings),
        }
    }

    /// Every reference name this matcher can bind.
    pub fn reference_names(&self) -> BTreeSet<Symbol> {
        let mut names = BTreeSet::new();
        self.collect_reference_names(&mut names);
        names
    }

    fn collect_reference_names(&self, out: &mut BTreeSet<Symbol>) {
        match self {
            Matcher::Bind(name) => {
                out.insert(name.clone());
            }
            Matcher::Named(name, inner) => {
                out.insert(name.clone());
                inner.collect_reference_names(out);
            }
            Matcher::Precondition(inner, _) | Matcher::Postcondition(inner, _) => {
                inner.collect_reference_names(out)
            }
            Matcher::Fixed { children, .. } | Matcher::Ordered { children, .. } => {
                for c in children {
                    c.collect_reference_names(out);
                }
            }
            Matcher::Commutative(c) => {
                for m in c.children() {
                    m.collect_reference_names(out);
                }
                if let Some(rest) = c.rest() {
                    rest.collect_reference_names(out);
                }
            }
            Matcher::Anything
            | Matcher::Nothing
            | Matcher::AnyNumber
            | Matcher::AnySymbol
            | Matcher::Exact(_) => {}
        }
    }

    /// Names bound by remainder matchers (`$$r` in templates).
    pub fn rest_reference_names(&self) -> BTreeSet<Symbol> {
        let mut names = BTreeSet::new();
        self.collect_rest_names(&mut names);
        names
    }

    fn collect_rest_names(&self, out: &mut BTreeSet<Symbol>) {
        match self {
            Matcher::Named(_, inner) | Matcher::Precondition(inner, _) | Matcher::Postcondition(inner, _) => {
                inner.collect_rest_names(out)
            }
            Matcher::Fixed { children, .. } | Matcher::Ordered { children, .. } => {
                for c in children {
                    c.collect_rest_names(out);
                }
            }
            Matcher::Commutative(c) => {
                for m in c.children() {
                    m.collect_rest_names(out);
                }
                if let Some(Matcher::Bind(name)) = c.rest() {
                    out.insert(name.clone());
                }
            }
            _ => {}
        }
    }

    /// The single node this matcher could match under `bindings`, if any.
    pub fn determined_node(&self, bindings: &Bindings) -> Option<Node> {
        match self {
            Matcher::Exact(node) => Some(node.clone()),
            Matcher::Bind(name) => bindings.get(name).cloned(),
            Matcher::Named(name, inner) => bindings
                .get(name)
                .cloned()
                .or_else(|| inner.determined_node(bindings)),
            Matcher::Precondition(inner, _) | Matcher::Postcondition(inner, _) => {
                inner.determined_node(bindings)
            }
            Matcher::Fixed { head, children } => {
                fixed_node(head, &determined_children(children, bindings)?)
            }
            Matcher::Ordered { head, children } => {
                let nodes = determined_children(children, bindings)?;
                Expr::nary(head.clone(), nodes).ok()
            }
            // Any permutation of the children matches.
            Matcher::Commutative(_) => None,
            Matcher::Anything | Matcher::Nothing | Matcher::AnyNumber | Matcher::AnySymbol => None,
        }
    }

    pub fn is_fully_determined(&self, bindings: &Bindings) -> bool {
        self.determined_node(bindings).is_some()
    }

    /// Pattern template with reference leaves (`$r`, `$$r`) for this matcher.
    ///
    /// `None` when some part has no template form (`Anything`, `AnyNumber`...).
    pub fn template(&self) -> Option<Node> {
        match self {
            Matcher::Exact(node) => Some(node.clone()),
            Matcher::Bind(name) | Matcher::Named(name, _) => Some(Expr::reference(name.as_str())),
            Matcher::Precondition(inner, _) | Matcher::Postcondition(inner, _) => inner.template(),
            Matcher::Fixed { head, children } => {
                let nodes: Option<Vec<Node>> = children.iter().map(Matcher::template).collect();
                fixed_node(head, &nodes?)
            }
            Matcher::Ordered { head, children } => {
                let nodes: Option<Vec<Node>> = children.iter().map(Matcher::template).collect();
                Expr::nary(head.clone(), nodes?).ok()
            }
            Matcher::Commutative(c) => c.template(),
            Matcher::Anything | Matcher::Nothing | Matcher::AnyNumber | Matcher::AnySymbol => None,
        }
    }

    /// Interval of the canonical order this matcher's nodes lie in.
    pub fn sort_range(&self) -> SortRange {
        match self {
            Matcher::Anything | Matcher::Nothing | Matcher::Bind(_) => SortRange::Unbounded,
            Matcher::AnyNumber => SortRange::Kind(NodeKind::Number),
            Matcher::AnySymbol => SortRange::Kind(NodeKind::Symbol),
            Matcher::Exact(node) => SortRange::Point(node.clone()),
            Matcher::Named(_, inner) | Matcher::Precondition(inner, _) | Matcher::Postcondition(inner, _) => {
                inner.sort_range()
            }
            Matcher::Fixed { head, children } => match NodeKind::for_fixed_arity(children.len()) {
                Some(kind) => SortRange::Head(kind, head.clone()),
                None => SortRange::Unbounded,
            },
            Matcher::Ordered { head, .. } => SortRange::Head(NodeKind::NAry, head.clone()),
            Matcher::Commutative(c) => SortRange::Head(NodeKind::NAry, c.head().clone()),
        }
    }
}

fn match_positional(
    node: &Node,
    children: &[Matcher],
    ctx: &MatchContext<'_>,
    bindings: &Bindings,
) -> Option<Bindings> {
    let mut current = bindings.clone();
    for (i, (matcher, child)) in children.iter().zip(node.children()).enumerate() {
        current = matcher.match_node(child, &ctx.enter(node, i), &current)?;
    }
    Some(current)
}

fn fixed_node(head: &Symbol, nodes: &[Node]) -> Option<Node> {
    match nodes {
        [a] => Some(Expr::unary(head.clone(), a.clone())),
        [a, b] => Some(Expr::binary(head.clone(), a.clone(), b.clone())),
        [a, b, c] => Some(Expr::ternary(head.clone(), a.clone(), b.clone(), c.clone())),
        _ => None,
    }
}

fn determined_children(children: &[Matcher], bindings: &Bindings) -> Option<Vec<Node>> {
    children.iter().map(|c| c.determined_node(bindings)).collect()
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Anything => f.write_str("Anything"),
            Matcher::Nothing => f.write_str("Nothing"),
            Matcher::AnyNumber => f.write_str("AnyNumber"),
            Matcher::AnySymbol => f.write_str("AnySymbol"),
            Matcher::Exact(node) => write!(f, "Exact({})", node),
            Matcher::Bind(name) => write!(f, "Bind({})", name),
            Matcher::Named(name, inner) => write!(f, "Named({}, {:?})", name, inner),
            Matcher::Precondition(inner, _) => write!(f, "Precondition({:?})", inner),
            Matcher::Postcondition(inner, _) => write!(f, "Postcondition({:?})", inner),
            Matcher::Fixed { head, children } => write!(f, "Fixed({}, {:?})", head, children),
            Matcher::Ordered { head, children } => write!(f, "Ordered({}, {:?})", head, children),
            Matcher::Commutative(c) => write!(f, "{:?}", c),
        }
    }
}
