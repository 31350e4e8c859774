use crate::expression::{Expr, Node};
use crate::qualifier::QualifierTable;
use crate::symbol::Symbol;
use smallvec::SmallVec;
use std::collections::BTreeSet;

/// Lexical context of a node during descent.
///
/// Tracks the names bound by enclosing qualifier heads and the depth from the
/// root. Contexts are cheap values: [`Context::enter`] returns a new one and
/// leaves the parent untouched.
#[derive(Debug, Clone)]
pub struct Context<'q> {
    qualifiers: &'q QualifierTable,
    bound: SmallVec<[Symbol; 4]>,
    depth: usize,
}

impl<'q> Context<'q> {
    /// Context of a root expression: nothing bound, depth 0.
    pub fn root(qualifiers: &'q QualifierTable) -> Self {
        Self {
            qualifiers,
            bound: SmallVec::new(),
            depth: 0,
        }
    }

    pub fn qualifiers(&self) -> &'q QualifierTable {
        self.qualifiers
    }

    /// Context for child `child_index` of `parent`.
    ///
    /// If `parent` is a qualifier and the child sits at a binder or scope
    /// position, the parent's binder symbols become bound.
    pub fn enter(&self, parent: &Expr, child_index: usize) -> Self {
        let mut bound = self.bound.clone();
        if let Some(def) = parent.head().and_then(|h| self.qualifiers.get(h)) {
            if def.exposes(child_index) {
                for name in self.qualifiers.bound_names(parent) {
                    if !bound.contains(&name) {
                        bound.push(name);
                    }
                }
            }
        }
        Self {
            qualifiers: self.qualifiers,
            bound,
            depth: self.depth + 1,
        }
    }

    #[inline]
    pub fn is_bound(&self, name: &Symbol) -> bool {
        self.bound.contains(name)
    }

    /// Bound names, outermost first.
    pub fn bound_names(&self) -> &[Symbol] {
        &self.bound
    }

    /// Distance from the root (root = 0).
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Pre-order traversal exposing the live context at each node.
///
/// `max_depth` is measured from `root` (0 visits only `root`). The visitor
/// receives the node, its context and its level relative to `root`.
pub fn traverse_with_context<F>(root: &Node, ctx: &Context<'_>, max_depth: Option<usize>, mut visit: F)
where
    F: FnMut(&Node, &Context<'_>, usize),
{
    let mut stack: Vec<(&Node, Context<'_>, usize)> = vec![(root, ctx.clone(), 0)];

    while let Some((node, node_ctx, level)) = stack.pop() {
        visit(node, &node_ctx, level);
        if max_depth.is_some_and(|max| level >= max) {
            continue;
        }
        for (i, child) in node.children().iter().enumerate().rev() {
            stack.push((child, node_ctx.enter(node, i), level + 1));
        }
    }
}

/// Symbol leaves of `root` not bound by an enclosing qualifier.
///
/// The binder leaves of a qualifier are themselves bound occurrences.
pub fn free_variables(root: &Node, qualifiers: &QualifierTable) -> BTreeSet<Node> {
    let mut free = BTreeSet::new();
    traverse_with_context(root, &Context::root(qualifiers), None, |node, ctx, _| {
        if let Expr::Symbol(name) = node.as_ref() {
            if !ctx.is_bound(name) {
                free.insert(node.clone());
            }
        }
    });
    free
}
