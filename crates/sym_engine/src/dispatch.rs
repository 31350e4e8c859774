//! Structural dispatch index.
//!
//! Routes a node to the registered matchers that could possibly apply,
//! without testing every pattern:
//!
//! - matchers with a known head (branches, exact nodes) live in a bucket
//!   keyed by the full [`Signature`] (kind + head)
//! - `AnyNumber` / `AnySymbol` live in a bucket keyed by kind only
//! - unconditional matchers (`Anything`, `Bind`) live in the wildcard bucket
//!
//! A query merges the signature and kind buckets in registration order and
//! then appends the wildcard bucket. A branch matcher whose head differs
//! from the query node is never even called.

use crate::bindings::Bindings;
use crate::matcher::{MatchContext, Matcher};
use rustc_hash::FxHashMap;
use sym_ast::{Expr, Node, NodeKind, Signature};

/// Which bucket a matcher is stored in.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DispatchKey {
    /// Matches nothing; not stored.
    Never,
    Signature(Signature),
    Kind(NodeKind),
    Wildcard,
}

fn dispatch_key(matcher: &Matcher) -> DispatchKey {
    match matcher {
        Matcher::Nothing => DispatchKey::Never,
        Matcher::Anything | Matcher::Bind(_) => DispatchKey::Wildcard,
        Matcher::AnyNumber => DispatchKey::Kind(NodeKind::Number),
        Matcher::AnySymbol => DispatchKey::Kind(NodeKind::Symbol),
        Matcher::Exact(node) => DispatchKey::Signature(node.signature()),
        Matcher::Named(_, inner) | Matcher::Precondition(inner, _) | Matcher::Postcondition(inner, _) => {
            dispatch_key(inner)
        }
        Matcher::Fixed { head, children } => match NodeKind::for_fixed_arity(children.len()) {
            Some(kind) => DispatchKey::Signature(Signature::new(kind, Some(head.clone()))),
            None => DispatchKey::Never,
        },
        Matcher::Ordered { head, .. } => {
            DispatchKey::Signature(Signature::new(NodeKind::NAry, Some(head.clone())))
        }
        Matcher::Commutative(c) => {
            DispatchKey::Signature(Signature::new(NodeKind::NAry, Some(c.head().clone())))
        }
    }
}

/// Index of `(matcher, payload)` pairs keyed by structural signature.
pub struct DispatchIndex<P> {
    entries: Vec<(Matcher, P)>,
    by_signature: FxHashMap<Signature, Vec<usize>>,
    by_kind: FxHashMap<NodeKind, Vec<usize>>,
    wildcard: Vec<usize>,
}

impl<P> Default for DispatchIndex<P> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            by_signature: FxHashMap::default(),
            by_kind: FxHashMap::default(),
            wildcard: Vec::new(),
        }
    }
}

impl<P> DispatchIndex<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pair. Returns `false` (and stores nothing) for a matcher
    /// that can never match.
    pub fn insert(&mut self, matcher: Matcher, payload: P) -> bool {
        let idx = self.entries.len();
        match dispatch_key(&matcher) {
            DispatchKey::Never => return false,
            DispatchKey::Signature(sig) => self.by_signature.entry(sig).or_default().push(idx),
            DispatchKey::Kind(kind) => self.by_kind.entry(kind).or_default().push(idx),
            DispatchKey::Wildcard => self.wildcard.push(idx),
        }
        self.entries.push((matcher, payload));
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry indices that could apply to `node`, in dispatch order.
    fn candidate_indices(&self, node: &Expr) -> Vec<usize> {
        let empty: &[usize] = &[];
        let by_sig = self
            .by_signature
            .get(&node.signature())
            .map_or(empty, Vec::as_slice);
        let by_kind = self.by_kind.get(&node.kind()).map_or(empty, Vec::as_slice);

        let mut out = Vec::with_capacity(by_sig.len() + by_kind.len() + self.wildcard.len());
        // Both buckets are ascending; merge by registration index.
        let (mut i, mut j) = (0, 0);
        while i < by_sig.len() && j < by_kind.len() {
            if by_sig[i] < by_kind[j] {
                out.push(by_sig[i]);
                i += 1;
            } else {
                out.push(by_kind[j]);
                j += 1;
            }
        }
        out.extend_from_slice(&by_sig[i..]);
        out.extend_from_slice(&by_kind[j..]);
        out.extend_from_slice(&self.wildcard);
        out
    }

    /// Candidate pairs for `node` without matching them.
    pub fn candidates(&self, node: &Expr) -> Vec<(&Matcher, &P)> {
        self.candidate_indices(node)
            .into_iter()
            .map(|i| {
                let (m, p) = &self.entries[i];
                (m, p)
            })
            .collect()
    }

    /// All payloads whose matcher matches `node`, with their bindings.
    pub fn dispatch(&self, node: &Node, ctx: &MatchContext<'_>) -> Vec<(&P, Bindings)> {
        let mut out = Vec::new();
        self.for_each_match(node, ctx, |p, b| out.push((p, b)));
        out
    }

    /// Call `f` for every matching payload, in dispatch order.
    pub fn for_each_match<'s, F>(&'s self, node: &Node, ctx: &MatchContext<'_>, mut f: F)
    where
        F: FnMut(&'s P, Bindings),
    {
        let empty = Bindings::new();
        for i in self.candidate_indices(node) {
            let (matcher, payload) = &self.entries[i];
            if let Some(b) = matcher.match_node(node, ctx, &empty) {
                f(payload, b);
            }
        }
    }

    /// Stop at the first match for which `accept` returns `Some`.
    pub fn find_first<'s, R, F>(&'s self, node: &Node, ctx: &MatchContext<'_>, mut accept: F) -> Option<R>
    where
        F: FnMut(&'s P, Bindings) -> Option<R>,
    {
        let empty = Bindings::new();
        for i in self.candidate_indices(node) {
            let (matcher, payload) = &self.entries[i];
            if let Some(b) = matcher.match_node(node, ctx, &empty) {
                if let Some(r) = accept(payload, b) {
                    return Some(r);
                }
            }
        }
        None
    }
}
