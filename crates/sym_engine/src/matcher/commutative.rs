//! Associative/commutative matching of n-ary branches.
//!
//! The child matchers are split into the fewest chains of mutually
//! comparable matchers (see [`super::order`]). With a single chain and no
//! remainder the match is positional against the canonically sorted
//! children. Otherwise matchers are placed by backtracking: each claims the
//! first unclaimed child (in original order) it matches, and on failure
//! further down the next candidate is tried.
//!
//! Worst case is exponential in the number of matchers sharing candidates.
//! The chain order only reduces typical-case search.

use super::order::{chain_decomposition, SortRange};
use super::{MatchContext, Matcher};
use crate::bindings::Bindings;
use std::fmt;
use sym_ast::{compare_expr, deep_equals, Expr, Node, Symbol};

/// Unordered child matchers plus an optional remainder matcher.
#[derive(Clone)]
pub struct CommutativeMatcher {
    head: Symbol,
    children: Vec<Matcher>,
    rest: Option<Box<Matcher>>,
    /// Indices into `children`, chains most specific first.
    chains: Vec<Vec<usize>>,
}

impl CommutativeMatcher {
    pub fn new(head: impl Into<Symbol>, children: Vec<Matcher>, rest: Option<Matcher>) -> Self {
        let ranges: Vec<SortRange> = children.iter().map(Matcher::sort_range).collect();
        let chains = chain_decomposition(&ranges);
        Self {
            head: head.into(),
            children,
            rest: rest.map(Box::new),
            chains,
        }
    }

    pub fn head(&self) -> &Symbol {
        &self.head
    }

    pub fn children(&self) -> &[Matcher] {
        &self.children
    }

    pub fn rest(&self) -> Option<&Matcher> {
        self.rest.as_deref()
    }

    pub fn chains(&self) -> &[Vec<usize>] {
        &self.chains
    }

    /// `Head(children..., $$rest)`.
    pub fn template(&self) -> Option<Node> {
        let mut nodes = self
            .children
            .iter()
            .map(Matcher::template)
            .collect::<Option<Vec<Node>>>()?;
        if let Some(rest) = self.rest() {
            nodes.push(match rest {
                Matcher::Bind(name) => Expr::rest_reference(name.as_str()),
                other => other.template()?,
            });
        }
        Expr::nary(self.head.clone(), nodes).ok()
    }

    pub fn match_node(&self, node: &Node, ctx: &MatchContext<'_>, bindings: &Bindings) -> Option<Bindings> {
        let Expr::NAry(head, args) = node.as_ref() else {
            return None;
        };
        if *head != self.head {
            return None;
        }
        if args.len() < self.children.len() {
            return None;
        }
        if args.len() > self.children.len() && self.rest.is_none() {
            return None;
        }

        if self.chains.len() == 1 && self.rest.is_none() {
            return self.match_single_chain(node, args, ctx, bindings);
        }

        let order: Vec<usize> = self.chains.iter().flatten().copied().collect();
        let mut claimed = vec![false; args.len()];
        self.backtrack(node, args, &order, &mut claimed, ctx, bindings)
    }

    /// Sorted children against the chain, position by position.
    fn match_single_chain(
        &self,
        node: &Node,
        args: &[Node],
        ctx: &MatchContext<'_>,
        bindings: &Bindings,
    ) -> Option<Bindings> {
        let mut sorted: Vec<usize> = (0..args.len()).collect();
        sorted.sort_by(|&a, &b| compare_expr(&args[a], &args[b]));

        let mut current = bindings.clone();
        for (&m, &c) in self.chains[0].iter().zip(&sorted) {
            current = self.children[m].match_node(&args[c], &ctx.enter(node, c), &current)?;
        }
        Some(current)
    }

    fn backtrack(
        &self,
        node: &Node,
        args: &[Node],
        order: &[usize],
        claimed: &mut [bool],
        ctx: &MatchContext<'_>,
        bindings: &Bindings,
    ) -> Option<Bindings> {
        let Some((&m, remaining)) = order.split_first() else {
            return self.match_rest(args, claimed, ctx, bindings);
        };
        let matcher = &self.children[m];
        let target = matcher.determined_node(bindings);

        for i in 0..args.len() {
            if claimed[i] {
                continue;
            }
            if let Some(t) = &target {
                if !deep_equals(t, &args[i]) {
                    continue;
                }
            }
            let Some(extended) = matcher.match_node(&args[i], &ctx.enter(node, i), bindings) else {
                continue;
            };
            claimed[i] = true;
            if let Some(done) = self.backtrack(node, args, remaining, claimed, ctx, &extended) {
                return Some(done);
            }
            claimed[i] = false;
        }
        None
    }

    fn match_rest(
        &self,
        args: &[Node],
        claimed: &[bool],
        ctx: &MatchContext<'_>,
        bindings: &Bindings,
    ) -> Option<Bindings> {
        let leftovers: Vec<Node> = args
            .iter()
            .zip(claimed)
            .filter(|(_, taken)| !**taken)
            .map(|(arg, _)| arg.clone())
            .collect();

        match &self.rest {
            None => leftovers.is_empty().then(|| bindings.clone()),
            Some(rest) => {
                let packaged = Expr::nary(self.head.clone(), leftovers).ok()?;
                rest.match_node(&packaged, ctx, bindings)
            }
        }
    }
}

impl fmt::Debug for CommutativeMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Commutative")
            .field("head", &self.head)
            .field("children", &self.children)
            .field("rest", &self.rest)
            .field("chains", &self.chains)
            .finish()
    }
}
