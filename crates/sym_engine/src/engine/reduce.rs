//! Fixed-point rewriting.
//!
//! One pass walks the tree post-order (children before their parent). At
//! every node the dispatch candidates are tried in order and the first rule
//! whose replacement differs structurally from the node is applied. Passes
//! repeat until one changes nothing or the pass budget runs out.

use super::Calculator;
use crate::error::EngineError;
use crate::matcher::MatchContext;
use crate::options::ReduceOptions;
use std::sync::{Arc, LazyLock};
use sym_ast::{deep_equals, try_map_children, MetaKey, Node, NodeMetadata};

use tracing::{debug, info, trace, warn, Level};

/// Metadata key caching the reduced form of a node.
pub static SIMPLIFIED_FORM: MetaKey<Node> = MetaKey::new("simplified_form");

/// Promote rule-application events from `debug!` to `info!`.
static SYM_TRACE_RULES_ENABLED: LazyLock<bool> =
    LazyLock::new(|| std::env::var("SYM_TRACE_RULES").is_ok());

impl Calculator {
    /// Rewrite `node` to normal form under the registered rules.
    ///
    /// Returns the very same `Arc` when no rule applied anywhere, so
    /// `Arc::ptr_eq(&input, &output)` means "nothing to simplify".
    pub fn reduce(&self, node: &Node) -> Result<Node, EngineError> {
        self.reduce_with(node, &self.options.reduce)
    }

    /// [`Calculator::reduce`] under an explicit budget. A zero pass budget
    /// is rejected.
    pub fn reduce_with(&self, node: &Node, opts: &ReduceOptions) -> Result<Node, EngineError> {
        if opts.max_passes == 0 {
            return Err(EngineError::InvalidArgument(
                "max_passes must be at least 1".to_string(),
            ));
        }
        let mut current = node.clone();
        for pass in 0..opts.max_passes {
            let root = MatchContext::root(self);
            let next = self.rewrite_node(&current, &root, opts)?;
            if Arc::ptr_eq(&next, &current) {
                debug!(passes = pass + 1, "reached normal form");
                return Ok(current);
            }
            current = next;
        }
        warn!(
            max_passes = opts.max_passes,
            result = %current,
            "pass budget exhausted before reaching a normal form"
        );
        Ok(current)
    }

    /// [`Calculator::reduce`] with the result cached on both the input and
    /// the output node.
    pub fn reduce_cached(&self, node: &Node, metadata: &mut NodeMetadata) -> Result<Node, EngineError> {
        if let Some(done) = metadata.get(node, &SIMPLIFIED_FORM) {
            return Ok(done.clone());
        }
        let reduced = self.reduce(node)?;
        metadata.insert(node, &SIMPLIFIED_FORM, reduced.clone());
        if !Arc::ptr_eq(node, &reduced) {
            metadata.insert(&reduced, &SIMPLIFIED_FORM, reduced.clone());
        }
        Ok(reduced)
    }

    fn rewrite_node(&self, node: &Node, ctx: &MatchContext<'_>, opts: &ReduceOptions) -> Result<Node, EngineError> {
        let descend = opts.max_depth.map_or(true, |max| ctx.depth() < max);
        let rebuilt = if descend {
            try_map_children(node, |i, child| self.rewrite_node(child, &ctx.enter(node, i), opts))?
        } else {
            node.clone()
        };
        match self.apply_first_rule(&rebuilt, ctx)? {
            Some(replaced) => Ok(replaced),
            None => Ok(rebuilt),
        }
    }

    /// Replacement from the first applicable, non-trivial rule.
    fn apply_first_rule(&self, node: &Node, ctx: &MatchContext<'_>) -> Result<Option<Node>, EngineError> {
        if tracing::enabled!(Level::TRACE) {
            trace!(
                signature = %node.signature(),
                candidates = self.index.candidates(node).len(),
                "dispatching"
            );
        }

        let outcome = self.index.find_first(node, ctx, |rule, bindings| {
            if !rule.allows_depth(ctx.depth()) {
                return None;
            }
            match rule.replacement().apply(&bindings, ctx) {
                Ok(Some(new)) if !deep_equals(&new, node) => Some(Ok((rule, new))),
                Ok(_) => None,
                Err(e) => Some(Err((rule, e))),
            }
        });

        match outcome {
            None => Ok(None),
            Some(Ok((rule, new))) => {
                if *SYM_TRACE_RULES_ENABLED {
                    info!(rule = %rule.name(), before = %node, after = %new, depth = ctx.depth(), "rule applied");
                } else {
                    debug!(rule = %rule.name(), before = %node, after = %new, "rule applied");
                }
                Ok(Some(new))
            }
            Some(Err((rule, e))) => {
                debug!(rule = %rule.name(), node = %node, error = %e, "rule failed");
                Err(e)
            }
        }
    }
}
