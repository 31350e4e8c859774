//! Canonical tree traversal and rebuild utilities.
//!
//! # Functions
//!
//! - [`traverse`] / [`traverse_post_order`]: deterministic left-to-right
//!   visitation, optionally depth-limited, annotated with the level
//! - [`recur_map`]: bottom-up rebuild with a pre- and post-rebuild callback
//! - [`map_children`] / [`try_map_children`]: rebuild one level, sharing
//!   the node when no child changed
//! - [`map_symbol`]: rename every symbol leaf and branch head
//! - [`deep_equals`]: structural equality with a pointer fast path
//! - [`count_all_nodes`] / [`count_nodes_and_max_depth`]: complexity metrics
//!
//! The visiting and counting functions use explicit stacks, so they are safe
//! for any tree depth. The rebuilding functions recurse.

use crate::expression::{Expr, Node};
use crate::symbol::Symbol;
use std::convert::Infallible;
use std::sync::Arc;

/// Pre-order traversal. `visit` receives each node and its level (root = 0).
///
/// With `max_depth = Some(0)` only the root is visited.
///
/// # Example
/// ```
/// use sym_ast::{traversal::traverse, Expr};
///
/// let e = Expr::add(Expr::sym("x"), Expr::num(1));
/// let mut seen = Vec::new();
/// traverse(&e, None, |n, level| seen.push((n.to_string(), level)));
/// assert_eq!(seen[0], ("x + 1".to_string(), 0));
/// assert_eq!(seen.len(), 3);
/// ```
pub fn traverse<F>(root: &Node, max_depth: Option<usize>, mut visit: F)
where
    F: FnMut(&Node, usize),
{
    let mut stack: Vec<(&Node, usize)> = vec![(root, 0)];

    while let Some((node, level)) = stack.pop() {
        visit(node, level);
        if max_depth.is_some_and(|max| level >= max) {
            continue;
        }
        // Reverse so the leftmost child is popped first.
        for child in node.children().iter().rev() {
            stack.push((child, level + 1));
        }
    }
}

/// Post-order traversal: children (left to right) before their parent.
pub fn traverse_post_order<F>(root: &Node, max_depth: Option<usize>, mut visit: F)
where
    F: FnMut(&Node, usize),
{
    // (node, level, children_pushed)
    let mut stack: Vec<(&Node, usize, bool)> = vec![(root, 0, false)];

    while let Some((node, level, expanded)) = stack.pop() {
        let at_limit = max_depth.is_some_and(|max| level >= max);
        if expanded || at_limit || node.is_leaf() {
            visit(node, level);
            continue;
        }
        stack.push((node, level, true));
        for child in node.children().iter().rev() {
            stack.push((child, level + 1, false));
        }
    }
}

/// Rebuild `node` with every child passed through `f` (index, child).
///
/// Returns the very same `Arc` when every child comes back pointer-equal.
pub fn map_children<F>(node: &Node, mut f: F) -> Node
where
    F: FnMut(usize, &Node) -> Node,
{
    match try_map_children::<_, Infallible>(node, |i, c| Ok(f(i, c))) {
        Ok(n) => n,
        Err(never) => match never {},
    }
}

/// Fallible [`map_children`]; the first error aborts the rebuild.
pub fn try_map_children<F, E>(node: &Node, mut f: F) -> Result<Node, E>
where
    F: FnMut(usize, &Node) -> Result<Node, E>,
{
    let rebuilt = match node.as_ref() {
        Expr::Number(_) | Expr::Symbol(_) | Expr::Opaque(_) => return Ok(node.clone()),
        Expr::Unary(head, [a]) => {
            let a2 = f(0, a)?;
            if Arc::ptr_eq(a, &a2) {
                return Ok(node.clone());
            }
            Expr::Unary(head.clone(), [a2])
        }
        Expr::Binary(head, [a, b]) => {
            let a2 = f(0, a)?;
            let b2 = f(1, b)?;
            if Arc::ptr_eq(a, &a2) && Arc::ptr_eq(b, &b2) {
                return Ok(node.clone());
            }
            Expr::Binary(head.clone(), [a2, b2])
        }
        Expr::Ternary(head, [a, b, c]) => {
            let a2 = f(0, a)?;
            let b2 = f(1, b)?;
            let c2 = f(2, c)?;
            if Arc::ptr_eq(a, &a2) && Arc::ptr_eq(b, &b2) && Arc::ptr_eq(c, &c2) {
                return Ok(node.clone());
            }
            Expr::Ternary(head.clone(), [a2, b2, c2])
        }
        Expr::NAry(head, children) => {
            let mut changed = false;
            let mut out = Vec::with_capacity(children.len());
            for (i, child) in children.iter().enumerate() {
                let mapped = f(i, child)?;
                changed |= !Arc::ptr_eq(child, &mapped);
                out.push(mapped);
            }
            if !changed {
                return Ok(node.clone());
            }
            Expr::NAry(head.clone(), out)
        }
    };
    Ok(Arc::new(rebuilt))
}

/// Bottom-up rebuild with a double application of `f`.
///
/// At every position `f` is first applied to the node found there (its pre
/// form). If the result is a branch and `depth` allows descending, its
/// children are recur-mapped with one level less, the branch is rebuilt
/// (shared when nothing changed) and the rebuilt node is passed to `f`
/// again (its post form). Leaves and nodes at the depth limit see `f` once.
///
/// `depth = None` means unlimited.
pub fn recur_map<F>(node: &Node, depth: Option<usize>, f: &mut F) -> Node
where
    F: FnMut(&Node) -> Node,
{
    let pre = f(node);
    if pre.is_leaf() || depth == Some(0) {
        return pre;
    }
    let child_depth = depth.map(|d| d - 1);
    let rebuilt = map_children(&pre, |_, child| recur_map(child, child_depth, f));
    f(&rebuilt)
}

/// Structural equality, ignoring metadata and node identity.
#[inline]
pub fn deep_equals(a: &Node, b: &Node) -> bool {
    Arc::ptr_eq(a, b) || a == b
}

/// Pass every symbol occurrence (leaf names and branch heads) through `f`.
///
/// Opaque tags and numbers are left alone.
pub fn map_symbol<F>(node: &Node, f: &mut F) -> Node
where
    F: FnMut(&Symbol) -> Symbol,
{
    match node.as_ref() {
        Expr::Number(_) | Expr::Opaque(_) => node.clone(),
        Expr::Symbol(s) => {
            let mapped = f(s);
            if &mapped == s {
                node.clone()
            } else {
                Arc::new(Expr::Symbol(mapped))
            }
        }
        Expr::Unary(head, [a]) => Arc::new(Expr::Unary(f(head), [map_symbol(a, f)])),
        Expr::Binary(head, [a, b]) => {
            let head = f(head);
            Arc::new(Expr::Binary(head, [map_symbol(a, f), map_symbol(b, f)]))
        }
        Expr::Ternary(head, [a, b, c]) => {
            let head = f(head);
            Arc::new(Expr::Ternary(
                head,
                [map_symbol(a, f), map_symbol(b, f), map_symbol(c, f)],
            ))
        }
        Expr::NAry(head, children) => {
            let head = f(head);
            Arc::new(Expr::NAry(
                head,
                children.iter().map(|c| map_symbol(c, f)).collect(),
            ))
        }
    }
}

/// Count all nodes in an expression tree.
pub fn count_all_nodes(root: &Node) -> usize {
    let mut count = 0;
    traverse(root, None, |_, _| count += 1);
    count
}

/// Count nodes and compute maximum depth.
///
/// # Returns
/// Tuple of (total_nodes, max_depth) where the root has depth 0.
pub fn count_nodes_and_max_depth(root: &Node) -> (usize, usize) {
    let mut count = 0;
    let mut max_depth = 0;
    traverse(root, None, |_, level| {
        count += 1;
        max_depth = max_depth.max(level);
    });
    (count, max_depth)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        // f(g(a), b)
        Expr::binary("f", Expr::unary("g", Expr::sym("a")), Expr::sym("b"))
    }

    fn names(order: &[(Node, usize)]) -> Vec<String> {
        order.iter().map(|(n, l)| format!("{}@{}", n, l)).collect()
    }

    #[test]
    fn test_pre_order_is_left_to_right() {
        let mut seen = Vec::new();
        traverse(&sample(), None, |n, l| seen.push((n.clone(), l)));
        assert_eq!(names(&seen), vec!["f(g(a), b)@0", "g(a)@1", "a@2", "b@1"]);
    }

    #[test]
    fn test_post_order_children_first() {
        let mut seen = Vec::new();
        traverse_post_order(&sample(), None, |n, l| seen.push((n.clone(), l)));
        assert_eq!(names(&seen), vec!["a@2", "g(a)@1", "b@1", "f(g(a), b)@0"]);
    }

    #[test]
    fn test_depth_zero_visits_only_root() {
        let mut pre = 0;
        traverse(&sample(), Some(0), |_, _| pre += 1);
        let mut post = 0;
        traverse_post_order(&sample(), Some(0), |_, _| post += 1);
        assert_eq!(pre, 1);
        assert_eq!(post, 1);
    }

    #[test]
    fn test_depth_limited_traversal() {
        let mut seen = Vec::new();
        traverse(&sample(), Some(1), |n, l| seen.push((n.clone(), l)));
        assert_eq!(names(&seen), vec!["f(g(a), b)@0", "g(a)@1", "b@1"]);
    }

    #[test]
    fn test_map_children_shares_unchanged() {
        let e = sample();
        let same = map_children(&e, |_, c| c.clone());
        assert!(Arc::ptr_eq(&e, &same));

        let changed = map_children(&e, |i, c| if i == 1 { Expr::sym("z") } else { c.clone() });
        assert_eq!(changed.to_string(), "f(g(a), z)");
        // Untouched child is shared, not copied.
        assert!(Arc::ptr_eq(&e.children()[0], &changed.children()[0]));
    }

    #[test]
    fn test_recur_map_sees_pre_and_post_forms() {
        let e = sample();
        let mut seen = Vec::new();
        let out = recur_map(&e, None, &mut |n: &Node| {
            seen.push(n.to_string());
            n.clone()
        });
        assert!(Arc::ptr_eq(&out, &e));
        // Branches are observed twice (pre and post), leaves once.
        assert_eq!(
            seen,
            vec!["f(g(a), b)", "g(a)", "a", "g(a)", "b", "f(g(a), b)"]
        );
    }

    #[test]
    fn test_recur_map_rebuilds_bottom_up() {
        let e = sample();
        let out = recur_map(&e, None, &mut |n: &Node| match n.as_ref() {
            Expr::Symbol(s) if s.as_str() == "a" => Expr::sym("c"),
            _ => n.clone(),
        });
        assert_eq!(out.to_string(), "f(g(c), b)");
    }

    #[test]
    fn test_recur_map_depth_limit() {
        let e = sample();
        let out = recur_map(&e, Some(1), &mut |n: &Node| match n.as_ref() {
            Expr::Symbol(s) if s.as_str() == "a" => Expr::sym("c"),
            _ => n.clone(),
        });
        // `a` sits at level 2 and is out of reach.
        assert!(Arc::ptr_eq(&out, &e));
    }

    #[test]
    fn test_map_symbol_renames_heads_and_leaves() {
        let e = sample();
        let out = map_symbol(&e, &mut |s: &Symbol| Symbol::from(s.as_str().to_uppercase()));
        assert_eq!(out.to_string(), "F(G(A), B)");
    }

    #[test]
    fn test_deep_equals() {
        assert!(deep_equals(&sample(), &sample()));
        assert!(!deep_equals(&sample(), &Expr::sym("a")));
    }

    #[test]
    fn test_counts() {
        assert_eq!(count_all_nodes(&sample()), 4);
        assert_eq!(count_nodes_and_max_depth(&sample()), (4, 2));
    }
}
