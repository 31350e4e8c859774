use crate::expression::{Expr, Node};
use std::cmp::Ordering;
use std::sync::Arc;

/// Canonical total order over nodes.
///
/// 1. Kind rank (Number < Symbol < Opaque < Unary < Binary < Ternary < NAry)
/// 2. Head symbol / leaf name
/// 3. Children, left to right, then child count
///
/// Rationals compare by `(numerator, denominator)`, not by numeric value.
/// The order agrees with structural equality: `Equal` iff `a == b`.
pub fn compare_expr(a: &Expr, b: &Expr) -> Ordering {
    if std::ptr::eq(a, b) {
        return Ordering::Equal;
    }

    // 1. Hierarchy Check
    let rank_a = a.kind().rank();
    let rank_b = b.kind().rank();
    if rank_a != rank_b {
        return rank_a.cmp(&rank_b);
    }

    // 2. Same Type Comparison
    match (a, b) {
        (Expr::Number(n1), Expr::Number(n2)) => n1
            .numer()
            .cmp(n2.numer())
            .then_with(|| n1.denom().cmp(n2.denom())),
        (Expr::Symbol(s1), Expr::Symbol(s2)) | (Expr::Opaque(s1), Expr::Opaque(s2)) => s1.cmp(s2),
        _ => match (a.head(), b.head()) {
            (Some(h1), Some(h2)) => match h1.cmp(h2) {
                Ordering::Equal => compare_children(a.children(), b.children()),
                ord => ord,
            },
            // Ranks are equal, so both are branches here.
            _ => Ordering::Equal,
        },
    }
}

/// Lexicographic comparison of child lists, shorter list first on a tie.
pub fn compare_children(args1: &[Node], args2: &[Node]) -> Ordering {
    for (a1, a2) in args1.iter().zip(args2.iter()) {
        if Arc::ptr_eq(a1, a2) {
            continue;
        }
        match compare_expr(a1, a2) {
            Ordering::Equal => continue,
            ord => return ord,
        }
    }
    args1.len().cmp(&args2.len())
}

impl PartialOrd for Expr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Expr {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_expr(self, other)
    }
}

/// True if `nodes` is already in canonical ascending order.
pub fn is_canonically_sorted(nodes: &[Node]) -> bool {
    nodes
        .windows(2)
        .all(|w| compare_expr(&w[0], &w[1]) != Ordering::Greater)
}
