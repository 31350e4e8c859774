//! Pi-specific structural helpers.

use num_rational::BigRational;
use num_traits::One;
use sym_ast::{Builtin, Expr, Node};

/// Check if expression is exactly π
pub fn is_pi(expr: &Expr) -> bool {
    expr.is_symbol(Builtin::Pi)
}

/// Extract the rational coefficient k from an expression θ = k·π.
///
/// Matches patterns:
/// - `π` → k = 1
/// - `0` → k = 0
/// - `Product(k, π)` in either operand order → k
///
/// Returns None if not a recognizable rational multiple of π.
pub fn extract_pi_multiple(expr: &Expr) -> Option<BigRational> {
    if is_pi(expr) {
        return Some(BigRational::one());
    }
    if let Expr::Number(n) = expr {
        return if *n == BigRational::from_integer(0.into()) {
            Some(n.clone())
        } else {
            None
        };
    }
    if !expr.has_head(Builtin::Product) {
        return None;
    }
    match expr.children() {
        [a, b] => match (a.as_number(), b.as_number()) {
            (Some(k), None) if is_pi(b) => Some(k.clone()),
            (None, Some(k)) if is_pi(a) => Some(k.clone()),
            _ => None,
        },
        _ => None,
    }
}

/// Build `k·π` in the shape [`extract_pi_multiple`] recognizes.
pub fn build_pi_multiple(k: BigRational) -> Node {
    if k.is_one() {
        Expr::pi()
    } else {
        Expr::mul(Expr::number(k), Expr::pi())
    }
}
