//! Sum and product normalization.
//!
//! All rules here match a whole `Sum(...)` / `Product(...)` through a single
//! remainder reference and rewrite the operand list in one step.

use super::register_set;
use crate::engine::Calculator;
use crate::rule::RuleBuilder;
use num_rational::BigRational;
use num_traits::{One, Zero};
use std::sync::Arc;
use sym_ast::{compare_expr, deep_equals, is_canonically_sorted, Builtin, Expr, Node};

type OperandRewrite = fn(Builtin, &[Node]) -> Option<Node>;

pub fn register(calculator: &mut Calculator) {
    register_set(
        calculator,
        "arithmetic",
        vec![
            operand_rule("flatten_sum", Builtin::Sum, flatten),
            operand_rule("flatten_product", Builtin::Product, flatten),
            RuleBuilder::new("unwrap_singleton_sum")
                .pattern_template(singleton(Builtin::Sum))
                .replace_with(Expr::reference("x")),
            RuleBuilder::new("unwrap_singleton_product")
                .pattern_template(singleton(Builtin::Product))
                .replace_with(Expr::reference("x")),
            operand_rule("fold_sum_numbers", Builtin::Sum, fold_numbers),
            operand_rule("fold_product_numbers", Builtin::Product, fold_numbers),
            operand_rule("collect_like_terms", Builtin::Sum, collect_like_terms),
            operand_rule("merge_powers", Builtin::Product, merge_powers),
            operand_rule("sort_sum_operands", Builtin::Sum, canonical_order),
            operand_rule("sort_product_operands", Builtin::Product, canonical_order),
        ],
    );
}

fn singleton(head: Builtin) -> Node {
    Arc::new(Expr::NAry(head.symbol(), vec![Expr::reference("x")]))
}

/// `Head($$args)` rewritten by `rewrite` over the operand list.
fn operand_rule(name: &str, head: Builtin, rewrite: OperandRewrite) -> RuleBuilder {
    let pattern = Arc::new(Expr::NAry(head.symbol(), vec![Expr::rest_reference("args")]));
    RuleBuilder::new(name)
        .pattern_template(pattern)
        .replace_by(&["args"], move |bindings, _| {
            Ok(match bindings.get_str("args").map(|n| n.as_ref()) {
                Some(Expr::NAry(h, args)) if h.is(head) => rewrite(head, args),
                _ => None,
            })
        })
}

/// Identity element of a commutative head.
fn identity(head: Builtin) -> BigRational {
    if head == Builtin::Product {
        BigRational::one()
    } else {
        BigRational::zero()
    }
}

/// `Head(operands)`, collapsing zero or one operand.
fn rebuild(head: Builtin, mut operands: Vec<Node>) -> Node {
    match operands.len() {
        0 => Expr::number(identity(head)),
        1 => operands.swap_remove(0),
        _ => Arc::new(Expr::NAry(head.symbol(), operands)),
    }
}

fn flatten(head: Builtin, args: &[Node]) -> Option<Node> {
    let is_nested = |a: &Node| matches!(a.as_ref(), Expr::NAry(h, _) if h.is(head));
    if !args.iter().any(is_nested) {
        return None;
    }
    let mut out = Vec::with_capacity(args.len());
    for arg in args {
        match arg.as_ref() {
            Expr::NAry(h, inner) if h.is(head) => out.extend(inner.iter().cloned()),
            _ => out.push(arg.clone()),
        }
    }
    Some(rebuild(head, out))
}

fn fold_numbers(head: Builtin, args: &[Node]) -> Option<Node> {
    let numbers: Vec<&BigRational> = args.iter().filter_map(|a| a.as_number()).collect();
    let unit = identity(head);
    let folded = numbers.iter().fold(unit.clone(), |acc, n| {
        if head == Builtin::Product {
            acc * *n
        } else {
            acc + *n
        }
    });

    if head == Builtin::Product && folded.is_zero() && args.len() > 1 {
        return Some(Expr::num(0));
    }
    let drops_identity = numbers.len() == 1 && *numbers[0] == unit && args.len() > 1;
    if numbers.len() < 2 && !drops_identity {
        return None;
    }

    let mut out: Vec<Node> = args.iter().filter(|a| a.as_number().is_none()).cloned().collect();
    if folded != unit || out.is_empty() {
        out.insert(0, Expr::number(folded));
    }
    Some(rebuild(head, out))
}

/// Operands grouped by a structural key, in first-occurrence order.
struct Groups<V> {
    /// (key, accumulated value, member count)
    groups: Vec<(Node, V, usize)>,
    /// Group index per operand; `None` for operands that take no part.
    slots: Vec<Option<usize>>,
}

impl<V: std::ops::AddAssign> Groups<V> {
    fn collect<F>(args: &[Node], split: F) -> Self
    where
        F: Fn(&Node) -> Option<(Node, V)>,
    {
        let mut groups: Vec<(Node, V, usize)> = Vec::new();
        let mut slots = Vec::with_capacity(args.len());
        for arg in args {
            let Some((key, value)) = split(arg) else {
                slots.push(None);
                continue;
            };
            match groups.iter().position(|(k, _, _)| deep_equals(k, &key)) {
                Some(i) => {
                    groups[i].1 += value;
                    groups[i].2 += 1;
                    slots.push(Some(i));
                }
                None => {
                    groups.push((key, value, 1));
                    slots.push(Some(groups.len() - 1));
                }
            }
        }
        Self { groups, slots }
    }
}

/// `c * base` for a term; numbers take no part.
fn split_coefficient(term: &Node) -> Option<(Node, BigRational)> {
    match term.as_ref() {
        Expr::Number(_) => None,
        Expr::NAry(h, factors) if h.is(Builtin::Product) => {
            let mut coefficient = BigRational::one();
            let mut rest = Vec::with_capacity(factors.len());
            for f in factors {
                match f.as_number() {
                    Some(n) => coefficient *= n,
                    None => rest.push(f.clone()),
                }
            }
            if rest.is_empty() {
                return None;
            }
            let base = if rest.len() == factors.len() {
                term.clone()
            } else {
                rebuild(Builtin::Product, rest)
            };
            Some((base, coefficient))
        }
        _ => Some((term.clone(), BigRational::one())),
    }
}

fn scaled(coefficient: BigRational, base: &Node) -> Node {
    if coefficient.is_one() {
        return base.clone();
    }
    let mut factors = vec![Expr::number(coefficient)];
    match base.as_ref() {
        Expr::NAry(h, inner) if h.is(Builtin::Product) => factors.extend(inner.iter().cloned()),
        _ => factors.push(base.clone()),
    }
    rebuild(Builtin::Product, factors)
}

/// `x + x -> 2*x`, `2*x + 3*x -> 5*x`.
fn collect_like_terms(_: Builtin, args: &[Node]) -> Option<Node> {
    let grouped = Groups::collect(args, split_coefficient);
    if grouped.groups.iter().all(|(_, _, count)| *count < 2) {
        return None;
    }

    let mut emitted = vec![false; grouped.groups.len()];
    let mut out = Vec::with_capacity(args.len());
    for (arg, slot) in args.iter().zip(&grouped.slots) {
        match slot {
            None => out.push(arg.clone()),
            Some(g) if grouped.groups[*g].2 < 2 => out.push(arg.clone()),
            Some(g) => {
                if emitted[*g] {
                    continue;
                }
                emitted[*g] = true;
                let (base, coefficient, _) = &grouped.groups[*g];
                if !coefficient.is_zero() {
                    out.push(scaled(coefficient.clone(), base));
                }
            }
        }
    }
    Some(rebuild(Builtin::Sum, out))
}

/// `base^e` for a factor with a rational exponent; numbers take no part.
fn split_exponent(factor: &Node) -> Option<(Node, BigRational)> {
    match factor.as_ref() {
        Expr::Number(_) => None,
        Expr::Binary(h, [base, exp]) if h.is(Builtin::Power) => match exp.as_number() {
            Some(e) => Some((base.clone(), e.clone())),
            None => Some((factor.clone(), BigRational::one())),
        },
        _ => Some((factor.clone(), BigRational::one())),
    }
}

/// `x*x*x -> x^3`, `x^a * x^b -> x^(a+b)`.
///
/// Groups whose exponents cancel are left alone: `x * x^-1` is not `1`
/// at `x = 0`.
fn merge_powers(_: Builtin, args: &[Node]) -> Option<Node> {
    let grouped = Groups::collect(args, split_exponent);
    let merges = |g: usize| {
        let (_, exponent, count) = &grouped.groups[g];
        *count > 1 && !exponent.is_zero()
    };
    if !(0..grouped.groups.len()).any(&merges) {
        return None;
    }

    let mut emitted = vec![false; grouped.groups.len()];
    let mut out = Vec::with_capacity(args.len());
    for (arg, slot) in args.iter().zip(&grouped.slots) {
        match slot {
            Some(g) if merges(*g) => {
                if emitted[*g] {
                    continue;
                }
                emitted[*g] = true;
                let (base, exponent, _) = &grouped.groups[*g];
                out.push(if exponent.is_one() {
                    base.clone()
                } else {
                    Expr::pow(base.clone(), Expr::number(exponent.clone()))
                });
            }
            _ => out.push(arg.clone()),
        }
    }
    Some(rebuild(Builtin::Product, out))
}

fn canonical_order(head: Builtin, args: &[Node]) -> Option<Node> {
    if is_canonically_sorted(args) {
        return None;
    }
    let mut sorted = args.to_vec();
    sorted.sort_by(|a, b| compare_expr(a, b));
    Some(rebuild(head, sorted))
}
