//! Special-angle values and the Pythagorean identity.

use super::register_set;
use crate::bindings::Bindings;
use crate::engine::Calculator;
use crate::error::EngineError;
use crate::matcher::MatchContext;
use crate::rule::RuleBuilder;
use std::sync::Arc;
use sym_ast::{Builtin, Expr, Node};
use sym_math::{eval_pi_multiple, extract_pi_multiple, TrigFn};

pub fn register(calculator: &mut Calculator) {
    register_set(
        calculator,
        "trigonometry",
        vec![
            special_angle_rule("evaluate_sin", TrigFn::Sin),
            special_angle_rule("evaluate_cos", TrigFn::Cos),
            special_angle_rule("evaluate_tan", TrigFn::Tan),
            // sin(x)^2 + cos(x)^2 -> 1
            RuleBuilder::new("pythagorean_identity")
                .pattern_template(pythagorean_pattern(false))
                .replace_by(&["x"], |_, _| Ok(Some(Expr::num(1)))),
            // sin(x)^2 + cos(x)^2 + rest -> 1 + rest
            RuleBuilder::new("pythagorean_identity_with_rest")
                .pattern_template(pythagorean_pattern(true))
                .replace_by(&["x", "rest"], one_plus_rest),
        ],
    );
}

fn special_angle_rule(name: &str, f: TrigFn) -> RuleBuilder {
    RuleBuilder::new(name)
        .pattern_template(Expr::unary(f.builtin(), Expr::reference("t")))
        .replace_by(&["t"], move |bindings, _| {
            Ok(bindings
                .get_str("t")
                .and_then(|t| extract_pi_multiple(t))
                .and_then(|k| eval_pi_multiple(f, &k)))
        })
}

fn pythagorean_pattern(with_rest: bool) -> Node {
    let square = |f: Builtin| Expr::pow(Expr::unary(f, Expr::reference("x")), Expr::num(2));
    let mut terms = vec![square(Builtin::Sin), square(Builtin::Cos)];
    if with_rest {
        terms.push(Expr::rest_reference("rest"));
    }
    Arc::new(Expr::NAry(Builtin::Sum.symbol(), terms))
}

fn one_plus_rest(bindings: &Bindings, _: &MatchContext<'_>) -> Result<Option<Node>, EngineError> {
    let Some(rest) = bindings.get_str("rest") else {
        return Ok(None);
    };
    let mut terms = vec![Expr::num(1)];
    match rest.as_ref() {
        Expr::NAry(h, leftovers) if h.is(Builtin::Sum) => terms.extend(leftovers.iter().cloned()),
        _ => terms.push(rest.clone()),
    }
    Ok(Some(Expr::sum(terms)?))
}
