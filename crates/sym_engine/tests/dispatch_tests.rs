//! Dispatch index correctness: candidate selection, ordering and early exit.

use sym_ast::{Builtin, Expr};
use sym_engine::{Calculator, DispatchIndex, MatchContext, Matcher};

#[test]
fn test_symbol_matcher_and_wildcard_both_dispatched() {
    let calc = Calculator::new();
    let ctx = MatchContext::root(&calc);
    let mut index = DispatchIndex::new();
    index.insert(Matcher::exact(Expr::sym("x")), "x");
    index.insert(Matcher::Anything, "any");

    let hits: Vec<&str> = index
        .dispatch(&Expr::sym("x"), &ctx)
        .into_iter()
        .map(|(p, _)| *p)
        .collect();
    assert_eq!(hits, vec!["x", "any"]);

    let other: Vec<&str> = index
        .dispatch(&Expr::sym("y"), &ctx)
        .into_iter()
        .map(|(p, _)| *p)
        .collect();
    assert_eq!(other, vec!["any"]);
}

#[test]
fn test_head_mismatch_dispatches_nothing() {
    let calc = Calculator::new();
    let ctx = MatchContext::root(&calc);
    let mut index = DispatchIndex::new();
    index.insert(Matcher::fixed(Builtin::Sin, vec![Matcher::Anything]), 1);
    index.insert(
        Matcher::commutative(Builtin::Sum, vec![Matcher::AnySymbol], Some(Matcher::bind("r"))),
        2,
    );

    assert!(index.candidates(&Expr::cos(Expr::sym("x"))).is_empty());
    assert!(index.dispatch(&Expr::cos(Expr::sym("x")), &ctx).is_empty());
    let product = Expr::mul(Expr::sym("x"), Expr::sym("y"));
    assert!(index.candidates(&product).is_empty());
}

#[test]
fn test_find_first_stops_at_accepted_candidate() {
    let calc = Calculator::new();
    let ctx = MatchContext::root(&calc);
    let mut index = DispatchIndex::new();
    for label in ["a", "b", "c"] {
        index.insert(Matcher::AnyNumber, label);
    }

    let mut seen = Vec::new();
    let found = index.find_first(&Expr::num(7), &ctx, |label, _| {
        seen.push(*label);
        (*label == "b").then_some(*label)
    });
    assert_eq!(found, Some("b"));
    // "c" is never offered
    assert_eq!(seen, vec!["a", "b"]);
}

#[test]
fn test_bindings_are_reported_per_candidate() {
    let calc = Calculator::new();
    let ctx = MatchContext::root(&calc);
    let mut index = DispatchIndex::new();
    index.insert(
        Matcher::fixed(Builtin::Power, vec![Matcher::bind("b"), Matcher::exact(Expr::num(2))]),
        "square",
    );
    index.insert(Matcher::bind("whole"), "whole");

    let node = Expr::pow(Expr::sym("x"), Expr::num(2));
    let hits = index.dispatch(&node, &ctx);
    assert_eq!(hits.len(), 2);
    assert_eq!(*hits[0].0, "square");
    assert_eq!(hits[0].1.get_str("b"), Some(&Expr::sym("x")));
    assert_eq!(*hits[1].0, "whole");
    assert_eq!(hits[1].1.get_str("whole"), Some(&node));
}

#[test]
fn test_default_rules_are_indexed_by_head() {
    let calc = Calculator::with_default_rules();
    assert_eq!(calc.rule_count(), calc.rule_names().len());
    assert!(calc.rule_names().contains(&"pythagorean_identity"));
    assert!(calc.rule_names().contains(&"evaluate_rational_power"));
}

#[test]
fn test_empty_index_returns_nothing() {
    let calc = Calculator::new();
    let ctx = MatchContext::root(&calc);
    let index = DispatchIndex::<u32>::new();
    let node = Expr::add(Expr::sym("x"), Expr::num(1));

    assert!(index.is_empty());
    assert!(index.candidates(&node).is_empty());
    assert!(index.dispatch(&node, &ctx).is_empty());
    let mut calls = 0;
    index.for_each_match(&node, &ctx, |_, _| calls += 1);
    assert_eq!(calls, 0);
    assert_eq!(index.find_first(&node, &ctx, |p, _| Some(*p)), None);
}
