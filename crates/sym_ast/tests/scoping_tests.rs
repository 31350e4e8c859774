//! Bound-variable scoping through qualifier heads.
//!
//! Covers free-variable collection for nested and user-defined qualifiers and
//! the contexts exposed by `traverse_with_context`.

use std::collections::BTreeSet;
use sym_ast::{
    free_variables, traverse_with_context, Builtin, Context, Expr, Node, QualifierDef,
    QualifierTable, Symbol,
};

fn set(names: &[&str]) -> BTreeSet<Node> {
    names.iter().map(|n| Expr::sym(n)).collect()
}

// ============================================================================
// Free variables
// ============================================================================

#[test]
fn test_summation_range_is_outside_scope() {
    let table = QualifierTable::with_defaults();
    // Summation(i, x + i, i * y): the `i` in the range is not bound.
    let e = Expr::ternary(
        Builtin::Summation,
        Expr::sym("i"),
        Expr::add(Expr::sym("x"), Expr::sym("i")),
        Expr::mul(Expr::sym("i"), Expr::sym("y")),
    );
    assert_eq!(free_variables(&e, &table), set(&["i", "x", "y"]));
}

#[test]
fn test_nested_qualifiers_accumulate_bindings() {
    let table = QualifierTable::with_defaults();
    // Lambda(f, Summation(k, n, f * k * z))
    let body = Expr::product(vec![Expr::sym("f"), Expr::sym("k"), Expr::sym("z")]).unwrap();
    let inner = Expr::ternary(Builtin::Summation, Expr::sym("k"), Expr::sym("n"), body);
    let e = Expr::binary(Builtin::Lambda, Expr::sym("f"), inner);
    assert_eq!(free_variables(&e, &table), set(&["n", "z"]));
}

#[test]
fn test_user_defined_qualifier() {
    let mut table = QualifierTable::new();
    // ForAll(var, domain, predicate): var scoped over predicate only.
    table.define("ForAll", QualifierDef::new(&[0], &[2]));
    let e = Expr::ternary("ForAll", Expr::sym("t"), Expr::sym("t"), Expr::sym("t"));
    assert_eq!(free_variables(&e, &table), set(&["t"]));

    let closed = Expr::ternary("ForAll", Expr::sym("t"), Expr::sym("D"), Expr::sym("t"));
    assert_eq!(free_variables(&closed, &table), set(&["D"]));
}

#[test]
fn test_constants_and_numbers_are_not_filtered_here() {
    let table = QualifierTable::new();
    let e = Expr::add(Expr::num(2), Expr::pi());
    // Constant filtering is an engine concern; the raw walk reports `Pi`.
    assert_eq!(free_variables(&e, &table), set(&["Pi"]));
}

// ============================================================================
// Context-aware traversal
// ============================================================================

#[test]
fn test_context_reports_bound_names_per_position() {
    let table = QualifierTable::with_defaults();
    let e = Expr::binary(
        Builtin::Lambda,
        Expr::sym("u"),
        Expr::pow(Expr::sym("u"), Expr::num(2)),
    );

    let mut bound_at_u = Vec::new();
    traverse_with_context(&e, &Context::root(&table), None, |node, ctx, _| {
        if node.as_symbol() == Some(&Symbol::new("u")) {
            bound_at_u.push(ctx.is_bound(&Symbol::new("u")));
        }
    });
    assert_eq!(bound_at_u, vec![true, true]);
}

#[test]
fn test_traversal_depth_is_relative_to_start_context() {
    let table = QualifierTable::with_defaults();
    let start = Context::root(&table).enter(&Expr::sin(Expr::sym("x")), 0);
    let e = Expr::cos(Expr::sym("x"));

    let mut depths = Vec::new();
    traverse_with_context(&e, &start, None, |_, ctx, level| depths.push((ctx.depth(), level)));
    assert_eq!(depths, vec![(1, 0), (2, 1)]);
}
