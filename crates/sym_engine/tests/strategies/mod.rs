use proptest::prelude::*;
use sym_ast::{Expr, Node};

/// Small random trees over numbers, a few symbols, π and the default heads.
pub fn arb_expr() -> impl Strategy<Value = Node> {
    let leaf = prop_oneof![
        // Numbers: small integers for simplicity
        (-10i64..10).prop_map(Expr::num),
        // Variables
        prop::sample::select(vec!["x", "y", "z"]).prop_map(Expr::sym),
        Just(Expr::pi()),
    ];

    leaf.prop_recursive(
        4,  // levels deep
        48, // max size
        4,  // items per collection
        |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 2..4)
                    .prop_map(|terms| Expr::sum(terms).expect("non-empty")),
                prop::collection::vec(inner.clone(), 2..4)
                    .prop_map(|factors| Expr::product(factors).expect("non-empty")),
                // Integer exponents only: keeps results in the real domain
                (inner.clone(), -3i64..4).prop_map(|(b, e)| Expr::pow(b, Expr::num(e))),
                inner.clone().prop_map(Expr::neg),
                inner.clone().prop_map(Expr::sin),
                inner.clone().prop_map(Expr::cos),
            ]
        },
    )
}

/// A few distinct symbol leaves, in random order.
pub fn arb_distinct_symbols() -> impl Strategy<Value = Vec<Node>> {
    prop::sample::subsequence(vec!["a", "b", "c", "d", "e"], 1..5)
        .prop_shuffle()
        .prop_map(|names| names.into_iter().map(Expr::sym).collect())
}
