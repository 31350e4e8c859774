use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use sym_ast::{Expr, Node};
use sym_engine::{Calculator, DispatchIndex, MatchContext, ReduceOptions};

fn square(e: Node) -> Node {
    Expr::pow(e, Expr::num(2))
}

/// sin²(x·1) + cos²(x·1) + ... + sin²(x·n) + cos²(x·n)
fn pythagorean_chain(n: i64) -> Node {
    let mut terms = Vec::new();
    for i in 1..=n {
        let arg = Expr::mul(Expr::num(i), Expr::sym("x"));
        terms.push(square(Expr::sin(arg.clone())));
        terms.push(square(Expr::cos(arg)));
    }
    Expr::sum(terms).unwrap()
}

fn benchmark_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    let calc = Calculator::with_default_rules();

    let mut index = DispatchIndex::new();
    for rule in calc.rules() {
        index.insert(rule.pattern().clone(), rule.name());
    }

    let power = Expr::pow(Expr::sym("x"), Expr::num(3));
    group.bench_function("dispatch_power", |b| {
        let ctx = MatchContext::root(&calc);
        b.iter(|| black_box(index.dispatch(black_box(&power), &ctx).len()))
    });

    let sum = pythagorean_chain(3);
    group.bench_function("dispatch_large_sum", |b| {
        let ctx = MatchContext::root(&calc);
        b.iter(|| black_box(index.dispatch(black_box(&sum), &ctx).len()))
    });

    group.bench_function("reduce_sum_one_pass_budget", |b| {
        let opts = ReduceOptions::default().with_max_passes(1);
        b.iter(|| black_box(calc.reduce_with(black_box(&sum), &opts).unwrap()))
    });

    group.finish();
}

fn benchmark_reduction(c: &mut Criterion) {
    let mut group = c.benchmark_group("reduction");
    let calc = Calculator::with_default_rules();

    group.bench_function("combine_like_terms_20", |b| {
        // x + 2x + ... + 20x
        let mut terms = vec![Expr::sym("x")];
        for i in 2..=20 {
            terms.push(Expr::mul(Expr::num(i), Expr::sym("x")));
        }
        let e = Expr::sum(terms).unwrap();
        b.iter(|| black_box(calc.reduce(black_box(&e)).unwrap()))
    });

    group.bench_function("power_of_two_4096", |b| {
        let e = Expr::pow(Expr::num(2), Expr::num(4096));
        b.iter(|| black_box(calc.reduce(black_box(&e)).unwrap()))
    });

    group.sample_size(10);
    group.bench_function("pythagorean_chain_5", |b| {
        let e = pythagorean_chain(5);
        b.iter(|| black_box(calc.reduce(black_box(&e)).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, benchmark_dispatch, benchmark_reduction);
criterion_main!(benches);
