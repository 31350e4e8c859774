//! Powers: closed-form rational evaluation, `x^1` and the `I^n` cycle.

use super::register_set;
use crate::engine::Calculator;
use crate::error::EngineError;
use crate::options::NumberDomain;
use crate::rule::RuleBuilder;
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, ToPrimitive};
use sym_ast::{Expr, Node};
use sym_math::{evaluate_rational_power, RationalPower};

pub fn register(calculator: &mut Calculator) {
    register_set(
        calculator,
        "exponents",
        vec![
            RuleBuilder::new("evaluate_rational_power")
                .pattern_template(Expr::pow(Expr::reference("b"), Expr::reference("e")))
                .replace_by(&["b", "e"], |bindings, ctx| {
                    let (Some(b), Some(e)) = (bindings.get_str("b"), bindings.get_str("e")) else {
                        return Ok(None);
                    };
                    let (Some(base), Some(exponent)) = (b.as_number(), e.as_number()) else {
                        return Ok(None);
                    };
                    rational_power(base, exponent, ctx.calculator().options().number_domain)
                }),
            RuleBuilder::new("power_one")
                .pattern_template(Expr::pow(Expr::reference("x"), Expr::num(1)))
                .replace_with(Expr::reference("x")),
            RuleBuilder::new("imaginary_unit_cycle")
                .pattern_template(Expr::pow(Expr::imaginary_unit(), Expr::reference("n")))
                .replace_by(&["n"], |bindings, _| {
                    Ok(bindings
                        .get_str("n")
                        .and_then(|n| n.as_number())
                        .filter(|n| n.is_integer())
                        .map(|n| unit_power(n.numer())))
                }),
        ],
    );
}

fn rational_power(
    base: &BigRational,
    exponent: &BigRational,
    domain: NumberDomain,
) -> Result<Option<Node>, EngineError> {
    match evaluate_rational_power(base, exponent) {
        RationalPower::Exact(value) => Ok(Some(Expr::number(value))),
        RationalPower::ZeroDivision => Err(EngineError::Domain(format!(
            "0^{} is a division by zero",
            exponent
        ))),
        RationalPower::ImaginaryUnitPower {
            coefficient,
            unit_exponent,
        } => match domain {
            NumberDomain::Complex => Ok(Some(imaginary_multiple(coefficient, unit_exponent))),
            NumberDomain::Real => Err(not_real(base, exponent)),
        },
        RationalPower::NegativeEvenRoot => match domain {
            NumberDomain::Complex => Ok(None),
            NumberDomain::Real => Err(not_real(base, exponent)),
        },
        // 0^0 has no fixed answer here; leave it as written.
        RationalPower::ZeroToZero | RationalPower::Irreducible => Ok(None),
    }
}

fn not_real(base: &BigRational, exponent: &BigRational) -> EngineError {
    EngineError::Domain(format!("({})^({}) has no real value", base, exponent))
}

/// `coefficient * I^k` for `k` in `0..4`.
fn imaginary_multiple(coefficient: BigRational, k: u8) -> Node {
    let (sign, with_unit) = match k % 4 {
        0 => (BigRational::one(), false),
        1 => (BigRational::one(), true),
        2 => (-BigRational::one(), false),
        _ => (-BigRational::one(), true),
    };
    let c = coefficient * sign;
    if !with_unit {
        Expr::number(c)
    } else if c.is_one() {
        Expr::imaginary_unit()
    } else {
        Expr::mul(Expr::number(c), Expr::imaginary_unit())
    }
}

/// `I^n` for integer `n`: 1, I, -1, -I.
fn unit_power(n: &BigInt) -> Node {
    let k = n.mod_floor(&BigInt::from(4)).to_u8().unwrap_or_default();
    imaginary_multiple(BigRational::one(), k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CalculatorOptions;

    fn calc(domain: NumberDomain) -> Calculator {
        let mut calc = Calculator::with_options(CalculatorOptions::default().with_number_domain(domain));
        register(&mut calc);
        calc
    }

    #[test]
    fn test_integer_powers() {
        let c = calc(NumberDomain::Real);
        assert_eq!(c.reduce(&Expr::pow(Expr::num(2), Expr::num(10))).unwrap(), Expr::num(1024));
        assert_eq!(c.reduce(&Expr::pow(Expr::num(0), Expr::num(3))).unwrap(), Expr::num(0));
        assert_eq!(
            c.reduce(&Expr::pow(Expr::num(2), Expr::num(-2))).unwrap(),
            Expr::rational(1, 4)
        );
    }

    #[test]
    fn test_exact_roots() {
        let c = calc(NumberDomain::Real);
        assert_eq!(
            c.reduce(&Expr::pow(Expr::num(27), Expr::rational(1, 3))).unwrap(),
            Expr::num(3)
        );
        let irrational = Expr::pow(Expr::num(2), Expr::rational(1, 2));
        assert_eq!(c.reduce(&irrational).unwrap(), irrational);
    }

    #[test]
    fn test_zero_to_negative_is_domain_error() {
        let c = calc(NumberDomain::Real);
        let err = c.reduce(&Expr::pow(Expr::num(0), Expr::num(-1))).unwrap_err();
        assert!(err.is_domain());
    }

    #[test]
    fn test_negative_square_root_by_domain() {
        let e = Expr::pow(Expr::num(-1), Expr::rational(1, 2));
        assert!(calc(NumberDomain::Real).reduce(&e).unwrap_err().is_domain());
        assert_eq!(calc(NumberDomain::Complex).reduce(&e).unwrap(), Expr::imaginary_unit());

        let minus_four = Expr::pow(Expr::num(-4), Expr::rational(1, 2));
        assert_eq!(
            calc(NumberDomain::Complex).reduce(&minus_four).unwrap(),
            Expr::mul(Expr::num(2), Expr::imaginary_unit())
        );
    }

    #[test]
    fn test_imaginary_unit_cycle() {
        let c = calc(NumberDomain::Complex);
        let i = Expr::imaginary_unit;
        assert_eq!(c.reduce(&Expr::pow(i(), Expr::num(2))).unwrap(), Expr::num(-1));
        assert_eq!(
            c.reduce(&Expr::pow(i(), Expr::num(3))).unwrap(),
            Expr::mul(Expr::num(-1), i())
        );
        assert_eq!(c.reduce(&Expr::pow(i(), Expr::num(4))).unwrap(), Expr::num(1));
        assert_eq!(c.reduce(&Expr::pow(i(), Expr::num(5))).unwrap(), i());
    }

    #[test]
    fn test_power_one() {
        let c = calc(NumberDomain::Real);
        assert_eq!(c.reduce(&Expr::pow(Expr::sym("x"), Expr::num(1))).unwrap(), Expr::sym("x"));
    }
}
