//! Exact trigonometric values at rational multiples of π.
//!
//! The table holds sin/cos/tan for the special angles in `[0, π/2]`:
//! 0, π/6, π/4, π/3, π/2. Any other rational multiple `kπ` is first reduced
//! into `[0, 1)` using the period (tracking the sign flip of each half turn
//! for sin/cos) and then folded into `[0, 1/2]` with the reflection
//! identities
//!
//! - `sin(π - θ) =  sin(θ)`
//! - `cos(π - θ) = -cos(θ)`
//! - `tan(π - θ) = -tan(θ)`
//!
//! Angles that do not land on a table entry have no closed form here.

use num_integer::Integer;
use num_rational::BigRational;
use num_traits::ToPrimitive;
use rustc_hash::FxHashMap;
use std::sync::LazyLock;
use sym_ast::{Builtin, Expr, Node};

/// Trigonometric function with a value table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrigFn {
    Sin,
    Cos,
    Tan,
}

impl TrigFn {
    pub fn from_builtin(builtin: Builtin) -> Option<Self> {
        match builtin {
            Builtin::Sin => Some(Self::Sin),
            Builtin::Cos => Some(Self::Cos),
            Builtin::Tan => Some(Self::Tan),
            _ => None,
        }
    }

    pub fn builtin(self) -> Builtin {
        match self {
            Self::Sin => Builtin::Sin,
            Self::Cos => Builtin::Cos,
            Self::Tan => Builtin::Tan,
        }
    }
}

/// Represents a simplified trigonometric result value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrigValue {
    /// 0
    Zero,
    /// 1
    One,
    /// A rational fraction: numer/denom (e.g., 1/2)
    Fraction(i64, i64),
    /// sqrt(n)/d (e.g., sqrt(3)/2 is SqrtDiv(3, 2))
    SqrtDiv(i64, i64),
    /// Undefined (e.g., tan(π/2))
    Undefined,
}

impl TrigValue {
    /// Build the node for this value, negated if `negate`.
    ///
    /// `sqrt(r)/d` is built as `Product(1/d, Power(r, 1/2))` (the coefficient
    /// omitted when it is 1), which the arithmetic rules leave unchanged.
    pub fn to_node(&self, negate: bool) -> Node {
        let sign = if negate { -1 } else { 1 };
        match self {
            TrigValue::Zero => Expr::num(0),
            TrigValue::One => Expr::num(sign),
            TrigValue::Fraction(n, d) => Expr::rational(sign * n, *d),
            TrigValue::SqrtDiv(radicand, denom) => {
                let sqrt = Expr::pow(Expr::num(*radicand), Expr::rational(1, 2));
                if *denom == 1 && !negate {
                    sqrt
                } else {
                    Expr::mul(Expr::rational(sign, *denom), sqrt)
                }
            }
            TrigValue::Undefined => Expr::undefined(),
        }
    }
}

/// Special angle `kπ` in `[0, π/2]`, keyed by `k = (numer, denom)`.
type AngleKey = (i64, i64);

static TRIG_VALUES: LazyLock<FxHashMap<(TrigFn, AngleKey), TrigValue>> = LazyLock::new(|| {
    use TrigFn::*;
    use TrigValue::*;
    let entries = [
        // --- Angle: 0 ---
        (Sin, (0, 1), Zero),
        (Cos, (0, 1), One),
        (Tan, (0, 1), Zero),
        // --- Angle: π/6 ---
        (Sin, (1, 6), Fraction(1, 2)),
        (Cos, (1, 6), SqrtDiv(3, 2)),
        (Tan, (1, 6), SqrtDiv(3, 3)),
        // --- Angle: π/4 ---
        (Sin, (1, 4), SqrtDiv(2, 2)),
        (Cos, (1, 4), SqrtDiv(2, 2)),
        (Tan, (1, 4), One),
        // --- Angle: π/3 ---
        (Sin, (1, 3), SqrtDiv(3, 2)),
        (Cos, (1, 3), Fraction(1, 2)),
        (Tan, (1, 3), SqrtDiv(3, 1)),
        // --- Angle: π/2 ---
        (Sin, (1, 2), One),
        (Cos, (1, 2), Zero),
        (Tan, (1, 2), Undefined),
    ];
    entries
        .into_iter()
        .map(|(f, angle, value)| ((f, angle), value))
        .collect()
});

/// Look up `f(kπ)` for `k` already in `[0, 1/2]`.
pub fn lookup_trig_value(f: TrigFn, k: &BigRational) -> Option<&'static TrigValue> {
    let key = (k.numer().to_i64()?, k.denom().to_i64()?);
    TRIG_VALUES.get(&(f, key))
}

/// Reduce `f(kπ)` to `(folded k in [0, 1/2], negate)`.
pub fn reduce_angle(f: TrigFn, k: &BigRational) -> (BigRational, bool) {
    let one = BigRational::from_integer(1.into());
    let half = BigRational::new(1.into(), 2.into());

    let turns = k.floor();
    let mut frac = k - &turns;
    // sin and cos flip sign every half turn; tan has period π.
    let mut negate = f != TrigFn::Tan && turns.to_integer().is_odd();

    if frac > half {
        frac = &one - frac;
        if f != TrigFn::Sin {
            negate = !negate;
        }
    }
    (frac, negate)
}

/// Exact value of `f(kπ)`, if `kπ` reduces to a special angle.
///
/// # Example
/// ```
/// use num_rational::BigRational;
/// use sym_ast::Expr;
/// use sym_math::trig_table::{eval_pi_multiple, TrigFn};
///
/// let sixth = BigRational::new(1.into(), 6.into());
/// assert_eq!(eval_pi_multiple(TrigFn::Sin, &sixth), Some(Expr::rational(1, 2)));
/// ```
pub fn eval_pi_multiple(f: TrigFn, k: &BigRational) -> Option<Node> {
    let (folded, negate) = reduce_angle(f, k);
    let value = lookup_trig_value(f, &folded)?;
    // Zero and Undefined carry no sign.
    let negate = negate && !matches!(value, TrigValue::Zero | TrigValue::Undefined);
    Some(value.to_node(negate))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(n: i64, d: i64) -> BigRational {
        BigRational::new(n.into(), d.into())
    }

    fn eval(f: TrigFn, n: i64, d: i64) -> Option<Node> {
        eval_pi_multiple(f, &r(n, d))
    }

    fn sqrt_div(sign: i64, radicand: i64, denom: i64) -> Node {
        Expr::mul(
            Expr::rational(sign, denom),
            Expr::pow(Expr::num(radicand), Expr::rational(1, 2)),
        )
    }

    #[test]
    fn test_table_values_first_quadrant() {
        assert_eq!(eval(TrigFn::Sin, 1, 6), Some(Expr::rational(1, 2)));
        assert_eq!(eval(TrigFn::Cos, 1, 3), Some(Expr::rational(1, 2)));
        assert_eq!(eval(TrigFn::Sin, 1, 4), Some(sqrt_div(1, 2, 2)));
        assert_eq!(eval(TrigFn::Tan, 1, 4), Some(Expr::num(1)));
        assert_eq!(
            eval(TrigFn::Tan, 1, 3),
            Some(Expr::pow(Expr::num(3), Expr::rational(1, 2)))
        );
    }

    #[test]
    fn test_reflection_into_first_quadrant() {
        // sin(5π/6) = sin(π/6)
        assert_eq!(eval(TrigFn::Sin, 5, 6), Some(Expr::rational(1, 2)));
        // cos(2π/3) = -cos(π/3)
        assert_eq!(eval(TrigFn::Cos, 2, 3), Some(Expr::rational(-1, 2)));
        // tan(3π/4) = -tan(π/4)
        assert_eq!(eval(TrigFn::Tan, 3, 4), Some(Expr::num(-1)));
    }

    #[test]
    fn test_period_reduction() {
        // sin(7π/6) = -sin(π/6)
        assert_eq!(eval(TrigFn::Sin, 7, 6), Some(Expr::rational(-1, 2)));
        // cos(2π) = 1, cos(π) = -1
        assert_eq!(eval(TrigFn::Cos, 2, 1), Some(Expr::num(1)));
        assert_eq!(eval(TrigFn::Cos, 1, 1), Some(Expr::num(-1)));
        // sin(-π/6) = -1/2
        assert_eq!(eval(TrigFn::Sin, -1, 6), Some(Expr::rational(-1, 2)));
        // tan(π + π/4) = 1
        assert_eq!(eval(TrigFn::Tan, 5, 4), Some(Expr::num(1)));
        // sin(π) = 0 without a signed zero
        assert_eq!(eval(TrigFn::Sin, 1, 1), Some(Expr::num(0)));
    }

    #[test]
    fn test_tangent_undefined_at_odd_half_turns() {
        assert_eq!(eval(TrigFn::Tan, 1, 2), Some(Expr::undefined()));
        assert_eq!(eval(TrigFn::Tan, 3, 2), Some(Expr::undefined()));
        assert_eq!(eval(TrigFn::Tan, -1, 2), Some(Expr::undefined()));
    }

    #[test]
    fn test_unknown_angle() {
        assert_eq!(eval(TrigFn::Sin, 1, 5), None);
        assert_eq!(eval(TrigFn::Cos, 1, 12), None);
    }
}
