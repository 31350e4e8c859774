// =============================================================================
// Exact rational powers and roots
// =============================================================================

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

/// Largest exponent numerator/denominator evaluated in closed form.
///
/// Larger powers are reported as [`RationalPower::Irreducible`] and left
/// symbolic so a single node cannot allocate an unbounded integer.
pub const MAX_EVAL_EXPONENT: u32 = 4096;

/// Closed-form outcome of `base^exponent` for rational operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RationalPower {
    /// Exact rational value.
    Exact(BigRational),
    /// `coefficient * I^unit_exponent` (unit exponent in `0..4`).
    ///
    /// Produced for a negative base under a square root with an exact root.
    ImaginaryUnitPower {
        coefficient: BigRational,
        unit_exponent: u8,
    },
    /// Negative base under an even root with no imaginary closed form here.
    NegativeEvenRoot,
    /// `0^0`.
    ZeroToZero,
    /// `0^negative`.
    ZeroDivision,
    /// No exact rational value (e.g. `2^(1/2)`) or exponent too large.
    Irreducible,
}

/// Integer power by repeated squaring.
pub fn pow_by_squaring(base: &BigRational, mut exp: u32) -> BigRational {
    let mut result = BigRational::one();
    let mut acc = base.clone();
    while exp > 0 {
        if exp & 1 == 1 {
            result *= &acc;
        }
        exp >>= 1;
        if exp > 0 {
            acc = &acc * &acc;
        }
    }
    result
}

/// Exact `k`-th root of an integer, if one exists.
///
/// Negative radicands have a (negative) root only for odd `k`.
pub fn exact_root(n: &BigInt, k: u32) -> Option<BigInt> {
    if k == 0 {
        return None;
    }
    if n.is_negative() {
        if k % 2 == 0 {
            return None;
        }
        return exact_root(&-n, k).map(|r| -r);
    }
    let root = n.nth_root(k);
    if num_traits::pow(root.clone(), k as usize) == *n {
        Some(root)
    } else {
        None
    }
}

/// Exact `k`-th root of a rational (numerator and denominator separately).
pub fn exact_rational_root(r: &BigRational, k: u32) -> Option<BigRational> {
    let numer = exact_root(r.numer(), k)?;
    let denom = exact_root(r.denom(), k)?;
    Some(BigRational::new(numer, denom))
}

fn signed_power(base: &BigRational, p: &BigInt) -> Option<BigRational> {
    let magnitude = p.abs().to_u32()?;
    let value = pow_by_squaring(base, magnitude);
    if p.is_negative() {
        if value.is_zero() {
            return None;
        }
        Some(value.recip())
    } else {
        Some(value)
    }
}

/// Evaluate `base^exponent` exactly where a rational (or `c*I^k`) result
/// exists.
///
/// `exponent = p/q` is computed as `(base^(1/q))^p`.
///
/// # Example
/// ```
/// use num_rational::BigRational;
/// use sym_math::numeric::{evaluate_rational_power, RationalPower};
///
/// let r = |n: i64, d: i64| BigRational::new(n.into(), d.into());
/// assert_eq!(
///     evaluate_rational_power(&r(8, 27), &r(2, 3)),
///     RationalPower::Exact(r(4, 9))
/// );
/// assert_eq!(evaluate_rational_power(&r(2, 1), &r(1, 2)), RationalPower::Irreducible);
/// ```
pub fn evaluate_rational_power(base: &BigRational, exponent: &BigRational) -> RationalPower {
    if base.is_zero() {
        return if exponent.is_zero() {
            RationalPower::ZeroToZero
        } else if exponent.is_positive() {
            RationalPower::Exact(BigRational::zero())
        } else {
            RationalPower::ZeroDivision
        };
    }

    let p = exponent.numer();
    let Some(q) = exponent.denom().to_u32() else {
        return RationalPower::Irreducible;
    };
    if q > MAX_EVAL_EXPONENT || p.abs() > BigInt::from(MAX_EVAL_EXPONENT) {
        return RationalPower::Irreducible;
    }

    if q == 1 {
        return match signed_power(base, p) {
            Some(v) => RationalPower::Exact(v),
            None => RationalPower::Irreducible,
        };
    }

    if base.is_negative() && q % 2 == 0 {
        if q != 2 {
            return RationalPower::NegativeEvenRoot;
        }
        // (-a)^(p/2) = (I * a^(1/2))^p
        let Some(root) = exact_rational_root(&base.abs(), 2) else {
            return RationalPower::NegativeEvenRoot;
        };
        let Some(coefficient) = signed_power(&root, p) else {
            return RationalPower::Irreducible;
        };
        let unit_exponent = p.mod_floor(&BigInt::from(4)).to_u8().unwrap_or_default();
        return RationalPower::ImaginaryUnitPower {
            coefficient,
            unit_exponent,
        };
    }

    match exact_rational_root(base, q).and_then(|root| signed_power(&root, p)) {
        Some(v) => RationalPower::Exact(v),
        None => RationalPower::Irreducible,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(n: i64, d: i64) -> BigRational {
        BigRational::new(n.into(), d.into())
    }

    #[test]
    fn test_pow_by_squaring() {
        assert_eq!(pow_by_squaring(&r(2, 1), 10), r(1024, 1));
        assert_eq!(pow_by_squaring(&r(-3, 2), 3), r(-27, 8));
        assert_eq!(pow_by_squaring(&r(7, 1), 0), r(1, 1));
    }

    #[test]
    fn test_exact_root() {
        assert_eq!(exact_root(&BigInt::from(27), 3), Some(BigInt::from(3)));
        assert_eq!(exact_root(&BigInt::from(-8), 3), Some(BigInt::from(-2)));
        assert_eq!(exact_root(&BigInt::from(-4), 2), None);
        assert_eq!(exact_root(&BigInt::from(2), 2), None);
    }

    #[test]
    fn test_integer_powers() {
        assert_eq!(
            evaluate_rational_power(&r(2, 1), &r(10, 1)),
            RationalPower::Exact(r(1024, 1))
        );
        assert_eq!(
            evaluate_rational_power(&r(2, 1), &r(-2, 1)),
            RationalPower::Exact(r(1, 4))
        );
    }

    #[test]
    fn test_zero_base() {
        assert_eq!(
            evaluate_rational_power(&r(0, 1), &r(3, 1)),
            RationalPower::Exact(r(0, 1))
        );
        assert_eq!(
            evaluate_rational_power(&r(0, 1), &r(-1, 1)),
            RationalPower::ZeroDivision
        );
        assert_eq!(
            evaluate_rational_power(&r(0, 1), &r(0, 1)),
            RationalPower::ZeroToZero
        );
    }

    #[test]
    fn test_fractional_powers() {
        assert_eq!(
            evaluate_rational_power(&r(4, 9), &r(1, 2)),
            RationalPower::Exact(r(2, 3))
        );
        assert_eq!(
            evaluate_rational_power(&r(-8, 1), &r(1, 3)),
            RationalPower::Exact(r(-2, 1))
        );
        assert_eq!(
            evaluate_rational_power(&r(4, 1), &r(-3, 2)),
            RationalPower::Exact(r(1, 8))
        );
        assert_eq!(
            evaluate_rational_power(&r(3, 1), &r(1, 2)),
            RationalPower::Irreducible
        );
    }

    #[test]
    fn test_negative_base_even_root() {
        assert_eq!(
            evaluate_rational_power(&r(-1, 1), &r(1, 2)),
            RationalPower::ImaginaryUnitPower {
                coefficient: r(1, 1),
                unit_exponent: 1
            }
        );
        // (-4)^(3/2) = (2I)^3 = 8 * I^3
        assert_eq!(
            evaluate_rational_power(&r(-4, 1), &r(3, 2)),
            RationalPower::ImaginaryUnitPower {
                coefficient: r(8, 1),
                unit_exponent: 3
            }
        );
        // (-1)^(-1/2) = I^-1 = I^3
        assert_eq!(
            evaluate_rational_power(&r(-1, 1), &r(-1, 2)),
            RationalPower::ImaginaryUnitPower {
                coefficient: r(1, 1),
                unit_exponent: 3
            }
        );
        assert_eq!(
            evaluate_rational_power(&r(-2, 1), &r(1, 2)),
            RationalPower::NegativeEvenRoot
        );
        assert_eq!(
            evaluate_rational_power(&r(-16, 1), &r(1, 4)),
            RationalPower::NegativeEvenRoot
        );
    }

    #[test]
    fn test_huge_exponent_left_symbolic() {
        assert_eq!(
            evaluate_rational_power(&r(3, 1), &r(1_000_000, 1)),
            RationalPower::Irreducible
        );
    }
}
