use super::Matcher;
use crate::error::RuleBuildError;
use sym_ast::{Expr, Node, Symbol};

/// Compile an example tree into a matcher.
///
/// - `$r` leaves become [`Matcher::Bind`]
/// - a `$$r` leaf directly under a commutative n-ary branch becomes that
///   branch's remainder matcher (at most one per branch)
/// - other leaves become [`Matcher::Exact`]
/// - unary/binary/ternary branches become [`Matcher::Fixed`]
/// - n-ary branches become [`Matcher::Commutative`] when `is_commutative`
///   accepts the head, [`Matcher::Ordered`] otherwise
///
/// `rule` only labels errors.
pub fn compile_pattern(
    example: &Node,
    is_commutative: &dyn Fn(&Symbol) -> bool,
    rule: &str,
) -> Result<Matcher, RuleBuildError> {
    let invalid = |reason: String| RuleBuildError::InvalidPattern {
        rule: rule.to_string(),
        reason,
    };

    match example.as_ref() {
        Expr::Symbol(s) if s.is_rest_reference() => Err(invalid(format!(
            "remainder reference '{}' outside a commutative branch",
            s
        ))),
        Expr::Symbol(s) if s.is_reference() => match s.reference_name() {
            Some(name) => Ok(Matcher::Bind(name)),
            None => Err(invalid(format!("malformed reference '{}'", s))),
        },
        Expr::Number(_) | Expr::Symbol(_) | Expr::Opaque(_) => Ok(Matcher::Exact(example.clone())),
        Expr::Unary(head, _) | Expr::Binary(head, _) | Expr::Ternary(head, _) => {
            let children = example
                .children()
                .iter()
                .map(|c| compile_pattern(c, is_commutative, rule))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Matcher::Fixed {
                head: head.clone(),
                children,
            })
        }
        Expr::NAry(head, args) if is_commutative(head) => {
            let mut rest: Option<Matcher> = None;
            let mut children = Vec::with_capacity(args.len());
            for arg in args {
                match arg.as_symbol() {
                    Some(s) if s.is_rest_reference() => {
                        if rest.is_some() {
                            return Err(invalid(format!(
                                "more than one remainder reference under '{}'",
                                head
                            )));
                        }
                        let name = s
                            .reference_name()
                            .ok_or_else(|| invalid(format!("malformed reference '{}'", s)))?;
                        rest = Some(Matcher::Bind(name));
                    }
                    _ => children.push(compile_pattern(arg, is_commutative, rule)?),
                }
            }
            Ok(Matcher::commutative(head.clone(), children, rest))
        }
        Expr::NAry(head, args) => {
            let children = args
                .iter()
                .map(|c| compile_pattern(c, is_commutative, rule))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Matcher::Ordered {
                head: head.clone(),
                children,
            })
        }
    }
}
