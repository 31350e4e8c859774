//! Rules: a named pattern plus a replacement, validated once at build time.
//!
//! A replacement is either a template (a node with `$r` / `$$r` reference
//! leaves substituted from the match) or a builder closure that computes the
//! result from the bindings. Builders declare which references they consume
//! so both forms go through the same validation:
//!
//! 1. every reference the replacement uses must be bound by the pattern
//! 2. every reference the pattern binds must be used by the replacement
//! 3. a replacement that rebuilds the pattern itself is a no-op and the rule
//!    is skipped without error

use crate::bindings::Bindings;
use crate::engine::Calculator;
use crate::error::{EngineError, RuleBuildError};
use crate::matcher::{compile_pattern, MatchContext, Matcher};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use sym_ast::{deep_equals, map_children, Expr, Node, Symbol};

/// Builder closure. `Ok(None)` declines the rewrite.
pub type BuildFn =
    Arc<dyn Fn(&Bindings, &MatchContext<'_>) -> Result<Option<Node>, EngineError> + Send + Sync>;

#[derive(Clone)]
pub enum Replacement {
    /// Node with reference leaves substituted from the bindings.
    Template(Node),
    /// Computed replacement consuming the listed references.
    Builder {
        consumes: BTreeSet<Symbol>,
        build: BuildFn,
    },
}

impl Replacement {
    /// Reference names the replacement reads.
    pub fn references(&self) -> BTreeSet<Symbol> {
        match self {
            Replacement::Template(node) => template_references(node),
            Replacement::Builder { consumes, .. } => consumes.clone(),
        }
    }

    pub fn apply(&self, bindings: &Bindings, ctx: &MatchContext<'_>) -> Result<Option<Node>, EngineError> {
        match self {
            Replacement::Template(node) => Ok(Some(substitute(node, bindings))),
            Replacement::Builder { build, .. } => build(bindings, ctx),
        }
    }
}

impl fmt::Debug for Replacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Replacement::Template(node) => write!(f, "Template({})", node),
            Replacement::Builder { consumes, .. } => write!(f, "Builder(consumes {:?})", consumes),
        }
    }
}

fn template_references(node: &Node) -> BTreeSet<Symbol> {
    let mut names = BTreeSet::new();
    sym_ast::traverse(node, None, |n, _| {
        if let Expr::Symbol(s) = n.as_ref() {
            if let Some(name) = s.reference_name() {
                names.insert(name);
            }
        }
    });
    names
}

/// Replace reference leaves in `template` by their bindings.
///
/// A `$$r` child of an n-ary branch whose binding is an n-ary node with the
/// same head is spliced in place, so `Sum(1, $$rest)` with `rest = Sum(a, b)`
/// becomes `Sum(1, a, b)`. Unbound references are left as they are.
pub fn substitute(template: &Node, bindings: &Bindings) -> Node {
    match template.as_ref() {
        Expr::Symbol(s) => match s.reference_name() {
            Some(name) => bindings.get(&name).cloned().unwrap_or_else(|| template.clone()),
            None => template.clone(),
        },
        Expr::Number(_) | Expr::Opaque(_) => template.clone(),
        Expr::NAry(head, args) => {
            let mut out = Vec::with_capacity(args.len());
            let mut changed = false;
            for arg in args {
                if let Some(spliced) = splice_rest(arg, head, bindings) {
                    out.extend(spliced.iter().cloned());
                    changed = true;
                    continue;
                }
                let mapped = substitute(arg, bindings);
                changed |= !Arc::ptr_eq(arg, &mapped);
                out.push(mapped);
            }
            if !changed {
                return template.clone();
            }
            Expr::nary(head.clone(), out).unwrap_or_else(|_| template.clone())
        }
        _ => map_children(template, |_, child| substitute(child, bindings)),
    }
}

fn splice_rest<'b>(arg: &Node, head: &Symbol, bindings: &'b Bindings) -> Option<&'b [Node]> {
    let s = arg.as_symbol().filter(|s| s.is_rest_reference())?;
    let bound = bindings.get(&s.reference_name()?)?;
    match bound.as_ref() {
        Expr::NAry(h, children) if h == head => Some(children),
        _ => None,
    }
}

// =============================================================================
// Rule
// =============================================================================

/// Validated, registrable rule.
pub struct Rule {
    name: String,
    pattern: Matcher,
    replacement: Replacement,
    max_depth: Option<usize>,
}

impl Rule {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &Matcher {
        &self.pattern
    }

    pub fn replacement(&self) -> &Replacement {
        &self.replacement
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Whether the rule may fire at `depth` (distance from the root).
    #[inline]
    pub fn allows_depth(&self, depth: usize) -> bool {
        self.max_depth.map_or(true, |max| depth <= max)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("pattern", &self.pattern)
            .field("replacement", &self.replacement)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

enum PatternSource {
    Matcher(Matcher),
    Template(Node),
}

/// Staged construction of a [`Rule`].
///
/// ```
/// use sym_ast::Expr;
/// use sym_engine::{Calculator, RuleBuilder};
///
/// let calc = Calculator::new();
/// let rule = RuleBuilder::new("power_one")
///     .pattern_template(Expr::pow(Expr::reference("x"), Expr::num(1)))
///     .replace_with(Expr::reference("x"))
///     .build(&calc)
///     .unwrap();
/// assert!(rule.is_some());
/// ```
pub struct RuleBuilder {
    name: String,
    pattern: Option<PatternSource>,
    replacement: Option<Replacement>,
    max_depth: Option<usize>,
}

impl RuleBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: None,
            replacement: None,
            max_depth: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(mut self, matcher: Matcher) -> Self {
        self.pattern = Some(PatternSource::Matcher(matcher));
        self
    }

    /// Pattern given as an example tree, compiled against the calculator's
    /// commutative heads at build time.
    pub fn pattern_template(mut self, example: Node) -> Self {
        self.pattern = Some(PatternSource::Template(example));
        self
    }

    pub fn replace_with(mut self, template: Node) -> Self {
        self.replacement = Some(Replacement::Template(template));
        self
    }

    pub fn replace_by<F>(mut self, consumes: &[&str], build: F) -> Self
    where
        F: Fn(&Bindings, &MatchContext<'_>) -> Result<Option<Node>, EngineError> + Send + Sync + 'static,
    {
        self.replacement = Some(Replacement::Builder {
            consumes: consumes.iter().map(|&n| Symbol::new(n)).collect(),
            build: Arc::new(build),
        });
        self
    }

    /// Only fire at nodes at most `depth` levels below the root.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Validate and build. `Ok(None)` means the rule is a no-op.
    pub fn build(self, calculator: &Calculator) -> Result<Option<Rule>, RuleBuildError> {
        let invalid = |reason: &str| RuleBuildError::InvalidPattern {
            rule: self.name.clone(),
            reason: reason.to_string(),
        };
        let source = self.pattern.as_ref().ok_or_else(|| invalid("missing pattern"))?;
        let replacement = self
            .replacement
            .clone()
            .ok_or_else(|| invalid("missing replacement"))?;

        let (pattern, template) = match source {
            PatternSource::Matcher(m) => (m.clone(), m.template()),
            PatternSource::Template(example) => {
                let compiled = compile_pattern(example, &|h: &Symbol| calculator.is_commutative(h), &self.name)?;
                (compiled, Some(example.clone()))
            }
        };

        let bound = pattern.reference_names();
        let used = replacement.references();
        if let Some(name) = used.difference(&bound).next() {
            return Err(RuleBuildError::UnboundReference {
                rule: self.name,
                name: name.to_string(),
            });
        }
        if let Some(name) = bound.difference(&used).next() {
            return Err(RuleBuildError::UnconsumedReference {
                rule: self.name,
                name: name.to_string(),
            });
        }

        if let Some(template) = template {
            if is_noop(&pattern, &replacement, &template, calculator) {
                return Ok(None);
            }
        }

        Ok(Some(Rule {
            name: self.name,
            pattern,
            replacement,
            max_depth: self.max_depth,
        }))
    }
}

/// Build the replacement with every reference bound to its own placeholder
/// and compare against the pattern template.
fn is_noop(pattern: &Matcher, replacement: &Replacement, template: &Node, calculator: &Calculator) -> bool {
    let rest = pattern.rest_reference_names();
    let mut identity = Bindings::new();
    for name in pattern.reference_names() {
        let placeholder = if rest.contains(&name) {
            Expr::rest_reference(name.as_str())
        } else {
            Expr::reference(name.as_str())
        };
        match identity.with(&name, &placeholder) {
            Some(next) => identity = next,
            None => return false,
        }
    }
    match replacement.apply(&identity, &MatchContext::root(calculator)) {
        Ok(Some(built)) => deep_equals(&built, template),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sym_ast::Builtin;

    fn bind(pairs: &[(&str, Node)]) -> Bindings {
        pairs.iter().fold(Bindings::new(), |b, (n, node)| {
            b.with(&Symbol::new(n), node).unwrap()
        })
    }

    #[test]
    fn test_substitute_plain() {
        let t = Expr::pow(Expr::reference("b"), Expr::num(2));
        let out = substitute(&t, &bind(&[("b", Expr::sym("x"))]));
        assert_eq!(out, Expr::pow(Expr::sym("x"), Expr::num(2)));
    }

    #[test]
    fn test_substitute_splices_rest() {
        let t = Expr::sum(vec![Expr::num(1), Expr::rest_reference("rest")]).unwrap();
        let rest = Expr::sum(vec![Expr::sym("a"), Expr::sym("b")]).unwrap();
        let out = substitute(&t, &bind(&[("rest", rest)]));
        assert_eq!(
            out,
            Expr::sum(vec![Expr::num(1), Expr::sym("a"), Expr::sym("b")]).unwrap()
        );
    }

    #[test]
    fn test_substitute_shares_unchanged() {
        let t = Expr::sin(Expr::sym("x"));
        assert!(Arc::ptr_eq(&substitute(&t, &Bindings::new()), &t));
    }

    #[test]
    fn test_noop_rule_skipped() {
        let calc = Calculator::new();
        let rule = RuleBuilder::new("identity")
            .pattern_template(Expr::reference("x"))
            .replace_with(Expr::reference("x"))
            .build(&calc)
            .unwrap();
        assert!(rule.is_none());
    }

    #[test]
    fn test_noop_with_rest_skipped() {
        let calc = Calculator::new();
        let t = Expr::sum(vec![Expr::sin(Expr::reference("x")), Expr::rest_reference("rest")]).unwrap();
        let rule = RuleBuilder::new("same_sum")
            .pattern_template(t.clone())
            .replace_with(t)
            .build(&calc)
            .unwrap();
        assert!(rule.is_none());
    }

    #[test]
    fn test_unbound_reference() {
        let calc = Calculator::new();
        let err = RuleBuilder::new("bad")
            .pattern_template(Expr::reference("x"))
            .replace_with(Expr::reference("y"))
            .build(&calc)
            .unwrap_err();
        assert_eq!(
            err,
            RuleBuildError::UnboundReference {
                rule: "bad".into(),
                name: "y".into()
            }
        );
    }

    #[test]
    fn test_unconsumed_reference() {
        let calc = Calculator::new();
        let err = RuleBuilder::new("drops_y")
            .pattern_template(Expr::binary("f", Expr::reference("x"), Expr::reference("y")))
            .replace_with(Expr::reference("x"))
            .build(&calc)
            .unwrap_err();
        assert!(matches!(err, RuleBuildError::UnconsumedReference { name, .. } if name == "y"));
    }

    #[test]
    fn test_builder_consumes_and_depth() {
        let calc = Calculator::new();
        let rule = RuleBuilder::new("sin_to_zero")
            .pattern(Matcher::fixed(Builtin::Sin, vec![Matcher::bind("t")]))
            .replace_by(&["t"], |_, _| Ok(Some(Expr::num(0))))
            .max_depth(2)
            .build(&calc)
            .unwrap()
            .unwrap();
        assert_eq!(rule.name(), "sin_to_zero");
        assert!(rule.allows_depth(2));
        assert!(!rule.allows_depth(3));
    }

    #[test]
    fn test_missing_parts() {
        let calc = Calculator::new();
        let err = RuleBuilder::new("empty").build(&calc).unwrap_err();
        assert!(matches!(err, RuleBuildError::InvalidPattern { .. }));
    }
}
