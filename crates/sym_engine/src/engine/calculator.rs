//! Calculator struct definition, construction, and rule registration.
//!
//! The `Calculator` is the main entry point of the engine. It owns the rule
//! registry (an ordered list plus the dispatch index built from it), the
//! qualifier table, the set of commutative heads and the named constants.
//! Registration needs `&mut self`; a shared `&Calculator` is a frozen
//! registry and can reduce from several threads at once.

use crate::dispatch::DispatchIndex;
use crate::error::{EngineError, RuleBuildError};
use crate::matcher::{compile_pattern, MatchContext, Matcher};
use crate::options::CalculatorOptions;
use crate::rule::{Rule, RuleBuilder};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;
use std::sync::Arc;
use sym_ast::{Builtin, Context, Expr, Node, QualifierDef, QualifierTable, Symbol};

use tracing::debug;

/// Outcome of [`Calculator::register_rule_set`]; every rule is processed
/// independently of the others.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSetReport {
    /// Names of the rules that were added.
    pub registered: Vec<String>,
    /// Names of no-op rules that were skipped.
    pub skipped: Vec<String>,
    pub errors: Vec<RuleBuildError>,
}

impl RuleSetReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct Calculator {
    pub(super) options: CalculatorOptions,
    pub(super) rules: Vec<Arc<Rule>>,
    pub(super) index: DispatchIndex<Arc<Rule>>,
    qualifiers: QualifierTable,
    commutative_heads: FxHashSet<Symbol>,
    constants: FxHashMap<Symbol, Node>,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator {
    /// Create a calculator without rules registered.
    ///
    /// Usually you want `Calculator::with_default_rules()` instead.
    pub fn new() -> Self {
        Self::with_options(CalculatorOptions::default())
    }

    pub fn with_options(options: CalculatorOptions) -> Self {
        let commutative_heads = [Builtin::Sum, Builtin::Product]
            .into_iter()
            .map(Builtin::symbol)
            .collect();
        let constants = [
            (Builtin::Pi, Expr::pi()),
            (Builtin::E, Expr::e()),
            (Builtin::I, Expr::imaginary_unit()),
        ]
        .into_iter()
        .map(|(b, node)| (b.symbol(), node))
        .collect();

        Self {
            options,
            rules: Vec::new(),
            index: DispatchIndex::new(),
            qualifiers: QualifierTable::with_defaults(),
            commutative_heads,
            constants,
        }
    }

    /// Create a calculator with all default rules registered.
    ///
    /// # Example
    ///
    /// ```
    /// use sym_ast::Expr;
    /// use sym_engine::Calculator;
    ///
    /// let calc = Calculator::with_default_rules();
    /// let four = calc.reduce(&Expr::add(Expr::num(2), Expr::num(2))).unwrap();
    /// assert_eq!(four, Expr::num(4));
    /// ```
    pub fn with_default_rules() -> Self {
        Self::with_default_rules_and_options(CalculatorOptions::default())
    }

    pub fn with_default_rules_and_options(options: CalculatorOptions) -> Self {
        let mut calc = Self::with_options(options);
        calc.register_default_rules();
        calc
    }

    pub fn register_default_rules(&mut self) {
        crate::rules::register_default_rules(self);

        #[cfg(debug_assertions)]
        self.assert_unique_rule_names();
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Validate and register one rule.
    ///
    /// Returns `Ok(false)` when the rule is a no-op and was skipped.
    pub fn register_rule(&mut self, builder: RuleBuilder) -> Result<bool, RuleBuildError> {
        let name = builder.name().to_string();
        match builder.build(self)? {
            Some(rule) => {
                self.add_rule(rule);
                Ok(true)
            }
            None => {
                debug!(rule = %name, "skipping no-op rule");
                Ok(false)
            }
        }
    }

    /// Register several rules; a failing rule never prevents the others.
    pub fn register_rule_set<I>(&mut self, builders: I) -> RuleSetReport
    where
        I: IntoIterator<Item = RuleBuilder>,
    {
        let mut report = RuleSetReport::default();
        for builder in builders {
            let name = builder.name().to_string();
            match self.register_rule(builder) {
                Ok(true) => report.registered.push(name),
                Ok(false) => report.skipped.push(name),
                Err(e) => report.errors.push(e),
            }
        }
        report
    }

    fn add_rule(&mut self, rule: Rule) {
        let rule = Arc::new(rule);
        debug!(rule = %rule.name(), pattern = ?rule.pattern(), "registering rule");
        if self.index.insert(rule.pattern().clone(), rule.clone()) {
            self.rules.push(rule);
        } else {
            debug!(rule = %rule.name(), "pattern can never match; not indexed");
        }
    }

    /// Validate a rule without registering it.
    pub fn build_rule(&self, builder: RuleBuilder) -> Result<Option<Rule>, RuleBuildError> {
        builder.build(self)
    }

    /// Compile an example tree (with `$r` / `$$r` reference leaves) into a
    /// matcher, using this calculator's commutative heads.
    pub fn compile_matcher(&self, example: &Node) -> Result<Matcher, RuleBuildError> {
        compile_pattern(example, &|h: &Symbol| self.is_commutative(h), "<matcher>")
    }

    /// Debug check that no two registered rules share a name.
    pub fn assert_unique_rule_names(&self) {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        for rule in &self.rules {
            assert!(seen.insert(rule.name()), "duplicate rule name '{}'", rule.name());
        }
    }

    // =========================================================================
    // Scoping and symbols
    // =========================================================================

    /// Unbound symbol leaves of `node`; named constants are not variables.
    pub fn free_variables(&self, node: &Node) -> BTreeSet<Node> {
        let mut free = sym_ast::free_variables(node, &self.qualifiers);
        free.retain(|n| match n.as_symbol() {
            Some(s) => !self.constants.contains_key(s),
            None => true,
        });
        free
    }

    /// Pre-order traversal exposing the match context at every node.
    pub fn traverse_with_context<F>(&self, node: &Node, max_depth: Option<usize>, mut visit: F)
    where
        F: FnMut(&Node, &MatchContext<'_>, usize),
    {
        let root = Context::root(&self.qualifiers);
        sym_ast::traverse_with_context(node, &root, max_depth, |n, scope, level| {
            visit(n, &MatchContext::from_scope(self, scope.clone()), level)
        });
    }

    pub fn define_qualifier(&mut self, head: impl Into<Symbol>, def: QualifierDef) -> Option<QualifierDef> {
        self.qualifiers.define(head, def)
    }

    /// Mark `head` as associative/commutative for pattern compilation.
    ///
    /// Only affects rules built afterwards.
    pub fn define_commutative(&mut self, head: impl Into<Symbol>) -> bool {
        self.commutative_heads.insert(head.into())
    }

    pub fn is_commutative(&self, head: &Symbol) -> bool {
        self.commutative_heads.contains(head)
    }

    /// Named constant (`Pi`, `E`, `I`).
    pub fn constant(&self, name: &str) -> Result<Node, EngineError> {
        self.constants
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::UnknownConstant(name.to_string()))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn rules(&self) -> &[Arc<Rule>] {
        &self.rules
    }

    pub fn qualifiers(&self) -> &QualifierTable {
        &self.qualifiers
    }

    pub fn options(&self) -> &CalculatorOptions {
        &self.options
    }
}
