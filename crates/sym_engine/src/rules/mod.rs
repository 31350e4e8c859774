//! Default rule content.
//!
//! Every module here is ordinary policy: it only uses the public rule API
//! (`RuleBuilder` + `Calculator::register_rule_set`) and can be left out or
//! replaced without touching matching, dispatch or rewriting.

pub mod arithmetic;
pub mod exponents;
pub mod trigonometry;

use crate::engine::Calculator;
use crate::rule::RuleBuilder;

use tracing::{debug, warn};

/// Register arithmetic, exponent and trigonometry rules, in that order.
pub fn register_default_rules(calculator: &mut Calculator) {
    arithmetic::register(calculator);
    exponents::register(calculator);
    trigonometry::register(calculator);
}

/// Register a module's rules, logging (not failing on) rules that do not build.
pub(crate) fn register_set(calculator: &mut Calculator, module: &str, builders: Vec<RuleBuilder>) {
    let report = calculator.register_rule_set(builders);
    for error in &report.errors {
        warn!(module, error = %error, "default rule failed to build");
    }
    debug!(
        module,
        registered = report.registered.len(),
        skipped = report.skipped.len(),
        "registered default rules"
    );
}
