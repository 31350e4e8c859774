//! Pattern matching, rule dispatch and fixed-point rewriting over
//! [`sym_ast`] trees.
//!
//! ```
//! use sym_ast::Expr;
//! use sym_engine::Calculator;
//!
//! let calc = Calculator::with_default_rules();
//! let x = Expr::sym("x");
//! let cube = Expr::product(vec![x.clone(), x.clone(), x.clone()]).unwrap();
//! assert_eq!(calc.reduce(&cube).unwrap(), Expr::pow(x, Expr::num(3)));
//! ```

pub mod bindings;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod options;
pub mod rule;
pub mod rules;

pub use bindings::Bindings;
pub use dispatch::DispatchIndex;
pub use engine::{Calculator, RuleSetReport, SIMPLIFIED_FORM};
pub use error::{EngineError, RuleBuildError};
pub use matcher::{compile_pattern, CommutativeMatcher, Condition, MatchContext, Matcher, SortRange};
pub use options::{CalculatorOptions, NumberDomain, ReduceOptions};
pub use rule::{Replacement, Rule, RuleBuilder};
