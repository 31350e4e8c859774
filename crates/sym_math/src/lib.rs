//! Numeric collaborators of the rewrite engine.
//!
//! Exact rational powers and roots, π-multiple detection and the
//! special-angle trigonometric tables. Nothing here knows about rules or
//! matching; rule modules call into these helpers.

pub mod numeric;
pub mod pi_helpers;
pub mod trig_table;

pub use numeric::{evaluate_rational_power, pow_by_squaring, RationalPower, MAX_EVAL_EXPONENT};
pub use pi_helpers::{build_pi_multiple, extract_pi_multiple};
pub use trig_table::{eval_pi_multiple, TrigFn, TrigValue};
