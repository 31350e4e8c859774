mod calculator;
mod reduce;

pub use calculator::{Calculator, RuleSetReport};
pub use reduce::SIMPLIFIED_FORM;
