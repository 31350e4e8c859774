use sym_ast::AstError;
use thiserror::Error;

/// Failure to build a rule. Aborts registration of that one rule only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleBuildError {
    #[error("rule '{rule}': replacement uses '{name}', which the pattern never binds")]
    UnboundReference { rule: String, name: String },

    #[error("rule '{rule}': pattern binds '{name}', which the replacement never uses")]
    UnconsumedReference { rule: String, name: String },

    #[error("rule '{rule}': invalid pattern: {reason}")]
    InvalidPattern { rule: String, reason: String },
}

/// Runtime failure of the engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// No value under the active number domain (e.g. `(-1)^(1/2)` over the
    /// reals). Aborts the whole `reduce` call.
    #[error("Domain error: {0}")]
    Domain(String),

    /// Rejected call parameter, e.g. a zero pass budget.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown constant '{0}'")]
    UnknownConstant(String),

    #[error(transparent)]
    Ast(#[from] AstError),

    #[error(transparent)]
    Build(#[from] RuleBuildError),
}

impl EngineError {
    pub fn is_domain(&self) -> bool {
        matches!(self, EngineError::Domain(_))
    }
}
