use thiserror::Error;

use crate::expr::Sort;

/// Failures of concrete evaluation and of expression well-formedness checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("program variable `{0}` has no value")]
    UnboundVariable(String),
    #[error("parameter `{0}` has no value")]
    UnboundParameter(String),
    #[error("expected a value of sort {expected}, got {found}")]
    SortMismatch { expected: Sort, found: Sort },
    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),
    #[error("wrong number of arguments for {0}")]
    MalformedApplication(&'static str),
    #[error("hole `{hole}` of {component} is not bound")]
    UnboundHole {
        component: &'static str,
        hole: &'static str,
    },
    #[error("hole `{hole}` does not belong to {component}")]
    ForeignHole {
        component: &'static str,
        hole: &'static str,
    },
}

/// Failures of a `synthesize` call. An unsatisfiable query is not one of
/// these: it is reported as an absent result.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("the component multiset is empty")]
    EmptyComponents,
    #[error("forbidden pattern `{pattern}` is malformed: {reason}")]
    MalformedPattern { pattern: String, reason: EvalError },
    #[error("solver failure: {0}")]
    SolverFailure(String),
    #[error("solver gave up: {0}")]
    Timeout(String),
    #[error("decoded model is inconsistent: {0}")]
    InconsistentModel(String),
}
