//! Error types.
//!
//! Only malformed input and engine plumbing failures are errors.
//! An unsatisfiable or inconclusive solve is an ordinary `Ok(false)`.

use thiserror::Error;

/// Input validation failure raised while building a problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A bound kind other than `exact`, `min` or `max`.
    #[error("invalid kind '{0}': expected one of exact, min, max")]
    InvalidKind(String),

    /// Workload or unavailability declared on a resource it cannot apply to.
    #[error("resource '{resource}' cannot carry this constraint: {reason}")]
    IncompatibleResource { resource: String, reason: String },

    #[error("unknown task id {0}")]
    UnknownTask(usize),

    #[error("unknown resource id {0}")]
    UnknownResource(usize),

    #[error("name '{0}' is already used")]
    DuplicateName(String),

    #[error("task '{task}' already requires resource '{resource}'")]
    DuplicateRequirement { task: String, resource: String },

    #[error("invalid time interval ({lo}, {hi}): {reason}")]
    InvalidInterval { lo: i64, hi: i64, reason: String },

    #[error("invalid worker selection: {0}")]
    InvalidSelection(String),

    #[error("period must be positive, got {0}")]
    InvalidPeriod(i64),

    #[error("'{entity}' has negative {field} {value}")]
    NegativeValue {
        entity: String,
        field: &'static str,
        value: i64,
    },

    /// A custom formula mentions a variable this problem never declared.
    #[error("unknown variable #{0}")]
    UnknownVariable(usize),
}

/// Failure inside an engine adapter (never a verdict).
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine answered something the adapter cannot interpret.
    #[error("engine protocol error: {0}")]
    Protocol(String),

    /// `minimize`/`maximize` on an engine built for plain decision.
    #[error("optimization is not available in decision mode")]
    OptimizationUnavailable,

    /// A variable was used before being declared to the engine.
    #[error("undeclared variable #{0}")]
    Undeclared(usize),

    /// A variable was used with a sort other than the declared one.
    #[error("variable #{0} used with the wrong sort")]
    SortMismatch(usize),

    #[error("cannot start search threads: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Errors surfaced by [`SchedulingSolver`](crate::solver::SchedulingSolver).
#[derive(Debug, Error)]
pub enum SolverError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The engine's model does not cover every scheduling variable.
    #[error("cannot project model onto problem: {0}")]
    Projection(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for solver operations.
pub type Result<T> = std::result::Result<T, SolverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let e = ModelError::InvalidKind("foo".into());
        assert_eq!(
            e.to_string(),
            "invalid kind 'foo': expected one of exact, min, max"
        );

        let e = SolverError::Engine(EngineError::SortMismatch(3));
        assert_eq!(e.to_string(), "variable #3 used with the wrong sort");
    }

    #[test]
    fn test_from_model_error() {
        let e: SolverError = ModelError::InvalidPeriod(0).into();
        assert!(matches!(e, SolverError::Model(ModelError::InvalidPeriod(0))));
    }
}
