//! Solving engines.
//!
//! An [`Engine`] is a generic arithmetic constraint solver: declare
//! variables, assert formulas, optionally register optimization goals,
//! then check. The orchestrator never depends on anything beyond this
//! trait.
//!
//! # Engines
//!
//! | Engine | Strategy |
//! |--------|----------|
//! | [`Z3Engine`] | Z3 over unbounded integers (default) |
//! | [`BoundedEngine`] | in-process depth-first search over finite ranges |

mod bounded;
pub mod smtlib;
mod z3_engine;

pub use bounded::BoundedEngine;
pub use z3_engine::Z3Engine;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::config::SolverConfig;
use crate::error::EngineError;
use crate::expr::{Assignment, Expr, Formula, VarDecl, VarId};

/// Verdict of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SatResult {
    Sat,
    Unsat,
    /// Inconclusive; see [`Engine::reason_unknown`].
    Unknown,
}

impl fmt::Display for SatResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SatResult::Sat => "sat",
            SatResult::Unsat => "unsat",
            SatResult::Unknown => "unknown",
        })
    }
}

/// Whether the engine accepts optimization goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineMode {
    /// Plain decision procedure.
    Decision,
    /// Decision plus `minimize` / `maximize`.
    Optimization,
}

/// Engine knobs derived from a [`SolverConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub verbose: bool,
    pub timeout: Duration,
    /// Search threads (1 = sequential).
    pub threads: usize,
    pub random_seed: Option<u64>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&SolverConfig::default())
    }
}

impl EngineSettings {
    pub fn from_config(config: &SolverConfig) -> Self {
        Self {
            verbose: config.verbosity,
            timeout: Duration::from_millis(config.timeout_ms()),
            threads: config.worker_threads(),
            random_seed: config.random_seed,
        }
    }
}

/// Value of one variable in a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    Int(i64),
    Bool(bool),
}

impl Value {
    /// Integer view (booleans read as 0 / 1).
    pub fn as_i64(self) -> i64 {
        match self {
            Value::Int(v) => v,
            Value::Bool(b) => i64::from(b),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// One variable binding of a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub name: String,
    pub value: Value,
}

/// Satisfying assignment returned by an engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    bindings: BTreeMap<VarId, Binding>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, var: VarId, name: impl Into<String>, value: Value) {
        self.bindings.insert(
            var,
            Binding {
                name: name.into(),
                value,
            },
        );
    }

    pub fn get(&self, var: VarId) -> Option<Value> {
        self.bindings.get(&var).map(|b| b.value)
    }

    /// Looks a binding up by variable name.
    pub fn get_by_name(&self, name: &str) -> Option<Value> {
        self.bindings
            .values()
            .find(|b| b.name == name)
            .map(|b| b.value)
    }

    /// Bindings in variable order.
    pub fn iter(&self) -> impl Iterator<Item = (VarId, &Binding)> {
        self.bindings.iter().map(|(v, b)| (*v, b))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Assignment for Model {
    fn value(&self, var: VarId) -> Option<i64> {
        self.get(var).map(Value::as_i64)
    }
}

/// Engine statistics (name → numeric value).
pub type Statistics = BTreeMap<String, f64>;

/// Generic arithmetic constraint solver.
pub trait Engine {
    /// Mode the engine was created in.
    fn mode(&self) -> EngineMode;

    /// Declares a variable. `range` is the finite search range; engines
    /// over unbounded integers may ignore it for time variables.
    fn declare(&mut self, var: VarId, decl: &VarDecl, range: (i64, i64))
        -> Result<(), EngineError>;

    /// Adds a hard constraint.
    fn assert(&mut self, formula: Formula) -> Result<(), EngineError>;

    /// Adds a minimization goal (optimization mode only).
    fn minimize(&mut self, expr: Expr) -> Result<(), EngineError>;

    /// Adds a maximization goal (optimization mode only).
    fn maximize(&mut self, expr: Expr) -> Result<(), EngineError>;

    /// Decides the current constraint set, optimizing goals in the order
    /// they were added.
    fn check(&mut self) -> Result<SatResult, EngineError>;

    /// Explanation of the last `unknown` verdict.
    fn reason_unknown(&self) -> Option<&str>;

    /// Model of the last `sat` verdict.
    fn model(&self) -> Option<Model>;

    fn statistics(&self) -> Statistics;

    /// Asserted formulas, in assertion order.
    fn assertions(&self) -> &[Formula];

    /// SMT-LIB 2 rendering of declarations, assertions and goals.
    fn to_smt2(&self) -> Result<String, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_assignment() {
        let mut model = Model::new();
        model.insert(VarId(0), "t_start", Value::Int(4));
        model.insert(VarId(2), "sel", Value::Bool(true));

        assert_eq!(model.value(VarId(0)), Some(4));
        assert_eq!(model.value(VarId(1)), None);
        assert_eq!(model.value(VarId(2)), Some(1));
        assert_eq!(model.get_by_name("sel"), Some(Value::Bool(true)));
        assert_eq!(model.len(), 2);
    }

    #[test]
    fn test_settings_from_config() {
        let config = SolverConfig::new().with_max_time(3).with_parallel(true);
        let settings = EngineSettings::from_config(&config);
        assert_eq!(settings.timeout, Duration::from_secs(3));
        assert_eq!(settings.threads, crate::config::PARALLEL_WORKERS);
        assert!(!settings.verbose);
    }

    #[test]
    fn test_display() {
        assert_eq!(SatResult::Unknown.to_string(), "unknown");
        assert_eq!(Value::Int(-3).to_string(), "-3");
        assert_eq!(Value::Bool(false).to_string(), "false");
    }
}
