//! Solving orchestrator.
//!
//! # Workflow
//!
//! 1. Look for evident infeasibility (logged; the engine still decides).
//! 2. Compile it into a staged [`Program`].
//! 3. Create the engine (optimization mode iff the problem has objectives),
//!    declare every variable, assert every stage in order, register goals.
//! 4. `check_sat` / `solve`; a satisfying model is projected back onto the
//!    problem as its [`Solution`].
//!
//! The solver borrows the problem mutably for its whole lifetime, so the
//! problem cannot change between build and solve.
//!
//! # Example
//!
//! ```
//! use u_schedule_smt::config::SolverConfig;
//! use u_schedule_smt::models::{Objective, ResourceDef, SchedulingProblem, TaskDef};
//! use u_schedule_smt::solver::SchedulingSolver;
//!
//! let mut pb = SchedulingProblem::new("demo");
//! let cut = pb.add_task(TaskDef::new("cut", 3)).unwrap();
//! let weld = pb.add_task(TaskDef::new("weld", 2)).unwrap();
//! let bob = pb.add_resource(ResourceDef::worker("bob")).unwrap();
//! pb.require(cut, bob).unwrap();
//! pb.require(weld, bob).unwrap();
//! pb.add_objective(Objective::Makespan);
//!
//! let mut solver = SchedulingSolver::new(&mut pb, SolverConfig::default()).unwrap();
//! assert!(solver.solve().unwrap());
//! assert_eq!(solver.solution().unwrap().makespan(), 5);
//! ```

use std::path::Path;
use std::time::Instant;

use tracing::{info, warn};

use crate::config::SolverConfig;
use crate::encoding::{compile, Program, Sense, Stage};
use crate::engine::smtlib::Script;
use crate::engine::{Engine, EngineMode, EngineSettings, Model, SatResult, Value, Z3Engine};
use crate::error::{EngineError, ModelError, Result};
use crate::expr::{Expr, Formula, VarId};
use crate::models::{SchedulingProblem, Solution};
use crate::validation::{validate_problem, ValidationError};

/// Builds the constraint system of a problem on an engine and solves it.
pub struct SchedulingSolver<'p, E: Engine = Z3Engine> {
    problem: &'p mut SchedulingProblem,
    config: SolverConfig,
    engine: E,
    program: Program,
    issues: Vec<ValidationError>,
    current_solution: Option<Model>,
}

impl<'p> SchedulingSolver<'p, Z3Engine> {
    /// Builds the problem on a [`Z3Engine`].
    pub fn new(problem: &'p mut SchedulingProblem, config: SolverConfig) -> Result<Self> {
        Self::with_engine(problem, config, |mode, settings| {
            Ok(Z3Engine::new(mode, settings))
        })
    }
}

impl<'p, E: Engine> SchedulingSolver<'p, E> {
    /// Builds the problem on an engine created by `factory`.
    pub fn with_engine<F>(
        problem: &'p mut SchedulingProblem,
        config: SolverConfig,
        factory: F,
    ) -> Result<Self>
    where
        F: FnOnce(EngineMode, &EngineSettings) -> std::result::Result<E, EngineError>,
    {
        let issues = validate_problem(problem).err().unwrap_or_default();
        for issue in &issues {
            warn!(
                event = "validation",
                problem = problem.name(),
                kind = ?issue.kind,
                "{}",
                issue.message
            );
        }
        let program = compile(problem);

        let mode = if problem.objectives().is_empty() {
            EngineMode::Decision
        } else {
            EngineMode::Optimization
        };
        let settings = EngineSettings::from_config(&config);
        let mut engine = factory(mode, &settings)?;

        let mut printer = config.verbosity.then(|| Script::new(mode));
        for (var, decl, range) in program.declarations() {
            engine.declare(var, decl, range)?;
            if let Some(p) = printer.as_mut() {
                p.declare(var, decl, range);
            }
        }
        for stage in Stage::ALL {
            for formula in program.stage(stage) {
                if let Some(p) = &printer {
                    info!(event = "assert", stage = ?stage, "{}", p.formula(formula));
                }
                engine.assert(formula.clone())?;
            }
        }
        for goal in program.goals() {
            match goal.sense {
                Sense::Minimize => engine.minimize(goal.expr.clone())?,
                Sense::Maximize => engine.maximize(goal.expr.clone())?,
            }
        }

        info!(
            event = "build",
            problem = problem.name(),
            variables = program.vars().len(),
            assertions = program.assertion_count(),
            goals = program.goals().len(),
            mode = ?mode,
        );

        Ok(Self {
            problem,
            config,
            engine,
            program,
            issues,
            current_solution: None,
        })
    }

    /// Decides the constraint system.
    ///
    /// `Ok(false)` when it is unsatisfiable or the engine gave up; the
    /// reason is logged.
    pub fn check_sat(&mut self) -> Result<bool> {
        let started = Instant::now();
        let verdict = self.engine.check()?;
        let name = self.problem.name();
        let elapsed = started.elapsed().as_secs_f64();
        info!(
            event = "check_sat",
            verdict = %verdict,
            elapsed,
            "{name} Satisfiability checked in {elapsed:.2}s"
        );

        match verdict {
            SatResult::Sat => Ok(true),
            SatResult::Unsat => {
                info!(event = "unsat", "No solution exists for problem {name}.");
                Ok(false)
            }
            SatResult::Unknown => {
                let reason = self.engine.reason_unknown().unwrap_or("unknown");
                info!(
                    event = "unknown",
                    reason,
                    "No solution can be found for problem {name} because: {reason}"
                );
                Ok(false)
            }
        }
    }

    /// Checks, then projects the model onto the problem.
    pub fn solve(&mut self) -> Result<bool> {
        if !self.check_sat()? {
            return Ok(false);
        }
        let model = self
            .engine
            .model()
            .ok_or_else(|| EngineError::Protocol("sat verdict without a model".to_string()))?;

        if self.config.verbosity {
            for (name, value) in self.engine.statistics() {
                info!(event = "statistic", statistic = %name, value);
            }
            for (_, binding) in model.iter() {
                info!(event = "binding", variable = %binding.name, value = %binding.value);
            }
        }

        self.problem.set_solution(&model)?;
        self.current_solution = Some(model);
        Ok(true)
    }

    /// Excludes the current value of `var` and solves again.
    ///
    /// Returns `Ok(false)` without touching the engine when nothing has
    /// been solved yet.
    pub fn find_another_solution(&mut self, var: VarId) -> Result<bool> {
        let Some(model) = &self.current_solution else {
            warn!(
                event = "find_another_solution",
                problem = self.problem.name(),
                "No current solution. First call solve()."
            );
            return Ok(false);
        };
        let value = model
            .get(var)
            .ok_or(ModelError::UnknownVariable(var.index()))?;
        let exclusion = match value {
            Value::Int(v) => Expr::var(var).ne(v),
            Value::Bool(true) => Formula::var(var).negate(),
            Value::Bool(false) => Formula::var(var),
        };
        self.engine.assert(exclusion)?;
        self.solve()
    }

    /// Writes the engine's current assertions and goals as SMT-LIB 2.
    pub fn export_to_smt2(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.engine.to_smt2()?)?;
        info!(event = "export", path = %path.as_ref().display());
        Ok(())
    }

    /// Model of the last successful solve.
    pub fn current_solution(&self) -> Option<&Model> {
        self.current_solution.as_ref()
    }

    /// Projected solution of the last successful solve.
    pub fn solution(&self) -> Option<&Solution> {
        self.problem.solution()
    }

    /// Infeasibility evident before solving. Each one makes the problem
    /// unsatisfiable.
    pub fn issues(&self) -> &[ValidationError] {
        &self.issues
    }

    pub fn problem(&self) -> &SchedulingProblem {
        &*self.problem
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::BoundedEngine;
    use crate::expr::Assignment;
    use crate::models::{Constraint, Objective, ResourceDef, TaskDef};
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_decision_mode_without_objectives() {
        let mut pb = SchedulingProblem::new("plain");
        pb.add_task(TaskDef::new("t", 2)).unwrap();
        let solver = SchedulingSolver::new(&mut pb, SolverConfig::default()).unwrap();
        assert_eq!(solver.engine().mode(), EngineMode::Decision);
        assert_eq!(
            solver.engine().assertions().len(),
            solver.program().assertion_count()
        );
    }

    #[test]
    fn test_solve_projects_solution() {
        let mut pb = SchedulingProblem::new("pair").with_horizon(6);
        let a = pb.add_task(TaskDef::new("a", 2)).unwrap();
        let b = pb.add_task(TaskDef::new("b", 3)).unwrap();
        let w = pb.add_resource(ResourceDef::worker("w")).unwrap();
        pb.require(a, w).unwrap();
        pb.require(b, w).unwrap();
        pb.add_constraint(Constraint::precedence(b, a)).unwrap();

        let mut solver = SchedulingSolver::new(&mut pb, SolverConfig::default()).unwrap();
        assert!(solver.solve().unwrap());
        let solution = solver.solution().unwrap();
        assert!(solution.tasks["a"].start >= solution.tasks["b"].end);
        assert_eq!(solution.tasks["a"].assigned_resources, vec!["w".to_string()]);
        assert!(solver.current_solution().is_some());
        assert!(pb.solution().is_some());
    }

    #[test]
    fn test_unsat_is_not_an_error() {
        let mut pb = SchedulingProblem::new("tight").with_horizon(4);
        let a = pb.add_task(TaskDef::new("a", 3)).unwrap();
        let b = pb.add_task(TaskDef::new("b", 3)).unwrap();
        let w = pb.add_resource(ResourceDef::worker("w")).unwrap();
        pb.require(a, w).unwrap();
        pb.require(b, w).unwrap();

        let mut solver = SchedulingSolver::new(&mut pb, SolverConfig::default()).unwrap();
        assert!(!solver.solve().unwrap());
        assert!(solver.current_solution().is_none());
        assert!(pb.solution().is_none());
    }

    #[test]
    fn test_evident_infeasibility_is_unsat() {
        let mut pb = SchedulingProblem::new("short").with_horizon(3);
        pb.add_task(TaskDef::new("t", 5)).unwrap();
        let mut solver = SchedulingSolver::new(&mut pb, SolverConfig::default()).unwrap();
        assert_eq!(solver.issues().len(), 1);
        assert_eq!(solver.issues()[0].kind, ValidationErrorKind::HorizonTooShort);
        assert!(!solver.solve().unwrap());
        assert!(solver.solution().is_none());
    }

    #[test]
    fn test_work_without_resource_is_unsat() {
        let mut pb = SchedulingProblem::new("work").with_horizon(10);
        pb.add_task(TaskDef::new("t", 2).with_work_amount(1)).unwrap();
        let mut solver = SchedulingSolver::new(&mut pb, SolverConfig::default()).unwrap();
        assert_eq!(
            solver.issues()[0].kind,
            ValidationErrorKind::UnreachableWorkAmount
        );
        assert!(!solver.solve().unwrap());
    }

    #[test]
    fn test_precedence_cycle_is_unsat() {
        let mut pb = SchedulingProblem::new("cycle");
        let a = pb.add_task(TaskDef::new("a", 1)).unwrap();
        let b = pb.add_task(TaskDef::new("b", 1)).unwrap();
        pb.add_constraint(Constraint::precedence(a, b)).unwrap();
        pb.add_constraint(Constraint::precedence(b, a)).unwrap();
        let mut solver = SchedulingSolver::new(&mut pb, SolverConfig::default()).unwrap();
        assert_eq!(solver.issues()[0].kind, ValidationErrorKind::CyclicPrecedence);
        assert!(!solver.solve().unwrap());
    }

    #[test]
    fn test_bounded_engine() {
        let mut pb = SchedulingProblem::new("bounded").with_horizon(6);
        let a = pb.add_task(TaskDef::new("a", 2)).unwrap();
        let b = pb.add_task(TaskDef::new("b", 3)).unwrap();
        let w = pb.add_resource(ResourceDef::worker("w")).unwrap();
        pb.require(a, w).unwrap();
        pb.require(b, w).unwrap();

        let mut solver =
            SchedulingSolver::with_engine(&mut pb, SolverConfig::default(), |mode, settings| {
                Ok(BoundedEngine::new(mode, settings))
            })
            .unwrap();
        assert!(solver.solve().unwrap());
        let solution = solver.solution().unwrap();
        let (a, b) = (&solution.tasks["a"], &solution.tasks["b"]);
        assert!(a.end <= b.start || b.end <= a.start);
    }

    #[test]
    fn test_find_another_before_solve() {
        let mut pb = SchedulingProblem::new("early");
        let t = pb.add_task(TaskDef::new("t", 1)).unwrap();
        let start = pb.task(t).start();
        let mut solver = SchedulingSolver::new(&mut pb, SolverConfig::default()).unwrap();
        let before = solver.engine().assertions().len();
        assert!(!solver.find_another_solution(start).unwrap());
        assert_eq!(solver.engine().assertions().len(), before);
    }

    #[test]
    fn test_find_another_excludes_value() {
        let mut pb = SchedulingProblem::new("again").with_horizon(3);
        let t = pb.add_task(TaskDef::new("t", 1)).unwrap();
        let start = pb.task(t).start();
        let mut solver = SchedulingSolver::new(&mut pb, SolverConfig::default()).unwrap();

        let mut seen = Vec::new();
        assert!(solver.solve().unwrap());
        seen.push(solver.current_solution().unwrap().value(start).unwrap());
        while solver.find_another_solution(start).unwrap() {
            let value = solver.current_solution().unwrap().value(start).unwrap();
            assert!(!seen.contains(&value));
            seen.push(value);
        }
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn test_optimization_mode() {
        let mut pb = SchedulingProblem::new("opt");
        pb.add_task(TaskDef::new("t", 2)).unwrap();
        pb.add_objective(Objective::Makespan);
        let mut solver = SchedulingSolver::new(&mut pb, SolverConfig::default()).unwrap();
        assert_eq!(solver.engine().mode(), EngineMode::Optimization);
        assert!(solver.solve().unwrap());
        assert_eq!(solver.solution().unwrap().horizon, 2);
    }
}
