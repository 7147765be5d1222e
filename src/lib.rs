//! Resource-constrained scheduling on arithmetic constraint solvers.
//!
//! Describe tasks, workers, workloads, constraints and objectives; the
//! problem is compiled into linear integer arithmetic over start/end
//! variables and handed to a solving engine. A satisfying model is
//! projected back as a per-task, per-resource [`models::Solution`].
//!
//! # Modules
//!
//! - **`models`**: Domain types: `SchedulingProblem`, `Task`, `Resource`,
//!   `WorkLoad`, `Constraint`, `Objective`, `Solution`
//! - **`expr`**: Integer/boolean variables, linear expressions and formulas
//! - **`encoding`**: Constraint compiler and objective builder
//! - **`engine`**: `Engine` trait, SMT-LIB 2 printer, the Z3 engine and a
//!   bounded search engine
//! - **`solver`**: Orchestrator (`build → check_sat → solve → project`)
//! - **`validation`**: Whole-problem checks run before solving
//! - **`config`**: Solver options (TOML-loadable)
//!
//! # Example
//!
//! ```
//! use u_schedule_smt::config::SolverConfig;
//! use u_schedule_smt::models::{BoundKind, ResourceDef, SchedulingProblem, TaskDef, WorkLoad};
//! use u_schedule_smt::solver::SchedulingSolver;
//!
//! let mut pb = SchedulingProblem::new("workshop").with_horizon(12);
//! let paint = pb.add_task(TaskDef::new("paint", 4)).unwrap();
//! let alice = pb.add_resource(ResourceDef::worker("alice")).unwrap();
//! pb.require(paint, alice).unwrap();
//! // alice does no work before time 5
//! pb.add_workload(WorkLoad::new(alice, [((0, 5), 0)]).with_kind(BoundKind::Max))
//!     .unwrap();
//!
//! let mut solver = SchedulingSolver::new(&mut pb, SolverConfig::default()).unwrap();
//! assert!(solver.solve().unwrap());
//! assert!(solver.solution().unwrap().tasks["paint"].start >= 5);
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Barrett, Fontaine & Tinelli (2017), "The SMT-LIB Standard: Version 2.6"
//! - Bjørner, Phan & Fleckenstein (2015), "νZ - An Optimizing SMT Solver"

pub mod config;
pub mod encoding;
pub mod engine;
pub mod error;
pub mod expr;
pub mod models;
pub mod solver;
pub mod validation;
