//! Compilation of a scheduling problem into arithmetic constraints.
//!
//! [`compile`] walks a [`SchedulingProblem`] and produces a [`Program`]:
//! the variable declarations, the assertions grouped by [`Stage`], and the
//! optimization goals. Stages are emitted in a fixed order so that the
//! assertion sequence (and any SMT-LIB dump of it) is reproducible.
//!
//! | Stage | Source |
//! |-------|--------|
//! | TaskDefinitions | duration relation, default bounds, fixed horizon |
//! | UserConstraints | [`Constraint`](crate::models::Constraint) lowering |
//! | Resources | worker no-overlap, group cardinality |
//! | WorkAmounts | productivity-weighted busy time |
//! | WorkLoads | summed overlap bounded per interval |
//! | Objectives | auxiliary definitions of the goals |

mod constraints;
mod objectives;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::expr::{Expr, Formula, VarDecl, VarId, VarPool};
use crate::models::SchedulingProblem;

/// Emission stage of an assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    TaskDefinitions,
    UserConstraints,
    Resources,
    WorkAmounts,
    WorkLoads,
    Objectives,
}

impl Stage {
    /// All stages in emission order.
    pub const ALL: [Stage; 6] = [
        Stage::TaskDefinitions,
        Stage::UserConstraints,
        Stage::Resources,
        Stage::WorkAmounts,
        Stage::WorkLoads,
        Stage::Objectives,
    ];
}

/// Optimization direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sense {
    Minimize,
    Maximize,
}

/// One optimization target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub sense: Sense,
    pub expr: Expr,
    /// Objective name, for logs.
    pub label: String,
}

/// Compiled constraint system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    vars: VarPool,
    time_floor: i64,
    time_bound: i64,
    stages: Vec<(Stage, Vec<Formula>)>,
    goals: Vec<Goal>,
}

impl Program {
    /// Problem variables followed by objective auxiliaries.
    pub fn vars(&self) -> &VarPool {
        &self.vars
    }

    /// Lower bound of every time variable.
    pub fn time_floor(&self) -> i64 {
        self.time_floor
    }

    /// Upper bound of every time variable.
    pub fn time_bound(&self) -> i64 {
        self.time_bound
    }

    /// Search range of a variable: its declared range, or
    /// `[time_floor, time_bound]` for time variables.
    pub fn range(&self, var: VarId) -> (i64, i64) {
        self.vars
            .get(var)
            .range
            .unwrap_or((self.time_floor, self.time_bound))
    }

    /// Declarations with resolved search ranges, in declaration order.
    pub fn declarations(&self) -> impl Iterator<Item = (VarId, &VarDecl, (i64, i64))> + '_ {
        self.vars.iter().map(move |(id, decl)| {
            let range = decl.range.unwrap_or((self.time_floor, self.time_bound));
            (id, decl, range)
        })
    }

    /// Assertions of one stage.
    pub fn stage(&self, stage: Stage) -> &[Formula] {
        self.stages
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, fs)| fs.as_slice())
            .unwrap_or(&[])
    }

    /// All assertions in stage order.
    pub fn assertions(&self) -> impl Iterator<Item = &Formula> + '_ {
        self.stages.iter().flat_map(|(_, fs)| fs.iter())
    }

    pub fn assertion_count(&self) -> usize {
        self.stages.iter().map(|(_, fs)| fs.len()).sum()
    }

    /// Goals in request order (lexicographic priority).
    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }
}

/// Compiles `problem` into a [`Program`].
pub fn compile(problem: &SchedulingProblem) -> Program {
    let mut vars = problem.vars().clone();
    let time_bound = problem.time_bound();

    let mut stages = Vec::with_capacity(Stage::ALL.len());
    stages.push((Stage::TaskDefinitions, constraints::task_definitions(problem)));
    stages.push((Stage::UserConstraints, constraints::user_constraints(problem)));
    stages.push((Stage::Resources, constraints::resources(problem)));
    stages.push((Stage::WorkAmounts, constraints::work_amounts(problem)));
    stages.push((Stage::WorkLoads, constraints::workloads(problem)));

    let (definitions, goals) = objectives::build(problem, &mut vars, time_bound);
    stages.push((Stage::Objectives, definitions));

    let program = Program {
        vars,
        time_floor: problem.time_floor(),
        time_bound,
        stages,
        goals,
    };
    debug!(
        event = "compile",
        problem = problem.name(),
        variables = program.vars.len(),
        assertions = program.assertion_count(),
        goals = program.goals.len(),
        time_bound = time_bound,
    );
    program
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Objective, ResourceDef, TaskDef, WorkLoad};

    #[test]
    fn test_stage_order_and_counts() {
        let mut pb = SchedulingProblem::new("stages").with_horizon(12);
        let t1 = pb.add_task(TaskDef::new("t1", 4).with_work_amount(4)).unwrap();
        let t2 = pb.add_task(TaskDef::new("t2", 4)).unwrap();
        let w = pb.add_resource(ResourceDef::worker("w")).unwrap();
        pb.require(t1, w).unwrap();
        pb.require(t2, w).unwrap();
        pb.add_workload(WorkLoad::new(w, [((4, 8), 0)])).unwrap();
        pb.add_objective(Objective::Flowtime);

        let program = compile(&pb);
        // horizon == 12, then per task: duration, end >= 0, start >= 0, end <= horizon
        assert_eq!(program.stage(Stage::TaskDefinitions).len(), 1 + 2 * 4);
        assert!(program.stage(Stage::UserConstraints).is_empty());
        assert_eq!(program.stage(Stage::Resources).len(), 1);
        assert_eq!(program.stage(Stage::WorkAmounts).len(), 1);
        assert_eq!(program.stage(Stage::WorkLoads).len(), 1);
        assert_eq!(program.stage(Stage::Objectives).len(), 1);
        assert_eq!(program.assertion_count(), program.assertions().count());
        assert_eq!(program.goals().len(), 1);
        assert_eq!(program.goals()[0].sense, Sense::Minimize);
    }

    #[test]
    fn test_ranges() {
        let mut pb = SchedulingProblem::new("ranges").with_horizon(10);
        pb.add_task(TaskDef::new("t", 3)).unwrap();
        let flag = pb.bool_var("flag");

        let program = compile(&pb);
        assert_eq!(program.time_bound(), 13);
        assert_eq!(program.range(pb.horizon()), (0, 13));
        assert_eq!(program.range(flag), (0, 1));
        assert_eq!(program.declarations().count(), pb.vars().len());
    }

    #[test]
    fn test_negative_start_widens_floor() {
        use crate::models::Constraint;

        let mut pb = SchedulingProblem::new("floor");
        let t = pb.add_task(TaskDef::new("t", 3)).unwrap();
        pb.add_constraint(Constraint::start_after(t, -4)).unwrap();

        let program = compile(&pb);
        assert_eq!(program.time_floor(), -4);
        assert_eq!(program.range(pb.task(t).start()).0, -4);
    }

    #[test]
    fn test_compile_is_reproducible() {
        let build = || {
            let mut pb = SchedulingProblem::new("repro");
            for i in 0..4 {
                pb.add_task(TaskDef::new(format!("t{i}"), i + 1)).unwrap();
            }
            pb.add_objective(Objective::Makespan);
            pb.add_objective(Objective::Earliest);
            compile(&pb)
        };
        let (a, b) = (build(), build());
        assert!(a.assertions().eq(b.assertions()));
        assert_eq!(a.goals(), b.goals());
    }
}
