//! Objective builder.
//!
//! Latest/earliest goals use an auxiliary that must be *attained* by some
//! task start; a mere bound would be vacuous under optimization.

use tracing::warn;

use super::{Goal, Sense};
use crate::expr::{Expr, Formula, VarPool};
use crate::models::{Objective, SchedulingProblem};

/// Auxiliary definitions and goals for the problem's objectives.
pub(super) fn build(
    problem: &SchedulingProblem,
    vars: &mut VarPool,
    time_bound: i64,
) -> (Vec<Formula>, Vec<Goal>) {
    let mut definitions = Vec::new();
    let mut goals = Vec::new();
    let starts: Vec<Expr> = problem
        .get_tasks()
        .iter()
        .map(|t| Expr::var(t.start()))
        .collect();

    for &objective in problem.objectives() {
        let goal = |sense, expr| Goal {
            sense,
            expr,
            label: objective.name().to_string(),
        };
        match objective {
            Objective::Makespan => {
                goals.push(goal(Sense::Minimize, Expr::var(problem.horizon())));
            }
            Objective::Flowtime => {
                let n = problem.get_tasks().len() as i64;
                let flowtime = vars.derived("FlowTime", 0, time_bound.saturating_mul(n));
                let ends = problem.get_tasks().iter().map(|t| Expr::var(t.end()));
                definitions.push(Expr::var(flowtime).eq(Expr::sum(ends)));
                goals.push(goal(Sense::Minimize, Expr::var(flowtime)));
            }
            Objective::Latest | Objective::Earliest => {
                if starts.is_empty() {
                    warn!(
                        event = "objective_skipped",
                        objective = objective.name(),
                        reason = "no task to attain it",
                    );
                    continue;
                }
                let (name, sense) = if objective == Objective::Latest {
                    ("SmallestStartTime", Sense::Maximize)
                } else {
                    ("GreatestStartTime", Sense::Minimize)
                };
                let aux = vars.time(name);
                let attained = starts.iter().map(|s| Expr::var(aux).eq(s.clone()));
                definitions.push(Formula::or(attained.collect()));
                for s in &starts {
                    definitions.push(match sense {
                        Sense::Maximize => Expr::var(aux).le(s.clone()),
                        Sense::Minimize => Expr::var(aux).ge(s.clone()),
                    });
                }
                goals.push(goal(sense, Expr::var(aux)));
            }
        }
    }
    (definitions, goals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskDef;

    fn problem(objective: Objective) -> SchedulingProblem {
        let mut pb = SchedulingProblem::new("obj").with_horizon(10);
        pb.add_task(TaskDef::new("a", 2)).unwrap();
        pb.add_task(TaskDef::new("b", 3)).unwrap();
        pb.add_objective(objective);
        pb
    }

    #[test]
    fn test_makespan_has_no_auxiliary() {
        let pb = problem(Objective::Makespan);
        let mut vars = pb.vars().clone();
        let (defs, goals) = build(&pb, &mut vars, 15);
        assert!(defs.is_empty());
        assert_eq!(goals[0].expr, Expr::var(pb.horizon()));
        assert_eq!(vars.len(), pb.vars().len());
    }

    #[test]
    fn test_latest_attains_a_start() {
        let pb = problem(Objective::Latest);
        let mut vars = pb.vars().clone();
        let (defs, goals) = build(&pb, &mut vars, 15);
        let aux = vars.find("SmallestStartTime").unwrap();
        assert_eq!(goals[0].sense, Sense::Maximize);
        assert_eq!(defs.len(), 1 + 2);

        // horizon, a_start, a_end, b_start, b_end, SmallestStartTime
        let holds = |env: [i64; 6]| defs.iter().all(|f| f.evaluate(&env[..]) == Some(true));
        assert_eq!(aux.index(), 5);
        assert!(holds([10, 4, 6, 7, 10, 4]));
        assert!(!holds([10, 4, 6, 7, 10, 3])); // not attained
        assert!(!holds([10, 4, 6, 7, 10, 7])); // above a start
    }

    #[test]
    fn test_earliest_attains_greatest_start() {
        let pb = problem(Objective::Earliest);
        let mut vars = pb.vars().clone();
        let (defs, goals) = build(&pb, &mut vars, 15);
        assert_eq!(goals[0].sense, Sense::Minimize);
        assert!(vars.find("GreatestStartTime").is_some());

        let holds = |env: [i64; 6]| defs.iter().all(|f| f.evaluate(&env[..]) == Some(true));
        assert!(holds([10, 0, 2, 2, 5, 2]));
        assert!(!holds([10, 0, 2, 2, 5, 0]));
    }

    #[test]
    fn test_flowtime_sums_ends() {
        let pb = problem(Objective::Flowtime);
        let mut vars = pb.vars().clone();
        let (defs, _) = build(&pb, &mut vars, 15);
        let flowtime = vars.find("FlowTime").unwrap();
        assert_eq!(vars.get(flowtime).range, Some((0, 30)));
        assert_eq!(defs[0].evaluate(&[10i64, 0, 2, 2, 5, 7][..]), Some(true));
    }

    #[test]
    fn test_no_tasks_skips_start_objectives() {
        let mut pb = SchedulingProblem::new("empty");
        pb.add_objective(Objective::Latest);
        pb.add_objective(Objective::Earliest);
        let mut vars = pb.vars().clone();
        let (defs, goals) = build(&pb, &mut vars, 0);
        assert!(defs.is_empty());
        assert!(goals.is_empty());
    }
}
