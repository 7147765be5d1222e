//! Constraint compiler stages.

use crate::expr::{Expr, Formula};
use crate::models::{SchedulingProblem, TaskId};

/// Task definitional assertions plus default bounds.
///
/// `end >= 0` always, `start >= 0` unless a user constraint bounds the
/// start, `end <= horizon` unless a user constraint bounds the end.
pub(super) fn task_definitions(problem: &SchedulingProblem) -> Vec<Formula> {
    let horizon = problem.horizon();
    let mut out = Vec::new();
    if let Some(h) = problem.fixed_horizon() {
        out.push(Expr::var(horizon).eq(h));
    }
    for task in problem.get_tasks() {
        out.extend(task.assertions().iter().cloned());
        out.push(Expr::var(task.end()).ge(0));
        if !task.is_lower_bounded() {
            out.push(Expr::var(task.start()).ge(0));
        }
        if !task.is_upper_bounded() {
            out.push(Expr::var(task.end()).le(horizon));
        }
    }
    out
}

pub(super) fn user_constraints(problem: &SchedulingProblem) -> Vec<Formula> {
    problem
        .constraints()
        .iter()
        .flat_map(|c| c.assertions(problem))
        .collect()
}

pub(super) fn resources(problem: &SchedulingProblem) -> Vec<Formula> {
    problem
        .get_resources()
        .iter()
        .flat_map(|r| r.assertions())
        .collect()
}

/// `sum(productivity * busy length) >= work_amount` per task with work.
///
/// A task with work but no resource gets an empty sum, which no model
/// satisfies.
pub(super) fn work_amounts(problem: &SchedulingProblem) -> Vec<Formula> {
    let mut out = Vec::new();
    for (index, task) in problem.get_tasks().iter().enumerate() {
        if task.work_amount <= 0 {
            continue;
        }
        let id = TaskId(index);
        let done = Expr::sum(task.required_resources().iter().filter_map(|&r| {
            let resource = problem.resource(r);
            resource
                .busy_interval(id)
                .map(|busy| busy.length() * resource.productivity)
        }));
        out.push(done.ge(task.work_amount));
    }
    out
}

/// Summed overlap of the resource's busy intervals with each workload
/// interval, related to the bound by the workload kind.
pub(super) fn workloads(problem: &SchedulingProblem) -> Vec<Formula> {
    let mut out = Vec::new();
    for workload in problem.workloads() {
        let busy = problem.busy_intervals_of(workload.resource);
        for &((lo, hi), bound) in &workload.bounds {
            let load = Expr::sum(busy.iter().map(|b| b.overlap(lo, hi)));
            out.push(workload.kind.constrain(load, bound));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BoundKind, Constraint, ResourceDef, TaskDef, WorkLoad};

    #[test]
    fn test_bounded_tasks_skip_defaults() {
        let mut pb = SchedulingProblem::new("bounds");
        let t = pb.add_task(TaskDef::new("t", 2)).unwrap();
        pb.add_constraint(Constraint::start_at(t, 1)).unwrap();
        pb.add_constraint(Constraint::end_at(t, 3)).unwrap();

        // free horizon: duration, end >= 0
        assert_eq!(task_definitions(&pb).len(), 2);
    }

    #[test]
    fn test_work_amount_uses_productivity() {
        let mut pb = SchedulingProblem::new("work");
        let t = pb.add_task(TaskDef::new("t", 3).with_work_amount(6)).unwrap();
        let w = pb
            .add_resource(ResourceDef::worker("w").with_productivity(2))
            .unwrap();
        pb.require(t, w).unwrap();

        let f = &work_amounts(&pb)[0];
        // horizon, t_start, t_end
        assert_eq!(f.evaluate(&[9i64, 0, 3][..]), Some(true));
        assert_eq!(f.evaluate(&[9i64, 0, 2][..]), Some(false));
    }

    #[test]
    fn test_work_amount_without_resource_is_infeasible() {
        let mut pb = SchedulingProblem::new("work");
        pb.add_task(TaskDef::new("t", 3).with_work_amount(1)).unwrap();
        let f = &work_amounts(&pb)[0];
        assert_eq!(f.evaluate(&[9i64, 0, 3][..]), Some(false));
    }

    #[test]
    fn test_workload_sum() {
        let mut pb = SchedulingProblem::new("wl").with_horizon(12);
        let a = pb.add_task(TaskDef::new("a", 4)).unwrap();
        let b = pb.add_task(TaskDef::new("b", 4)).unwrap();
        let w = pb.add_resource(ResourceDef::worker("w")).unwrap();
        pb.require_all(a, &[w]).unwrap();
        pb.require_all(b, &[w]).unwrap();
        pb.add_workload(WorkLoad::new(w, [((2, 6), 3)]).with_kind(BoundKind::Exact))
            .unwrap();

        let f = &workloads(&pb)[0];
        // horizon, a_start, a_end, b_start, b_end
        assert_eq!(f.evaluate(&[12i64, 0, 4, 5, 9][..]), Some(true)); // 2 + 1
        assert_eq!(f.evaluate(&[12i64, 0, 4, 8, 12][..]), Some(false)); // 2 + 0
    }
}
