//! Solution model.
//!
//! A solution is an immutable snapshot of one satisfying model projected
//! onto the problem's entities: concrete task placements and the workers
//! each task actually occupies.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{BusyInterval, SchedulingProblem};
use crate::error::SolverError;
use crate::expr::{Assignment, VarId};

/// Placement of one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSolution {
    pub name: String,
    pub start: i64,
    pub end: i64,
    pub duration: i64,
    /// Workers occupied by the task, in requirement order.
    pub assigned_resources: Vec<String>,
}

/// One task occupying a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAssignment {
    pub task: String,
    pub start: i64,
    pub end: i64,
}

impl ResourceAssignment {
    #[inline]
    pub fn duration(&self) -> i64 {
        self.end - self.start
    }
}

/// Occupation of one resource. A group lists its members' assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSolution {
    pub name: String,
    pub assignments: Vec<ResourceAssignment>,
}

/// A complete schedule derived from a satisfying model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    pub problem_name: String,
    pub horizon: i64,
    pub tasks: BTreeMap<String, TaskSolution>,
    pub resources: BTreeMap<String, ResourceSolution>,
}

impl Solution {
    /// Projects `model` onto `problem`.
    ///
    /// Fails with [`SolverError::Projection`] when the model lacks a value
    /// for any scheduling variable; a solution is never partial.
    pub fn project<A>(problem: &SchedulingProblem, model: &A) -> Result<Self, SolverError>
    where
        A: Assignment + ?Sized,
    {
        let value = |var: VarId| {
            model.value(var).ok_or_else(|| {
                SolverError::Projection(format!("no value for '{}'", problem.vars().name(var)))
            })
        };
        let occupied = |busy: &BusyInterval| -> Result<bool, SolverError> {
            match busy.selected {
                Some(flag) => Ok(value(flag)? != 0),
                None => Ok(true),
            }
        };

        let mut tasks = BTreeMap::new();
        for (index, task) in problem.get_tasks().iter().enumerate() {
            let id = super::TaskId(index);
            let mut assigned_resources = Vec::new();
            for &r in task.required_resources() {
                let resource = problem.resource(r);
                if let Some(busy) = resource.busy_interval(id) {
                    if occupied(busy)? {
                        assigned_resources.push(resource.name.clone());
                    }
                }
            }
            tasks.insert(
                task.name.clone(),
                TaskSolution {
                    name: task.name.clone(),
                    start: value(task.start())?,
                    end: value(task.end())?,
                    duration: task.duration,
                    assigned_resources,
                },
            );
        }

        let mut resources: BTreeMap<String, ResourceSolution> = BTreeMap::new();
        for resource in problem.get_resources().iter().filter(|r| !r.is_group()) {
            let mut assignments = Vec::new();
            for (task, busy) in resource.busy_intervals() {
                if occupied(busy)? {
                    assignments.push(ResourceAssignment {
                        task: problem.task(*task).name.clone(),
                        start: value(busy.start)?,
                        end: value(busy.end)?,
                    });
                }
            }
            resources.insert(
                resource.name.clone(),
                ResourceSolution {
                    name: resource.name.clone(),
                    assignments,
                },
            );
        }
        for group in problem.get_resources().iter().filter(|r| r.is_group()) {
            let mut assignments: Vec<ResourceAssignment> = group
                .members()
                .iter()
                .filter_map(|&m| resources.get(&problem.resource(m).name))
                .flat_map(|member| member.assignments.iter().cloned())
                .collect();
            assignments.sort_by_key(|a| (a.start, a.end));
            resources.insert(
                group.name.clone(),
                ResourceSolution {
                    name: group.name.clone(),
                    assignments,
                },
            );
        }

        Ok(Self {
            problem_name: problem.name().to_string(),
            horizon: value(problem.horizon())?,
            tasks,
            resources,
        })
    }

    /// Latest task end (0 without tasks).
    pub fn makespan(&self) -> i64 {
        self.tasks.values().map(|t| t.end).max().unwrap_or(0)
    }

    /// Sum of task ends.
    pub fn flowtime(&self) -> i64 {
        self.tasks.values().map(|t| t.end).sum()
    }

    /// Busy time of a resource divided by the horizon.
    ///
    /// Returns `None` for an unknown resource or a non-positive horizon.
    pub fn utilization(&self, resource: &str) -> Option<f64> {
        if self.horizon <= 0 {
            return None;
        }
        let busy: i64 = self
            .resources
            .get(resource)?
            .assignments
            .iter()
            .map(ResourceAssignment::duration)
            .sum();
        Some(busy as f64 / self.horizon as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ResourceDef, TaskDef};

    // vars: horizon, a_start, a_end, b_start, b_end
    fn sample() -> SchedulingProblem {
        let mut pb = SchedulingProblem::new("sample").with_horizon(10);
        let a = pb.add_task(TaskDef::new("a", 3)).unwrap();
        let b = pb.add_task(TaskDef::new("b", 5)).unwrap();
        let w = pb.add_resource(ResourceDef::worker("w")).unwrap();
        pb.require(a, w).unwrap();
        pb.require(b, w).unwrap();
        pb
    }

    #[test]
    fn test_project() {
        let pb = sample();
        let model = [10i64, 0, 3, 3, 8];
        let s = Solution::project(&pb, &model[..]).unwrap();

        assert_eq!(s.problem_name, "sample");
        assert_eq!(s.tasks["a"].end, 3);
        assert_eq!(s.tasks["b"].start, 3);
        assert_eq!(s.tasks["b"].assigned_resources, vec!["w".to_string()]);
        assert_eq!(s.resources["w"].assignments.len(), 2);
        assert_eq!(s.makespan(), 8);
        assert_eq!(s.flowtime(), 11);
    }

    #[test]
    fn test_utilization() {
        let pb = sample();
        let s = Solution::project(&pb, &[10i64, 0, 3, 3, 8][..]).unwrap();
        let util = s.utilization("w").unwrap();
        assert!((util - 0.8).abs() < 1e-10);
        assert!(s.utilization("nope").is_none());
    }

    #[test]
    fn test_missing_value_fails() {
        let pb = sample();
        let partial = [Some(10i64), Some(0), None, Some(3), Some(8)];
        let err = Solution::project(&pb, &partial[..]).unwrap_err();
        assert!(err.to_string().contains("a_end"));
    }

    #[test]
    fn test_group_assignment() {
        let mut pb = SchedulingProblem::new("group").with_horizon(10);
        let t = pb.add_task(TaskDef::new("t", 4)).unwrap();
        let w1 = pb.add_resource(ResourceDef::worker("w1")).unwrap();
        let w2 = pb.add_resource(ResourceDef::worker("w2")).unwrap();
        let pick = pb
            .add_resource(ResourceDef::select("pick", vec![w1, w2], 1))
            .unwrap();
        pb.require(t, pick).unwrap();

        // horizon, t_start, t_end,
        // w1_busy_t_start, w1_busy_t_end, w1_selected_t,
        // w2_busy_t_start, w2_busy_t_end, w2_selected_t
        let model = [10i64, 2, 6, 2, 2, 0, 2, 6, 1];
        let s = Solution::project(&pb, &model[..]).unwrap();
        assert_eq!(s.tasks["t"].assigned_resources, vec!["w2".to_string()]);
        assert!(s.resources["w1"].assignments.is_empty());
        assert_eq!(s.resources["pick"].assignments[0].task, "t");
    }

    #[test]
    fn test_serialize() {
        let pb = sample();
        let s = Solution::project(&pb, &[10i64, 0, 3, 3, 8][..]).unwrap();
        let json = serde_json::to_string(&s).unwrap();
        let back: Solution = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
