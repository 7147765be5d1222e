//! Scheduling problem registry.
//!
//! Owns every task, resource, workload, constraint and objective of one
//! scheduling session, plus the decision variables they introduce.
//! Entities are kept in declaration order.

use serde::Serialize;

use super::constraint::TimeExtent;
use super::workload::validate_intervals;
use super::{
    BoundKind, BusyInterval, Constraint, Objective, Resource, ResourceDef, ResourceId,
    ResourceKind, Solution, Task, TaskDef, TaskId, WorkLoad,
};
use crate::error::{ModelError, SolverError};
use crate::expr::{Assignment, Expr, Formula, VarId, VarPool};

/// A resource-constrained scheduling problem.
///
/// # Example
/// ```
/// use u_schedule_smt::models::{Constraint, ResourceDef, SchedulingProblem, TaskDef};
///
/// let mut pb = SchedulingProblem::new("shop").with_horizon(20);
/// let cut = pb.add_task(TaskDef::new("cut", 4)).unwrap();
/// let weld = pb.add_task(TaskDef::new("weld", 6)).unwrap();
/// let robot = pb.add_resource(ResourceDef::worker("robot")).unwrap();
/// pb.require(cut, robot).unwrap();
/// pb.require(weld, robot).unwrap();
/// pb.add_constraint(Constraint::precedence(cut, weld)).unwrap();
///
/// assert_eq!(pb.get_tasks().len(), 2);
/// assert_eq!(pb.resource(robot).busy_intervals().len(), 2);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct SchedulingProblem {
    name: String,
    vars: VarPool,
    horizon: VarId,
    fixed_horizon: Option<i64>,
    tasks: Vec<Task>,
    resources: Vec<Resource>,
    workloads: Vec<WorkLoad>,
    constraints: Vec<Constraint>,
    objectives: Vec<Objective>,
    #[serde(skip)]
    solution: Option<Solution>,
}

impl SchedulingProblem {
    /// Creates a problem with a free horizon.
    pub fn new(name: impl Into<String>) -> Self {
        let mut vars = VarPool::new();
        let horizon = vars.time("horizon");
        Self {
            name: name.into(),
            vars,
            horizon,
            fixed_horizon: None,
            tasks: Vec::new(),
            resources: Vec::new(),
            workloads: Vec::new(),
            constraints: Vec::new(),
            objectives: Vec::new(),
            solution: None,
        }
    }

    /// Fixes the horizon to `horizon`.
    pub fn with_horizon(mut self, horizon: i64) -> Self {
        self.fixed_horizon = Some(horizon);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Horizon variable. Always present, fixed or not.
    pub fn horizon(&self) -> VarId {
        self.horizon
    }

    pub fn fixed_horizon(&self) -> Option<i64> {
        self.fixed_horizon
    }

    pub fn vars(&self) -> &VarPool {
        &self.vars
    }

    /// Declares an extra integer variable, e.g. for a custom constraint.
    pub fn int_var(&mut self, name: impl Into<String>, lo: i64, hi: i64) -> VarId {
        self.vars.int(name, lo, hi)
    }

    /// Declares an extra boolean variable.
    pub fn bool_var(&mut self, name: impl Into<String>) -> VarId {
        self.vars.boolean(name)
    }

    // ======================== Registration ========================

    /// Registers a task.
    pub fn add_task(&mut self, def: TaskDef) -> Result<TaskId, ModelError> {
        self.check_name(&def.name)?;
        for (field, value) in [("duration", def.duration), ("work amount", def.work_amount)] {
            if value < 0 {
                return Err(ModelError::NegativeValue {
                    entity: def.name,
                    field,
                    value,
                });
            }
        }
        let id = TaskId(self.tasks.len());
        self.tasks.push(Task::register(def, &mut self.vars));
        Ok(id)
    }

    /// Registers a resource.
    ///
    /// A cumulative resource of size `n` also registers `n` member workers
    /// named `{name}_CumulativeWorker_{i}`.
    pub fn add_resource(&mut self, def: ResourceDef) -> Result<ResourceId, ModelError> {
        self.check_name(&def.name)?;
        if def.productivity < 0 {
            return Err(ModelError::NegativeValue {
                entity: def.name,
                field: "productivity",
                value: def.productivity,
            });
        }
        let kind = match def.kind {
            ResourceKind::Worker => ResourceKind::Worker,
            ResourceKind::Cumulative { size, .. } => {
                if size == 0 {
                    return Err(ModelError::InvalidSelection(format!(
                        "cumulative worker '{}' has size 0",
                        def.name
                    )));
                }
                let mut members = Vec::with_capacity(size);
                for i in 0..size {
                    let member = format!("{}_CumulativeWorker_{}", def.name, i);
                    self.check_name(&member)?;
                    members.push(self.push_resource(Resource::new(
                        member,
                        def.productivity,
                        ResourceKind::Worker,
                    )));
                }
                ResourceKind::Cumulative { size, members }
            }
            ResourceKind::Select {
                members,
                count,
                kind,
            } => {
                self.check_selection(&def.name, &members, count, kind)?;
                ResourceKind::Select {
                    members,
                    count,
                    kind,
                }
            }
        };
        Ok(self.push_resource(Resource::new(def.name, def.productivity, kind)))
    }

    fn push_resource(&mut self, resource: Resource) -> ResourceId {
        let id = ResourceId(self.resources.len());
        self.resources.push(resource);
        id
    }

    fn check_name(&self, name: &str) -> Result<(), ModelError> {
        let taken = name == "horizon"
            || self.tasks.iter().any(|t| t.name == name)
            || self.resources.iter().any(|r| r.name == name);
        if taken {
            Err(ModelError::DuplicateName(name.to_string()))
        } else {
            Ok(())
        }
    }

    fn check_selection(
        &self,
        name: &str,
        members: &[ResourceId],
        count: usize,
        kind: BoundKind,
    ) -> Result<(), ModelError> {
        if members.is_empty() {
            return Err(ModelError::InvalidSelection(format!(
                "'{name}' selects from an empty list"
            )));
        }
        for (i, &m) in members.iter().enumerate() {
            let member = self.try_resource(m)?;
            if member.kind != ResourceKind::Worker {
                return Err(ModelError::InvalidSelection(format!(
                    "'{}' is not a worker",
                    member.name
                )));
            }
            if members[..i].contains(&m) {
                return Err(ModelError::InvalidSelection(format!(
                    "'{}' listed twice",
                    member.name
                )));
            }
        }
        if kind != BoundKind::Max && count > members.len() {
            return Err(ModelError::InvalidSelection(format!(
                "'{name}' cannot select {count} of {} workers",
                members.len()
            )));
        }
        Ok(())
    }

    /// Makes `task` require `resource`.
    ///
    /// A worker is occupied during the whole task. For a group, every member
    /// gets its own busy interval guarded by a selection literal: a selected
    /// member is busy during the task, an unselected one has an empty busy
    /// interval at the task start.
    pub fn require(&mut self, task: TaskId, resource: ResourceId) -> Result<(), ModelError> {
        self.try_task(task)?;
        self.try_resource(resource)?;

        if !self.resources[resource.0].is_group() {
            if self.resources[resource.0].busy_intervals.contains_key(&task) {
                return Err(self.duplicate_requirement(task, resource));
            }
            let t = &mut self.tasks[task.0];
            let busy = BusyInterval {
                start: t.start(),
                end: t.end(),
                selected: None,
            };
            t.required_resources.push(resource);
            self.resources[resource.0].busy_intervals.insert(task, busy);
            return Ok(());
        }

        let members = self.resources[resource.0].members().to_vec();
        let taken = self.resources[resource.0].selections.contains_key(&task)
            || members
                .iter()
                .any(|m| self.resources[m.0].busy_intervals.contains_key(&task));
        if taken {
            return Err(self.duplicate_requirement(task, resource));
        }

        let (start, end) = (self.tasks[task.0].start(), self.tasks[task.0].end());
        let task_name = self.tasks[task.0].name.clone();
        let mut flags = Vec::with_capacity(members.len());
        for m in members {
            let member_name = self.resources[m.0].name.clone();
            let busy_start = self.vars.time(format!("{member_name}_busy_{task_name}_start"));
            let busy_end = self.vars.time(format!("{member_name}_busy_{task_name}_end"));
            let selected = self.vars.boolean(format!("{member_name}_selected_{task_name}"));

            let t = &mut self.tasks[task.0];
            t.assertions.push(Formula::implies(
                Formula::var(selected),
                Formula::and(vec![
                    Expr::var(busy_start).eq(start),
                    Expr::var(busy_end).eq(end),
                ]),
            ));
            t.assertions.push(Formula::implies(
                Formula::var(selected).negate(),
                Formula::and(vec![
                    Expr::var(busy_start).eq(start),
                    Expr::var(busy_end).eq(start),
                ]),
            ));
            t.required_resources.push(m);

            self.resources[m.0].busy_intervals.insert(
                task,
                BusyInterval {
                    start: busy_start,
                    end: busy_end,
                    selected: Some(selected),
                },
            );
            flags.push(selected);
        }
        self.resources[resource.0].selections.insert(task, flags);
        Ok(())
    }

    fn duplicate_requirement(&self, task: TaskId, resource: ResourceId) -> ModelError {
        ModelError::DuplicateRequirement {
            task: self.tasks[task.0].name.clone(),
            resource: self.resources[resource.0].name.clone(),
        }
    }

    /// Makes `task` require every resource of `resources`.
    pub fn require_all(
        &mut self,
        task: TaskId,
        resources: &[ResourceId],
    ) -> Result<(), ModelError> {
        for &r in resources {
            self.require(task, r)?;
        }
        Ok(())
    }

    /// Adds a workload bound.
    ///
    /// The resource must be a worker or a cumulative worker already
    /// required by some task; intervals must be well formed and disjoint.
    pub fn add_workload(&mut self, workload: WorkLoad) -> Result<(), ModelError> {
        self.check_busy_target(workload.resource)?;
        validate_intervals(workload.intervals())?;
        self.workloads.push(workload);
        Ok(())
    }

    /// Adds a user constraint.
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<(), ModelError> {
        for t in constraint.tasks() {
            self.try_task(t)?;
        }
        if let Some(r) = constraint.resource() {
            self.check_busy_target(r)?;
        }
        match &constraint {
            Constraint::ResourceUnavailable { intervals, .. } => check_ordered(intervals)?,
            Constraint::ResourcePeriodicallyUnavailable(p) => {
                if p.period <= 0 {
                    return Err(ModelError::InvalidPeriod(p.period));
                }
                check_ordered(&p.intervals)?;
            }
            Constraint::Custom(formula) => {
                if let Some(v) = formula.vars().into_iter().find(|v| v.index() >= self.vars.len()) {
                    return Err(ModelError::UnknownVariable(v.index()));
                }
            }
            _ => {}
        }
        match &constraint {
            Constraint::StartAt { task, .. } | Constraint::StartAfter { task, .. } => {
                self.tasks[task.0].lower_bounded = true;
            }
            Constraint::EndAt { task, .. } | Constraint::EndBefore { task, .. } => {
                self.tasks[task.0].upper_bounded = true;
            }
            _ => {}
        }
        self.constraints.push(constraint);
        Ok(())
    }

    /// Requests an objective. Objectives are optimized in request order.
    pub fn add_objective(&mut self, objective: Objective) {
        self.objectives.push(objective);
    }

    fn check_busy_target(&self, resource: ResourceId) -> Result<(), ModelError> {
        let r = self.try_resource(resource)?;
        let incompatible = |reason: &str| ModelError::IncompatibleResource {
            resource: r.name.clone(),
            reason: reason.to_string(),
        };
        if matches!(r.kind, ResourceKind::Select { .. }) {
            return Err(incompatible("selection groups have no busy intervals"));
        }
        if self.busy_intervals_of(resource).is_empty() {
            return Err(incompatible("no task requires it"));
        }
        Ok(())
    }

    // ======================== Lookup ========================

    /// All tasks in declaration order.
    pub fn get_tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// All resources in declaration order (cumulative members included).
    pub fn get_resources(&self) -> &[Resource] {
        &self.resources
    }

    /// # Panics
    /// If `id` was not returned by this problem.
    pub fn task(&self, id: TaskId) -> &Task {
        &self.tasks[id.0]
    }

    /// # Panics
    /// If `id` was not returned by this problem.
    pub fn resource(&self, id: ResourceId) -> &Resource {
        &self.resources[id.0]
    }

    pub fn task_id(&self, name: &str) -> Option<TaskId> {
        self.tasks.iter().position(|t| t.name == name).map(TaskId)
    }

    pub fn resource_id(&self, name: &str) -> Option<ResourceId> {
        self.resources
            .iter()
            .position(|r| r.name == name)
            .map(ResourceId)
    }

    fn try_task(&self, id: TaskId) -> Result<&Task, ModelError> {
        self.tasks.get(id.0).ok_or(ModelError::UnknownTask(id.0))
    }

    fn try_resource(&self, id: ResourceId) -> Result<&Resource, ModelError> {
        self.resources
            .get(id.0)
            .ok_or(ModelError::UnknownResource(id.0))
    }

    pub fn workloads(&self) -> &[WorkLoad] {
        &self.workloads
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }

    /// Busy intervals a resource contributes to workload and availability
    /// constraints: its own for a worker, its members' for a cumulative one.
    pub fn busy_intervals_of(&self, resource: ResourceId) -> Vec<BusyInterval> {
        let r = &self.resources[resource.0];
        match &r.kind {
            ResourceKind::Worker => r.busy_intervals.values().copied().collect(),
            ResourceKind::Cumulative { members, .. } => members
                .iter()
                .flat_map(|m| self.resources[m.0].busy_intervals.values().copied())
                .collect(),
            ResourceKind::Select { .. } => Vec::new(),
        }
    }

    /// Upper bound of every time variable.
    ///
    /// Large enough that any feasible schedule can be shifted inside
    /// `[0, time_bound]`: the furthest time constant or ranged variable
    /// referenced, plus every task run back to back, plus positive
    /// precedence offsets, plus one period per task for each periodic
    /// unavailability.
    pub fn time_bound(&self) -> i64 {
        let mut extent = TimeExtent {
            reach: self.fixed_horizon.unwrap_or(0).max(0),
            ..TimeExtent::default()
        };
        for c in &self.constraints {
            let e = c.time_extent();
            extent.reach = extent.reach.max(e.reach);
            extent.slack = extent.slack.saturating_add(e.slack);
            extent.per_task = extent.per_task.saturating_add(e.per_task);
        }
        for wl in &self.workloads {
            for (_, hi) in wl.intervals() {
                extent.reach = extent.reach.max(hi);
            }
        }
        for (_, (_, hi)) in self.vars.hard_ranges() {
            extent.reach = extent.reach.max(hi);
        }
        let serial = self
            .tasks
            .iter()
            .map(|t| t.duration)
            .fold(0, i64::saturating_add);
        let tasks = self.tasks.len() as i64;
        extent
            .reach
            .saturating_add(serial)
            .saturating_add(extent.slack)
            .saturating_add(extent.per_task.saturating_mul(tasks))
    }

    /// Lower bound of every time variable.
    ///
    /// Starts are non-negative unless a start constraint bounds them, so
    /// this is 0, the smallest such bound, or the lowest value of a ranged
    /// variable.
    pub fn time_floor(&self) -> i64 {
        self.constraints
            .iter()
            .filter_map(|c| match c {
                Constraint::StartAt { value, .. } | Constraint::StartAfter { value, .. } => {
                    Some(*value)
                }
                _ => None,
            })
            .chain(self.vars.hard_ranges().map(|(_, (lo, _))| lo))
            .fold(0, i64::min)
    }

    // ======================== Solution ========================

    /// Projects `model` onto this problem and replaces the current
    /// solution. Nothing changes if the projection fails.
    pub fn set_solution<A>(&mut self, model: &A) -> Result<(), SolverError>
    where
        A: Assignment + ?Sized,
    {
        let solution = Solution::project(self, model)?;
        self.solution = Some(solution);
        Ok(())
    }

    /// Last projected solution.
    pub fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }
}

fn check_ordered(intervals: &[(i64, i64)]) -> Result<(), ModelError> {
    match intervals.iter().find(|(lo, hi)| lo > hi) {
        Some(&(lo, hi)) => Err(ModelError::InvalidInterval {
            lo,
            hi,
            reason: "lower end exceeds upper end".into(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PeriodicUnavailability;

    fn two_tasks() -> (SchedulingProblem, TaskId, TaskId) {
        let mut pb = SchedulingProblem::new("test").with_horizon(10);
        let a = pb.add_task(TaskDef::new("a", 3)).unwrap();
        let b = pb.add_task(TaskDef::new("b", 4)).unwrap();
        (pb, a, b)
    }

    #[test]
    fn test_declaration_order() {
        let (pb, a, b) = two_tasks();
        let names: Vec<&str> = pb.get_tasks().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(pb.task_id("b"), Some(b));
        assert_eq!(pb.task(a).duration, 3);
        assert_eq!(pb.vars().name(pb.horizon()), "horizon");
    }

    #[test]
    fn test_duplicate_names() {
        let (mut pb, _, _) = two_tasks();
        assert_eq!(
            pb.add_task(TaskDef::new("a", 1)),
            Err(ModelError::DuplicateName("a".into()))
        );
        assert!(pb.add_resource(ResourceDef::worker("b")).is_err());
        assert!(pb.add_task(TaskDef::new("horizon", 1)).is_err());
    }

    #[test]
    fn test_negative_values() {
        let mut pb = SchedulingProblem::new("neg");
        assert!(matches!(
            pb.add_task(TaskDef::new("t", -1)),
            Err(ModelError::NegativeValue { field: "duration", .. })
        ));
        assert!(matches!(
            pb.add_resource(ResourceDef::worker("w").with_productivity(-2)),
            Err(ModelError::NegativeValue { field: "productivity", .. })
        ));
        assert!(pb.get_tasks().is_empty());
    }

    #[test]
    fn test_cumulative_expands_members() {
        let mut pb = SchedulingProblem::new("cumul");
        let m = pb
            .add_resource(ResourceDef::cumulative("M", 3).with_productivity(2))
            .unwrap();
        let members = pb.resource(m).members().to_vec();
        assert_eq!(members.len(), 3);
        assert_eq!(pb.resource(members[0]).name, "M_CumulativeWorker_0");
        assert_eq!(pb.resource(members[2]).productivity, 2);
        assert_eq!(pb.get_resources().len(), 4);

        assert!(pb.add_resource(ResourceDef::cumulative("E", 0)).is_err());
    }

    #[test]
    fn test_require_worker() {
        let (mut pb, a, _) = two_tasks();
        let w = pb.add_resource(ResourceDef::worker("w")).unwrap();
        pb.require(a, w).unwrap();

        let busy = pb.resource(w).busy_interval(a).unwrap();
        assert_eq!(busy.start, pb.task(a).start());
        assert_eq!(busy.selected, None);
        assert_eq!(pb.task(a).required_resources(), &[w]);
        assert!(matches!(
            pb.require(a, w),
            Err(ModelError::DuplicateRequirement { .. })
        ));
    }

    #[test]
    fn test_require_group_creates_selection() {
        let (mut pb, a, _) = two_tasks();
        let w1 = pb.add_resource(ResourceDef::worker("w1")).unwrap();
        let w2 = pb.add_resource(ResourceDef::worker("w2")).unwrap();
        let sel = pb
            .add_resource(ResourceDef::select("pick", vec![w1, w2], 1))
            .unwrap();
        pb.require(a, sel).unwrap();

        assert_eq!(pb.task(a).required_resources(), &[w1, w2]);
        assert_eq!(pb.task(a).assertions().len(), 1 + 2 * 2);
        assert_eq!(pb.resource(sel).selections()[&a].len(), 2);
        let busy = pb.resource(w1).busy_interval(a).unwrap();
        assert_eq!(pb.vars().name(busy.start), "w1_busy_a_start");
        assert!(busy.selected.is_some());

        assert!(pb.require(a, w1).is_err());
    }

    #[test]
    fn test_invalid_selection() {
        let mut pb = SchedulingProblem::new("sel");
        let w = pb.add_resource(ResourceDef::worker("w")).unwrap();
        let c = pb.add_resource(ResourceDef::cumulative("c", 2)).unwrap();
        assert!(pb.add_resource(ResourceDef::select("s1", vec![], 1)).is_err());
        assert!(pb.add_resource(ResourceDef::select("s2", vec![w, c], 1)).is_err());
        assert!(pb.add_resource(ResourceDef::select("s3", vec![w, w], 1)).is_err());
        assert!(pb.add_resource(ResourceDef::select("s4", vec![w], 2)).is_err());
        assert!(pb
            .add_resource(ResourceDef::select("s5", vec![w], 2).with_selection_kind(BoundKind::Max))
            .is_ok());
    }

    #[test]
    fn test_workload_requires_busy_resource() {
        let (mut pb, a, _) = two_tasks();
        let w = pb.add_resource(ResourceDef::worker("w")).unwrap();
        let err = pb.add_workload(WorkLoad::new(w, [((3, 8), 0)])).unwrap_err();
        assert!(matches!(err, ModelError::IncompatibleResource { .. }));

        pb.require(a, w).unwrap();
        assert!(pb.add_workload(WorkLoad::new(w, [((3, 8), 0)])).is_ok());
        assert!(pb
            .add_workload(WorkLoad::new(w, [((0, 5), 1), ((4, 8), 1)]))
            .is_err());
        assert_eq!(pb.workloads().len(), 1);
    }

    #[test]
    fn test_unavailability_validation() {
        let (mut pb, a, _) = two_tasks();
        let w = pb.add_resource(ResourceDef::worker("w")).unwrap();
        assert!(pb
            .add_constraint(Constraint::unavailable(w, vec![(1, 3)]))
            .is_err());
        pb.require(a, w).unwrap();
        assert!(pb
            .add_constraint(Constraint::unavailable(w, vec![(3, 1)]))
            .is_err());
        assert_eq!(
            pb.add_constraint(Constraint::periodically_unavailable(
                PeriodicUnavailability::new(w, vec![(1, 2)], 0)
            )),
            Err(ModelError::InvalidPeriod(0))
        );
        assert!(pb
            .add_constraint(Constraint::unavailable(w, vec![(1, 3)]))
            .is_ok());
    }

    #[test]
    fn test_bound_flags() {
        let (mut pb, a, b) = two_tasks();
        pb.add_constraint(Constraint::start_after(a, 2)).unwrap();
        pb.add_constraint(Constraint::end_before(b, 9)).unwrap();
        assert!(pb.task(a).is_lower_bounded());
        assert!(!pb.task(a).is_upper_bounded());
        assert!(pb.task(b).is_upper_bounded());
        assert!(pb
            .add_constraint(Constraint::start_at(TaskId(7), 0))
            .is_err());
    }

    #[test]
    fn test_custom_unknown_variable() {
        let (mut pb, _, _) = two_tasks();
        let ghost = VarId(999);
        assert_eq!(
            pb.add_constraint(Constraint::Custom(Expr::var(ghost).le(3))),
            Err(ModelError::UnknownVariable(999))
        );
        let x = pb.int_var("x", 0, 5);
        assert!(pb.add_constraint(Constraint::Custom(Expr::var(x).le(3))).is_ok());
    }

    #[test]
    fn test_time_bound() {
        let (mut pb, a, b) = two_tasks();
        assert_eq!(pb.time_bound(), 10 + 7);

        let w = pb.add_resource(ResourceDef::worker("w")).unwrap();
        pb.require(a, w).unwrap();
        pb.add_constraint(Constraint::unavailable(w, vec![(0, 30)]))
            .unwrap();
        pb.add_constraint(Constraint::precedence_with(
            a,
            b,
            crate::models::PrecedenceKind::Lax,
            2,
        ))
        .unwrap();
        assert_eq!(pb.time_bound(), 30 + 7 + 2);
    }

    #[test]
    fn test_time_range_covers_ranged_variables() {
        let (mut pb, _, _) = two_tasks();
        pb.int_var("late", 900, 1000);
        pb.int_var("early", -20, 0);
        assert_eq!(pb.time_bound(), 1000 + 7);
        assert_eq!(pb.time_floor(), -20);
    }

    #[test]
    fn test_time_bound_saturates() {
        let mut pb = SchedulingProblem::new("huge");
        pb.add_task(TaskDef::new("a", i64::MAX)).unwrap();
        pb.add_task(TaskDef::new("b", i64::MAX)).unwrap();
        assert_eq!(pb.time_bound(), i64::MAX);
    }
}
