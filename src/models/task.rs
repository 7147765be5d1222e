//! Task model.
//!
//! A task is a unit of work with a fixed duration. Its `start` and `end`
//! are decision variables; the duration relation is a definitional
//! assertion the task carries itself.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 1

use serde::{Deserialize, Serialize};

use super::ResourceId;
use crate::expr::{Expr, Formula, VarId, VarPool};

/// Handle to a task registered in a [`SchedulingProblem`](super::SchedulingProblem).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(pub(crate) usize);

impl TaskId {
    /// Declaration index of the task.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Definition of a task before registration.
///
/// # Example
/// ```
/// use u_schedule_smt::models::TaskDef;
///
/// let def = TaskDef::new("paint", 8).with_work_amount(12);
/// assert_eq!(def.duration, 8);
/// assert_eq!(def.work_amount, 12);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDef {
    /// Unique task name.
    pub name: String,
    /// Fixed duration (time units).
    pub duration: i64,
    /// Productivity-weighted effort required from the assigned resources.
    #[serde(default)]
    pub work_amount: i64,
}

impl TaskDef {
    /// Creates a fixed-duration task definition.
    pub fn new(name: impl Into<String>, duration: i64) -> Self {
        Self {
            name: name.into(),
            duration,
            work_amount: 0,
        }
    }

    /// Sets the required work amount.
    pub fn with_work_amount(mut self, work_amount: i64) -> Self {
        self.work_amount = work_amount;
        self
    }
}

/// A registered task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique task name.
    pub name: String,
    /// Fixed duration.
    pub duration: i64,
    /// Required work amount (0 = none).
    pub work_amount: i64,
    start: VarId,
    end: VarId,
    pub(crate) lower_bounded: bool,
    pub(crate) upper_bounded: bool,
    /// Concrete workers this task may occupy, in requirement order.
    pub(crate) required_resources: Vec<ResourceId>,
    pub(crate) assertions: Vec<Formula>,
}

impl Task {
    pub(crate) fn register(def: TaskDef, vars: &mut VarPool) -> Self {
        let start = vars.time(format!("{}_start", def.name));
        let end = vars.time(format!("{}_end", def.name));
        let duration_holds = (Expr::var(end) - start).eq(def.duration);
        Self {
            name: def.name,
            duration: def.duration,
            work_amount: def.work_amount,
            start,
            end,
            lower_bounded: false,
            upper_bounded: false,
            required_resources: Vec::new(),
            assertions: vec![duration_holds],
        }
    }

    /// Start time variable.
    pub fn start(&self) -> VarId {
        self.start
    }

    /// End time variable.
    pub fn end(&self) -> VarId {
        self.end
    }

    /// Whether a user constraint already bounds the start from below,
    /// suppressing the default `start >= 0`.
    pub fn is_lower_bounded(&self) -> bool {
        self.lower_bounded
    }

    /// Whether a user constraint already bounds the end from above,
    /// suppressing the default `end <= horizon`.
    pub fn is_upper_bounded(&self) -> bool {
        self.upper_bounded
    }

    /// Concrete workers required (or selectable) by this task.
    pub fn required_resources(&self) -> &[ResourceId] {
        &self.required_resources
    }

    /// Definitional assertions: duration relation and busy-interval links.
    pub fn assertions(&self) -> &[Formula] {
        &self.assertions
    }
}
