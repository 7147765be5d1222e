//! Resource model.
//!
//! Three resource shapes are supported:
//!
//! | Shape | Semantics |
//! |-------|-----------|
//! | Worker | one task at a time |
//! | Cumulative | `size` internal workers, each task takes at least one |
//! | Select | a task takes `count` (exactly / at least / at most) of a worker list |
//!
//! Workers record a busy interval per task that requires them. Group shapes
//! own one selection literal per member and per task.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 1.2

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{BoundKind, TaskId};
use crate::expr::{Expr, Formula, VarId};

/// Handle to a resource registered in a [`SchedulingProblem`](super::SchedulingProblem).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId(pub(crate) usize);

impl ResourceId {
    /// Declaration index of the resource.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Resource shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Single-slot worker.
    Worker,
    /// Worker pool allowing up to `size` concurrent tasks.
    Cumulative {
        size: usize,
        /// Internal workers, filled in at registration.
        #[serde(default)]
        members: Vec<ResourceId>,
    },
    /// Selection of `count` workers out of `members`.
    Select {
        members: Vec<ResourceId>,
        count: usize,
        kind: BoundKind,
    },
}

/// Definition of a resource before registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDef {
    /// Unique resource name.
    pub name: String,
    /// Work units produced per time unit (default 1).
    pub productivity: i64,
    /// Shape.
    pub kind: ResourceKind,
}

impl ResourceDef {
    /// Single-slot worker.
    pub fn worker(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            productivity: 1,
            kind: ResourceKind::Worker,
        }
    }

    /// Worker pool of capacity `size`.
    pub fn cumulative(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            productivity: 1,
            kind: ResourceKind::Cumulative {
                size,
                members: Vec::new(),
            },
        }
    }

    /// Selection of exactly `count` workers among `members`.
    pub fn select(name: impl Into<String>, members: Vec<ResourceId>, count: usize) -> Self {
        Self {
            name: name.into(),
            productivity: 1,
            kind: ResourceKind::Select {
                members,
                count,
                kind: BoundKind::Exact,
            },
        }
    }

    /// Sets the productivity.
    pub fn with_productivity(mut self, productivity: i64) -> Self {
        self.productivity = productivity;
        self
    }

    /// Sets the selection kind (only meaningful for `select`).
    pub fn with_selection_kind(mut self, kind: BoundKind) -> Self {
        if let ResourceKind::Select { kind: k, .. } = &mut self.kind {
            *k = kind;
        }
        self
    }
}

/// Interval during which a worker is occupied by one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: VarId,
    pub end: VarId,
    /// Selection literal when the worker was offered through a group.
    /// An unselected interval has zero length.
    pub selected: Option<VarId>,
}

impl BusyInterval {
    /// Length of the interval as an expression.
    pub fn length(&self) -> Expr {
        Expr::var(self.end) - self.start
    }

    /// Summed overlap with `(lo, hi)`, clipped at zero.
    pub fn overlap(&self, lo: i64, hi: i64) -> Expr {
        Expr::clipped_overlap(self.start, self.end, lo, hi)
    }

    fn guard(&self) -> Option<Formula> {
        self.selected.map(|s| Formula::var(s).negate())
    }
}

/// A registered resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    /// Unique resource name.
    pub name: String,
    /// Work units per time unit.
    pub productivity: i64,
    /// Shape.
    pub kind: ResourceKind,
    pub(crate) busy_intervals: BTreeMap<TaskId, BusyInterval>,
    /// Group shapes only: per task, one literal per member (member order).
    pub(crate) selections: BTreeMap<TaskId, Vec<VarId>>,
}

impl Resource {
    pub(crate) fn new(name: String, productivity: i64, kind: ResourceKind) -> Self {
        Self {
            name,
            productivity,
            kind,
            busy_intervals: BTreeMap::new(),
            selections: BTreeMap::new(),
        }
    }

    /// Busy intervals by task, in task declaration order.
    pub fn busy_intervals(&self) -> &BTreeMap<TaskId, BusyInterval> {
        &self.busy_intervals
    }

    /// Busy interval for one task, if that task requires this worker.
    pub fn busy_interval(&self, task: TaskId) -> Option<&BusyInterval> {
        self.busy_intervals.get(&task)
    }

    /// Whether this is a cumulative or selection group.
    pub fn is_group(&self) -> bool {
        !matches!(self.kind, ResourceKind::Worker)
    }

    /// Members of a group (empty for a worker).
    pub fn members(&self) -> &[ResourceId] {
        match &self.kind {
            ResourceKind::Worker => &[],
            ResourceKind::Cumulative { members, .. } | ResourceKind::Select { members, .. } => {
                members
            }
        }
    }

    /// Selection literals per task for a group.
    pub fn selections(&self) -> &BTreeMap<TaskId, Vec<VarId>> {
        &self.selections
    }

    /// Capacity and selection assertions of this resource.
    ///
    /// - worker: pairwise no-overlap of its busy intervals (an unselected
    ///   interval never conflicts)
    /// - cumulative: every requiring task selects at least one member
    /// - select: every requiring task selects `count` members per `kind`
    pub fn assertions(&self) -> Vec<Formula> {
        match &self.kind {
            ResourceKind::Worker => {
                let intervals: Vec<&BusyInterval> = self.busy_intervals.values().collect();
                let mut out = Vec::new();
                for (i, a) in intervals.iter().enumerate() {
                    for b in &intervals[i + 1..] {
                        let mut alternatives: Vec<Formula> =
                            a.guard().into_iter().chain(b.guard()).collect();
                        alternatives.push(Expr::var(a.end).le(b.start));
                        alternatives.push(Expr::var(b.end).le(a.start));
                        out.push(Formula::or(alternatives));
                    }
                }
                out
            }
            ResourceKind::Cumulative { .. } => self
                .selections
                .values()
                .map(|flags| BoundKind::Min.constrain(selected_count(flags), 1))
                .collect(),
            ResourceKind::Select { count, kind, .. } => self
                .selections
                .values()
                .map(|flags| kind.constrain(selected_count(flags), *count as i64))
                .collect(),
        }
    }
}

fn selected_count(flags: &[VarId]) -> Expr {
    Expr::sum(flags.iter().map(|&f| Expr::indicator(f)))
}
