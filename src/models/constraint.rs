//! User-declared scheduling constraints.
//!
//! Each constraint lowers itself to formulas over the problem's variables;
//! the compiler passes those through untouched.
//!
//! # Reference
//! Brucker (2007), "Scheduling Algorithms", Ch. 2

use serde::{Deserialize, Serialize};

use super::{ResourceId, SchedulingProblem, TaskId};
use crate::expr::{Expr, Formula};

/// How tightly a precedence binds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrecedenceKind {
    /// `after.start >= before.end + offset`
    #[default]
    Lax,
    /// `after.start > before.end + offset`
    Strict,
    /// `after.start == before.end + offset`
    Tight,
}

/// Repeating unavailability of a resource.
///
/// Every interval `(lo, hi)` recurs as `(lo + offset + k*period, hi + offset + k*period)`.
/// A recurrence is kept when its lower end lies in `[start, end)`; `end`
/// defaults to the problem's time bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodicUnavailability {
    pub resource: ResourceId,
    pub intervals: Vec<(i64, i64)>,
    pub period: i64,
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub start: i64,
    #[serde(default)]
    pub end: Option<i64>,
}

impl PeriodicUnavailability {
    pub fn new(resource: ResourceId, intervals: Vec<(i64, i64)>, period: i64) -> Self {
        Self {
            resource,
            intervals,
            period,
            offset: 0,
            start: 0,
            end: None,
        }
    }

    /// Shifts every recurrence by `offset`.
    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    /// Ignores recurrences starting before `start`.
    pub fn with_start(mut self, start: i64) -> Self {
        self.start = start;
        self
    }

    /// Ignores recurrences starting at or after `end`.
    pub fn with_end(mut self, end: i64) -> Self {
        self.end = Some(end);
        self
    }

    /// Concrete unavailable intervals up to `limit` (used when `end` is unset).
    pub fn expand(&self, limit: i64) -> Vec<(i64, i64)> {
        let window_end = self.end.unwrap_or(limit);
        let mut out = Vec::new();
        if self.period <= 0 {
            return out;
        }
        for &(lo, hi) in &self.intervals {
            let base = lo + self.offset;
            // first k with base + k*period >= start
            let mut k = -(base - self.start).div_euclid(self.period);
            if base + k * self.period < self.start {
                k += 1;
            }
            loop {
                let shift = self.offset + k * self.period;
                if lo + shift >= window_end {
                    break;
                }
                out.push((lo + shift, hi + shift));
                k += 1;
            }
        }
        out.sort_unstable();
        out
    }
}

/// A scheduling constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Constraint {
    /// `after` starts once `before` has ended (+ `offset`).
    Precedence {
        before: TaskId,
        after: TaskId,
        offset: i64,
        kind: PrecedenceKind,
    },
    StartAt { task: TaskId, value: i64 },
    StartAfter { task: TaskId, value: i64, strict: bool },
    EndAt { task: TaskId, value: i64 },
    EndBefore { task: TaskId, value: i64, strict: bool },
    /// The resource performs no work inside any of the intervals.
    ResourceUnavailable {
        resource: ResourceId,
        intervals: Vec<(i64, i64)>,
    },
    ResourcePeriodicallyUnavailable(PeriodicUnavailability),
    /// Arbitrary formula over problem variables, asserted verbatim.
    Custom(Formula),
}

/// Time span a constraint can push the schedule to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct TimeExtent {
    /// Largest absolute time referenced.
    pub reach: i64,
    /// Extra delay added on top of serial task execution.
    pub slack: i64,
    /// Extra delay per task (periodic patterns).
    pub per_task: i64,
}

impl Constraint {
    /// Zero-offset lax precedence.
    pub fn precedence(before: TaskId, after: TaskId) -> Self {
        Self::Precedence {
            before,
            after,
            offset: 0,
            kind: PrecedenceKind::Lax,
        }
    }

    /// Precedence with an explicit kind and offset.
    pub fn precedence_with(
        before: TaskId,
        after: TaskId,
        kind: PrecedenceKind,
        offset: i64,
    ) -> Self {
        Self::Precedence {
            before,
            after,
            offset,
            kind,
        }
    }

    pub fn start_at(task: TaskId, value: i64) -> Self {
        Self::StartAt { task, value }
    }

    pub fn start_after(task: TaskId, value: i64) -> Self {
        Self::StartAfter {
            task,
            value,
            strict: false,
        }
    }

    pub fn end_at(task: TaskId, value: i64) -> Self {
        Self::EndAt { task, value }
    }

    pub fn end_before(task: TaskId, value: i64) -> Self {
        Self::EndBefore {
            task,
            value,
            strict: false,
        }
    }

    pub fn unavailable(resource: ResourceId, intervals: Vec<(i64, i64)>) -> Self {
        Self::ResourceUnavailable {
            resource,
            intervals,
        }
    }

    pub fn periodically_unavailable(pattern: PeriodicUnavailability) -> Self {
        Self::ResourcePeriodicallyUnavailable(pattern)
    }

    /// Tasks referenced by this constraint.
    pub fn tasks(&self) -> Vec<TaskId> {
        match self {
            Constraint::Precedence { before, after, .. } => vec![*before, *after],
            Constraint::StartAt { task, .. }
            | Constraint::StartAfter { task, .. }
            | Constraint::EndAt { task, .. }
            | Constraint::EndBefore { task, .. } => vec![*task],
            _ => Vec::new(),
        }
    }

    /// Resource referenced by this constraint.
    pub fn resource(&self) -> Option<ResourceId> {
        match self {
            Constraint::ResourceUnavailable { resource, .. } => Some(*resource),
            Constraint::ResourcePeriodicallyUnavailable(p) => Some(p.resource),
            _ => None,
        }
    }

    /// Lowers this constraint to formulas. Ids must belong to `problem`.
    pub fn assertions(&self, problem: &SchedulingProblem) -> Vec<Formula> {
        match self {
            Constraint::Precedence {
                before,
                after,
                offset,
                kind,
            } => {
                let ready = Expr::var(problem.task(*before).end()) + *offset;
                let start = Expr::var(problem.task(*after).start());
                let f = match kind {
                    PrecedenceKind::Lax => start.ge(ready),
                    PrecedenceKind::Strict => start.gt(ready),
                    PrecedenceKind::Tight => start.eq(ready),
                };
                vec![f]
            }
            Constraint::StartAt { task, value } => {
                vec![Expr::var(problem.task(*task).start()).eq(*value)]
            }
            Constraint::StartAfter {
                task,
                value,
                strict,
            } => {
                let start = Expr::var(problem.task(*task).start());
                vec![if *strict { start.gt(*value) } else { start.ge(*value) }]
            }
            Constraint::EndAt { task, value } => {
                vec![Expr::var(problem.task(*task).end()).eq(*value)]
            }
            Constraint::EndBefore {
                task,
                value,
                strict,
            } => {
                let end = Expr::var(problem.task(*task).end());
                vec![if *strict { end.lt(*value) } else { end.le(*value) }]
            }
            Constraint::ResourceUnavailable {
                resource,
                intervals,
            } => no_work_during(problem, *resource, intervals),
            Constraint::ResourcePeriodicallyUnavailable(pattern) => {
                let intervals = pattern.expand(problem.time_bound());
                no_work_during(problem, pattern.resource, &intervals)
            }
            Constraint::Custom(formula) => vec![formula.clone()],
        }
    }

    pub(crate) fn time_extent(&self) -> TimeExtent {
        match self {
            Constraint::Precedence { offset, .. } => TimeExtent {
                slack: (*offset).max(0),
                ..TimeExtent::default()
            },
            Constraint::StartAt { value, .. }
            | Constraint::StartAfter { value, .. }
            | Constraint::EndAt { value, .. }
            | Constraint::EndBefore { value, .. } => TimeExtent {
                reach: value.abs(),
                ..TimeExtent::default()
            },
            Constraint::ResourceUnavailable { intervals, .. } => TimeExtent {
                reach: intervals.iter().map(|&(_, hi)| hi).max().unwrap_or(0),
                ..TimeExtent::default()
            },
            Constraint::ResourcePeriodicallyUnavailable(p) => {
                let hi = p.intervals.iter().map(|&(_, hi)| hi).max().unwrap_or(0);
                TimeExtent {
                    reach: p.start.max(0) + p.offset.abs() + hi.max(0),
                    slack: 0,
                    per_task: p.period.max(0),
                }
            }
            Constraint::Custom(formula) => TimeExtent {
                reach: largest_constant(formula),
                ..TimeExtent::default()
            },
        }
    }
}

// Each (lo, hi) gets `overlap(busy, (lo, hi)) == 0`, so zero-length
// (unselected) busy intervals are never in the way.
fn no_work_during(
    problem: &SchedulingProblem,
    resource: ResourceId,
    intervals: &[(i64, i64)],
) -> Vec<Formula> {
    let mut out = Vec::new();
    for busy in problem.busy_intervals_of(resource) {
        for &(lo, hi) in intervals {
            out.push(busy.overlap(lo, hi).le(0));
        }
    }
    out
}

fn largest_constant(formula: &Formula) -> i64 {
    fn in_expr(e: &Expr) -> i64 {
        match e {
            Expr::Const(c) => c.saturating_abs(),
            Expr::Var(_) => 0,
            Expr::Sum(ts) => ts.iter().map(in_expr).max().unwrap_or(0),
            Expr::Sub(a, b) => in_expr(a).max(in_expr(b)),
            Expr::Scale(_, e) => in_expr(e),
            Expr::Ite(c, a, b) => largest_constant(c).max(in_expr(a)).max(in_expr(b)),
        }
    }
    match formula {
        Formula::Const(_) | Formula::Var(_) => 0,
        Formula::Cmp(_, a, b) => in_expr(a).max(in_expr(b)),
        Formula::Not(f) => largest_constant(f),
        Formula::And(fs) | Formula::Or(fs) => fs.iter().map(largest_constant).max().unwrap_or(0),
        Formula::Implies(a, b) => largest_constant(a).max(largest_constant(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ResourceDef, TaskDef};

    #[test]
    fn test_precedence_kinds() {
        let mut pb = SchedulingProblem::new("prec").with_horizon(20);
        let a = pb.add_task(TaskDef::new("a", 2)).unwrap();
        let b = pb.add_task(TaskDef::new("b", 2)).unwrap();

        // vars: horizon, a_start, a_end, b_start, b_end
        let env = [20i64, 0, 2, 4, 6];
        let lax = Constraint::precedence_with(a, b, PrecedenceKind::Lax, 2).assertions(&pb);
        let strict = Constraint::precedence_with(a, b, PrecedenceKind::Strict, 2).assertions(&pb);
        let tight = Constraint::precedence_with(a, b, PrecedenceKind::Tight, 2).assertions(&pb);

        assert_eq!(lax[0].evaluate(&env[..]), Some(true));
        assert_eq!(strict[0].evaluate(&env[..]), Some(false));
        assert_eq!(tight[0].evaluate(&env[..]), Some(true));
    }

    #[test]
    fn test_task_references() {
        let c = Constraint::precedence(TaskId(0), TaskId(3));
        assert_eq!(c.tasks(), vec![TaskId(0), TaskId(3)]);
        assert_eq!(c.resource(), None);

        let u = Constraint::unavailable(ResourceId(1), vec![(1, 3)]);
        assert!(u.tasks().is_empty());
        assert_eq!(u.resource(), Some(ResourceId(1)));
    }

    #[test]
    fn test_periodic_expand_basic() {
        let p = PeriodicUnavailability::new(ResourceId(0), vec![(1, 2), (3, 4)], 5);
        assert_eq!(
            p.expand(12),
            vec![(1, 2), (3, 4), (6, 7), (8, 9), (11, 12)]
        );
    }

    #[test]
    fn test_periodic_expand_window() {
        // (2, 4) shifted to (4, 6); (-1, 1) lies before start, (14, 16) at end
        let p = PeriodicUnavailability::new(ResourceId(0), vec![(2, 4)], 5)
            .with_offset(2)
            .with_start(3)
            .with_end(14);
        assert_eq!(p.expand(100), vec![(4, 6), (9, 11)]);
    }

    #[test]
    fn test_periodic_expand_negative_base() {
        let p = PeriodicUnavailability::new(ResourceId(0), vec![(0, 1)], 4).with_offset(-6);
        assert_eq!(p.expand(9), vec![(2, 3), (6, 7)]);
    }

    #[test]
    fn test_unavailable_lowering() {
        let mut pb = SchedulingProblem::new("u").with_horizon(10);
        let t = pb.add_task(TaskDef::new("t", 3)).unwrap();
        let w = pb.add_resource(ResourceDef::worker("w")).unwrap();
        pb.require(t, w).unwrap();

        let f = Constraint::unavailable(w, vec![(1, 3), (6, 8)]).assertions(&pb);
        assert_eq!(f.len(), 2);
        // horizon, t_start, t_end
        let ok = [10i64, 3, 6];
        let bad = [10i64, 2, 5];
        assert!(f.iter().all(|x| x.evaluate(&ok[..]) == Some(true)));
        assert!(f.iter().any(|x| x.evaluate(&bad[..]) == Some(false)));
    }

    #[test]
    fn test_time_extent() {
        let e = Constraint::precedence_with(TaskId(0), TaskId(1), PrecedenceKind::Lax, 3)
            .time_extent();
        assert_eq!(e.slack, 3);

        let e = Constraint::unavailable(ResourceId(0), vec![(0, 3), (40, 51)]).time_extent();
        assert_eq!(e.reach, 51);

        let custom = Constraint::Custom(Expr::var(crate::expr::VarId(0)).le(-17));
        assert_eq!(custom.time_extent().reach, 17);
    }
}
