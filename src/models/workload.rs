//! Time-varying workload bounds on a resource.
//!
//! A workload caps (or floors, or fixes) how much time a resource spends
//! busy inside given time intervals.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ResourceId;
use crate::error::ModelError;
use crate::expr::{Expr, Formula};

/// How a computed quantity relates to its bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundKind {
    /// `value == bound`
    Exact,
    /// `value >= bound`
    Min,
    /// `value <= bound`
    Max,
}

impl BoundKind {
    /// Builds `value <op> bound` for this kind.
    pub fn constrain(self, value: Expr, bound: impl Into<Expr>) -> Formula {
        match self {
            BoundKind::Exact => value.eq(bound),
            BoundKind::Min => value.ge(bound),
            BoundKind::Max => value.le(bound),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BoundKind::Exact => "exact",
            BoundKind::Min => "min",
            BoundKind::Max => "max",
        }
    }
}

impl FromStr for BoundKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(BoundKind::Exact),
            "min" => Ok(BoundKind::Min),
            "max" => Ok(BoundKind::Max),
            other => Err(ModelError::InvalidKind(other.to_string())),
        }
    }
}

impl fmt::Display for BoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workload bound on one resource.
///
/// Each entry maps a closed time interval `(lo, hi)` to a bound on the
/// summed overlap between that interval and the resource's busy intervals.
///
/// # Example
/// ```
/// use u_schedule_smt::models::{BoundKind, SchedulingProblem, TaskDef, ResourceDef, WorkLoad};
///
/// let mut pb = SchedulingProblem::new("wl").with_horizon(12);
/// let task = pb.add_task(TaskDef::new("t1", 8)).unwrap();
/// let worker = pb.add_resource(ResourceDef::worker("w1")).unwrap();
/// pb.require(task, worker).unwrap();
///
/// let kind: BoundKind = "max".parse().unwrap();
/// pb.add_workload(WorkLoad::new(worker, [((0, 6), 2)]).with_kind(kind)).unwrap();
/// assert!("foo".parse::<BoundKind>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkLoad {
    /// Bound resource (a worker or a cumulative worker).
    pub resource: ResourceId,
    /// `((lo, hi), bound)` entries over disjoint intervals.
    pub bounds: Vec<((i64, i64), i64)>,
    /// Relation between summed overlap and bound (default `max`).
    pub kind: BoundKind,
}

impl WorkLoad {
    /// Creates a `max` workload.
    pub fn new<I>(resource: ResourceId, bounds: I) -> Self
    where
        I: IntoIterator<Item = ((i64, i64), i64)>,
    {
        Self {
            resource,
            bounds: bounds.into_iter().collect(),
            kind: BoundKind::Max,
        }
    }

    /// Sets the bound kind.
    pub fn with_kind(mut self, kind: BoundKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the bound kind from its name, failing on anything but
    /// `exact`, `min` or `max`.
    pub fn with_kind_name(self, kind: &str) -> Result<Self, ModelError> {
        Ok(self.with_kind(kind.parse()?))
    }

    /// Intervals of this workload.
    pub fn intervals(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.bounds.iter().map(|(interval, _)| *interval)
    }
}

/// Checks `lo <= hi` for every interval and that no two overlap with
/// positive length.
pub(crate) fn validate_intervals<I>(intervals: I) -> Result<(), ModelError>
where
    I: IntoIterator<Item = (i64, i64)>,
{
    let mut sorted: Vec<(i64, i64)> = intervals.into_iter().collect();
    for &(lo, hi) in &sorted {
        if lo > hi {
            return Err(ModelError::InvalidInterval {
                lo,
                hi,
                reason: "lower end exceeds upper end".into(),
            });
        }
    }
    sorted.sort_unstable();
    for pair in sorted.windows(2) {
        let ((_, hi_a), (lo_b, hi_b)) = (pair[0], pair[1]);
        if lo_b < hi_a {
            return Err(ModelError::InvalidInterval {
                lo: lo_b,
                hi: hi_b,
                reason: "overlaps another interval".into(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse() {
        assert_eq!("exact".parse::<BoundKind>().unwrap(), BoundKind::Exact);
        assert_eq!("min".parse::<BoundKind>().unwrap(), BoundKind::Min);
        assert_eq!("max".parse::<BoundKind>().unwrap(), BoundKind::Max);
        assert_eq!(
            "foo".parse::<BoundKind>(),
            Err(ModelError::InvalidKind("foo".into()))
        );
        assert!("MAX".parse::<BoundKind>().is_err());
    }

    #[test]
    fn test_kind_serde() {
        let kind: BoundKind = serde_json::from_str("\"min\"").unwrap();
        assert_eq!(kind, BoundKind::Min);
        assert!(serde_json::from_str::<BoundKind>("\"foo\"").is_err());
        assert_eq!(BoundKind::Exact.to_string(), "exact");
    }

    #[test]
    fn test_default_kind_is_max() {
        let wl = WorkLoad::new(ResourceId(0), [((0, 6), 2)]);
        assert_eq!(wl.kind, BoundKind::Max);
        assert_eq!(wl.intervals().collect::<Vec<_>>(), vec![(0, 6)]);
    }

    #[test]
    fn test_with_kind_name() {
        let wl = WorkLoad::new(ResourceId(0), [((0, 6), 3)]);
        assert_eq!(wl.clone().with_kind_name("exact").unwrap().kind, BoundKind::Exact);
        assert_eq!(
            wl.with_kind_name("foo").unwrap_err(),
            ModelError::InvalidKind("foo".into())
        );
    }

    #[test]
    fn test_constrain() {
        let v = crate::expr::VarId(0);
        let at = |x: i64| [x];
        let max = BoundKind::Max.constrain(Expr::var(v), 2);
        let min = BoundKind::Min.constrain(Expr::var(v), 2);
        let exact = BoundKind::Exact.constrain(Expr::var(v), 2);

        assert_eq!(max.evaluate(&at(2)[..]), Some(true));
        assert_eq!(max.evaluate(&at(3)[..]), Some(false));
        assert_eq!(min.evaluate(&at(1)[..]), Some(false));
        assert_eq!(exact.evaluate(&at(2)[..]), Some(true));
        assert_eq!(exact.evaluate(&at(3)[..]), Some(false));
    }

    #[test]
    fn test_validate_intervals() {
        assert!(validate_intervals([(0, 4), (4, 8)]).is_ok());
        assert!(validate_intervals([(5, 5)]).is_ok());
        assert!(validate_intervals([(6, 2)]).is_err());
        assert!(validate_intervals([(0, 5), (4, 8)]).is_err());
        assert!(validate_intervals([(8, 10), (0, 9)]).is_err());
    }
}
