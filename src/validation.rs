//! Whole-problem validation.
//!
//! Runs before compilation and reports every issue at once. Each issue
//! makes the problem infeasible; the solver logs them and lets the engine
//! return the unsat verdict. Detects:
//! - Tasks longer than a fixed horizon
//! - Work amounts no required resource can deliver
//! - Precedence cycles of positive length
//!
//! Per-entity checks (names, negative values, intervals) already happen
//! when the entity is added to the problem.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 24.1 and 24.4
//! (Bellman-Ford, difference constraints)

use crate::models::{Constraint, PrecedenceKind, SchedulingProblem, TaskId};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A task cannot fit inside the fixed horizon.
    HorizonTooShort,
    /// A task needs work but requires no productive resource.
    UnreachableWorkAmount,
    /// Precedence constraints chain back to their origin with a positive delay.
    CyclicPrecedence,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a scheduling problem.
///
/// Checks:
/// 1. Every task fits inside the fixed horizon, if any
/// 2. Every task with a work amount requires a resource with positive productivity
/// 3. Precedence constraints admit some ordering of task starts
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_problem(problem: &SchedulingProblem) -> ValidationResult {
    let mut errors = Vec::new();

    if let Some(h) = problem.fixed_horizon() {
        for task in problem.get_tasks() {
            if task.duration > h {
                errors.push(ValidationError::new(
                    ValidationErrorKind::HorizonTooShort,
                    format!(
                        "Task '{}' (duration {}) exceeds horizon {h}",
                        task.name, task.duration
                    ),
                ));
            }
        }
    }

    for (index, task) in problem.get_tasks().iter().enumerate() {
        if task.work_amount <= 0 {
            continue;
        }
        let productive = task.required_resources().iter().any(|&r| {
            let resource = problem.resource(r);
            resource.productivity > 0 && resource.busy_interval(TaskId(index)).is_some()
        });
        if !productive {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnreachableWorkAmount,
                format!(
                    "Task '{}' needs work {} but requires no productive resource",
                    task.name, task.work_amount
                ),
            ));
        }
    }

    if let Some(err) = detect_positive_cycle(problem) {
        errors.push(err);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Detects an infeasible cycle among precedence constraints.
///
/// # Algorithm
/// Each precedence is a difference constraint
/// `start(after) - start(before) >= duration(before) + offset` (+1 when
/// strict; a tight precedence also adds the reverse edge). Longest-path
/// Bellman-Ford relaxation from a virtual source: if an edge can still be
/// relaxed after `n` rounds, some cycle has positive length and no
/// schedule satisfies it.
///
/// # Reference
/// Cormen et al. (2009), "Introduction to Algorithms", Ch. 24.4
fn detect_positive_cycle(problem: &SchedulingProblem) -> Option<ValidationError> {
    let tasks = problem.get_tasks();
    let mut edges: Vec<(usize, usize, i64)> = Vec::new();
    for constraint in problem.constraints() {
        if let Constraint::Precedence {
            before,
            after,
            offset,
            kind,
        } = constraint
        {
            let gap = tasks[before.index()].duration.saturating_add(*offset);
            match kind {
                PrecedenceKind::Lax => edges.push((before.index(), after.index(), gap)),
                PrecedenceKind::Strict => {
                    edges.push((before.index(), after.index(), gap.saturating_add(1)))
                }
                PrecedenceKind::Tight => {
                    edges.push((before.index(), after.index(), gap));
                    edges.push((after.index(), before.index(), gap.saturating_neg()));
                }
            }
        }
    }
    if edges.is_empty() {
        return None;
    }

    let mut dist = vec![0i64; tasks.len()];
    for _ in 0..tasks.len() {
        let mut changed = false;
        for &(u, v, w) in &edges {
            if dist[u].saturating_add(w) > dist[v] {
                dist[v] = dist[u].saturating_add(w);
                changed = true;
            }
        }
        if !changed {
            return None;
        }
    }

    let mut involved: Vec<&str> = edges
        .iter()
        .filter(|&&(u, v, w)| dist[u].saturating_add(w) > dist[v])
        .flat_map(|&(u, v, _)| [tasks[u].name.as_str(), tasks[v].name.as_str()])
        .collect();
    involved.sort_unstable();
    involved.dedup();
    if involved.is_empty() {
        return None;
    }
    Some(ValidationError::new(
        ValidationErrorKind::CyclicPrecedence,
        format!(
            "Precedence constraints form a cycle of positive length involving task(s) {}",
            involved
                .iter()
                .map(|n| format!("'{n}'"))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    ))
}
