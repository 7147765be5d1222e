//! Scheduling domain models.
//!
//! Provides the data types describing a scheduling problem and its
//! solution. Every entity carries the decision variables and definitional
//! assertions it introduces; the [`encoding`](crate::encoding) module only
//! collects and orders them.
//!
//! # Domain Mappings
//!
//! | u-schedule-smt | Manufacturing | Healthcare | Logistics |
//! |----------------|--------------|------------|-----------|
//! | Task | Job/Order | Patient Case | Shipment |
//! | Worker | Machine/Operator | Room/Doctor | Truck/Driver |
//! | Cumulative | Machine pool | Ward beds | Fleet |
//! | WorkLoad | Shift capacity | Staffing limit | Driving-hours cap |
//! | Solution | Production Plan | OR Schedule | Route Plan |

mod constraint;
mod objective;
mod problem;
mod resource;
mod solution;
mod task;
mod workload;

pub use constraint::{Constraint, PeriodicUnavailability, PrecedenceKind};
pub use objective::Objective;
pub use problem::SchedulingProblem;
pub use resource::{BusyInterval, Resource, ResourceDef, ResourceId, ResourceKind};
pub use solution::{ResourceAssignment, ResourceSolution, Solution, TaskSolution};
pub use task::{Task, TaskDef, TaskId};
pub use workload::{BoundKind, WorkLoad};
