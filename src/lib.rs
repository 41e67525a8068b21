//! # talloc - Task Allocator
//!
//! Assigns a batch of tasks to a team in one deterministic greedy pass.
//!
//! ## How a run works
//!
//! - Tasks are ordered by priority class (urgent-fixed, urgent-dynamic, high,
//!   medium, low, unknown), then zone, then hardest first.
//! - Each team member has a time budget (300 adjusted minutes by default);
//!   a task's adjusted time is its base time divided by the member's speed.
//! - The first time a member is considered for a non-urgent task it is locked
//!   to a zone drawn round-robin from the zones in play, and afterwards only
//!   takes non-urgent work from that zone.
//! - Slow members (speed below 1.0) are never handed a difficulty 4+ task as
//!   their very first job.
//! - Among the members that pass, the least loaded wins; ties go to the
//!   member listed first. Tasks nobody can take are reported as unassigned.
//!
//! ```
//! use task_allocator::{allocate, AllocConfig, Task, Worker};
//!
//! let tasks = vec![
//!     Task::new("T1", 50.0, "urgent-fixed", 5, "X").unwrap(),
//!     Task::new("T2", 100.0, "high", 2, "Y").unwrap(),
//! ];
//! let team = vec![Worker::new("A", 1.0).unwrap(), Worker::new("B", 0.5).unwrap()];
//! let plan = allocate(&tasks, team, &AllocConfig::default()).unwrap();
//! assert_eq!(plan.assigned_count(), 2);
//! ```

pub mod capacity;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod engine;
pub mod error;
pub mod fields;
pub mod ingest;
pub mod report;
pub mod sorter;
pub mod task;
pub mod zones;

pub use config::AllocConfig;
pub use engine::{allocate, Allocation, AllocationEngine, AssignmentRow};
pub use error::{AllocError, AllocResult, RowError};
pub use fields::Priority;
pub use task::{AssignmentRecord, Task, Worker};
