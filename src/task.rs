//! Task, worker and assignment value types.
//!
//! This module defines the fixed-shape records that one allocation run owns:
//! the immutable `Task` being placed, the `Worker` accumulating assignments,
//! and the `AssignmentRecord` produced for each successful match.

use serde::{Deserialize, Serialize};

use crate::error::{AllocError, AllocResult};
use crate::fields::{parse_priority, Priority};

/// A unit of work to be placed on one worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    /// Base duration in minutes.
    pub time: f64,
    pub priority: Priority,
    /// Priority as it appeared in the input, trimmed.
    pub priority_label: String,
    pub difficulty: u32,
    pub zone: String,
}

impl Task {
    /// Build a task, parsing `priority` case-insensitively.
    pub fn new(
        id: impl Into<String>,
        time: f64,
        priority: &str,
        difficulty: u32,
        zone: impl Into<String>,
    ) -> AllocResult<Self> {
        let id = id.into();
        if !time.is_finite() || time <= 0.0 {
            return Err(AllocError::InvalidTime { task: id, time });
        }
        Ok(Task {
            id,
            time,
            priority: parse_priority(priority),
            priority_label: priority.trim().to_string(),
            difficulty,
            zone: zone.into(),
        })
    }
}

/// One successful match, frozen at the moment it was made.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentRecord {
    pub task_id: String,
    pub base_time: f64,
    /// `base_time / speed`, rounded to one decimal.
    pub adjusted_time: f64,
    pub priority: String,
    pub difficulty: u32,
    pub zone: String,
    /// Worker's cumulative used time right after this record was committed.
    pub used_after: f64,
}

/// A team member and the state it accumulates during one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Worker {
    pub name: String,
    speed: f64,
    pub(crate) assigned: Vec<AssignmentRecord>,
    pub(crate) used_time: f64,
    pub(crate) locked_zone: Option<String>,
}

impl Worker {
    /// Build a fresh worker. A non-positive or non-finite speed is rejected
    /// here so capacity checks never divide by it.
    pub fn new(name: impl Into<String>, speed: f64) -> AllocResult<Self> {
        let name = name.into();
        if !speed.is_finite() || speed <= 0.0 {
            return Err(AllocError::InvalidSpeed {
                worker: name,
                speed,
            });
        }
        Ok(Worker {
            name,
            speed,
            assigned: Vec::new(),
            used_time: 0.0,
            locked_zone: None,
        })
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn assigned(&self) -> &[AssignmentRecord] {
        &self.assigned
    }

    pub fn used_time(&self) -> f64 {
        self.used_time
    }

    pub fn locked_zone(&self) -> Option<&str> {
        self.locked_zone.as_deref()
    }

    /// Unrounded duration of `task` on this worker.
    pub fn adjusted_time(&self, task: &Task) -> f64 {
        task.time / self.speed
    }
}

/// Round to one decimal place for reporting.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
