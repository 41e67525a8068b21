//! Time budget admission.

use crate::task::{Task, Worker};

/// Gates assignments on a per-worker cumulative time cap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacityTracker {
    capacity: f64,
}

impl CapacityTracker {
    pub fn new(capacity: f64) -> Self {
        CapacityTracker { capacity }
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// True iff `task` still fits in the worker's remaining budget.
    pub fn fits(&self, worker: &Worker, task: &Task) -> bool {
        debug_assert!(worker.speed() > 0.0, "worker speed must be positive");
        worker.used_time() + worker.adjusted_time(task) <= self.capacity
    }

    /// Charge `task` to the worker. Only called after a successful match.
    pub fn commit(&self, worker: &mut Worker, task: &Task) -> f64 {
        let adjusted = worker.adjusted_time(task);
        worker.used_time += adjusted;
        adjusted
    }
}
