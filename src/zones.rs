//! Round-robin zone locking.
//!
//! Workers are spread over the distinct zones of non-exempt tasks by drawing
//! from a fixed, sorted zone list with a modulo-indexed counter. A worker
//! draws once, the first time a non-exempt task needs it locked, and keeps
//! that zone for the rest of the run unless relock on exhaustion is enabled.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::task::{Task, Worker};

#[derive(Debug, Clone, Default)]
pub struct ZoneAssigner {
    zones: Vec<String>,
    counter: usize,
    /// Non-exempt tasks per zone the engine has not processed yet.
    remaining: BTreeMap<String, usize>,
    acquisitions: BTreeMap<String, usize>,
}

impl ZoneAssigner {
    /// Build the zone cycle for one run from its tasks.
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut remaining: BTreeMap<String, usize> = BTreeMap::new();
        for task in tasks.iter().filter(|t| !t.priority.is_exempt()) {
            *remaining.entry(task.zone.clone()).or_default() += 1;
        }
        let zones: BTreeSet<String> = remaining.keys().cloned().collect();
        ZoneAssigner {
            zones: zones.into_iter().collect(),
            counter: 0,
            remaining,
            acquisitions: BTreeMap::new(),
        }
    }

    /// Distinct non-exempt zones, sorted.
    pub fn zones(&self) -> &[String] {
        &self.zones
    }

    /// Number of draws taken from the cycle so far.
    pub fn draws(&self) -> usize {
        self.counter
    }

    /// How many times each zone has been locked onto a worker.
    pub fn acquisitions(&self) -> &BTreeMap<String, usize> {
        &self.acquisitions
    }

    /// Draw the next zone in the cycle. `None` only when there are no
    /// non-exempt zones at all.
    pub fn acquire(&mut self) -> Option<String> {
        if self.zones.is_empty() {
            return None;
        }
        let zone = self.zones[self.counter % self.zones.len()].clone();
        self.counter += 1;
        *self.acquisitions.entry(zone.clone()).or_default() += 1;
        Some(zone)
    }

    /// True iff the worker is locked to `zone`.
    pub fn is_eligible(&self, worker: &Worker, zone: &str) -> bool {
        worker.locked_zone() == Some(zone)
    }

    pub fn remaining(&self, zone: &str) -> usize {
        self.remaining.get(zone).copied().unwrap_or(0)
    }

    /// True when no unprocessed non-exempt task is left in `zone`.
    pub fn is_exhausted(&self, zone: &str) -> bool {
        self.remaining(zone) == 0
    }

    /// Record that the engine has finished with `task`, assigned or not.
    pub fn mark_processed(&mut self, task: &Task) {
        if task.priority.is_exempt() {
            return;
        }
        if let Some(count) = self.remaining.get_mut(&task.zone) {
            *count = count.saturating_sub(1);
        }
    }

    /// Keep drawing until a zone that still has work comes up, at most one
    /// full turn of the cycle.
    fn relock(&mut self) -> Option<String> {
        for _ in 0..self.zones.len() {
            let zone = self.zones[self.counter % self.zones.len()].clone();
            self.counter += 1;
            if !self.is_exhausted(&zone) {
                *self.acquisitions.entry(zone.clone()).or_default() += 1;
                return Some(zone);
            }
        }
        None
    }

    /// Zone check for a non-exempt task, locking the worker first if it has
    /// no zone yet. With `relock_on_exhaustion`, a worker whose zone has run
    /// dry is moved to the next zone that still has work before testing.
    pub fn check(&mut self, worker: &mut Worker, task_zone: &str, relock_on_exhaustion: bool) -> bool {
        match worker.locked_zone.clone() {
            None => match self.acquire() {
                Some(zone) => {
                    debug!("worker '{}' locked to zone '{}'", worker.name, zone);
                    worker.locked_zone = Some(zone);
                }
                None => return false,
            },
            Some(current) => {
                if relock_on_exhaustion && current != task_zone && self.is_exhausted(&current) {
                    if let Some(zone) = self.relock() {
                        debug!(
                            "worker '{}' relocked from exhausted zone '{}' to '{}'",
                            worker.name, current, zone
                        );
                        worker.locked_zone = Some(zone);
                    }
                }
            }
        }
        self.is_eligible(worker, task_zone)
    }
}
