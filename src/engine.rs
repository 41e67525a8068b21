//! Greedy best-fit allocation.
//!
//! The engine walks the sorted task sequence exactly once. For each task it
//! collects the workers that pass the capacity check, the zone lock (for
//! non-exempt tasks) and the novice guard, then hands the task to the least
//! loaded of them. Ties go to the worker listed first. A task nobody can take
//! is routed to the unassigned list and never looked at again.

use std::collections::BTreeMap;

use log::{debug, info};
use serde::Serialize;

use crate::capacity::CapacityTracker;
use crate::config::AllocConfig;
use crate::error::AllocResult;
use crate::sorter::sort_tasks;
use crate::task::{round1, AssignmentRecord, Task, Worker};
use crate::zones::ZoneAssigner;

/// One output row: a single assignment plus the worker's running total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentRow {
    #[serde(rename = "Team Member")]
    pub member: String,
    #[serde(rename = "Task ID")]
    pub task_id: String,
    #[serde(rename = "Base Time (mins)")]
    pub base_time: f64,
    #[serde(rename = "Adjusted Time (mins)")]
    pub adjusted_time: f64,
    #[serde(rename = "Priority")]
    pub priority: String,
    #[serde(rename = "Difficulty")]
    pub difficulty: u32,
    #[serde(rename = "Zone")]
    pub zone: String,
    #[serde(rename = "Total Time Used (mins)")]
    pub total_time_used: f64,
}

/// Final snapshot of a run.
#[derive(Debug, Clone, Serialize)]
pub struct Allocation {
    pub workers: Vec<Worker>,
    pub unassigned: Vec<Task>,
    /// Lock acquisitions per zone over the run.
    pub zone_locks: BTreeMap<String, usize>,
}

impl Allocation {
    /// Every assignment, grouped by worker in list order, then in the order
    /// each worker received them.
    pub fn rows(&self) -> Vec<AssignmentRow> {
        self.workers
            .iter()
            .flat_map(|w| {
                w.assigned().iter().map(move |r| AssignmentRow {
                    member: w.name.clone(),
                    task_id: r.task_id.clone(),
                    base_time: r.base_time,
                    adjusted_time: r.adjusted_time,
                    priority: r.priority.clone(),
                    difficulty: r.difficulty,
                    zone: r.zone.clone(),
                    total_time_used: round1(r.used_after),
                })
            })
            .collect()
    }

    /// Rows belonging to one worker.
    pub fn rows_for(&self, member: &str) -> Vec<AssignmentRow> {
        self.rows().into_iter().filter(|r| r.member == member).collect()
    }

    pub fn worker(&self, name: &str) -> Option<&Worker> {
        self.workers.iter().find(|w| w.name == name)
    }

    pub fn assigned_count(&self) -> usize {
        self.workers.iter().map(|w| w.assigned().len()).sum()
    }
}

/// Single-run allocation state. Owns its workers and zone cycle outright.
pub struct AllocationEngine {
    config: AllocConfig,
    capacity: CapacityTracker,
    zones: ZoneAssigner,
    workers: Vec<Worker>,
    unassigned: Vec<Task>,
}

impl AllocationEngine {
    pub fn new(workers: Vec<Worker>, zones: ZoneAssigner, config: AllocConfig) -> Self {
        AllocationEngine {
            capacity: CapacityTracker::new(config.capacity),
            config,
            zones,
            workers,
            unassigned: Vec::new(),
        }
    }

    /// Process `tasks` in the order given and return the final snapshot.
    pub fn run(mut self, tasks: Vec<Task>) -> Allocation {
        for task in tasks {
            self.process(task);
        }
        info!(
            "allocation finished: {} assigned, {} unassigned across {} worker(s)",
            self.workers.iter().map(|w| w.assigned().len()).sum::<usize>(),
            self.unassigned.len(),
            self.workers.len()
        );
        Allocation {
            workers: self.workers,
            unassigned: self.unassigned,
            zone_locks: self.zones.acquisitions().clone(),
        }
    }

    /// Place one task, or route it to the unassigned list.
    pub fn process(&mut self, task: Task) {
        let chosen = self.select(&task);
        self.zones.mark_processed(&task);
        match chosen {
            Some(idx) => self.assign(idx, &task),
            None => {
                info!(
                    "task '{}' ({}, zone '{}', {} min) left unassigned",
                    task.id, task.priority, task.zone, task.time
                );
                self.unassigned.push(task);
            }
        }
    }

    fn novice_blocked(&self, worker: &Worker, task: &Task) -> bool {
        self.config.novice_guard
            && worker.assigned().is_empty()
            && worker.speed() < self.config.novice_speed_below
            && task.difficulty >= self.config.novice_difficulty_from
    }

    /// Index of the least loaded eligible worker, first in list order on ties.
    fn select(&mut self, task: &Task) -> Option<usize> {
        let exempt = task.priority.is_exempt();
        let mut best: Option<(usize, f64)> = None;
        for idx in 0..self.workers.len() {
            if !self.capacity.fits(&self.workers[idx], task) {
                continue;
            }
            if !exempt {
                let relock = self.config.relock_on_exhaustion;
                if !self.zones.check(&mut self.workers[idx], &task.zone, relock) {
                    continue;
                }
                if self.novice_blocked(&self.workers[idx], task) {
                    debug!(
                        "novice guard: '{}' withheld from '{}'",
                        task.id, self.workers[idx].name
                    );
                    continue;
                }
            }
            let used = self.workers[idx].used_time();
            if best.map_or(true, |(_, min)| used < min) {
                best = Some((idx, used));
            }
        }
        best.map(|(idx, _)| idx)
    }

    fn assign(&mut self, idx: usize, task: &Task) {
        let worker = &mut self.workers[idx];
        let adjusted = self.capacity.commit(worker, task);
        worker.assigned.push(AssignmentRecord {
            task_id: task.id.clone(),
            base_time: task.time,
            adjusted_time: round1(adjusted),
            priority: task.priority_label.clone(),
            difficulty: task.difficulty,
            zone: task.zone.clone(),
            used_after: worker.used_time(),
        });
        debug!(
            "task '{}' -> '{}' ({:.1} min, total {:.1})",
            task.id,
            worker.name,
            adjusted,
            worker.used_time()
        );
    }
}

/// Sort `tasks`, build a fresh zone cycle and run the engine over them.
pub fn allocate(tasks: &[Task], workers: Vec<Worker>, config: &AllocConfig) -> AllocResult<Allocation> {
    config.validate()?;
    let ordered = sort_tasks(tasks);
    let zones = ZoneAssigner::from_tasks(&ordered);
    debug!(
        "allocating {} task(s) to {} worker(s) over zones {:?}",
        ordered.len(),
        workers.len(),
        zones.zones()
    );
    Ok(AllocationEngine::new(workers, zones, config.clone()).run(ordered))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, priority: &str, zone: &str, time: f64, difficulty: u32) -> Task {
        Task::new(id, time, priority, difficulty, zone).unwrap()
    }

    fn team(specs: &[(&str, f64)]) -> Vec<Worker> {
        specs
            .iter()
            .map(|(name, speed)| Worker::new(*name, *speed).unwrap())
            .collect()
    }

    fn owner<'a>(alloc: &'a Allocation, task_id: &str) -> Option<&'a str> {
        alloc
            .workers
            .iter()
            .find(|w| w.assigned().iter().any(|r| r.task_id == task_id))
            .map(|w| w.name.as_str())
    }

    #[test]
    fn test_worked_example() {
        let tasks = vec![
            task("T1", "urgent-fixed", "X", 50.0, 5),
            task("T2", "high", "Y", 100.0, 2),
            task("T3", "high", "Y", 100.0, 5),
        ];
        let workers = team(&[("A", 1.0), ("B", 0.5), ("C", 2.0)]);
        let alloc = allocate(&tasks, workers, &AllocConfig::default()).unwrap();

        assert_eq!(owner(&alloc, "T1"), Some("A"));
        assert_eq!(owner(&alloc, "T2"), Some("B"));
        assert_eq!(owner(&alloc, "T3"), Some("C"));
        assert!(alloc.unassigned.is_empty());

        assert_eq!(alloc.worker("A").unwrap().used_time(), 50.0);
        assert_eq!(alloc.worker("B").unwrap().used_time(), 200.0);
        assert_eq!(alloc.worker("C").unwrap().used_time(), 50.0);
        // Only Y is a non-exempt zone, so every lock lands there.
        assert_eq!(alloc.worker("B").unwrap().locked_zone(), Some("Y"));
        assert_eq!(alloc.zone_locks.get("Y"), Some(&3));
        assert!(alloc.zone_locks.get("X").is_none());
    }

    #[test]
    fn test_novice_guard_blocks_first_hard_task() {
        let tasks = vec![task("hard", "high", "Z", 30.0, 4)];
        let alloc = allocate(&tasks, team(&[("slow", 0.8)]), &AllocConfig::default()).unwrap();
        assert_eq!(alloc.unassigned.len(), 1);
        assert_eq!(alloc.unassigned[0].id, "hard");

        let relaxed = AllocConfig {
            novice_guard: false,
            ..AllocConfig::default()
        };
        let alloc = allocate(&tasks, team(&[("slow", 0.8)]), &relaxed).unwrap();
        assert_eq!(owner(&alloc, "hard"), Some("slow"));
    }

    #[test]
    fn test_novice_guard_lifts_after_first_assignment() {
        let tasks = vec![
            task("easy", "high", "Z", 30.0, 3),
            task("hard", "high", "Z", 30.0, 4),
            task("harder", "high", "Z", 30.0, 9),
        ];
        // Sorted order puts the hard tasks first, so the guard holds them back.
        let alloc = allocate(&tasks, team(&[("slow", 0.5)]), &AllocConfig::default()).unwrap();
        assert_eq!(owner(&alloc, "easy"), Some("slow"));
        let unassigned: Vec<_> = alloc.unassigned.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(unassigned, vec!["harder", "hard"]);

        // An exempt first assignment counts as prior work.
        let tasks = vec![
            task("warmup", "dy", "Q", 10.0, 1),
            task("hard", "high", "Z", 30.0, 5),
        ];
        let alloc = allocate(&tasks, team(&[("slow", 0.5)]), &AllocConfig::default()).unwrap();
        assert_eq!(owner(&alloc, "hard"), Some("slow"));
    }

    #[test]
    fn test_exempt_tasks_ignore_zone_and_guard() {
        let tasks = vec![
            task("u1", "fz", "North", 20.0, 9),
            task("u2", "DY", "South", 20.0, 9),
        ];
        let alloc = allocate(&tasks, team(&[("slow", 0.5)]), &AllocConfig::default()).unwrap();
        assert_eq!(alloc.assigned_count(), 2);
        assert!(alloc.worker("slow").unwrap().locked_zone().is_none());
        assert!(alloc.zone_locks.is_empty());
    }

    #[test]
    fn test_least_loaded_with_list_order_ties() {
        let tasks = vec![
            task("a", "fz", "Z", 10.0, 0),
            task("b", "fz", "Z", 10.0, 0),
            task("c", "fz", "Z", 10.0, 0),
        ];
        let alloc = allocate(&tasks, team(&[("P", 1.0), ("Q", 1.0)]), &AllocConfig::default()).unwrap();
        assert_eq!(owner(&alloc, "a"), Some("P"));
        assert_eq!(owner(&alloc, "b"), Some("Q"));
        assert_eq!(owner(&alloc, "c"), Some("P"));
    }

    #[test]
    fn test_zone_locks_spread_round_robin() {
        let tasks = vec![
            task("a1", "high", "A", 10.0, 1),
            task("b1", "high", "B", 10.0, 1),
            task("a2", "medium", "A", 10.0, 1),
            task("b2", "medium", "B", 10.0, 1),
        ];
        let workers = team(&[("W1", 1.0), ("W2", 1.0), ("W3", 1.0)]);
        let alloc = allocate(&tasks, workers, &AllocConfig::default()).unwrap();

        assert_eq!(alloc.worker("W1").unwrap().locked_zone(), Some("A"));
        assert_eq!(alloc.worker("W2").unwrap().locked_zone(), Some("B"));
        assert_eq!(alloc.worker("W3").unwrap().locked_zone(), Some("A"));
        assert_eq!(owner(&alloc, "a1"), Some("W1"));
        assert_eq!(owner(&alloc, "b1"), Some("W2"));
        assert_eq!(owner(&alloc, "a2"), Some("W3"));
        assert_eq!(owner(&alloc, "b2"), Some("W2"));
    }

    #[test]
    fn test_capacity_failure_skips_lock() {
        let tasks = vec![task("big", "high", "A", 400.0, 1), task("small", "high", "B", 10.0, 1)];
        let alloc = allocate(&tasks, team(&[("W", 1.0)]), &AllocConfig::default()).unwrap();
        // "big" never fits, so the first draw happens for "small" and yields A.
        assert_eq!(alloc.unassigned[0].id, "big");
        assert_eq!(alloc.worker("W").unwrap().locked_zone(), Some("A"));
        assert_eq!(alloc.unassigned.len(), 2);
    }

    #[test]
    fn test_relock_on_exhaustion() {
        let tasks = vec![task("a1", "high", "A", 10.0, 1), task("b1", "high", "B", 10.0, 1)];
        let baseline = allocate(&tasks, team(&[("W", 1.0)]), &AllocConfig::default()).unwrap();
        assert_eq!(owner(&baseline, "a1"), Some("W"));
        assert_eq!(baseline.unassigned.len(), 1);

        let relock = AllocConfig {
            relock_on_exhaustion: true,
            ..AllocConfig::default()
        };
        let alloc = allocate(&tasks, team(&[("W", 1.0)]), &relock).unwrap();
        assert_eq!(alloc.assigned_count(), 2);
        assert_eq!(alloc.worker("W").unwrap().locked_zone(), Some("B"));
    }

    #[test]
    fn test_empty_inputs() {
        let alloc = allocate(&[], team(&[("W", 1.0)]), &AllocConfig::default()).unwrap();
        assert_eq!(alloc.assigned_count(), 0);
        assert!(alloc.unassigned.is_empty());

        let tasks = vec![task("t", "low", "A", 5.0, 0)];
        let alloc = allocate(&tasks, Vec::new(), &AllocConfig::default()).unwrap();
        assert!(alloc.workers.is_empty());
        assert_eq!(alloc.unassigned.len(), 1);
    }

    #[test]
    fn test_rows_carry_running_total() {
        let tasks = vec![
            task("t1", "fz", "Z", 10.0, 0),
            task("t2", "fz", "Z", 20.0, 0),
            task("t3", "fz", "Z", 5.0, 0),
        ];
        let alloc = allocate(&tasks, team(&[("A", 3.0)]), &AllocConfig::default()).unwrap();
        let rows = alloc.rows();
        let adjusted: Vec<f64> = rows.iter().map(|r| r.adjusted_time).collect();
        let totals: Vec<f64> = rows.iter().map(|r| r.total_time_used).collect();
        assert_eq!(adjusted, vec![3.3, 6.7, 1.7]);
        assert_eq!(totals, vec![3.3, 10.0, 11.7]);
        assert_eq!(alloc.rows_for("A").len(), 3);
        assert!(alloc.rows_for("nobody").is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad = AllocConfig {
            capacity: -1.0,
            ..AllocConfig::default()
        };
        assert!(allocate(&[], Vec::new(), &bad).is_err());
    }
}
