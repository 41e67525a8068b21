//! Rendering and export of an allocation plan.
//!
//! This module turns an `Allocation` into terminal tables, CSV files and a
//! JSON plan document. All functions here are read-only projections of the
//! result; none of them feed back into the engine.

use std::collections::BTreeMap;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::AllocConfig;
use crate::engine::{Allocation, AssignmentRow};
use crate::error::AllocResult;
use crate::task::{round1, Task};

/// Unassigned task as exported, with its original fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnassignedRow {
    pub id: String,
    pub time: f64,
    pub priority: String,
    pub difficulty: u32,
    pub zone: String,
}

impl From<&Task> for UnassignedRow {
    fn from(task: &Task) -> Self {
        UnassignedRow {
            id: task.id.clone(),
            time: task.time,
            priority: task.priority_label.clone(),
            difficulty: task.difficulty,
            zone: task.zone.clone(),
        }
    }
}

/// Per-worker totals for the plan document.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerSummary {
    pub name: String,
    pub speed: f64,
    pub used_time: f64,
    pub locked_zone: Option<String>,
    pub tasks: usize,
}

/// Everything `allocate --format json` prints.
#[derive(Debug, Clone, Serialize)]
pub struct PlanDocument {
    pub generated_at: DateTime<Utc>,
    pub config: AllocConfig,
    pub rows: Vec<AssignmentRow>,
    pub unassigned: Vec<UnassignedRow>,
    pub workers: Vec<WorkerSummary>,
    pub zone_locks: BTreeMap<String, usize>,
}

impl PlanDocument {
    /// Build the document. `rows` is passed separately so a member filter
    /// can be applied first.
    pub fn new(alloc: &Allocation, rows: Vec<AssignmentRow>, config: &AllocConfig) -> Self {
        PlanDocument {
            generated_at: Utc::now(),
            config: config.clone(),
            rows,
            unassigned: alloc.unassigned.iter().map(UnassignedRow::from).collect(),
            workers: alloc
                .workers
                .iter()
                .map(|w| WorkerSummary {
                    name: w.name.clone(),
                    speed: w.speed(),
                    used_time: round1(w.used_time()),
                    locked_zone: w.locked_zone().map(str::to_string),
                    tasks: w.assigned().len(),
                })
                .collect(),
            zone_locks: alloc.zone_locks.clone(),
        }
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

/// Format the assignment rows as a fixed-width table.
pub fn format_table(rows: &[AssignmentRow]) -> String {
    let mut out = format!(
        "{:<14} {:<10} {:>8} {:>8} {:<14} {:>4} {:<12} {:>8}\n",
        "Member", "Task", "Base", "Adj", "Priority", "Diff", "Zone", "Total"
    );
    for r in rows {
        out.push_str(&format!(
            "{:<14} {:<10} {:>8} {:>8.1} {:<14} {:>4} {:<12} {:>8.1}\n",
            truncate(&r.member, 14),
            truncate(&r.task_id, 10),
            r.base_time,
            r.adjusted_time,
            truncate(if r.priority.is_empty() { "-" } else { r.priority.as_str() }, 14),
            r.difficulty,
            truncate(if r.zone.is_empty() { "-" } else { r.zone.as_str() }, 12),
            r.total_time_used
        ));
    }
    out
}

/// Format unassigned tasks as a fixed-width table.
pub fn format_unassigned(tasks: &[Task]) -> String {
    let mut out = format!(
        "{:<10} {:>8} {:<14} {:>4} {}\n",
        "ID", "Time", "Priority", "Diff", "Zone"
    );
    for t in tasks {
        out.push_str(&format!(
            "{:<10} {:>8} {:<14} {:>4} {}\n",
            truncate(&t.id, 10),
            t.time,
            truncate(if t.priority_label.is_empty() { "-" } else { t.priority_label.as_str() }, 14),
            t.difficulty,
            if t.zone.is_empty() { "-" } else { t.zone.as_str() }
        ));
    }
    out
}

/// Print the plan to stdout.
pub fn print_plan(rows: &[AssignmentRow], unassigned: &[Task]) {
    println!("Allocated Tasks");
    print!("{}", format_table(rows));
    if !unassigned.is_empty() {
        println!();
        println!("Unassigned Tasks");
        print!("{}", format_unassigned(unassigned));
    }
}

/// Write assignment rows as CSV with the plan headers.
pub fn write_rows_csv<W: Write>(out: W, rows: &[AssignmentRow]) -> AllocResult<()> {
    let mut wtr = csv::Writer::from_writer(out);
    if rows.is_empty() {
        wtr.write_record([
            "Team Member",
            "Task ID",
            "Base Time (mins)",
            "Adjusted Time (mins)",
            "Priority",
            "Difficulty",
            "Zone",
            "Total Time Used (mins)",
        ])?;
    }
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write unassigned tasks as CSV with columns `id,time,priority,difficulty,zone`.
pub fn write_unassigned_csv<W: Write>(out: W, tasks: &[Task]) -> AllocResult<()> {
    let mut wtr = csv::Writer::from_writer(out);
    if tasks.is_empty() {
        wtr.write_record(["id", "time", "priority", "difficulty", "zone"])?;
    }
    for task in tasks {
        wtr.serialize(UnassignedRow::from(task))?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::allocate;
    use crate::task::Worker;

    fn sample() -> Allocation {
        let tasks = vec![
            Task::new("T1", 50.0, "FZ", 5, "X").unwrap(),
            Task::new("T2", 100.0, "High", 2, "Y").unwrap(),
            Task::new("T9", 700.0, "low", 1, "Y").unwrap(),
        ];
        let workers = vec![Worker::new("A", 1.0).unwrap(), Worker::new("B", 2.0).unwrap()];
        allocate(&tasks, workers, &AllocConfig::default()).unwrap()
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }

    #[test]
    fn test_rows_csv_headers_and_values() {
        let alloc = sample();
        let mut buf = Vec::new();
        write_rows_csv(&mut buf, &alloc.rows()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Team Member,Task ID,Base Time (mins),Adjusted Time (mins),Priority,Difficulty,Zone,Total Time Used (mins)")
        );
        assert_eq!(lines.next(), Some("A,T1,50.0,50.0,FZ,5,X,50.0"));
        assert_eq!(lines.next(), Some("B,T2,100.0,50.0,High,2,Y,50.0"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_empty_csv_still_has_header() {
        let mut buf = Vec::new();
        write_rows_csv(&mut buf, &[]).unwrap();
        assert!(String::from_utf8(buf).unwrap().starts_with("Team Member,Task ID"));

        let mut buf = Vec::new();
        write_unassigned_csv(&mut buf, &[]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "id,time,priority,difficulty,zone\n");
    }

    #[test]
    fn test_unassigned_keeps_original_fields() {
        let alloc = sample();
        let mut buf = Vec::new();
        write_unassigned_csv(&mut buf, &alloc.unassigned).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "id,time,priority,difficulty,zone\nT9,700.0,low,1,Y\n");

        let table = format_unassigned(&alloc.unassigned);
        assert!(table.contains("T9"));
    }

    #[test]
    fn test_plan_document_json() {
        let alloc = sample();
        let config = AllocConfig::default();
        let doc = PlanDocument::new(&alloc, alloc.rows_for("B"), &config);
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["rows"].as_array().unwrap().len(), 1);
        assert_eq!(value["rows"][0]["Task ID"], "T2");
        assert_eq!(value["unassigned"][0]["id"], "T9");
        assert_eq!(value["workers"][1]["locked_zone"], "Y");
        assert_eq!(value["config"]["capacity"], 300.0);
        assert!(value["generated_at"].is_string());
    }
}
