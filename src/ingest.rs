//! CSV ingestion for task and team sheets.
//!
//! Header names are trimmed and lower-cased before the required columns are
//! checked, so `" ID "` and `Id` both satisfy `id`. Every bad cell in a file
//! is collected and reported together; nothing is coerced to a default
//! except the documented ones (empty priority, zone and difficulty).

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::debug;

use crate::error::{AllocError, AllocResult, RowError};
use crate::task::{Task, Worker};

pub const TASK_COLUMNS: [&str; 5] = ["id", "time", "priority", "difficulty", "zone"];
pub const TEAM_COLUMNS: [&str; 2] = ["name", "speed"];

/// Column lookup for one sheet.
struct Sheet {
    index: HashMap<String, usize>,
}

impl Sheet {
    fn new(dataset: &str, headers: &csv::StringRecord, required: &[&str]) -> AllocResult<Self> {
        let mut index = HashMap::new();
        for (i, h) in headers.iter().enumerate() {
            index.entry(h.trim().to_lowercase()).or_insert(i);
        }
        let missing: Vec<String> = required
            .iter()
            .filter(|c| !index.contains_key(**c))
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AllocError::MissingColumns {
                dataset: dataset.to_string(),
                missing,
            });
        }
        Ok(Sheet { index })
    }

    fn cell<'r>(&self, record: &'r csv::StringRecord, column: &str) -> &'r str {
        self.index
            .get(column)
            .and_then(|&i| record.get(i))
            .unwrap_or("")
            .trim()
    }
}

fn reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input)
}

fn line_of(record: &csv::StringRecord, fallback: usize) -> usize {
    record
        .position()
        .map(|p| p.line() as usize)
        .unwrap_or(fallback)
}

fn row_error(line: usize, column: &str, value: &str, reason: &str) -> RowError {
    RowError {
        line,
        column: column.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_positive(line: usize, column: &str, raw: &str, errors: &mut Vec<RowError>) -> Option<f64> {
    if raw.is_empty() {
        errors.push(row_error(line, column, raw, "value is required"));
        return None;
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Some(v),
        Ok(_) => {
            errors.push(row_error(line, column, raw, "must be greater than zero"));
            None
        }
        Err(_) => {
            errors.push(row_error(line, column, raw, "not a number"));
            None
        }
    }
}

/// Empty means 0. Whole-valued decimals such as `3.0` are accepted.
fn parse_difficulty(line: usize, raw: &str, errors: &mut Vec<RowError>) -> Option<u32> {
    if raw.is_empty() {
        return Some(0);
    }
    if let Ok(v) = raw.parse::<i64>() {
        return match u32::try_from(v) {
            Ok(d) => Some(d),
            Err(_) => {
                errors.push(row_error(line, "difficulty", raw, "must be a non-negative integer"));
                None
            }
        };
    }
    match raw.parse::<f64>() {
        Ok(v) if v.fract() == 0.0 && v >= 0.0 && v <= u32::MAX as f64 => Some(v as u32),
        _ => {
            errors.push(row_error(line, "difficulty", raw, "must be a non-negative integer"));
            None
        }
    }
}

/// Parse a task sheet with columns `id,time,priority,difficulty,zone`.
pub fn parse_tasks<R: Read>(input: R) -> AllocResult<Vec<Task>> {
    let mut rdr = reader(input);
    let sheet = Sheet::new("tasks", rdr.headers()?, &TASK_COLUMNS)?;

    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let line = line_of(&record, i + 2);

        let id = sheet.cell(&record, "id");
        if id.is_empty() {
            errors.push(row_error(line, "id", id, "value is required"));
        } else if !seen.insert(id.to_string()) {
            errors.push(row_error(line, "id", id, "duplicate task id"));
        }
        let time = parse_positive(line, "time", sheet.cell(&record, "time"), &mut errors);
        let difficulty = parse_difficulty(line, sheet.cell(&record, "difficulty"), &mut errors);

        if let (Some(time), Some(difficulty)) = (time, difficulty) {
            rows.push((
                id.to_string(),
                time,
                sheet.cell(&record, "priority").to_string(),
                difficulty,
                sheet.cell(&record, "zone").to_string(),
            ));
        }
    }

    if !errors.is_empty() {
        return Err(AllocError::InvalidRows {
            dataset: "tasks".to_string(),
            errors,
        });
    }

    let tasks = rows
        .into_iter()
        .map(|(id, time, priority, difficulty, zone)| Task::new(id, time, &priority, difficulty, zone))
        .collect::<AllocResult<Vec<_>>>()?;
    debug!("ingested {} task(s)", tasks.len());
    Ok(tasks)
}

/// Parse a team sheet with columns `name,speed`.
pub fn parse_team<R: Read>(input: R) -> AllocResult<Vec<Worker>> {
    let mut rdr = reader(input);
    let sheet = Sheet::new("team", rdr.headers()?, &TEAM_COLUMNS)?;

    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let line = line_of(&record, i + 2);

        let name = sheet.cell(&record, "name");
        if name.is_empty() {
            errors.push(row_error(line, "name", name, "value is required"));
        } else if !seen.insert(name.to_string()) {
            errors.push(row_error(line, "name", name, "duplicate team member"));
        }
        if let Some(speed) = parse_positive(line, "speed", sheet.cell(&record, "speed"), &mut errors) {
            rows.push((name.to_string(), speed));
        }
    }

    if !errors.is_empty() {
        return Err(AllocError::InvalidRows {
            dataset: "team".to_string(),
            errors,
        });
    }

    let workers = rows
        .into_iter()
        .map(|(name, speed)| Worker::new(name, speed))
        .collect::<AllocResult<Vec<_>>>()?;
    debug!("ingested {} team member(s)", workers.len());
    Ok(workers)
}

pub fn read_tasks(path: &Path) -> AllocResult<Vec<Task>> {
    parse_tasks(File::open(path)?)
}

pub fn read_team(path: &Path) -> AllocResult<Vec<Worker>> {
    parse_team(File::open(path)?)
}
