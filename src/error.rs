//! Error taxonomy for ingestion, configuration and allocation.

use std::fmt;

use thiserror::Error;

/// A single offending cell found while ingesting a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    /// 1-based line number in the source file, header included.
    pub line: usize,
    pub column: String,
    pub value: String,
    pub reason: String,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: column '{}' value '{}': {}",
            self.line, self.column, self.value, self.reason
        )
    }
}

fn join_rows(errors: &[RowError]) -> String {
    errors
        .iter()
        .map(|e| format!("  {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Error, Debug)]
pub enum AllocError {
    #[error("{dataset}: missing required column(s): {}", missing.join(", "))]
    MissingColumns {
        dataset: String,
        missing: Vec<String>,
    },
    #[error("{dataset}: {} invalid row(s):\n{}", errors.len(), join_rows(errors))]
    InvalidRows {
        dataset: String,
        errors: Vec<RowError>,
    },
    #[error("worker '{worker}' has invalid speed {speed}; speed must be a positive number")]
    InvalidSpeed { worker: String, speed: f64 },
    #[error("task '{task}' has invalid time {time}; time must be a positive number of minutes")]
    InvalidTime { task: String, time: f64 },
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type AllocResult<T> = Result<T, AllocError>;
