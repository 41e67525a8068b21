//! Enumerations and field types for task allocation.
//!
//! This module defines the priority classes that drive processing order and
//! zone exemption, plus the output formats understood by the CLI.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Priority classification for a task.
///
/// Variants are declared in processing order, so the derived `Ord` matches
/// [`Priority::rank`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    UrgentFixed,
    UrgentDynamic,
    High,
    Medium,
    Low,
    Unknown,
}

impl Priority {
    /// Sort rank, lowest first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::UrgentFixed => 0,
            Priority::UrgentDynamic => 1,
            Priority::High => 2,
            Priority::Medium => 3,
            Priority::Low => 4,
            Priority::Unknown => 5,
        }
    }

    /// Urgent classes skip zone locking and the novice guard.
    pub fn is_exempt(self) -> bool {
        matches!(self, Priority::UrgentFixed | Priority::UrgentDynamic)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::UrgentFixed => "urgent-fixed",
            Priority::UrgentDynamic => "urgent-dynamic",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
            Priority::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a priority label case-insensitively. Never fails: anything
/// unrecognised (including an empty cell) is `Unknown`.
///
/// `fz` and `dy` are the short codes used by exported rota sheets for the
/// fixed and dynamic urgent classes.
pub fn parse_priority(s: &str) -> Priority {
    let normalised = s.trim().to_lowercase().replace(['_', ' '], "-");
    match normalised.as_str() {
        "urgent-fixed" | "fz" => Priority::UrgentFixed,
        "urgent-dynamic" | "dy" => Priority::UrgentDynamic,
        "high" => Priority::High,
        "medium" => Priority::Medium,
        "low" => Priority::Low,
        _ => Priority::Unknown,
    }
}

/// How `allocate` prints its plan.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}
