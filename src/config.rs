//! Run policy for an allocation.
//!
//! Defaults reproduce the baseline behaviour: a 300 minute cap, the novice
//! guard on, and permanent zone locks. A JSON file may override any subset of
//! fields; CLI flags are applied on top of that.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AllocError, AllocResult};

/// Per-worker maximum cumulative adjusted minutes.
pub const DEFAULT_CAPACITY: f64 = 300.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocConfig {
    pub capacity: f64,
    pub novice_guard: bool,
    /// Workers strictly slower than this count as novices.
    pub novice_speed_below: f64,
    /// Tasks at or above this difficulty are withheld from a novice's first slot.
    pub novice_difficulty_from: u32,
    /// Permit zone relock on exhaustion.
    pub relock_on_exhaustion: bool,
}

impl Default for AllocConfig {
    fn default() -> Self {
        AllocConfig {
            capacity: DEFAULT_CAPACITY,
            novice_guard: true,
            novice_speed_below: 1.0,
            novice_difficulty_from: 4,
            relock_on_exhaustion: false,
        }
    }
}

impl AllocConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> AllocResult<Self> {
        let mut buf = String::new();
        File::open(path)?.read_to_string(&mut buf)?;
        let config: AllocConfig = serde_json::from_str(&buf)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AllocResult<()> {
        if !self.capacity.is_finite() || self.capacity <= 0.0 {
            return Err(AllocError::Config(format!(
                "capacity must be positive, got {}",
                self.capacity
            )));
        }
        if !self.novice_speed_below.is_finite() || self.novice_speed_below <= 0.0 {
            return Err(AllocError::Config(format!(
                "novice_speed_below must be positive, got {}",
                self.novice_speed_below
            )));
        }
        Ok(())
    }
}
