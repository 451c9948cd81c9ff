// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Tactical Match Simulation Suite ("The Arena") - Run Configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::batch::{BatchRequest, DEFAULT_WORKER_FRACTION};
use crate::error::SimError;
use crate::roster::Map;
use crate::types::{SimMode, Team};

/// Batch settings as read from a JSON file. Missing fields take defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    /// Map name; unrecognized names play as a neutral map.
    pub map: String,
    pub team_one: Vec<String>,
    pub team_two: Vec<String>,
    /// Starting attacker, 1 or 2.
    pub attacking: u8,
    pub matches: u64,
    pub mode: SimMode,
    pub seed: Option<u64>,
    pub workers: Option<usize>,
    pub worker_fraction: f64,
    /// Most traces kept in detailed mode.
    pub trace_limit: Option<usize>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            map: "Ascent".to_string(),
            team_one: Vec::new(),
            team_two: Vec::new(),
            attacking: 1,
            matches: 1000,
            mode: SimMode::Fast,
            seed: None,
            workers: None,
            worker_fraction: DEFAULT_WORKER_FRACTION,
            trace_limit: None,
        }
    }
}

impl SimConfig {
    pub fn from_json_str(json: &str) -> Result<Self, SimError> {
        serde_json::from_str(json).map_err(|e| SimError::Config(e.to_string()))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, SimError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SimError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    /// Checks the fields that can be checked without building teams.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.map.trim().is_empty() {
            return Err(SimError::EmptyMapName);
        }
        if self.matches == 0 {
            return Err(SimError::InvalidMatchCount);
        }
        Team::try_from(self.attacking)?;
        if !(self.worker_fraction > 0.0 && self.worker_fraction <= 1.0) {
            return Err(SimError::Config(format!(
                "worker_fraction must be in (0, 1], got {}",
                self.worker_fraction
            )));
        }
        Ok(())
    }

    pub fn to_request(&self) -> Result<BatchRequest, SimError> {
        self.validate()?;
        Ok(BatchRequest {
            team_one: self.team_one.clone(),
            team_two: self.team_two.clone(),
            map: Map::parse(&self.map),
            attacking: Team::try_from(self.attacking)?,
            matches: self.matches,
            mode: self.mode,
            seed: self.seed,
            workers: self.workers,
            worker_fraction: self.worker_fraction,
            trace_limit: self.trace_limit,
        })
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
