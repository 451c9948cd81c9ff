// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Tactical Match Simulation Suite ("The Arena")

pub mod types;
pub mod error;
pub mod agent;
pub mod roster;
pub mod team;
pub mod match_sim;
pub mod batch;
pub mod session;
pub mod config;

pub use types::*;
pub use error::SimError;
pub use agent::Agent;
pub use roster::{AgentRegistry, Map};
pub use team::{StyleTotals, TeamComposition, TeamStats, TEAM_SIZE};
pub use match_sim::{AdvantageSnapshot, MatchSimulator, MatchState, Phase};
pub use batch::{
    partition, run_batch, run_batch_with, worker_count, AggregateStatistics, BatchOutcome,
    BatchRequest, BatchSummary, WinRate,
};
pub use session::Session;
pub use config::SimConfig;

use tracing::warn;
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

fn report_rejection(context: &str, err: &SimError) {
    warn!(context, error = %err, "request rejected");
    #[cfg(target_arch = "wasm32")]
    log(&format!("{context}: {err}"));
}

// ─── WASM Interface ──────────────────────────────────────────────────────────

/// Browser-facing handle. Batches run on the calling thread.
#[wasm_bindgen]
pub struct SimulatorHandle {
    session: Session,
}

impl Default for SimulatorHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl SimulatorHandle {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let mut session = Session::new();
        session.set_workers(Some(1));
        Self { session }
    }

    /// `team` is 1 or 2. Returns false for an invalid slot or name.
    pub fn add_agent(&mut self, team: u8, name: &str) -> bool {
        let result = Team::try_from(team).and_then(|t| self.session.add_agent(t, name));
        match result {
            Ok(()) => true,
            Err(e) => {
                report_rejection("add_agent", &e);
                false
            }
        }
    }

    pub fn clear_team(&mut self, team: u8) -> bool {
        match Team::try_from(team) {
            Ok(t) => {
                self.session.clear_team(t);
                true
            }
            Err(e) => {
                report_rejection("clear_team", &e);
                false
            }
        }
    }

    /// Returns the selected map's display name, or an empty string if the
    /// name was blank.
    pub fn set_map(&mut self, name: &str) -> String {
        match self.session.set_map(name) {
            Ok(map) => map.to_string(),
            Err(e) => {
                report_rejection("set_map", &e);
                String::new()
            }
        }
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.session.set_seed(Some(seed));
    }

    pub fn team_agents(&self, team: u8) -> Vec<String> {
        Team::try_from(team)
            .map(|t| self.session.team(t).agent_names())
            .unwrap_or_default()
    }

    /// Caps the traces kept by detailed batches; zero keeps none.
    pub fn set_trace_limit(&mut self, limit: u32) {
        self.session.set_trace_limit(Some(limit as usize));
    }

    pub fn run_batch(
        &self,
        matches: u32,
        attacking: u8,
        detailed: bool,
    ) -> Result<JsValue, JsValue> {
        let mode = if detailed { SimMode::Detailed } else { SimMode::Fast };
        let outcome = Team::try_from(attacking)
            .and_then(|side| self.session.run_batch(matches as u64, side, mode))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(serde_wasm_bindgen::to_value(&outcome).unwrap_or(JsValue::NULL))
    }

    pub fn get_totals(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.session.totals()).unwrap_or(JsValue::NULL)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
