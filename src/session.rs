// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Tactical Match Simulation Suite ("The Arena") - Caller Session

use tracing::info;

use crate::batch::{
    run_batch_with, AggregateStatistics, BatchOutcome, BatchRequest, DEFAULT_WORKER_FRACTION,
};
use crate::error::SimError;
use crate::roster::{AgentRegistry, Map};
use crate::team::TeamComposition;
use crate::types::{MatchTally, SimMode, Team};

/// Front-end state: two team slots being filled, the selected map and the
/// run options. Totals accumulate across every batch this session runs.
#[derive(Debug)]
pub struct Session {
    registry: AgentRegistry,
    teams: [TeamComposition; 2],
    map: Map,
    workers: Option<usize>,
    seed: Option<u64>,
    trace_limit: Option<usize>,
    totals: AggregateStatistics,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Starts on Ascent with both slots empty.
    pub fn new() -> Self {
        Self {
            registry: AgentRegistry::for_map(Map::Ascent),
            teams: [TeamComposition::new(), TeamComposition::new()],
            map: Map::Ascent,
            workers: None,
            seed: None,
            trace_limit: None,
            totals: AggregateStatistics::new(),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.seed = seed;
    }

    pub fn set_workers(&mut self, workers: Option<usize>) {
        self.workers = workers;
    }

    /// Caps the traces a detailed batch hands back.
    pub fn set_trace_limit(&mut self, limit: Option<usize>) {
        self.trace_limit = limit;
    }

    pub fn add_agent(&mut self, team: Team, name: &str) -> Result<(), SimError> {
        self.teams[team.index()].add_agent(&self.registry, name)
    }

    /// Selects a map by name and rebalances both teams for it.
    /// Unknown names select the neutral map.
    pub fn set_map(&mut self, name: &str) -> Result<Map, SimError> {
        if name.trim().is_empty() {
            return Err(SimError::EmptyMapName);
        }
        let map = Map::parse(name);
        self.registry.balance_for_map(map);
        for team in &mut self.teams {
            team.rebalance(map);
        }
        self.map = map;
        info!(requested = name, %map, "map selected");
        Ok(map)
    }

    pub fn map(&self) -> Map {
        self.map
    }

    pub fn clear_team(&mut self, team: Team) {
        self.teams[team.index()].clear();
    }

    pub fn team(&self, team: Team) -> &TeamComposition {
        &self.teams[team.index()]
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Runs `matches` matches between the two current compositions.
    pub fn run_batch(
        &self,
        matches: u64,
        attacking: Team,
        mode: SimMode,
    ) -> Result<BatchOutcome, SimError> {
        for slot in [Team::One, Team::Two] {
            let team = self.team(slot);
            if !team.is_complete() {
                return Err(SimError::TeamIncomplete { team: slot, count: team.len() });
            }
        }
        let request = BatchRequest {
            team_one: self.teams[0].agent_names(),
            team_two: self.teams[1].agent_names(),
            map: self.map,
            attacking,
            matches,
            mode,
            seed: self.seed,
            workers: self.workers,
            worker_fraction: DEFAULT_WORKER_FRACTION,
            trace_limit: self.trace_limit,
        };
        run_batch_with(&request, &self.totals, None)
    }

    /// Totals over every batch run so far.
    pub fn totals(&self) -> MatchTally {
        self.totals.snapshot()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> Session {
        let mut session = Session::new().with_workers(2).with_seed(10);
        for name in ["Jett", "Sova", "Omen", "Killjoy", "KAY/O"] {
            session.add_agent(Team::One, name).unwrap();
        }
        for name in ["Raze", "Fade", "Viper", "Cypher", "Skye"] {
            session.add_agent(Team::Two, name).unwrap();
        }
        session
    }

    #[test]
    fn add_agent_reports_invalid_names() {
        let mut session = Session::new();
        assert!(session.add_agent(Team::One, "jett").is_ok());
        assert!(matches!(session.add_agent(Team::One, "Ghost"), Err(SimError::UnknownAgent(_))));
        assert!(matches!(session.add_agent(Team::One, "Jett"), Err(SimError::DuplicateAgent(_))));
        // the same agent may appear on both sides
        assert!(session.add_agent(Team::Two, "Jett").is_ok());
        assert_eq!(session.team(Team::One).len(), 1);
    }

    #[test]
    fn set_map_rebalances_teams() {
        let mut session = filled();
        let ascent = session.team(Team::One).total_relative_power();
        assert_eq!(session.set_map("BIND").unwrap(), Map::Bind);
        assert_ne!(session.team(Team::One).total_relative_power(), ascent);
        assert_eq!(session.set_map("nowhere").unwrap(), Map::None);
        assert_eq!(session.team(Team::One).total_relative_power(), 43.0);
        assert!(matches!(session.set_map(""), Err(SimError::EmptyMapName)));
        assert_eq!(session.map(), Map::None);
    }

    #[test]
    fn run_batch_requires_full_teams() {
        let mut session = filled();
        session.clear_team(Team::Two);
        assert!(session.team(Team::Two).is_empty());
        assert!(matches!(
            session.run_batch(10, Team::One, SimMode::Fast),
            Err(SimError::TeamIncomplete { team: Team::Two, count: 0 })
        ));
    }

    #[test]
    fn totals_accumulate_across_batches() {
        let session = filled();
        let first = session.run_batch(40, Team::One, SimMode::Fast).unwrap();
        let second = session.run_batch(60, Team::Two, SimMode::Detailed).unwrap();
        assert_eq!(first.summary.simulated, 40);
        assert_eq!(second.traces.len(), 60);
        assert!(second.traces.iter().all(|t| t.rounds[0].attacker == Team::Two));
        assert_eq!(session.totals().matches, 100);
    }

    #[test]
    fn trace_limit_applies_to_detailed_batches() {
        let mut session = filled();
        session.set_trace_limit(Some(2));
        let outcome = session.run_batch(30, Team::One, SimMode::Detailed).unwrap();
        assert_eq!(outcome.traces.len(), 2);
        assert_eq!(outcome.summary.simulated, 30);
        assert_eq!(session.totals().matches, 30);
    }
}
