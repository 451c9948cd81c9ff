// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Tactical Match Simulation Suite ("The Arena") - Match State Machine

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

use crate::error::SimError;
use crate::roster::Map;
use crate::team::{TeamComposition, TeamStats};
use crate::types::*;

/// Rounds played before the first side swap.
pub const HALF_LENGTH: u32 = 12;
/// Round wins that close out regulation.
pub const ROUNDS_TO_WIN: u32 = 13;
/// Lead required to close out overtime.
pub const OVERTIME_MARGIN: u32 = 2;
/// Percentage points per whole unit of relative-power difference.
pub const POWER_RATE: f64 = 0.2;
/// Range of the bonus granted to a team whose style counters the other's.
pub const STYLE_BONUS_RANGE: std::ops::Range<f64> = 1.0..5.0;
/// Chances within this distance of 50% resolve as tie-breaks.
pub const TIE_EPSILON: f64 = 1e-9;

// ─── Advantage Snapshot ─────────────────────────────────────────────────────

/// Advantages that stay fixed for a whole match. Rebuilt whenever the map
/// or a composition changes; never mutated in place.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AdvantageSnapshot {
    pub map: Map,
    /// Percentage points in favor of whichever side is attacking.
    pub map_advantage: f64,
    /// Percentage points in favor of team one (negative favors team two).
    pub power_advantage: f64,
}

impl AdvantageSnapshot {
    pub fn compute(map: Map, team_one: &TeamStats, team_two: &TeamStats) -> Self {
        Self {
            map,
            map_advantage: map.attacker_advantage(),
            power_advantage: power_advantage(team_one.relative_power, team_two.relative_power),
        }
    }

    /// Team one's win chance in percent before any style bonus.
    pub fn team_one_chance(&self, attacker: Team) -> f64 {
        let map = match attacker {
            Team::One => self.map_advantage,
            Team::Two => -self.map_advantage,
        };
        50.0 + self.power_advantage + map
    }
}

/// `POWER_RATE` per whole unit of difference, partial units rounded up,
/// signed toward the stronger team.
pub fn power_advantage(team_one_power: f64, team_two_power: f64) -> f64 {
    let delta = team_one_power - team_two_power;
    if delta.abs() < TIE_EPSILON {
        return 0.0;
    }
    let units = delta.abs().ceil();
    POWER_RATE * units * delta.signum()
}

// ─── Match State ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Simulating,
    Complete,
}

/// Per-match mutable state. Reset at the start of every match.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchState {
    pub phase: Phase,
    /// Number of the next round to be played.
    pub round: u32,
    pub team_one_rounds: u32,
    pub team_two_rounds: u32,
    pub attacker: Team,
    pub team_one_tie_breaks: u32,
    pub team_two_tie_breaks: u32,
    pub overtime: bool,
}

impl MatchState {
    fn new(attacker: Team) -> Self {
        Self {
            phase: Phase::Idle,
            round: 1,
            team_one_rounds: 0,
            team_two_rounds: 0,
            attacker,
            team_one_tie_breaks: 0,
            team_two_tie_breaks: 0,
            overtime: false,
        }
    }

    fn rounds(&self, team: Team) -> u32 {
        match team {
            Team::One => self.team_one_rounds,
            Team::Two => self.team_two_rounds,
        }
    }

    fn nobody_has_won_regulation(&self) -> bool {
        self.team_one_rounds < ROUNDS_TO_WIN && self.team_two_rounds < ROUNDS_TO_WIN
    }

    fn overtime_reached(&self) -> bool {
        self.team_one_rounds == HALF_LENGTH && self.team_two_rounds == HALF_LENGTH
    }

    fn margin(&self) -> u32 {
        self.team_one_rounds.abs_diff(self.team_two_rounds)
    }

    fn swap_sides(&mut self) {
        self.attacker = self.attacker.other();
    }
}

// ─── Match Simulator ────────────────────────────────────────────────────────

/// Drives matches between two owned compositions on one map.
///
/// The simulator owns its compositions and random source outright; nothing
/// in here is shared with another simulator.
pub struct MatchSimulator<R: Rng> {
    teams: [TeamComposition; 2],
    lineup: [TeamStats; 2],
    starting_side: Team,
    advantage: AdvantageSnapshot,
    state: MatchState,
    tally: MatchTally,
    rng: R,
}

impl<R: Rng> MatchSimulator<R> {
    /// Both compositions must be complete. They are rebalanced for `map`.
    pub fn new(
        mut team_one: TeamComposition,
        mut team_two: TeamComposition,
        map: Map,
        rng: R,
    ) -> Result<Self, SimError> {
        team_one.rebalance(map);
        team_two.rebalance(map);
        let lineup = [lineup_of(&team_one, Team::One)?, lineup_of(&team_two, Team::Two)?];
        let advantage = AdvantageSnapshot::compute(map, &lineup[0], &lineup[1]);
        Ok(Self {
            teams: [team_one, team_two],
            lineup,
            starting_side: Team::One,
            advantage,
            state: MatchState::new(Team::One),
            tally: MatchTally::default(),
            rng,
        })
    }

    pub fn with_starting_side(mut self, side: Team) -> Self {
        self.set_starting_side(side);
        self
    }

    /// Side that attacks first in every subsequent match.
    pub fn set_starting_side(&mut self, side: Team) {
        self.starting_side = side;
        if self.state.phase != Phase::Simulating {
            self.state = MatchState::new(side);
        }
    }

    pub fn set_map(&mut self, map: Map) {
        for team in &mut self.teams {
            team.rebalance(map);
        }
        for (slot, team) in self.teams.iter().enumerate() {
            if let Some(stats) = team.stats() {
                self.lineup[slot] = stats;
            }
        }
        self.advantage = AdvantageSnapshot::compute(map, &self.lineup[0], &self.lineup[1]);
        debug!(
            map = %map,
            map_advantage = self.advantage.map_advantage,
            power_advantage = self.advantage.power_advantage,
            "advantage snapshot rebuilt"
        );
    }

    pub fn map(&self) -> Map {
        self.advantage.map
    }

    pub fn advantage(&self) -> AdvantageSnapshot {
        self.advantage
    }

    pub fn starting_side(&self) -> Team {
        self.starting_side
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn tally(&self) -> &MatchTally {
        &self.tally
    }

    pub fn team(&self, team: Team) -> &TeamComposition {
        &self.teams[team.index()]
    }

    /// Plays one round against the current state and advances it.
    pub fn play_round(&mut self) -> RoundRecord {
        self.state.phase = Phase::Simulating;
        let attacker = self.state.attacker;

        let one_style = self.round_style(Team::One);
        let two_style = self.round_style(Team::Two);
        let [one, two] = &self.teams;
        let style_bonus = if one.counters(two) {
            self.rng.gen_range(STYLE_BONUS_RANGE)
        } else if two.counters(one) {
            -self.rng.gen_range(STYLE_BONUS_RANGE)
        } else {
            0.0
        };

        let chance = self.advantage.team_one_chance(attacker) + style_bonus;
        let tie_break = (chance - 50.0).abs() < TIE_EPSILON;
        let winner = if tie_break {
            if self.rng.gen::<bool>() { Team::One } else { Team::Two }
        } else if self.rng.gen::<f64>() < chance / 100.0 {
            Team::One
        } else {
            Team::Two
        };

        match winner {
            Team::One => {
                self.state.team_one_rounds += 1;
                if tie_break {
                    self.state.team_one_tie_breaks += 1;
                }
            }
            Team::Two => {
                self.state.team_two_rounds += 1;
                if tie_break {
                    self.state.team_two_tie_breaks += 1;
                }
            }
        }

        let record = RoundRecord {
            round: self.state.round,
            attacker,
            team_one_chance: chance,
            team_two_chance: 100.0 - chance,
            winner,
            team_one_rounds: self.state.team_one_rounds,
            team_two_rounds: self.state.team_two_rounds,
            team_one_style: one_style,
            team_two_style: two_style,
            tie_break,
        };
        self.state.round += 1;
        trace!(round = record.round, %winner, chance, "round resolved");
        record
    }

    /// Plays a full match without keeping the round trace.
    pub fn play_match(&mut self) -> MatchResult {
        self.run_match(None)
    }

    /// Plays a full match and returns every round alongside the result.
    pub fn play_match_traced(&mut self) -> (MatchResult, Vec<RoundRecord>) {
        let mut rounds = Vec::with_capacity(30);
        let result = self.run_match(Some(&mut rounds));
        (result, rounds)
    }

    /// Clears per-match counters. Running tallies are kept.
    pub fn reset(&mut self) {
        self.state = MatchState::new(self.starting_side);
    }

    fn run_match(&mut self, mut rounds: Option<&mut Vec<RoundRecord>>) -> MatchResult {
        self.reset();

        for _ in 0..HALF_LENGTH {
            self.step(&mut rounds);
        }
        self.state.swap_sides();

        while self.state.nobody_has_won_regulation() && !self.state.overtime_reached() {
            self.step(&mut rounds);
        }

        if self.state.overtime_reached() {
            self.state.overtime = true;
            while self.state.margin() != OVERTIME_MARGIN {
                self.state.swap_sides();
                self.step(&mut rounds);
            }
        }

        self.state.phase = Phase::Complete;
        let winner = if self.state.rounds(Team::One) > self.state.rounds(Team::Two) {
            Team::One
        } else {
            Team::Two
        };
        let result = MatchResult {
            winner,
            team_one_rounds: self.state.team_one_rounds,
            team_two_rounds: self.state.team_two_rounds,
            team_one_tie_breaks: self.state.team_one_tie_breaks,
            team_two_tie_breaks: self.state.team_two_tie_breaks,
            overtime: self.state.overtime,
        };
        self.tally.record(&result);
        debug!(
            %winner,
            score = format_args!("{}-{}", result.team_one_rounds, result.team_two_rounds),
            overtime = result.overtime,
            "match complete"
        );
        result
    }

    /// Draws the composition's style for the round being played.
    fn round_style(&mut self, slot: Team) -> Style {
        let i = slot.index();
        match self.teams[i].choose_round_style(&mut self.rng) {
            Some(style) => style,
            None => {
                error!(team = %slot, "incomplete composition reached round resolution");
                self.lineup[i].draw_style(&mut self.rng)
            }
        }
    }

    fn step(&mut self, rounds: &mut Option<&mut Vec<RoundRecord>>) {
        let record = self.play_round();
        if let Some(rounds) = rounds.as_mut() {
            rounds.push(record);
        }
    }
}

fn lineup_of(team: &TeamComposition, slot: Team) -> Result<TeamStats, SimError> {
    team.stats().ok_or(SimError::TeamIncomplete { team: slot, count: team.len() })
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use crate::roster::AgentRegistry;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const LINEUP: [&str; 5] = ["Jett", "Sova", "Omen", "Killjoy", "KAY/O"];

    fn mirror_match(map: Map, seed: u64) -> MatchSimulator<ChaCha8Rng> {
        let reg = AgentRegistry::for_map(map);
        let one = TeamComposition::from_names(&reg, &LINEUP).unwrap();
        let two = TeamComposition::from_names(&reg, &LINEUP).unwrap();
        MatchSimulator::new(one, two, map, ChaCha8Rng::seed_from_u64(seed)).unwrap()
    }

    /// Five identical agents per side with the given power and a single style.
    fn uniform_team(prefix: &str, power: f64, styles: [f64; 3]) -> Vec<Agent> {
        (0..5)
            .map(|i| {
                Agent::new(
                    format!("{prefix}{i}"),
                    Role::Duelist,
                    styles[0],
                    styles[1],
                    styles[2],
                    power,
                    None,
                )
                .unwrap()
            })
            .collect()
    }

    fn custom_match(
        one: Vec<Agent>,
        two: Vec<Agent>,
        seed: u64,
    ) -> MatchSimulator<ChaCha8Rng> {
        let one_names: Vec<String> = one.iter().map(|a| a.name().to_string()).collect();
        let two_names: Vec<String> = two.iter().map(|a| a.name().to_string()).collect();
        let reg = AgentRegistry::from_agents(one.into_iter().chain(two).collect()).unwrap();
        MatchSimulator::new(
            TeamComposition::from_names(&reg, &one_names).unwrap(),
            TeamComposition::from_names(&reg, &two_names).unwrap(),
            Map::None,
            ChaCha8Rng::seed_from_u64(seed),
        )
        .unwrap()
    }

    #[test]
    fn rejects_incomplete_team() {
        let reg = AgentRegistry::standard();
        let one = TeamComposition::from_names(&reg, &LINEUP[..4]).unwrap();
        let two = TeamComposition::from_names(&reg, &LINEUP).unwrap();
        let err = MatchSimulator::new(one, two, Map::None, ChaCha8Rng::seed_from_u64(0));
        assert!(matches!(err, Err(SimError::TeamIncomplete { team: Team::One, count: 4 })));
    }

    #[test]
    fn initial_state() {
        let sim = mirror_match(Map::Ascent, 1);
        let state = sim.state();
        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.round, 1);
        assert_eq!((state.team_one_rounds, state.team_two_rounds), (0, 0));
        assert_eq!(state.attacker, Team::One);
    }

    #[test]
    fn power_advantage_rounds_partial_units_up() {
        assert_eq!(power_advantage(40.0, 40.0), 0.0);
        assert!((power_advantage(50.0, 40.0) - 2.0).abs() < 1e-12);
        assert!((power_advantage(40.0, 50.0) + 2.0).abs() < 1e-12);
        assert!((power_advantage(40.5, 40.0) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn power_edge_raises_chance_above_half() {
        let sim = custom_match(
            uniform_team("A", 12.0, [3.0, 3.0, 3.0]),
            uniform_team("B", 10.0, [3.0, 3.0, 3.0]),
            0,
        );
        let snap = sim.advantage();
        assert!((snap.power_advantage - 2.0).abs() < 1e-12);
        assert!(snap.team_one_chance(Team::One) > 50.0);
    }

    #[test]
    fn map_advantage_follows_attacker() {
        let sim = mirror_match(Map::Ascent, 0);
        let snap = sim.advantage();
        assert_eq!(snap.power_advantage, 0.0);
        assert!((snap.team_one_chance(Team::One) - (50.0 - 5.05)).abs() < 1e-12);
        assert!((snap.team_one_chance(Team::Two) - (50.0 + 5.05)).abs() < 1e-12);
    }

    #[test]
    fn unknown_map_is_neutral() {
        let sim = mirror_match(Map::parse("dust2"), 0);
        assert_eq!(sim.map(), Map::None);
        assert_eq!(sim.advantage().team_one_chance(Team::One), 50.0);
    }

    #[test]
    fn set_map_rebuilds_snapshot() {
        let mut sim = mirror_match(Map::None, 0);
        assert_eq!(sim.advantage().map_advantage, 0.0);
        sim.set_map(Map::Bind);
        assert_eq!(sim.map(), Map::Bind);
        assert_eq!(sim.advantage().map_advantage, -3.81);
        assert_eq!(
            sim.team(Team::One).total_relative_power(),
            AgentRegistry::for_map(Map::Bind)
                .agents()
                .iter()
                .filter(|a| LINEUP.contains(&a.name()))
                .map(|a| a.current_relative_power())
                .sum::<f64>()
        );
    }

    #[test]
    fn mirrored_single_style_rounds_are_tie_breaks() {
        let mut sim = custom_match(
            uniform_team("A", 8.0, [4.0, 0.0, 0.0]),
            uniform_team("B", 8.0, [4.0, 0.0, 0.0]),
            5,
        );
        let (result, rounds) = sim.play_match_traced();
        assert!(rounds.iter().all(|r| r.tie_break && r.team_one_chance == 50.0));
        assert_eq!(
            result.team_one_tie_breaks + result.team_two_tie_breaks,
            result.rounds_played()
        );
    }

    #[test]
    fn rounds_record_each_composition_style() {
        let mut sim = mirror_match(Map::Ascent, 17);
        assert_eq!(sim.team(Team::One).round_style(), None);
        for _ in 0..200 {
            let record = sim.play_round();
            let (one, two) = (sim.team(Team::One), sim.team(Team::Two));
            assert_eq!(one.round_style(), Some(record.team_one_style));
            assert_eq!(two.round_style(), Some(record.team_two_style));
            assert_eq!(one.counters(two), record.team_one_style.counters(record.team_two_style));
        }
    }

    #[test]
    fn style_bonus_sign_and_range() {
        let mut sim = mirror_match(Map::Ascent, 23);
        let mut seen = [0u32; 3];
        for _ in 0..100 {
            let (_, rounds) = sim.play_match_traced();
            for r in rounds {
                let bonus = r.team_one_chance - sim.advantage().team_one_chance(r.attacker);
                if r.team_one_style.counters(r.team_two_style) {
                    assert!(STYLE_BONUS_RANGE.contains(&bonus), "bonus {bonus} out of range");
                    seen[0] += 1;
                } else if r.team_two_style.counters(r.team_one_style) {
                    assert!(STYLE_BONUS_RANGE.contains(&-bonus), "bonus {bonus} out of range");
                    seen[1] += 1;
                } else {
                    assert!(bonus.abs() < TIE_EPSILON, "same styles shifted by {bonus}");
                    seen[2] += 1;
                }
            }
        }
        assert!(seen.iter().all(|&n| n > 0), "style outcomes seen: {seen:?}");
    }

    #[test]
    fn halftime_after_exactly_twelve_rounds() {
        for seed in 0..50 {
            let mut sim = mirror_match(Map::Haven, seed).with_starting_side(Team::Two);
            let (_, rounds) = sim.play_match_traced();
            assert!(rounds[..12].iter().all(|r| r.attacker == Team::Two));
            assert_eq!(rounds[12].attacker, Team::One);
        }
    }

    #[test]
    fn completed_match_invariants() {
        let mut sim = mirror_match(Map::Split, 99);
        for _ in 0..300 {
            let (result, rounds) = sim.play_match_traced();
            assert_eq!(rounds.len() as u32, result.rounds_played());
            assert_ne!(result.team_one_rounds, result.team_two_rounds);
            let (w, l) = match result.winner {
                Team::One => (result.team_one_rounds, result.team_two_rounds),
                Team::Two => (result.team_two_rounds, result.team_one_rounds),
            };
            assert!(w > l);
            if result.overtime {
                assert_eq!(w - l, OVERTIME_MARGIN);
            } else {
                assert_eq!(w, ROUNDS_TO_WIN);
            }
            for (i, r) in rounds.iter().enumerate() {
                assert_eq!(r.round as usize, i + 1);
            }
            assert_eq!(sim.state().phase, Phase::Complete);
        }
        assert_eq!(sim.tally().matches, 300);
    }

    #[test]
    fn overtime_alternates_every_round() {
        let mut seen_overtime = 0;
        for seed in 0..400 {
            let mut sim = mirror_match(Map::None, seed);
            let (result, rounds) = sim.play_match_traced();
            if !result.overtime {
                continue;
            }
            seen_overtime += 1;
            let start = rounds
                .iter()
                .position(|r| r.team_one_rounds == 12 && r.team_two_rounds == 12)
                .expect("overtime match passes through 12-12");
            assert_eq!(start, 23, "12-12 can only be reached on round 24");
            for pair in rounds[start..].windows(2) {
                assert_eq!(pair[1].attacker, pair[0].attacker.other());
            }
            let last = rounds.last().unwrap();
            assert_eq!(last.team_one_rounds.abs_diff(last.team_two_rounds), 2);
        }
        assert!(seen_overtime > 10, "expected a fair number of overtime matches");
    }

    #[test]
    fn starting_side_persists_across_matches() {
        let mut sim = mirror_match(Map::Lotus, 3).with_starting_side(Team::Two);
        for _ in 0..5 {
            let (_, rounds) = sim.play_match_traced();
            assert_eq!(rounds[0].attacker, Team::Two);
        }
    }

    #[test]
    fn seeded_simulators_agree() {
        let mut a = mirror_match(Map::Pearl, 1234);
        let mut b = mirror_match(Map::Pearl, 1234);
        for _ in 0..20 {
            assert_eq!(a.play_match(), b.play_match());
        }
        assert_eq!(a.tally(), b.tally());
    }
}
