// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Tactical Match Simulation Suite ("The Arena") - Team Composition

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::agent::Agent;
use crate::error::SimError;
use crate::roster::{AgentRegistry, Map};
use crate::types::Style;

pub const TEAM_SIZE: usize = 5;

// ─── Aggregates ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct StyleTotals {
    pub aggro: f64,
    pub control: f64,
    pub midrange: f64,
}

impl StyleTotals {
    pub fn get(&self, style: Style) -> f64 {
        match style {
            Style::Aggro => self.aggro,
            Style::Control => self.control,
            Style::Midrange => self.midrange,
        }
    }

    pub fn total(&self) -> f64 {
        self.aggro + self.control + self.midrange
    }

    fn add(&mut self, style: Style, value: f64) {
        match style {
            Style::Aggro => self.aggro += value,
            Style::Control => self.control += value,
            Style::Midrange => self.midrange += value,
        }
    }
}

/// Aggregates of a complete five-agent composition.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct TeamStats {
    pub base: StyleTotals,
    /// Includes splash bonuses.
    pub true_totals: StyleTotals,
    pub relative_power: f64,
}

impl TeamStats {
    fn from_members(members: &[Agent]) -> Self {
        let mut stats = TeamStats::default();
        for agent in members {
            for style in Style::ALL {
                stats.base.add(style, agent.base_style(style));
                stats.true_totals.add(style, agent.true_style(style));
            }
            stats.relative_power += agent.current_relative_power();
        }
        stats
    }

    /// Weighted draw of this round's style.
    ///
    /// A roll in `[0, total)` lands in aggro `[0, A)`, control `[A, total - M)`
    /// or midrange `[total - M, total)`.
    pub fn draw_style<R: Rng + ?Sized>(&self, rng: &mut R) -> Style {
        let t = &self.true_totals;
        let total = t.total();
        if total <= 0.0 {
            return Style::ALL[rng.gen_range(0..Style::ALL.len())];
        }
        let roll = rng.gen::<f64>() * total;
        if roll < t.aggro {
            Style::Aggro
        } else if roll < total - t.midrange {
            Style::Control
        } else {
            Style::Midrange
        }
    }
}

// ─── Team Composition ───────────────────────────────────────────────────────

/// Ordered set of up to five distinct agents.
///
/// Aggregates exist only once the fifth agent is in; before that every
/// aggregate reads as zero.
#[derive(Debug, Clone, Default)]
pub struct TeamComposition {
    members: Vec<Agent>,
    stats: Option<TeamStats>,
    style: Option<Style>,
}

impl TeamComposition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a full composition by re-adding each name in order.
    pub fn from_names<S: AsRef<str>>(
        registry: &AgentRegistry,
        names: &[S],
    ) -> Result<Self, SimError> {
        let mut team = Self::new();
        for name in names {
            team.add_agent(registry, name.as_ref())?;
        }
        Ok(team)
    }

    /// Adds one agent by name. A rejected add leaves the team unchanged.
    pub fn add_agent(&mut self, registry: &AgentRegistry, name: &str) -> Result<(), SimError> {
        let name = name.trim();
        if self.is_complete() {
            return Err(SimError::TeamFull);
        }
        let Some(agent) = registry.get(name) else {
            warn!(agent = name, "invalid agent name");
            return Err(SimError::UnknownAgent(name.to_string()));
        };
        if self.contains(agent.name()) {
            return Err(SimError::DuplicateAgent(agent.name().to_string()));
        }

        self.members.push(agent.clone());
        if self.members.len() == TEAM_SIZE {
            for member in &mut self.members {
                member.apply_splash();
            }
            self.stats = Some(TeamStats::from_members(&self.members));
        }
        Ok(())
    }

    /// Re-derives every member's power for `map` and refreshes aggregates.
    pub fn rebalance(&mut self, map: Map) {
        for member in &mut self.members {
            member.reset_relative_power();
            member.adjust_relative_power(map.power_delta(member.name()));
        }
        if self.is_complete() {
            self.stats = Some(TeamStats::from_members(&self.members));
        }
    }

    pub fn clear(&mut self) {
        self.members.clear();
        self.stats = None;
        self.style = None;
    }

    pub fn contains(&self, name: &str) -> bool {
        let name = name.trim();
        self.members.iter().any(|a| a.name().eq_ignore_ascii_case(name))
    }

    pub fn is_complete(&self) -> bool {
        self.members.len() == TEAM_SIZE
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[Agent] {
        &self.members
    }

    pub fn agent_names(&self) -> Vec<String> {
        self.members.iter().map(|a| a.name().to_string()).collect()
    }

    pub fn stats(&self) -> Option<TeamStats> {
        self.stats
    }

    pub fn total_base_styles(&self) -> StyleTotals {
        self.stats.map(|s| s.base).unwrap_or_default()
    }

    pub fn total_true_styles(&self) -> StyleTotals {
        self.stats.map(|s| s.true_totals).unwrap_or_default()
    }

    pub fn total_relative_power(&self) -> f64 {
        self.stats.map(|s| s.relative_power).unwrap_or(0.0)
    }

    /// Draws and records this round's style. `None` until the team is
    /// complete.
    pub fn choose_round_style<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Style> {
        let style = self.stats?.draw_style(rng);
        self.style = Some(style);
        Some(style)
    }

    pub fn round_style(&self) -> Option<Style> {
        self.style
    }

    /// Whether this team's current style beats `other`'s.
    pub fn counters(&self, other: &TeamComposition) -> bool {
        match (self.style, other.style) {
            (Some(mine), Some(theirs)) => mine.counters(theirs),
            _ => false,
        }
    }
}

/// Style totals, total power, then one line per agent.
impl fmt::Display for TeamComposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let totals = self.total_true_styles();
        writeln!(f, "Total Points in Each Style:")?;
        writeln!(f, "Aggro: {:.1}", totals.aggro)?;
        writeln!(f, "Control: {:.1}", totals.control)?;
        writeln!(f, "Midrange: {:.1}", totals.midrange)?;
        writeln!(f, "Total Relative Power: {:.1}", self.total_relative_power())?;
        writeln!(f)?;
        writeln!(f, "Agent Stats:")?;
        for agent in &self.members {
            writeln!(f, "{agent}")?;
        }
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const LINEUP: [&str; 5] = ["Jett", "Sova", "Omen", "Killjoy", "KAY/O"];

    #[test]
    fn accepts_exactly_five() {
        let reg = AgentRegistry::standard();
        let mut team = TeamComposition::new();
        for name in LINEUP {
            team.add_agent(&reg, name).unwrap();
        }
        assert!(team.is_complete());
        assert!(matches!(team.add_agent(&reg, "Sage"), Err(SimError::TeamFull)));
        assert_eq!(team.len(), 5);
    }

    #[test]
    fn rejects_unknown_and_duplicate_without_mutation() {
        let reg = AgentRegistry::standard();
        let mut team = TeamComposition::new();
        team.add_agent(&reg, "jett").unwrap();
        assert!(matches!(team.add_agent(&reg, "Tracer"), Err(SimError::UnknownAgent(_))));
        assert!(matches!(team.add_agent(&reg, " JETT "), Err(SimError::DuplicateAgent(_))));
        assert_eq!(team.agent_names(), vec!["Jett".to_string()]);
    }

    #[test]
    fn aggregates_are_zero_before_fifth_agent() {
        let reg = AgentRegistry::standard();
        let mut team = TeamComposition::new();
        for name in &LINEUP[..4] {
            team.add_agent(&reg, name).unwrap();
        }
        assert!(team.stats().is_none());
        assert_eq!(team.total_relative_power(), 0.0);
        assert_eq!(team.total_true_styles().total(), 0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(team.choose_round_style(&mut rng).is_none());
        assert!(team.members().iter().all(|a| !a.splash_applied()));
    }

    #[test]
    fn splash_applied_on_completion() {
        let reg = AgentRegistry::standard();
        let team = TeamComposition::from_names(&reg, &LINEUP).unwrap();
        let stats = team.stats().unwrap();
        // Jett 9/2/0, Sova 1/6/4, Omen 3/6/2, Killjoy 3/7/1, KAY/O 7/3/1
        assert_eq!(stats.base, StyleTotals { aggro: 23.0, control: 24.0, midrange: 8.0 });
        // only Jett carries a splash (+2 aggro)
        assert_eq!(stats.true_totals.aggro, 25.0);
        assert_eq!(stats.true_totals.control, 24.0);
        assert_eq!(stats.relative_power, 7.0 + 10.0 + 10.0 + 7.0 + 9.0);
    }

    #[test]
    fn rebalance_tracks_map() {
        let reg = AgentRegistry::standard();
        let mut team = TeamComposition::from_names(&reg, &LINEUP).unwrap();
        team.rebalance(Map::Ascent);
        // Jett +3, Sova +2, Omen +2, Killjoy +3, KAY/O +3
        assert_eq!(team.total_relative_power(), 43.0 + 13.0);
        team.rebalance(Map::None);
        assert_eq!(team.total_relative_power(), 43.0);
    }

    #[test]
    fn style_frequencies_follow_totals() {
        let reg = AgentRegistry::standard();
        let mut team = TeamComposition::from_names(&reg, &LINEUP).unwrap();
        let totals = team.total_true_styles();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let n = 200_000;
        let mut counts = [0u32; 3];
        for _ in 0..n {
            match team.choose_round_style(&mut rng).unwrap() {
                Style::Aggro => counts[0] += 1,
                Style::Control => counts[1] += 1,
                Style::Midrange => counts[2] += 1,
            }
        }
        for (i, style) in Style::ALL.iter().enumerate() {
            let expected = totals.get(*style) / totals.total();
            let observed = counts[i] as f64 / n as f64;
            assert!(
                (expected - observed).abs() < 0.01,
                "{style}: expected {expected:.4}, observed {observed:.4}"
            );
        }
    }

    #[test]
    fn zero_style_team_still_draws() {
        let agents = (0..5)
            .map(|i| {
                Agent::new(format!("Z{i}"), crate::types::Role::Duelist, 0.0, 0.0, 0.0, 5.0, None)
                    .unwrap()
            })
            .collect();
        let reg = AgentRegistry::from_agents(agents).unwrap();
        let mut team = TeamComposition::from_names(&reg, &["Z0", "Z1", "Z2", "Z3", "Z4"]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(team.choose_round_style(&mut rng).is_some());
    }

    #[test]
    fn counters_uses_current_styles() {
        let reg = AgentRegistry::standard();
        let mut a = TeamComposition::from_names(&reg, &LINEUP).unwrap();
        let mut b = TeamComposition::from_names(&reg, &LINEUP).unwrap();
        assert!(!a.counters(&b), "no styles drawn yet");

        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..100 {
            let sa = a.choose_round_style(&mut rng).unwrap();
            let sb = b.choose_round_style(&mut rng).unwrap();
            assert_eq!(a.counters(&b), sa.counters(sb));
            assert!(!(a.counters(&b) && b.counters(&a)));
        }
    }

    #[test]
    fn stats_listing() {
        let reg = AgentRegistry::standard();
        let mut team = TeamComposition::from_names(&reg, &LINEUP).unwrap();
        team.rebalance(Map::Ascent);
        let text = team.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            &lines[..7],
            &[
                "Total Points in Each Style:",
                "Aggro: 25.0",
                "Control: 24.0",
                "Midrange: 8.0",
                "Total Relative Power: 56.0",
                "",
                "Agent Stats:",
            ]
        );
        assert_eq!(lines[7], "Jett, 11/2/0, Relative Power: 10");
        assert_eq!(lines.len(), 7 + TEAM_SIZE);
    }

    #[test]
    fn stats_listing_reads_zero_before_completion() {
        let reg = AgentRegistry::standard();
        let team = TeamComposition::from_names(&reg, &LINEUP[..2]).unwrap();
        let text = team.to_string();
        assert!(text.contains("Aggro: 0.0\n"));
        assert!(text.contains("Total Relative Power: 0.0\n"));
        assert!(text.ends_with(
            "Agent Stats:\nJett, 9/2/0, Relative Power: 7\nSova, 1/6/4, Relative Power: 10\n"
        ));
    }
}
