// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Tactical Match Simulation Suite ("The Arena") - Agent Roster & Map Tables

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::agent::Agent;
use crate::error::SimError;
use crate::types::{Role, Style};

// ─── Map ────────────────────────────────────────────────────────────────────

/// Map selector. Unrecognized names resolve to [`Map::None`], which carries
/// no attacker advantage and no agent balancing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Map {
    #[default]
    None,
    Abyss,
    Ascent,
    Bind,
    Breeze,
    Corrode,
    Fracture,
    Haven,
    Icebox,
    Lotus,
    Pearl,
    Split,
    Sunset,
}

impl Map {
    pub const PLAYABLE: [Map; 12] = [
        Map::Abyss,
        Map::Ascent,
        Map::Bind,
        Map::Breeze,
        Map::Corrode,
        Map::Fracture,
        Map::Haven,
        Map::Icebox,
        Map::Lotus,
        Map::Pearl,
        Map::Split,
        Map::Sunset,
    ];

    /// Trimmed, case-insensitive lookup. Never fails.
    pub fn parse(name: &str) -> Map {
        let wanted = name.trim().to_lowercase();
        Self::PLAYABLE
            .into_iter()
            .find(|m| m.key() == wanted)
            .unwrap_or(Map::None)
    }

    fn key(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Abyss => "abyss",
            Self::Ascent => "ascent",
            Self::Bind => "bind",
            Self::Breeze => "breeze",
            Self::Corrode => "corrode",
            Self::Fracture => "fracture",
            Self::Haven => "haven",
            Self::Icebox => "icebox",
            Self::Lotus => "lotus",
            Self::Pearl => "pearl",
            Self::Split => "split",
            Self::Sunset => "sunset",
        }
    }

    /// Percentage points added to the attacking side's round-win chance.
    pub fn attacker_advantage(&self) -> f64 {
        match self {
            Self::None => 0.0,
            Self::Abyss => -0.1,
            Self::Ascent => -5.05,
            Self::Bind => -3.81,
            Self::Breeze => 1.11,
            Self::Corrode => -0.96,
            Self::Fracture => 1.0,
            Self::Haven => -1.68,
            Self::Icebox => -1.35,
            Self::Lotus => 0.57,
            Self::Pearl => -1.6,
            Self::Split => -3.3,
            Self::Sunset => -1.39,
        }
    }

    /// Signed relative-power adjustments for this map. Agents not listed keep
    /// their baseline.
    pub fn power_deltas(&self) -> &'static [(&'static str, f64)] {
        match self {
            Self::None => &[],
            Self::Abyss => ABYSS_DELTAS,
            Self::Ascent => ASCENT_DELTAS,
            Self::Bind => BIND_DELTAS,
            Self::Breeze => BREEZE_DELTAS,
            Self::Corrode => CORRODE_DELTAS,
            Self::Fracture => FRACTURE_DELTAS,
            Self::Haven => HAVEN_DELTAS,
            Self::Icebox => ICEBOX_DELTAS,
            Self::Lotus => LOTUS_DELTAS,
            Self::Pearl => PEARL_DELTAS,
            Self::Split => SPLIT_DELTAS,
            Self::Sunset => SUNSET_DELTAS,
        }
    }

    pub fn power_delta(&self, agent: &str) -> f64 {
        self.power_deltas()
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(agent.trim()))
            .map(|(_, d)| *d)
            .unwrap_or(0.0)
    }
}

impl fmt::Display for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("N/A"),
            other => f.write_str(&other.key().to_uppercase()),
        }
    }
}

// ─── Agent Registry ─────────────────────────────────────────────────────────

/// Lookup table of every selectable agent, balanced for one map at a time.
#[derive(Debug, Clone)]
pub struct AgentRegistry {
    agents: Vec<Agent>,
    by_name: HashMap<String, usize>,
    map: Map,
}

impl AgentRegistry {
    /// Every built-in agent at baseline power.
    pub fn standard() -> Self {
        let agents: Vec<Agent> = AGENT_TABLE
            .iter()
            .map(|s| {
                let [aggro, control, midrange] = s.styles;
                Agent::from_table(
                    s.name,
                    s.role,
                    aggro,
                    control,
                    midrange,
                    s.relative_power,
                    s.splash,
                )
            })
            .collect();
        let by_name = agents
            .iter()
            .enumerate()
            .map(|(i, a)| (normalize(a.name()), i))
            .collect();
        Self { agents, by_name, map: Map::None }
    }

    pub fn for_map(map: Map) -> Self {
        let mut registry = Self::standard();
        registry.balance_for_map(map);
        registry
    }

    /// Builds a registry from custom agents. Names must be unique,
    /// ignoring case.
    pub fn from_agents(agents: Vec<Agent>) -> Result<Self, SimError> {
        let mut by_name = HashMap::with_capacity(agents.len());
        for (i, agent) in agents.iter().enumerate() {
            if by_name.insert(normalize(agent.name()), i).is_some() {
                return Err(SimError::DuplicateAgent(agent.name().to_string()));
            }
        }
        Ok(Self { agents, by_name, map: Map::None })
    }

    pub fn get(&self, name: &str) -> Option<&Agent> {
        self.by_name.get(&normalize(name)).map(|&i| &self.agents[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn map(&self) -> Map {
        self.map
    }

    /// Resets every agent to baseline, then applies `map`'s deltas.
    pub fn balance_for_map(&mut self, map: Map) {
        for agent in &mut self.agents {
            agent.reset_relative_power();
            agent.adjust_relative_power(map.power_delta(agent.name()));
        }
        self.map = map;
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

pub(crate) fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

// ─── Data Tables ────────────────────────────────────────────────────────────

struct AgentRow {
    name: &'static str,
    role: Role,
    /// aggro, control, midrange
    styles: [f64; 3],
    relative_power: f64,
    splash: Option<Style>,
}

const fn row(
    name: &'static str,
    role: Role,
    styles: [f64; 3],
    relative_power: f64,
    splash: Option<Style>,
) -> AgentRow {
    AgentRow { name, role, styles, relative_power, splash }
}

const AGENT_TABLE: [AgentRow; 27] = [
    row("Astra", Role::Controller, [2.0, 3.0, 6.0], 8.0, Some(Style::Control)),
    row("Breach", Role::Initiator, [7.0, 3.0, 1.0], 2.0, Some(Style::Aggro)),
    row("Brimstone", Role::Controller, [7.0, 2.0, 2.0], 6.0, None),
    row("Chamber", Role::Sentinel, [5.0, 6.0, 0.0], 7.0, None),
    row("Clove", Role::Controller, [5.0, 1.0, 5.0], 5.0, None),
    row("Cypher", Role::Sentinel, [1.0, 7.0, 3.0], 7.0, Some(Style::Control)),
    row("Deadlock", Role::Sentinel, [1.0, 5.0, 5.0], 7.0, None),
    row("Fade", Role::Initiator, [3.0, 3.0, 5.0], 10.0, Some(Style::Midrange)),
    row("Gekko", Role::Initiator, [3.0, 1.0, 7.0], 7.0, Some(Style::Midrange)),
    row("Harbor", Role::Controller, [5.0, 3.0, 3.0], 3.0, None),
    row("Iso", Role::Duelist, [7.0, 1.0, 3.0], 6.0, Some(Style::Aggro)),
    row("Jett", Role::Duelist, [9.0, 2.0, 0.0], 7.0, Some(Style::Aggro)),
    row("KAY/O", Role::Initiator, [7.0, 3.0, 1.0], 9.0, None),
    row("Killjoy", Role::Sentinel, [3.0, 7.0, 1.0], 7.0, None),
    row("Neon", Role::Duelist, [8.0, 0.0, 3.0], 10.0, Some(Style::Midrange)),
    row("Omen", Role::Controller, [3.0, 6.0, 2.0], 10.0, None),
    row("Phoenix", Role::Duelist, [6.0, 2.0, 3.0], 4.0, None),
    row("Raze", Role::Duelist, [7.0, 1.0, 3.0], 9.0, Some(Style::Aggro)),
    row("Reyna", Role::Duelist, [9.0, 0.0, 2.0], 4.0, None),
    row("Sage", Role::Sentinel, [1.0, 5.0, 5.0], 6.0, None),
    row("Skye", Role::Initiator, [3.0, 2.0, 6.0], 5.0, None),
    row("Sova", Role::Initiator, [1.0, 6.0, 4.0], 10.0, None),
    row("Tejo", Role::Initiator, [7.0, 1.0, 3.0], 7.0, None),
    row("Viper", Role::Controller, [3.0, 5.0, 3.0], 10.0, Some(Style::Midrange)),
    row("Vyse", Role::Sentinel, [1.0, 4.0, 6.0], 8.0, Some(Style::Control)),
    row("Waylay", Role::Duelist, [8.0, 2.0, 1.0], 6.0, None),
    row("Yoru", Role::Duelist, [5.0, 3.0, 3.0], 10.0, Some(Style::Aggro)),
];

const ABYSS_DELTAS: &[(&str, f64)] = &[
    ("Astra", 1.0),
    ("Breach", -1.0),
    ("Brimstone", -2.0),
    ("Chamber", 1.0),
    ("Clove", -1.0),
    ("Cypher", 1.0),
    ("Deadlock", 2.0),
    ("Gekko", 1.0),
    ("Harbor", 1.0),
    ("Jett", 2.0),
    ("KAY/O", 1.0),
    ("Killjoy", -1.0),
    ("Omen", -1.0),
    ("Raze", -2.0),
    ("Sova", 2.0),
    ("Vyse", 2.0),
    ("Yoru", -1.0),
];

const ASCENT_DELTAS: &[(&str, f64)] = &[
    ("Breach", 1.0),
    ("Brimstone", -2.0),
    ("Chamber", 2.0),
    ("Clove", 1.0),
    ("Gekko", -1.0),
    ("Jett", 3.0),
    ("KAY/O", 3.0),
    ("Killjoy", 3.0),
    ("Omen", 2.0),
    ("Phoenix", 1.0),
    ("Raze", -2.0),
    ("Sage", 1.0),
    ("Sova", 2.0),
    ("Viper", 2.0),
    ("Vyse", 2.0),
    ("Waylay", 1.0),
];

const BIND_DELTAS: &[(&str, f64)] = &[
    ("Astra", 1.0),
    ("Brimstone", 4.0),
    ("Chamber", 2.0),
    ("Clove", 1.0),
    ("Cypher", 1.0),
    ("Deadlock", 1.0),
    ("Fade", 2.0),
    ("Gekko", 1.0),
    ("Iso", 2.0),
    ("Jett", -1.0),
    ("Killjoy", -4.0),
    ("Neon", -1.0),
    ("Omen", -2.0),
    ("Phoenix", 1.0),
    ("Raze", 4.0),
    ("Skye", 1.0),
    ("Sova", -1.0),
    ("Tejo", 1.0),
    ("Viper", 4.0),
    ("Vyse", 3.0),
    ("Yoru", 2.0),
];

const BREEZE_DELTAS: &[(&str, f64)] = &[
    ("Astra", -1.0),
    ("Breach", -2.0),
    ("Brimstone", -3.0),
    ("Chamber", 1.0),
    ("Clove", -2.0),
    ("Cypher", 2.0),
    ("Deadlock", -1.0),
    ("Fade", -1.0),
    ("Gekko", 1.0),
    ("Harbor", 1.0),
    ("Jett", 2.0),
    ("KAY/O", 1.0),
    ("Killjoy", -2.0),
    ("Neon", -1.0),
    ("Omen", -2.0),
    ("Phoenix", -2.0),
    ("Raze", -2.0),
    ("Reyna", -1.0),
    ("Sage", -3.0),
    ("Sova", 2.0),
    ("Tejo", -1.0),
    ("Viper", 2.0),
    ("Vyse", 1.0),
    ("Waylay", -1.0),
    ("Yoru", 1.0),
];

const CORRODE_DELTAS: &[(&str, f64)] = &[
    ("Brimstone", 1.0),
    ("Chamber", 2.0),
    ("Cypher", 2.0),
    ("Deadlock", 2.0),
    ("Fade", 1.0),
    ("Gekko", 1.0),
    ("KAY/O", 1.0),
    ("Killjoy", -1.0),
    ("Neon", 2.0),
    ("Omen", 1.0),
    ("Phoenix", 1.0),
    ("Raze", 1.0),
    ("Sage", 2.0),
    ("Skye", 2.0),
    ("Sova", 1.0),
    ("Tejo", -1.0),
    ("Viper", 1.0),
    ("Vyse", 3.0),
    ("Waylay", 1.0),
];

const FRACTURE_DELTAS: &[(&str, f64)] = &[
    ("Breach", 2.0),
    ("Brimstone", 4.0),
    ("Chamber", 1.0),
    ("Clove", 1.0),
    ("Cypher", 2.0),
    ("Deadlock", 2.0),
    ("Fade", 1.0),
    ("Gekko", -1.0),
    ("KAY/O", 2.0),
    ("Killjoy", 1.0),
    ("Neon", 2.0),
    ("Omen", -2.0),
    ("Raze", 3.0),
    ("Sova", 1.0),
    ("Tejo", 1.0),
    ("Viper", -1.0),
    ("Vyse", 2.0),
    ("Yoru", -2.0),
];

const HAVEN_DELTAS: &[(&str, f64)] = &[
    ("Astra", 2.0),
    ("Breach", 4.0),
    ("Brimstone", -2.0),
    ("Chamber", 1.0),
    ("Clove", -1.0),
    ("Cypher", 3.0),
    ("Fade", -1.0),
    ("Gekko", -2.0),
    ("Iso", 4.0),
    ("KAY/O", -2.0),
    ("Killjoy", 2.0),
    ("Neon", 1.0),
    ("Omen", 3.0),
    ("Phoenix", 1.0),
    ("Raze", -2.0),
    ("Reyna", -2.0),
    ("Sage", -2.0),
    ("Skye", -2.0),
    ("Sova", 3.0),
    ("Tejo", 1.0),
    ("Viper", 3.0),
    ("Vyse", 2.0),
    ("Waylay", 1.0),
    ("Yoru", 3.0),
];

const ICEBOX_DELTAS: &[(&str, f64)] = &[
    ("Astra", -2.0),
    ("Breach", -2.0),
    ("Brimstone", -3.0),
    ("Chamber", 1.0),
    ("Cypher", -4.0),
    ("Deadlock", -2.0),
    ("Fade", -1.0),
    ("Gekko", 2.0),
    ("Harbor", 2.0),
    ("Iso", 1.0),
    ("Jett", 1.0),
    ("KAY/O", 2.0),
    ("Killjoy", 3.0),
    ("Neon", -1.0),
    ("Omen", -1.0),
    ("Phoenix", -1.0),
    ("Raze", -1.0),
    ("Reyna", 2.0),
    ("Sage", 5.0),
    ("Skye", -2.0),
    ("Sova", 3.0),
    ("Tejo", -2.0),
    ("Viper", 4.0),
    ("Vyse", -1.0),
    ("Waylay", -2.0),
    ("Yoru", -2.0),
];

const LOTUS_DELTAS: &[(&str, f64)] = &[
    ("Astra", 1.0),
    ("Breach", -1.0),
    ("Brimstone", -3.0),
    ("Chamber", 2.0),
    ("Clove", 1.0),
    ("Cypher", 1.0),
    ("Deadlock", 2.0),
    ("Fade", 4.0),
    ("Gekko", 1.0),
    ("Harbor", -2.0),
    ("KAY/O", 1.0),
    ("Killjoy", 1.0),
    ("Neon", 1.0),
    ("Omen", 2.0),
    ("Phoenix", -1.0),
    ("Raze", 3.0),
    ("Reyna", -1.0),
    ("Sage", -1.0),
    ("Skye", -2.0),
    ("Sova", -2.0),
    ("Tejo", 2.0),
    ("Viper", 3.0),
    ("Vyse", 3.0),
    ("Yoru", 1.0),
];

const PEARL_DELTAS: &[(&str, f64)] = &[
    ("Astra", 3.0),
    ("Breach", -2.0),
    ("Brimstone", -2.0),
    ("Clove", -2.0),
    ("Fade", 1.0),
    ("Gekko", -1.0),
    ("Harbor", 1.0),
    ("Jett", 1.0),
    ("KAY/O", 2.0),
    ("Killjoy", 2.0),
    ("Neon", 2.0),
    ("Omen", -2.0),
    ("Phoenix", 2.0),
    ("Raze", -1.0),
    ("Reyna", -1.0),
    ("Sage", 1.0),
    ("Skye", -1.0),
    ("Sova", 1.0),
    ("Tejo", -2.0),
    ("Viper", 1.0),
    ("Vyse", 2.0),
    ("Yoru", 1.0),
];

const SPLIT_DELTAS: &[(&str, f64)] = &[
    ("Astra", 2.0),
    ("Brimstone", -1.0),
    ("Chamber", 1.0),
    ("Cypher", 1.0),
    ("Fade", 2.0),
    ("Harbor", 2.0),
    ("KAY/O", 2.0),
    ("Killjoy", -2.0),
    ("Neon", -1.0),
    ("Omen", 1.0),
    ("Phoenix", 1.0),
    ("Raze", 4.0),
    ("Reyna", -2.0),
    ("Sage", 1.0),
    ("Skye", 1.0),
    ("Sova", -3.0),
    ("Tejo", 1.0),
    ("Viper", 3.0),
    ("Vyse", 1.0),
    ("Yoru", 2.0),
];

const SUNSET_DELTAS: &[(&str, f64)] = &[
    ("Breach", 1.0),
    ("Chamber", 2.0),
    ("Cypher", 2.0),
    ("Deadlock", 2.0),
    ("Fade", 2.0),
    ("Gekko", 1.0),
    ("Harbor", 2.0),
    ("KAY/O", 2.0),
    ("Killjoy", -3.0),
    ("Neon", 2.0),
    ("Omen", 1.0),
    ("Raze", 1.0),
    ("Reyna", -1.0),
    ("Sage", 2.0),
    ("Sova", 2.0),
    ("Tejo", 1.0),
    ("Viper", 2.0),
    ("Vyse", 2.0),
    ("Yoru", 1.0),
];

// ─── Tests ──────────────────────────────────────────────────────────────────
