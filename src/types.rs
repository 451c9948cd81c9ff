// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Tactical Match Simulation Suite ("The Arena") - Type Definitions

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SimError;

// ─── Style ──────────────────────────────────────────────────────────────────

/// Tactical style a team plays in a given round.
///
/// Styles form a fixed cycle: aggro beats control, control beats midrange,
/// midrange beats aggro.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Aggro,
    Control,
    Midrange,
}

impl Style {
    pub const ALL: [Style; 3] = [Style::Aggro, Style::Control, Style::Midrange];

    /// The style this one counters.
    pub fn beats(&self) -> Style {
        match self {
            Self::Aggro => Self::Control,
            Self::Control => Self::Midrange,
            Self::Midrange => Self::Aggro,
        }
    }

    pub fn counters(&self, other: Style) -> bool {
        self.beats() == other
    }

    /// Flat bonus a splash tag adds to its style.
    pub fn splash_bonus(&self) -> f64 {
        match self {
            Self::Aggro => 2.0,
            Self::Control => 2.0,
            Self::Midrange => 3.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Aggro => "AGGR",
            Self::Control => "CONTR",
            Self::Midrange => "MIDR",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ─── Role ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Controller,
    Initiator,
    Sentinel,
    Duelist,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Controller => "CONTROLLER",
            Self::Initiator => "INITIATOR",
            Self::Sentinel => "SENTINEL",
            Self::Duelist => "DUELIST",
        };
        f.write_str(s)
    }
}

// ─── Team ───────────────────────────────────────────────────────────────────

/// One of the two sides of a match. Used both as a team slot and as the
/// attacking-side selector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Team {
    #[default]
    One,
    Two,
}

impl Team {
    pub fn other(&self) -> Team {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }

    pub fn number(&self) -> u8 {
        self.index() as u8 + 1
    }
}

impl TryFrom<u8> for Team {
    type Error = SimError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(SimError::InvalidSide(other)),
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Team {}", self.number())
    }
}

// ─── Simulation Mode ────────────────────────────────────────────────────────

/// `Fast` only tallies results; `Detailed` additionally records every round.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SimMode {
    #[default]
    Fast,
    Detailed,
}

// ─── Round / Match Records ──────────────────────────────────────────────────

/// Trace of a single resolved round.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundRecord {
    pub round: u32,
    pub attacker: Team,
    /// Team one's win probability in percent.
    pub team_one_chance: f64,
    pub team_two_chance: f64,
    pub winner: Team,
    pub team_one_rounds: u32,
    pub team_two_rounds: u32,
    pub team_one_style: Style,
    pub team_two_style: Style,
    /// Resolved by an unweighted coin flip.
    pub tie_break: bool,
}

impl fmt::Display for RoundRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chance = (self.team_one_chance * 100.0).round() / 100.0;
        writeln!(f, "Current Round: {}", self.round)?;
        writeln!(f, "Attackers: {}", self.attacker)?;
        writeln!(f, "Team 1's odds: {:.2}%", chance)?;
        writeln!(f, "Team 2's odds: {:.2}%", 100.0 - chance)?;
        writeln!(f, "Round Winner: {}", self.winner)?;
        writeln!(f, "Team 1 rounds: {}", self.team_one_rounds)?;
        writeln!(f, "Team 2 rounds: {}", self.team_two_rounds)?;
        write!(f, "Styles: {} vs {}", self.team_one_style, self.team_two_style)
    }
}

/// Outcome of one completed match.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchResult {
    pub winner: Team,
    pub team_one_rounds: u32,
    pub team_two_rounds: u32,
    pub team_one_tie_breaks: u32,
    pub team_two_tie_breaks: u32,
    pub overtime: bool,
}

impl MatchResult {
    pub fn rounds_played(&self) -> u32 {
        self.team_one_rounds + self.team_two_rounds
    }
}

/// Full round-by-round trace of one match, produced in detailed mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchTrace {
    pub worker: usize,
    /// Index of the match within its worker's share.
    pub match_index: u64,
    pub result: MatchResult,
    pub rounds: Vec<RoundRecord>,
}

// ─── Match Tally ────────────────────────────────────────────────────────────

/// Running per-simulator totals across the matches it has played.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchTally {
    pub matches: u64,
    pub team_one_wins: u64,
    pub team_two_wins: u64,
    pub team_one_rounds: u64,
    pub team_two_rounds: u64,
    pub team_one_tie_breaks: u64,
    pub team_two_tie_breaks: u64,
}

impl MatchTally {
    pub fn record(&mut self, result: &MatchResult) {
        self.matches += 1;
        match result.winner {
            Team::One => self.team_one_wins += 1,
            Team::Two => self.team_two_wins += 1,
        }
        self.team_one_rounds += result.team_one_rounds as u64;
        self.team_two_rounds += result.team_two_rounds as u64;
        self.team_one_tie_breaks += result.team_one_tie_breaks as u64;
        self.team_two_tie_breaks += result.team_two_tie_breaks as u64;
    }

    pub fn merge(&mut self, other: &MatchTally) {
        self.matches += other.matches;
        self.team_one_wins += other.team_one_wins;
        self.team_two_wins += other.team_two_wins;
        self.team_one_rounds += other.team_one_rounds;
        self.team_two_rounds += other.team_two_rounds;
        self.team_one_tie_breaks += other.team_one_tie_breaks;
        self.team_two_tie_breaks += other.team_two_tie_breaks;
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_cycle() {
        assert!(Style::Aggro.counters(Style::Control));
        assert!(Style::Control.counters(Style::Midrange));
        assert!(Style::Midrange.counters(Style::Aggro));
        for s in Style::ALL {
            assert!(!s.counters(s), "{s} must not counter itself");
            // exactly one direction of any distinct pair counters
            for o in Style::ALL.into_iter().filter(|o| *o != s) {
                assert_ne!(s.counters(o), o.counters(s));
            }
        }
    }

    #[test]
    fn team_from_number() {
        assert_eq!(Team::try_from(1).unwrap(), Team::One);
        assert_eq!(Team::try_from(2).unwrap(), Team::Two);
        assert!(matches!(Team::try_from(3), Err(SimError::InvalidSide(3))));
        assert!(matches!(Team::try_from(0), Err(SimError::InvalidSide(0))));
        assert_eq!(Team::One.other(), Team::Two);
    }

    #[test]
    fn tally_records_winner_and_rounds() {
        let mut tally = MatchTally::default();
        tally.record(&MatchResult {
            winner: Team::Two,
            team_one_rounds: 11,
            team_two_rounds: 13,
            team_one_tie_breaks: 1,
            team_two_tie_breaks: 0,
            overtime: false,
        });
        assert_eq!(tally.matches, 1);
        assert_eq!(tally.team_two_wins, 1);
        assert_eq!(tally.team_one_rounds, 11);
        assert_eq!(tally.team_two_rounds, 13);
        assert_eq!(tally.team_one_tie_breaks, 1);

        let mut total = MatchTally::default();
        total.merge(&tally);
        total.merge(&tally);
        assert_eq!(total.matches, 2);
        assert_eq!(total.team_two_rounds, 26);
    }

    #[test]
    fn round_record_display() {
        let rec = RoundRecord {
            round: 3,
            attacker: Team::One,
            team_one_chance: 53.456,
            team_two_chance: 46.544,
            winner: Team::One,
            team_one_rounds: 2,
            team_two_rounds: 1,
            team_one_style: Style::Aggro,
            team_two_style: Style::Control,
            tie_break: false,
        };
        let text = rec.to_string();
        assert!(text.contains("Current Round: 3"));
        assert!(text.contains("Team 1's odds: 53.46%"));
        assert!(text.contains("Team 2's odds: 46.54%"));
        assert!(text.contains("Styles: AGGR vs CONTR"));
    }
}
