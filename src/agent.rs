// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Tactical Match Simulation Suite ("The Arena") - Agent Model

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SimError;
use crate::types::{Role, Style};

/// Stat record for one agent.
///
/// Everything is fixed at construction except `current_relative_power`,
/// which only map balancing moves, and the one-shot splash flag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Agent {
    name: String,
    role: Role,
    aggro: f64,
    control: f64,
    midrange: f64,
    splash: Option<Style>,
    splash_applied: bool,
    baseline_relative_power: f64,
    current_relative_power: f64,
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        role: Role,
        aggro: f64,
        control: f64,
        midrange: f64,
        relative_power: f64,
        splash: Option<Style>,
    ) -> Result<Self, SimError> {
        let name = name.into();
        for (stat, value) in [("aggro", aggro), ("control", control), ("midrange", midrange)] {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::InvalidAgentStat { agent: name, stat, value });
            }
        }
        if !relative_power.is_finite() {
            return Err(SimError::InvalidAgentStat {
                agent: name,
                stat: "relative power",
                value: relative_power,
            });
        }
        Ok(Self {
            name,
            role,
            aggro,
            control,
            midrange,
            splash,
            splash_applied: false,
            baseline_relative_power: relative_power,
            current_relative_power: relative_power,
        })
    }

    /// Built-in table entries, already known to be valid.
    pub(crate) fn from_table(
        name: &str,
        role: Role,
        aggro: f64,
        control: f64,
        midrange: f64,
        relative_power: f64,
        splash: Option<Style>,
    ) -> Self {
        Self {
            name: name.to_string(),
            role,
            aggro,
            control,
            midrange,
            splash,
            splash_applied: false,
            baseline_relative_power: relative_power,
            current_relative_power: relative_power,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn splash(&self) -> Option<Style> {
        self.splash
    }

    pub fn base_style(&self, style: Style) -> f64 {
        match style {
            Style::Aggro => self.aggro,
            Style::Control => self.control,
            Style::Midrange => self.midrange,
        }
    }

    /// Style value including the splash bonus, once applied.
    pub fn true_style(&self, style: Style) -> f64 {
        let bonus = match self.splash {
            Some(s) if s == style && self.splash_applied => s.splash_bonus(),
            _ => 0.0,
        };
        self.base_style(style) + bonus
    }

    /// Boosts the splash style. Repeated calls have no further effect.
    pub fn apply_splash(&mut self) {
        self.splash_applied = true;
    }

    pub fn splash_applied(&self) -> bool {
        self.splash_applied
    }

    pub fn baseline_relative_power(&self) -> f64 {
        self.baseline_relative_power
    }

    pub fn current_relative_power(&self) -> f64 {
        self.current_relative_power
    }

    pub fn adjust_relative_power(&mut self, delta: f64) {
        self.current_relative_power += delta;
    }

    pub fn reset_relative_power(&mut self) {
        self.current_relative_power = self.baseline_relative_power;
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}/{}/{}, Relative Power: {}",
            self.name,
            round4(self.true_style(Style::Aggro)),
            round4(self.true_style(Style::Control)),
            round4(self.true_style(Style::Midrange)),
            self.current_relative_power,
        )
    }
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

// ─── Tests ──────────────────────────────────────────────────────────────────
