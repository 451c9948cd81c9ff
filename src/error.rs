// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Tactical Match Simulation Suite ("The Arena") - Error Types

/// Errors surfaced by the simulation engine.
///
/// Everything except [`SimError::WorkerFailed`] and [`SimError::ThreadPool`]
/// is an input validation error: the offending call is rejected and no state
/// is modified.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("unknown agent: {0:?}")]
    UnknownAgent(String),

    #[error("agent {0} is already in this composition")]
    DuplicateAgent(String),

    #[error("team composition already has 5 agents")]
    TeamFull,

    #[error("{team} composition is incomplete ({count}/5 agents)")]
    TeamIncomplete { team: crate::types::Team, count: usize },

    #[error("invalid {stat} for agent {agent}: {value}")]
    InvalidAgentStat { agent: String, stat: &'static str, value: f64 },

    #[error("attacking side must be 1 or 2, got {0}")]
    InvalidSide(u8),

    #[error("match count must be at least 1")]
    InvalidMatchCount,

    #[error("map name must not be empty")]
    EmptyMapName,

    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),

    #[error("worker {worker} failed: {reason}")]
    WorkerFailed { worker: usize, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}
