// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Tactical Match Simulation Suite ("The Arena") - Console & JSON Report

use match_engine::{BatchOutcome, BatchRequest, BatchSummary, MatchTrace, TeamComposition};
use serde::Serialize;

// ─── Top-Level Report ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub timestamp: u128,
    pub version: &'static str,
    pub prng: &'static str,
    pub elapsed_ms: u128,
    pub team_one: &'a [String],
    pub team_two: &'a [String],
    pub summary: &'a BatchSummary,
    pub traces: &'a [MatchTrace],
}

impl<'a> RunReport<'a> {
    pub fn new(
        request: &'a BatchRequest,
        outcome: &'a BatchOutcome,
        timestamp: u128,
        elapsed_ms: u128,
    ) -> Self {
        Self {
            timestamp,
            version: env!("CARGO_PKG_VERSION"),
            prng: "ChaCha8Rng",
            elapsed_ms,
            team_one: &request.team_one,
            team_two: &request.team_two,
            summary: &outcome.summary,
            traces: &outcome.traces,
        }
    }
}

// ─── Console Output ─────────────────────────────────────────────────────────

pub fn print_header(request: &BatchRequest, teams: &[TeamComposition; 2]) {
    println!("\n  Match Simulator v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "  Map: {} | Attacking first: {} | Matches: {}",
        request.map, request.attacking, request.matches
    );
    print!("\nTeam 1 stats:\n{}", teams[0]);
    println!("{}", "-".repeat(42));
    print!("Team 2 stats:\n{}", teams[1]);
    println!();
}

pub fn print_traces(traces: &[MatchTrace], limit: usize) {
    for trace in traces.iter().take(limit) {
        println!("  ── Worker {} / match {} ──", trace.worker, trace.match_index + 1);
        for round in &trace.rounds {
            println!("{round}\n");
        }
        println!(
            "  Final: {} wins {}-{}{}\n",
            trace.result.winner,
            trace.result.team_one_rounds,
            trace.result.team_two_rounds,
            if trace.result.overtime { " (OT)" } else { "" }
        );
    }
    if traces.len() > limit {
        println!("  ({} more match traces in the JSON report)\n", traces.len() - limit);
    }
}

pub fn print_summary(summary: &BatchSummary, elapsed_ms: u128) {
    println!(
        "  {:<8} {:>10} {:>16} {:>12} {:>12}",
        "Team", "Wins", "Win% (95% CI)", "Rounds", "Tie-breaks"
    );
    println!("  {}", "-".repeat(62));
    let rows = [
        (
            "Team 1",
            summary.team_one_wins,
            summary.team_one_win_rate,
            summary.team_one_rounds,
            summary.team_one_tie_breaks,
        ),
        (
            "Team 2",
            summary.team_two_wins,
            summary.team_two_win_rate,
            summary.team_two_rounds,
            summary.team_two_tie_breaks,
        ),
    ];
    for (label, wins, rate, rounds, ties) in rows {
        let half_width = (rate.ci_upper - rate.ci_lower) / 2.0 * 100.0;
        println!(
            "  {:<8} {:>10} {:>9.2}±{:<5.2} {:>12} {:>12}",
            label,
            wins,
            rate.rate * 100.0,
            half_width,
            rounds,
            ties
        );
    }
    println!("  {}", "-".repeat(62));
    println!(
        "  Simulated: {}/{}  Workers: {}  Seed: {}  Avg rounds: {:.2}  Time: {}ms{}\n",
        summary.simulated,
        summary.requested,
        summary.workers,
        summary.base_seed,
        summary.average_rounds(),
        elapsed_ms,
        if summary.cancelled { "  (cancelled)" } else { "" }
    );
}
