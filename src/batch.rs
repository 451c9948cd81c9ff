// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Tactical Match Simulation Suite ("The Arena") - Batch Orchestrator

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::SimError;
use crate::match_sim::MatchSimulator;
use crate::roster::{AgentRegistry, Map};
use crate::team::TeamComposition;
use crate::types::*;

/// Share of available hardware threads given to a batch by default.
pub const DEFAULT_WORKER_FRACTION: f64 = 0.8;

// ─── Aggregate Statistics ───────────────────────────────────────────────────

/// Lock-free counters shared by every worker of a batch.
///
/// Only totals read after all workers have returned are meaningful.
#[derive(Debug, Default)]
pub struct AggregateStatistics {
    matches: AtomicU64,
    team_one_wins: AtomicU64,
    team_two_wins: AtomicU64,
    team_one_rounds: AtomicU64,
    team_two_rounds: AtomicU64,
    team_one_tie_breaks: AtomicU64,
    team_two_tie_breaks: AtomicU64,
}

impl AggregateStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a worker's local tally.
    pub fn record(&self, tally: &MatchTally) {
        self.matches.fetch_add(tally.matches, Ordering::Relaxed);
        self.team_one_wins.fetch_add(tally.team_one_wins, Ordering::Relaxed);
        self.team_two_wins.fetch_add(tally.team_two_wins, Ordering::Relaxed);
        self.team_one_rounds.fetch_add(tally.team_one_rounds, Ordering::Relaxed);
        self.team_two_rounds.fetch_add(tally.team_two_rounds, Ordering::Relaxed);
        self.team_one_tie_breaks.fetch_add(tally.team_one_tie_breaks, Ordering::Relaxed);
        self.team_two_tie_breaks.fetch_add(tally.team_two_tie_breaks, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MatchTally {
        MatchTally {
            matches: self.matches.load(Ordering::Relaxed),
            team_one_wins: self.team_one_wins.load(Ordering::Relaxed),
            team_two_wins: self.team_two_wins.load(Ordering::Relaxed),
            team_one_rounds: self.team_one_rounds.load(Ordering::Relaxed),
            team_two_rounds: self.team_two_rounds.load(Ordering::Relaxed),
            team_one_tie_breaks: self.team_one_tie_breaks.load(Ordering::Relaxed),
            team_two_tie_breaks: self.team_two_tie_breaks.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.matches,
            &self.team_one_wins,
            &self.team_two_wins,
            &self.team_one_rounds,
            &self.team_two_rounds,
            &self.team_one_tie_breaks,
            &self.team_two_tie_breaks,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

// ─── Partitioning ───────────────────────────────────────────────────────────

/// `max(1, floor(parallelism × fraction))`.
pub fn default_worker_count(fraction: f64) -> usize {
    let parallelism = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
    ((parallelism as f64 * fraction).floor() as usize).max(1)
}

/// Worker count for a batch: the override (or the hardware default), never
/// zero and never more than the number of matches.
pub fn worker_count(matches: u64, requested: Option<usize>, fraction: f64) -> usize {
    let workers = requested.unwrap_or_else(|| default_worker_count(fraction)).max(1);
    let cap = usize::try_from(matches).unwrap_or(usize::MAX).max(1);
    workers.min(cap)
}

/// Even split of `total` over `workers`; the first `total % workers` shares
/// get one extra match.
pub fn partition(total: u64, workers: usize) -> Vec<u64> {
    let workers = workers.max(1);
    let base = total / workers as u64;
    let remainder = (total % workers as u64) as usize;
    (0..workers)
        .map(|w| base + u64::from(w < remainder))
        .collect()
}

/// Per-worker seed derived from the batch seed.
pub fn worker_seed(base_seed: u64, worker: usize) -> u64 {
    base_seed
        .wrapping_mul(0x9e3779b97f4a7c15)
        .wrapping_add((worker as u64).wrapping_mul(0x517cc1b727220a95))
}

// ─── Request / Outcome ──────────────────────────────────────────────────────

/// Everything a batch needs. Teams travel as name lists so each worker can
/// build its own compositions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    pub team_one: Vec<String>,
    pub team_two: Vec<String>,
    pub map: Map,
    pub attacking: Team,
    pub matches: u64,
    pub mode: SimMode,
    pub seed: Option<u64>,
    pub workers: Option<usize>,
    pub worker_fraction: f64,
    /// Most match traces kept in detailed mode; `None` keeps all of them.
    #[serde(default)]
    pub trace_limit: Option<usize>,
}

impl BatchRequest {
    pub fn new<S: AsRef<str>>(team_one: &[S], team_two: &[S], matches: u64) -> Self {
        Self {
            team_one: team_one.iter().map(|s| s.as_ref().to_string()).collect(),
            team_two: team_two.iter().map(|s| s.as_ref().to_string()).collect(),
            map: Map::None,
            attacking: Team::One,
            matches,
            mode: SimMode::Fast,
            seed: None,
            workers: None,
            worker_fraction: DEFAULT_WORKER_FRACTION,
            trace_limit: None,
        }
    }

    pub fn with_map(mut self, map: Map) -> Self {
        self.map = map;
        self
    }

    pub fn with_attacking(mut self, side: Team) -> Self {
        self.attacking = side;
        self
    }

    pub fn with_mode(mut self, mode: SimMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_trace_limit(mut self, limit: usize) -> Self {
        self.trace_limit = Some(limit);
        self
    }

    /// Builds both compositions balanced for the request's map.
    pub fn compositions(&self) -> Result<[TeamComposition; 2], SimError> {
        let registry = AgentRegistry::for_map(self.map);
        Ok([
            build_team(&registry, &self.team_one, Team::One)?,
            build_team(&registry, &self.team_two, Team::Two)?,
        ])
    }
}

fn build_team(
    registry: &AgentRegistry,
    names: &[String],
    slot: Team,
) -> Result<TeamComposition, SimError> {
    let team = TeamComposition::from_names(registry, names)?;
    if !team.is_complete() {
        return Err(SimError::TeamIncomplete { team: slot, count: team.len() });
    }
    Ok(team)
}

/// Win rate with a 95% normal-approximation interval.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WinRate {
    pub rate: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
}

impl WinRate {
    pub fn from_counts(wins: u64, matches: u64) -> Self {
        if matches == 0 {
            return Self { rate: 0.0, ci_lower: 0.0, ci_upper: 0.0 };
        }
        let n = matches as f64;
        let rate = wins as f64 / n;
        let z = 1.96; // 95% CI
        let half_width = z * (rate * (1.0 - rate) / n).sqrt();
        Self {
            rate,
            ci_lower: (rate - half_width).max(0.0),
            ci_upper: (rate + half_width).min(1.0),
        }
    }

    pub fn contains(&self, rate: f64) -> bool {
        (self.ci_lower..=self.ci_upper).contains(&rate)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub map: Map,
    pub attacking: Team,
    pub mode: SimMode,
    pub requested: u64,
    pub simulated: u64,
    pub workers: usize,
    pub base_seed: u64,
    pub cancelled: bool,
    pub team_one_wins: u64,
    pub team_two_wins: u64,
    pub team_one_rounds: u64,
    pub team_two_rounds: u64,
    pub team_one_tie_breaks: u64,
    pub team_two_tie_breaks: u64,
    pub team_one_win_rate: WinRate,
    pub team_two_win_rate: WinRate,
}

impl BatchSummary {
    fn new(
        request: &BatchRequest,
        workers: usize,
        base_seed: u64,
        tally: &MatchTally,
        cancelled: bool,
    ) -> Self {
        Self {
            map: request.map,
            attacking: request.attacking,
            mode: request.mode,
            requested: request.matches,
            simulated: tally.matches,
            workers,
            base_seed,
            cancelled,
            team_one_wins: tally.team_one_wins,
            team_two_wins: tally.team_two_wins,
            team_one_rounds: tally.team_one_rounds,
            team_two_rounds: tally.team_two_rounds,
            team_one_tie_breaks: tally.team_one_tie_breaks,
            team_two_tie_breaks: tally.team_two_tie_breaks,
            team_one_win_rate: WinRate::from_counts(tally.team_one_wins, tally.matches),
            team_two_win_rate: WinRate::from_counts(tally.team_two_wins, tally.matches),
        }
    }

    pub fn average_rounds(&self) -> f64 {
        if self.simulated == 0 {
            return 0.0;
        }
        (self.team_one_rounds + self.team_two_rounds) as f64 / self.simulated as f64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub summary: BatchSummary,
    /// Populated in detailed mode only, ordered by worker then match.
    pub traces: Vec<MatchTrace>,
}

// ─── Orchestration ──────────────────────────────────────────────────────────

/// Runs a batch against a fresh set of counters.
pub fn run_batch(request: &BatchRequest) -> Result<BatchOutcome, SimError> {
    run_batch_with(request, &AggregateStatistics::new(), None)
}

/// Runs a batch, publishing every worker's counts into `stats`.
///
/// Team input is validated on the calling thread before any worker starts.
/// Blocks until all workers return; a failed worker fails the whole batch.
pub fn run_batch_with(
    request: &BatchRequest,
    stats: &AggregateStatistics,
    cancel: Option<&AtomicBool>,
) -> Result<BatchOutcome, SimError> {
    if request.matches == 0 {
        return Err(SimError::InvalidMatchCount);
    }
    request.compositions()?;

    let workers = worker_count(request.matches, request.workers, request.worker_fraction);
    let base_seed = request.seed.unwrap_or_else(rand::random);
    let shares = partition(request.matches, workers);
    info!(
        matches = request.matches,
        workers,
        base_seed,
        map = %request.map,
        attacking = %request.attacking,
        "starting batch"
    );

    let reports = dispatch(&shares, |worker, share| {
        run_worker(request, stats, cancel, base_seed, worker, share)
    })?;

    let mut tally = MatchTally::default();
    let mut traces = Vec::new();
    let mut cancelled = false;
    for report in reports {
        tally.merge(&report.tally);
        traces.extend(report.traces);
        cancelled |= report.cancelled;
    }
    if let Some(limit) = request.trace_limit {
        traces.truncate(limit);
    }

    let summary = BatchSummary::new(request, workers, base_seed, &tally, cancelled);
    info!(
        simulated = summary.simulated,
        team_one_wins = summary.team_one_wins,
        team_two_wins = summary.team_two_wins,
        cancelled,
        "batch complete"
    );
    Ok(BatchOutcome { summary, traces })
}

#[derive(Debug, Default)]
struct WorkerReport {
    tally: MatchTally,
    traces: Vec<MatchTrace>,
    cancelled: bool,
}

fn run_worker(
    request: &BatchRequest,
    stats: &AggregateStatistics,
    cancel: Option<&AtomicBool>,
    base_seed: u64,
    worker: usize,
    share: u64,
) -> Result<WorkerReport, SimError> {
    let [team_one, team_two] = request.compositions()?;
    let rng = ChaCha8Rng::seed_from_u64(worker_seed(base_seed, worker));
    let mut sim = MatchSimulator::new(team_one, team_two, request.map, rng)?
        .with_starting_side(request.attacking);

    let mut report = WorkerReport::default();
    for match_index in 0..share {
        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            report.cancelled = true;
            break;
        }
        match request.mode {
            SimMode::Fast => {
                sim.play_match();
            }
            SimMode::Detailed if request.trace_limit.is_some_and(|n| report.traces.len() >= n) => {
                sim.play_match();
            }
            SimMode::Detailed => {
                let (result, rounds) = sim.play_match_traced();
                report.traces.push(MatchTrace { worker, match_index, result, rounds });
            }
        }
    }

    report.tally = *sim.tally();
    stats.record(&report.tally);
    debug!(worker, share, played = report.tally.matches, "worker finished");
    Ok(report)
}

/// Runs one job per share and joins them all. Panics are caught per worker;
/// the first failure by worker index is returned once every worker is done.
fn dispatch<F>(shares: &[u64], job: F) -> Result<Vec<WorkerReport>, SimError>
where
    F: Fn(usize, u64) -> Result<WorkerReport, SimError> + Sync,
{
    let guarded = |worker: usize| {
        let share = shares[worker];
        panic::catch_unwind(AssertUnwindSafe(|| job(worker, share))).unwrap_or_else(|payload| {
            Err(SimError::WorkerFailed { worker, reason: panic_message(payload.as_ref()) })
        })
    };

    let results = execute(shares.len(), guarded)?;

    let mut reports = Vec::with_capacity(results.len());
    let mut first_error = None;
    for (worker, result) in results.into_iter().enumerate() {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                error!(worker, error = %e, "worker failed");
                first_error.get_or_insert(e);
            }
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(reports),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn execute<T, F>(workers: usize, job: F) -> Result<Vec<T>, SimError>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    use rayon::prelude::*;

    if workers <= 1 {
        return Ok((0..workers).map(job).collect());
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("match-worker-{i}"))
        .build()
        .map_err(|e| SimError::ThreadPool(e.to_string()))?;
    Ok(pool.install(|| (0..workers).into_par_iter().map(job).collect()))
}

#[cfg(target_arch = "wasm32")]
fn execute<T, F>(workers: usize, job: F) -> Result<Vec<T>, SimError>
where
    F: Fn(usize) -> T,
{
    Ok((0..workers).map(job).collect())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
