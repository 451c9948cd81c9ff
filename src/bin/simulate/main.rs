// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Tactical Match Simulation Suite ("The Arena") - Console Front End
//
// Usage:
//   cargo run --release --bin simulate -- --team-one Jett,Sova,Omen,Killjoy,KAY/O \
//       --team-two Raze,Fade,Viper,Cypher,Skye --map Ascent --matches 100000
//   cargo run --release --bin simulate -- --config arena.json --json
//   cargo run --release --bin simulate -- --config arena.json --detailed --show 3
//   RUST_LOG=match_engine=debug cargo run --bin simulate -- ...

mod report;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use clap::Parser;
use match_engine::{run_batch, SimConfig, SimError, SimMode};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use report::*;

// ─── CLI ────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "simulate")]
#[command(
    about = "Run batches of 5v5 tactical matches between two compositions",
    long_about = None
)]
struct Args {
    /// JSON run configuration; flags below override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Map name (unknown names play as a neutral map)
    #[arg(short, long)]
    map: Option<String>,

    /// Team 1 agents, comma separated
    #[arg(long, value_delimiter = ',')]
    team_one: Vec<String>,

    /// Team 2 agents, comma separated
    #[arg(long, value_delimiter = ',')]
    team_two: Vec<String>,

    /// Side attacking first (1 or 2)
    #[arg(short, long)]
    attacking: Option<u8>,

    /// Number of matches to simulate
    #[arg(short = 'n', long)]
    matches: Option<u64>,

    /// Record round-by-round traces
    #[arg(long)]
    detailed: bool,

    /// Match traces printed in detailed mode
    #[arg(long, default_value = "1")]
    show: usize,

    /// Most match traces kept in detailed mode (defaults to --show for
    /// table output without --out)
    #[arg(long)]
    keep_traces: Option<usize>,

    /// Base seed for reproducible batches
    #[arg(short, long)]
    seed: Option<u64>,

    /// Worker count override
    #[arg(short, long)]
    workers: Option<usize>,

    /// Print the report as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Also write the JSON report to this file
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Sim(#[from] SimError),

    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

impl Args {
    fn into_config(self) -> Result<(SimConfig, Output), CliError> {
        let mut config = match &self.config {
            Some(path) => SimConfig::from_json_file(path)?,
            None => SimConfig::default(),
        };
        if let Some(map) = self.map {
            config.map = map;
        }
        if !self.team_one.is_empty() {
            config.team_one = self.team_one;
        }
        if !self.team_two.is_empty() {
            config.team_two = self.team_two;
        }
        if let Some(side) = self.attacking {
            config.attacking = side;
        }
        if let Some(matches) = self.matches {
            config.matches = matches;
        }
        if self.detailed {
            config.mode = SimMode::Detailed;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.workers.is_some() {
            config.workers = self.workers;
        }
        if self.keep_traces.is_some() {
            config.trace_limit = self.keep_traces;
        } else if config.trace_limit.is_none() && !self.json && self.out.is_none() {
            config.trace_limit = Some(self.show);
        }
        let output = Output { json: self.json, out: self.out, show: self.show };
        Ok((config, output))
    }
}

struct Output {
    json: bool,
    out: Option<PathBuf>,
    show: usize,
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "simulation failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "match_engine=debug,simulate=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<(), CliError> {
    let (config, output) = args.into_config()?;
    let request = config.to_request()?;

    if !output.json {
        print_header(&request, &request.compositions()?);
    }

    let started = Instant::now();
    let outcome = run_batch(&request)?;
    let elapsed_ms = started.elapsed().as_millis();

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let report = RunReport::new(&request, &outcome, timestamp, elapsed_ms);

    if output.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_traces(&outcome.traces, output.show);
        print_summary(&outcome.summary, elapsed_ms);
    }

    if let Some(path) = &output.out {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        info!(path = %path.display(), "report written");
        if !output.json {
            println!("  Results saved to: {}\n", path.display());
        }
    }
    Ok(())
}
