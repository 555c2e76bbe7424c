// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Temporal Cascade Simulation Suite - Command Line

use std::path::PathBuf;

use clap::builder::RangedU64ValueParser;
use clap::Parser;

fn positive_rate(raw: &str) -> Result<f64, String> {
    let rate: f64 = raw.parse().map_err(|_| format!("`{}` is not a number", raw))?;
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(format!("rate must be positive, got {}", rate))
    }
}

/// Temporal cascade simulator
///
/// Spreads one-step SIR cascades over a contact graph whose nodes are only
/// reachable inside their online windows. Reproducible when `--seed` is given.
#[derive(Parser, Debug)]
#[command(name = "cascade")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Contact graph: one undirected edge `u v` per line
    #[arg(short = 'g', long)]
    pub graph: PathBuf,

    /// Connectivity windows: `id login logout`, one line per node
    #[arg(short = 'c', long)]
    pub connections: PathBuf,

    /// Node count, when the graph has trailing isolated nodes
    #[arg(short = 'n', long)]
    pub nodes: Option<usize>,

    /// Activity rate shared by every node, positive
    #[arg(
        short = 'a',
        long,
        conflicts_with = "rate_list",
        required_unless_present = "rate_list",
        value_parser = positive_rate
    )]
    pub rate: Option<f64>,

    /// Per-node activity rates: `id rate`, one line per node
    #[arg(short = 'b', long)]
    pub rate_list: Option<PathBuf>,

    /// Time bound shared by every run
    #[arg(short = 't', long, conflicts_with = "bound_list", required_unless_present = "bound_list")]
    pub max_time: Option<i64>,

    /// Per-run time bounds: `id bound`, one line per run
    #[arg(short = 'm', long)]
    pub bound_list: Option<PathBuf>,

    /// Run list: count, then `id k node,time ...` per run
    #[arg(short = 'i', long, conflicts_with = "random_runs", required_unless_present = "random_runs")]
    pub runs: Option<PathBuf>,

    /// Draw each listed run's k seeds at random instead of reading them
    #[arg(long, requires = "runs")]
    pub random_seeds: bool,

    /// Number of runs, each seeded by one random node at time zero
    #[arg(short = 'x', long, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub random_runs: Option<usize>,

    /// Repetitions of every run
    #[arg(short = 's', long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub samples: u32,

    /// Status lines: to the given file, or stderr when no path follows
    #[arg(short = 'e', long, num_args = 0..=1)]
    pub status: Option<Option<PathBuf>>,

    /// Trace output prefix; writes `<prefix>-maxtime.trace`
    #[arg(short = 'o', long)]
    pub trace_prefix: Option<String>,

    /// Infection probability per contact, in (0, 1]
    #[arg(short = 'p', long, default_value = "1.0")]
    pub probability: f64,

    /// Random seed for reproducible results. When omitted, a random seed is used.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Aggregated JSON report
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// One JSON line per finished run
    #[arg(long)]
    pub jsonl: Option<PathBuf>,
}

impl Args {
    /// Trace file path derived from the prefix.
    pub fn trace_path(&self) -> Option<PathBuf> {
        self.trace_prefix
            .as_deref()
            .filter(|prefix| !prefix.is_empty())
            .map(|prefix| PathBuf::from(format!("{}-maxtime.trace", prefix)))
    }
}
