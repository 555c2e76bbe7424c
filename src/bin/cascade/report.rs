// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Temporal Cascade Simulation Suite - Batch Report
//
// Aggregates per-run reports for independent analysis.

use std::io::{self, Write};

use cascade_engine::RunReport;
use serde::Serialize;

// ─── Statistics (aggregated across runs and samples) ─────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub std_dev: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

/// Two-sided 95% normal quantile.
const Z_95: f64 = 1.96;

impl Stats {
    /// Single pass over the reports with Welford's running mean and
    /// sum of squared deviations. An empty batch yields all zeros.
    pub fn of(reports: &[RunReport], metric: impl Fn(&RunReport) -> f64) -> Self {
        let mut n = 0usize;
        let mut mean = 0.0;
        let mut m2 = 0.0;
        let mut range: Option<(f64, f64)> = None;
        for x in reports.iter().map(metric) {
            n += 1;
            let delta = x - mean;
            mean += delta / n as f64;
            m2 += delta * (x - mean);
            range = Some(match range {
                None => (x, x),
                Some((lo, hi)) => (lo.min(x), hi.max(x)),
            });
        }

        let (min, max) = range.unwrap_or_default();
        let std_dev = if n > 1 { (m2 / (n - 1) as f64).sqrt() } else { 0.0 };
        let half_width = if n > 0 { Z_95 * std_dev / (n as f64).sqrt() } else { 0.0 };
        Self {
            mean,
            std_dev,
            ci_lower: mean - half_width,
            ci_upper: mean + half_width,
            min,
            max,
            n,
        }
    }
}

// ─── Top-Level Report ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub generated_at_unix: u64,
    pub version: &'static str,
    pub prng: &'static str,
    pub seed: u64,
    pub node_count: usize,
    pub edge_count: usize,
    pub infection_probability: f64,
    pub samples_per_run: u32,
    pub total_runs: usize,
    pub num_infected: Stats,
    pub infected_fraction: Stats,
    pub cascade_links: Stats,
    pub max_depth: Stats,
    pub final_time: Stats,
    pub individual_runs: Vec<RunReport>,
}

/// Run-independent context recorded alongside the aggregates.
#[derive(Debug, Clone, Copy)]
pub struct BatchContext {
    pub seed: u64,
    pub node_count: usize,
    pub edge_count: usize,
    pub infection_probability: f64,
    pub samples_per_run: u32,
}

impl BatchReport {
    pub fn new(context: BatchContext, generated_at_unix: u64, reports: Vec<RunReport>) -> Self {
        Self {
            generated_at_unix,
            version: env!("CARGO_PKG_VERSION"),
            prng: "ChaCha8Rng",
            seed: context.seed,
            node_count: context.node_count,
            edge_count: context.edge_count,
            infection_probability: context.infection_probability,
            samples_per_run: context.samples_per_run,
            total_runs: reports.len(),
            num_infected: Stats::of(&reports, |r| r.num_infected as f64),
            infected_fraction: Stats::of(&reports, |r| r.infected_fraction),
            cascade_links: Stats::of(&reports, |r| r.cascade_links as f64),
            max_depth: Stats::of(&reports, |r| r.max_depth as f64),
            final_time: Stats::of(&reports, |r| r.final_time as f64),
            individual_runs: reports,
        }
    }
}

/// One JSON object per line.
pub fn write_jsonl<W: Write>(mut out: W, reports: &[RunReport]) -> io::Result<()> {
    for report in reports {
        serde_json::to_writer(&mut out, report)?;
        out.write_all(b"\n")?;
    }
    out.flush()
}
