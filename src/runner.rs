// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Temporal Cascade Simulation Suite - Batch Runner
//
// Turns loaded inputs into a list of runs and drives them through one
// engine, `samples` times each, with optional human-readable status lines.

use std::io::Write;
use std::sync::Arc;

use tracing::info;

use crate::engine::CascadeEngine;
use crate::error::{CascadeError, Result};
use crate::input::SeedList;
use crate::params::{random_runs, RunParameters};
use crate::rng::VariateSource;
use crate::trace::TraceSink;
use crate::types::{RunId, RunReport, Time};

// ─── Sources ─────────────────────────────────────────────────────────────────

/// Where per-node activity rates come from.
#[derive(Debug, Clone)]
pub enum RateSource {
    Global(f64),
    PerNode(Arc<[f64]>),
}

/// Where per-run time bounds come from.
#[derive(Debug, Clone)]
pub enum BoundSource {
    Global(Time),
    /// One bound per run, in run order.
    PerRun(Vec<Time>),
}

/// Where the runs themselves come from.
#[derive(Debug, Clone)]
pub enum RunSource {
    List(Vec<SeedList>),
    /// This many runs, each seeded by one random node at time zero.
    Random(usize),
}

impl RunSource {
    pub fn run_count(&self) -> usize {
        match self {
            Self::List(runs) => runs.len(),
            Self::Random(count) => *count,
        }
    }

    /// Run ids in order; random runs are numbered from zero.
    pub fn run_ids(&self) -> Vec<RunId> {
        match self {
            Self::List(runs) => runs.iter().map(|r| r.id).collect(),
            Self::Random(count) => (0..*count as RunId).collect(),
        }
    }
}

// ─── BatchConfig ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub runs: RunSource,
    pub bounds: BoundSource,
    pub rates: RateSource,
    pub infection_probability: f64,
    /// Repetitions of every run, at least one.
    pub samples: u32,
    /// PRNG seed; OS entropy when absent.
    pub seed: Option<u64>,
}

impl BatchConfig {
    /// Every node inactive, probability 1, one sample per run.
    pub fn new(runs: RunSource, bounds: BoundSource) -> Self {
        Self {
            runs,
            bounds,
            rates: RateSource::Global(0.0),
            infection_probability: 1.0,
            samples: 1,
            seed: None,
        }
    }

    pub fn with_rates(mut self, rates: RateSource) -> Self {
        self.rates = rates;
        self
    }

    pub fn with_probability(mut self, p: f64) -> Self {
        self.infection_probability = p;
        self
    }

    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Independent variate stream number `stream` for this batch. Fixed
    /// seeds give reproducible streams; otherwise each is drawn from entropy.
    pub fn variate_source(&self, stream: u64) -> VariateSource {
        match self.seed {
            Some(seed) => VariateSource::seeded(seed.wrapping_add(stream)),
            None => VariateSource::from_entropy(),
        }
    }

    /// Shared rate table for `node_count` nodes.
    pub fn rate_table(&self, node_count: usize) -> Result<Arc<[f64]>> {
        match &self.rates {
            RateSource::Global(rate) => Ok(vec![*rate; node_count].into()),
            RateSource::PerNode(rates) if rates.len() == node_count => Ok(Arc::clone(rates)),
            RateSource::PerNode(rates) => Err(CascadeError::RateCount { nodes: node_count, rates: rates.len() }),
        }
    }

    /// Resolve every source into validated run parameters. `rng` draws the
    /// seeds of random runs.
    pub fn build_runs(&self, node_count: usize, rng: &mut VariateSource) -> Result<Vec<RunParameters>> {
        let rates = self.rate_table(node_count)?;
        let run_count = self.runs.run_count();

        if let BoundSource::PerRun(bounds) = &self.bounds {
            if bounds.len() != run_count {
                return Err(CascadeError::BoundCount { runs: run_count, bounds: bounds.len() });
            }
        }
        let bound_of = |i: usize| match &self.bounds {
            BoundSource::Global(bound) => *bound,
            BoundSource::PerRun(bounds) => bounds[i],
        };

        let runs: Vec<RunParameters> = match &self.runs {
            RunSource::List(list) => list
                .iter()
                .enumerate()
                .map(|(i, entry)| {
                    RunParameters::new(entry.id, bound_of(i), 0)
                        .with_rates(Arc::clone(&rates))
                        .with_seeds(entry.seeds.iter().copied())
                })
                .collect(),
            // bounds applied per run below
            RunSource::Random(count) => random_runs(*count, node_count, 0, Arc::clone(&rates), rng)
                .into_iter()
                .enumerate()
                .map(|(i, run)| run.with_bound(bound_of(i)))
                .collect(),
        };

        runs.into_iter()
            .map(|run| -> Result<RunParameters> {
                let run = run.with_probability(self.infection_probability);
                run.validate(node_count)?;
                Ok(run)
            })
            .collect()
    }
}

// ─── Batch execution ─────────────────────────────────────────────────────────

/// Run every parameter set `samples` times on `engine`, writing status lines
/// to `status` when given. Reports come out in run order, samples numbered
/// from one.
pub fn run_batch<S: TraceSink, W: Write + ?Sized>(
    engine: &mut CascadeEngine<S>,
    runs: &[RunParameters],
    samples: u32,
    mut status: Option<&mut W>,
) -> Result<Vec<RunReport>> {
    let node_count = engine.node_count() as u32;
    let samples = samples.max(1);
    let mut reports = Vec::with_capacity(runs.len() * samples as usize);

    info!(runs = runs.len(), samples, nodes = node_count, "batch start");
    for params in runs {
        for sample in 1..=samples {
            let seeds = params.seed_count() as u32;
            if let Some(out) = status.as_deref_mut() {
                writeln!(
                    out,
                    "Run {} #{}: started with {} / {} ( {:.2}% ) infected nodes",
                    params.id,
                    sample,
                    seeds,
                    node_count,
                    percent(seeds, node_count)
                )?;
            }

            let (final_time, summary) = engine.run(params.clone())?;
            let report = RunReport::new(params.id, sample, seeds, node_count, summary, final_time);

            if let Some(out) = status.as_deref_mut() {
                writeln!(
                    out,
                    "Run {} #{}: stopped with {} depth, {} / {} ( {:.2}% ) infected nodes and {} links",
                    params.id,
                    sample,
                    summary.max_depth,
                    summary.num_infected,
                    node_count,
                    percent(summary.num_infected, node_count),
                    summary.cascade_links
                )?;
            }
            info!(run = params.id, sample, final_time, %summary, "run finished");
            reports.push(report);
        }
    }
    if let Some(out) = status.as_deref_mut() {
        out.flush()?;
    }
    Ok(reports)
}

fn percent(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}
