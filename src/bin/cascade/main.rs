// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Temporal Cascade Simulation Suite - Command Line Runner
//
// Usage:
//   cascade -g graph.txt -c windows.txt -t 1000 -x 50             # 50 random single-seed runs
//   cascade -g graph.txt -c windows.txt -m bounds.txt -i runs.txt  # listed runs, per-run bounds
//   cascade ... -b rates.txt -p 0.3 -s 10 --seed 42                # per-node rates, 10 samples each
//   cascade ... -e -o out/run --report report.json                 # status on stderr, trace file, JSON report

mod cli;
mod report;

use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use cascade_engine::error::InputError;
use cascade_engine::input;
use cascade_engine::{
    run_batch, BatchConfig, BoundSource, CascadeEngine, RateSource, RunSource, TraceWriter, VariateSource,
};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::Args;
use report::{write_jsonl, BatchContext, BatchReport};

fn open(path: &Path, source_name: &'static str) -> Result<BufReader<File>, InputError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| InputError::Io { source_name, source })
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,cascade_engine=info,cascade=info")),
        )
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "simulation failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let seed = args.seed.unwrap_or_else(rand::random);

    // ─── Inputs ─────────────────────────────────────────────────────────

    let graph = input::read_graph(open(&args.graph, "graph")?, args.nodes)?;
    let n = graph.node_count();
    info!(nodes = n, edges = graph.edge_count(), "loaded graph");

    let windows = input::read_windows(open(&args.connections, "windows")?, n)?;
    info!(windows = windows.len(), "loaded connectivity windows");

    // Stream 0 draws seeds, stream 1 drives the engine.
    let mut setup_rng = VariateSource::seeded(seed);
    let runs = match &args.runs {
        Some(path) => {
            let random = args.random_seeds.then_some((n, &mut setup_rng));
            RunSource::List(input::read_run_list(open(path, "run list")?, random)?)
        }
        None => RunSource::Random(args.random_runs.unwrap_or_default()),
    };

    let bounds = match &args.bound_list {
        Some(path) => BoundSource::PerRun(input::read_bounds(open(path, "bounds")?, &runs.run_ids())?),
        None => BoundSource::Global(args.max_time.unwrap_or_default()),
    };

    let rates = match &args.rate_list {
        Some(path) => RateSource::PerNode(input::read_rates(open(path, "rates")?, n)?.into()),
        None => RateSource::Global(args.rate.unwrap_or_default()),
    };

    let config = BatchConfig::new(runs, bounds)
        .with_rates(rates)
        .with_probability(args.probability)
        .with_samples(args.samples)
        .with_seed(seed);
    let params = config.build_runs(n, &mut setup_rng)?;

    info!(
        runs = params.len(),
        samples = config.samples,
        p = config.infection_probability,
        seed,
        "starting batch"
    );

    // ─── Outputs ────────────────────────────────────────────────────────

    let trace_path = args.trace_path();
    let trace = match &trace_path {
        Some(path) => Some(TraceWriter::new(File::create(path)?)),
        None => None,
    };

    let mut status: Option<Box<dyn Write>> = match &args.status {
        None => None,
        Some(None) => Some(Box::new(io::stderr())),
        Some(Some(path)) => Some(Box::new(BufWriter::new(File::create(path)?))),
    };

    let edge_count = graph.edge_count();
    let mut engine = CascadeEngine::with_sink(graph, windows, config.variate_source(1), trace)?;
    let reports = run_batch(&mut engine, &params, config.samples, status.as_deref_mut())?;

    if let (Some(path), Some(writer)) = (&trace_path, engine.sink()) {
        info!(path = %path.display(), lines = writer.lines_written(), "wrote trace");
    }

    // ─── Summary ────────────────────────────────────────────────────────

    let generated_at_unix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let context = BatchContext {
        seed,
        node_count: n,
        edge_count,
        infection_probability: config.infection_probability,
        samples_per_run: config.samples,
    };

    if let Some(path) = &args.jsonl {
        write_jsonl(BufWriter::new(File::create(path)?), &reports)?;
        info!(path = %path.display(), "wrote run reports");
    }

    let batch = BatchReport::new(context, generated_at_unix, reports);
    println!("  Runs: {} | Samples/run: {} | Seed: {}", batch.total_runs, batch.samples_per_run, seed);
    println!("  {:<16} {:>10} {:>10} {:>10} {:>10}", "Metric", "Mean", "StdDev", "Min", "Max");
    println!("  {}", "-".repeat(60));
    for (label, stats) in [
        ("infected", &batch.num_infected),
        ("fraction", &batch.infected_fraction),
        ("links", &batch.cascade_links),
        ("depth", &batch.max_depth),
        ("final time", &batch.final_time),
    ] {
        println!(
            "  {:<16} {:>10.3} {:>10.3} {:>10.3} {:>10.3}",
            label, stats.mean, stats.std_dev, stats.min, stats.max
        );
    }

    if let Some(path) = &args.report {
        let mut out = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut out, &batch)?;
        out.flush()?;
        info!(path = %path.display(), "wrote batch report");
    }

    Ok(())
}
