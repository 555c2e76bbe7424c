// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Temporal Cascade Simulation Suite
//
// Discrete-event simulation of a one-step SIR cascade over a static contact
// graph where every node is reachable only inside its online window.

pub mod types;
pub mod error;
pub mod rng;
pub mod window;
pub mod graph;
pub mod stamp;
pub mod event_queue;
pub mod params;
pub mod trace;
pub mod engine;

// Loading and batch execution
pub mod input;
pub mod runner;

pub use types::*;
pub use engine::CascadeEngine;
pub use error::{CascadeError, Result};
pub use graph::ContactGraph;
pub use params::RunParameters;
pub use rng::VariateSource;
pub use runner::{run_batch, BatchConfig, BoundSource, RateSource, RunSource};
pub use trace::{NullSink, TraceRecord, TraceSink, TraceWriter};
pub use window::{ConnectivityWindows, OnlineWindow};
