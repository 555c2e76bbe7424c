// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Temporal Cascade Simulation Suite - Errors

use crate::types::{NodeId, RunId, Time};

// ---------------------------------------------------------------------------
// Load-time errors
// ---------------------------------------------------------------------------

/// Errors from connectivity window data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WindowError {
    #[error("window for node {node} starts before time zero (login {login})")]
    NegativeLogin { node: NodeId, login: Time },
    #[error("window for node {node} is inverted: login {login} > logout {logout}")]
    Inverted { node: NodeId, login: Time, logout: Time },
}

/// Errors from contact graph construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("graph has no nodes")]
    Empty,
    #[error("edge ({from}, {to}) references a node outside 0..{node_count}")]
    NodeOutOfRange { from: NodeId, to: NodeId, node_count: usize },
}

/// Errors from run parameter validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamsError {
    #[error("run {run}: infection probability {p} outside (0, 1]")]
    Probability { run: RunId, p: f64 },
    #[error("run {run}: time bound must be positive, got {bound}")]
    Bound { run: RunId, bound: Time },
    #[error("run {run}: activity table has {actual} entries for {expected} nodes")]
    RateTableSize { run: RunId, expected: usize, actual: usize },
    #[error("run {run}: activity rate {rate} for node {node} is not a finite non-negative number")]
    Rate { run: RunId, node: NodeId, rate: f64 },
    #[error("run {run}: no seed nodes")]
    NoSeeds { run: RunId },
    #[error("run {run}: seed node {node} outside 0..{node_count}")]
    SeedOutOfRange { run: RunId, node: NodeId, node_count: usize },
    #[error("run {run}: seed node {node} listed twice")]
    DuplicateSeed { run: RunId, node: NodeId },
    #[error("run {run}: seed node {node} activation time {time} outside 0..={bound}")]
    SeedTime { run: RunId, node: NodeId, time: Time, bound: Time },
}

/// Line-oriented parse errors from the text input formats.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("{source_name}:{line}: {reason}")]
    Malformed { source_name: &'static str, line: usize, reason: String },
    #[error("{source_name}: unexpected end of input after line {line}")]
    Truncated { source_name: &'static str, line: usize },
    #[error("{source_name}: read failed: {source}")]
    Io {
        source_name: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl InputError {
    pub(crate) fn malformed(source_name: &'static str, line: usize, reason: impl Into<String>) -> Self {
        Self::Malformed { source_name, line, reason: reason.into() }
    }
}

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CascadeError {
    #[error(transparent)]
    Window(#[from] WindowError),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Params(#[from] ParamsError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("graph has {graph} nodes but {windows} connectivity windows were supplied")]
    WindowCount { graph: usize, windows: usize },
    #[error("{bounds} bounds supplied for {runs} runs")]
    BoundCount { runs: usize, bounds: usize },
    #[error("{rates} activity rates supplied for {nodes} nodes")]
    RateCount { nodes: usize, rates: usize },
    #[error("simulate called without a preceding setup")]
    NotConfigured,
    #[error("trace output failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = CascadeError> = std::result::Result<T, E>;
