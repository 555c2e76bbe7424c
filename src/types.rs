// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Temporal Cascade Simulation Suite - Type Definitions

use std::fmt;

use serde::{Deserialize, Serialize};

/// Node identifier, dense in `0..node_count`.
pub type NodeId = u32;

/// Discrete simulation time step. Signed so seed infection times can be
/// flagged by negation.
pub type Time = i64;

/// User-facing run identifier, carried into every trace record.
pub type RunId = u32;

/// Activity rates at or below this value are treated as zero (node never
/// self-reactivates).
pub const RATE_EPSILON: f64 = 0.00001;

// ─── Seed ────────────────────────────────────────────────────────────────────

/// An initially infected node and the time it first becomes active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seed {
    pub node: NodeId,
    pub time: Time,
}

impl Seed {
    pub fn new(node: NodeId, time: Time) -> Self {
        Self { node, time }
    }
}

// ─── Event ───────────────────────────────────────────────────────────────────

/// A node becoming active and attempting one contact at `time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub node: NodeId,
    pub time: Time,
}

// ─── Contact State ───────────────────────────────────────────────────────────

/// Reachability of a node at a given time, relative to its online window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reachability {
    /// `t < login`: the node may still come online later.
    NotYetOnline,
    /// `login <= t <= logout`.
    Online,
    /// `t > logout`: unreachable from now on.
    Down,
}

impl Reachability {
    /// Whether the contact outcome is settled for this run, i.e. the
    /// candidate can leave the sampling pool.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Online | Self::Down)
    }
}

// ─── RunSummary ──────────────────────────────────────────────────────────────

/// Counters produced by one `setup` + `simulate` cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub num_infected: u32,
    pub cascade_links: u32,
    pub max_depth: u32,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} infected, {} links, depth {}",
            self.num_infected, self.cascade_links, self.max_depth
        )
    }
}

// ─── RunReport ───────────────────────────────────────────────────────────────

/// Everything the batch runner records about a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: RunId,
    /// 1-based repetition index of this run's parameters.
    pub sample: u32,
    pub seeds: u32,
    pub num_infected: u32,
    pub node_count: u32,
    pub infected_fraction: f64,
    pub cascade_links: u32,
    pub max_depth: u32,
    pub final_time: Time,
}

impl RunReport {
    pub fn new(
        run_id: RunId,
        sample: u32,
        seeds: u32,
        node_count: u32,
        summary: RunSummary,
        final_time: Time,
    ) -> Self {
        let infected_fraction = if node_count > 0 {
            summary.num_infected as f64 / node_count as f64
        } else {
            0.0
        };
        Self {
            run_id,
            sample,
            seeds,
            num_infected: summary.num_infected,
            node_count,
            infected_fraction,
            cascade_links: summary.cascade_links,
            max_depth: summary.max_depth,
            final_time,
        }
    }
}
