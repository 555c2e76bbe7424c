// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Temporal Cascade Simulation Suite - Cascade Engine
//
// Event-driven spread of a one-step SIR cascade over a contact graph whose
// nodes are only reachable inside their online windows.
//
// Each popped event (u, t) lets u contact one neighbor drawn without
// replacement from its unvisited pool. A contact that lands on an online
// neighbor transmits with probability p. Newly infected nodes and the
// provider itself are rescheduled after a geometric delay, provided the
// new time is inside their window and the run's bound.

use tracing::{debug, warn};

use crate::error::{CascadeError, Result};
use crate::event_queue::EventQueue;
use crate::graph::ContactGraph;
use crate::params::RunParameters;
use crate::rng::VariateSource;
use crate::stamp::{Epoch, EpochFlags};
use crate::trace::{NullSink, TraceRecord, TraceSink};
use crate::types::{Event, NodeId, Reachability, RunSummary, Time, RATE_EPSILON};
use crate::window::ConnectivityWindows;

// ─── CascadeEngine struct ────────────────────────────────────────────────────

pub struct CascadeEngine<S: TraceSink = NullSink> {
    graph: ContactGraph,
    windows: ConnectivityWindows,
    rng: VariateSource,
    sink: S,

    // Per-node state, reused across runs
    infected: EpochFlags,
    removed: EpochFlags,
    infection_time: Vec<Time>,
    visited: Vec<usize>,
    depth: Vec<u32>,

    queue: EventQueue,
    epoch: Epoch,
    pending: Option<RunParameters>,
    summary: RunSummary,
}

impl CascadeEngine<NullSink> {
    /// Engine that keeps no trace.
    pub fn new(graph: ContactGraph, windows: ConnectivityWindows, rng: VariateSource) -> Result<Self> {
        Self::with_sink(graph, windows, rng, NullSink)
    }
}

impl<S: TraceSink> CascadeEngine<S> {
    pub fn with_sink(
        graph: ContactGraph,
        windows: ConnectivityWindows,
        rng: VariateSource,
        sink: S,
    ) -> Result<Self> {
        let n = graph.node_count();
        if windows.len() != n {
            return Err(CascadeError::WindowCount { graph: n, windows: windows.len() });
        }
        Ok(Self {
            graph,
            windows,
            rng,
            sink,
            infected: EpochFlags::new(n),
            removed: EpochFlags::new(n),
            infection_time: vec![0; n],
            visited: vec![0; n],
            depth: vec![0; n],
            queue: EventQueue::new(),
            epoch: 0,
            pending: None,
            summary: RunSummary::default(),
        })
    }

    /// Install the next run. Must precede every `simulate`. A rejected run
    /// also discards any run installed earlier and not yet simulated.
    pub fn setup(&mut self, params: RunParameters) -> Result<()> {
        self.pending = None;
        params.validate(self.graph.node_count())?;
        self.epoch += 1;
        self.summary = RunSummary {
            num_infected: params.seed_count() as u32,
            cascade_links: 0,
            max_depth: 0,
        };
        self.pending = Some(params);
        Ok(())
    }

    /// Drain the event queue for the installed run and return the time of
    /// the last processed event.
    pub fn simulate(&mut self) -> Result<Time> {
        let params = self.pending.take().ok_or(CascadeError::NotConfigured)?;
        let epoch = self.epoch;

        self.visited.fill(0);
        self.depth.fill(0);
        self.queue.clear();

        for seed in &params.seeds {
            let v = seed.node as usize;
            if self.graph.degree(seed.node) == 0 {
                warn!(run = params.id, node = seed.node, "seed node has no neighbors");
            }
            self.infected.mark(v, epoch);
            self.depth[v] = 1;
            // negative marks a seed infection
            self.infection_time[v] = -seed.time;
            self.queue.push(seed.node, seed.time);
            debug!(node = seed.node, time = seed.time, "push seed");
        }
        self.summary.max_depth = 1;

        let mut last = 0;
        while let Some(Event { node: u, time: t }) = self.queue.pop() {
            last = t;
            self.removed.mark(u as usize, epoch);
            debug!(node = u, time = t, "pop");

            if self.visited[u as usize] < self.graph.degree(u) {
                self.contact(u, t, &params)?;
            }
            self.reschedule(u, t, &params);
        }

        self.sink.flush()?;
        debug!(run = params.id, final_time = last, summary = %self.summary, "run drained");
        Ok(last)
    }

    /// `setup` followed by `simulate`.
    pub fn run(&mut self, params: RunParameters) -> Result<(Time, RunSummary)> {
        self.setup(params)?;
        let last = self.simulate()?;
        Ok((last, self.summary))
    }

    // ─── Event handling ──────────────────────────────────────────────────────

    /// One contact attempt by `u` at time `t`. Requires a non-empty pool.
    fn contact(&mut self, u: NodeId, t: Time, params: &RunParameters) -> std::io::Result<()> {
        let epoch = self.epoch;
        let visited = self.visited[u as usize];
        let pool = self.graph.unvisited(u, visited);
        let slot = self.rng.uniform_int(pool.len());
        let v = pool[slot];

        let reach = self.windows.reachability(v, t);
        if reach.is_resolved() {
            self.graph.retire(u, slot, visited);
            self.visited[u as usize] += 1;
        }
        debug!(provider = u, contact = v, time = t, ?reach, "contact");

        if reach != Reachability::Online || self.rng.uniform01() > params.infection_probability {
            return Ok(());
        }

        let vi = v as usize;
        let provider_depth = self.depth[u as usize];
        if !self.infected.is_marked(vi, epoch) {
            self.summary.cascade_links += 1;
            self.summary.num_infected += 1;
            self.infected.mark(vi, epoch);
            self.infection_time[vi] = t;
            self.depth[vi] = provider_depth + 1;
            self.summary.max_depth = self.summary.max_depth.max(self.depth[vi]);

            let rate = params.activity_rates[vi];
            if rate > RATE_EPSILON {
                let dt = self.rng.geometric_from_rate(rate);
                self.schedule(v, t, dt, params.bound);
            }
            self.sink.emit(TraceRecord { time: t, provider: u, contact: v, run: params.id })?;
        } else if !self.removed.is_marked(vi, epoch) && self.infection_time[vi] == t && self.depth[vi] > 1 {
            // simultaneous infection along another path; seeds (depth 1)
            // activated at time zero also carry time zero and are excluded
            self.summary.cascade_links += 1;
            self.depth[vi] = self.depth[vi].max(provider_depth + 1);
            self.summary.max_depth = self.summary.max_depth.max(self.depth[vi]);
            self.sink.emit(TraceRecord { time: t, provider: u, contact: v, run: params.id })?;
        }
        Ok(())
    }

    /// Keep `u` active while it still has neighbors to contact. The rate is
    /// scaled by `degree / remaining` so the per-neighbor contact rate stays
    /// constant as the pool shrinks.
    fn reschedule(&mut self, u: NodeId, t: Time, params: &RunParameters) {
        let rate = params.activity_rates[u as usize];
        let degree = self.graph.degree(u);
        let visited = self.visited[u as usize];
        if rate <= RATE_EPSILON || degree <= visited {
            return;
        }
        let scaled = rate * degree as f64 / (degree - visited) as f64;
        let dt = self.rng.geometric_from_rate(scaled);
        self.schedule(u, t, dt, params.bound);
    }

    fn schedule(&mut self, v: NodeId, t: Time, dt: i64, bound: Time) {
        let at = t.saturating_add(dt);
        if at <= bound && self.windows.is_online(v, at) {
            self.queue.push(v, at);
            debug!(node = v, time = at, "push");
        } else {
            debug!(node = v, time = at, "push dropped");
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────────

    /// Counters of the last installed run.
    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_infected(&self, v: NodeId) -> bool {
        self.infected.is_marked(v as usize, self.epoch)
    }

    pub fn is_removed(&self, v: NodeId) -> bool {
        self.removed.is_marked(v as usize, self.epoch)
    }

    /// Cascade depth of `v` in the current run, if it was infected.
    pub fn depth(&self, v: NodeId) -> Option<u32> {
        self.is_infected(v).then(|| self.depth[v as usize])
    }

    /// Infection time of `v` in the current run; negated for seeds.
    pub fn infection_time(&self, v: NodeId) -> Option<Time> {
        self.is_infected(v).then(|| self.infection_time[v as usize])
    }

    /// How many of `u`'s neighbors have left its sampling pool this run.
    pub fn visited_count(&self, u: NodeId) -> usize {
        self.visited[u as usize]
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair_engine(windows: &[(Time, Time)]) -> CascadeEngine<Vec<TraceRecord>> {
        let graph = ContactGraph::from_edges(None, &[(0, 1)]).unwrap();
        let windows = ConnectivityWindows::from_pairs(windows).unwrap();
        CascadeEngine::with_sink(graph, windows, VariateSource::seeded(1), Vec::new()).unwrap()
    }

    #[test]
    fn test_simulate_requires_setup() {
        let mut engine = pair_engine(&[(0, 100), (0, 100)]);
        assert!(matches!(engine.simulate(), Err(CascadeError::NotConfigured)));

        engine.setup(RunParameters::new(0, 100, 2).with_seed(0, 0)).unwrap();
        engine.simulate().unwrap();
        // setup is consumed by simulate
        assert!(matches!(engine.simulate(), Err(CascadeError::NotConfigured)));
    }

    #[test]
    fn test_window_count_must_match_graph() {
        let graph = ContactGraph::from_edges(None, &[(0, 1)]).unwrap();
        let windows = ConnectivityWindows::always_online(3);
        assert!(matches!(
            CascadeEngine::new(graph, windows, VariateSource::seeded(0)),
            Err(CascadeError::WindowCount { graph: 2, windows: 3 })
        ));
    }

    #[test]
    fn test_setup_rejects_invalid_params() {
        let mut engine = pair_engine(&[(0, 100), (0, 100)]);
        let err = engine.setup(RunParameters::new(0, 100, 2)).unwrap_err();
        assert!(matches!(err, CascadeError::Params(_)));
        assert!(matches!(engine.simulate(), Err(CascadeError::NotConfigured)));
    }

    #[test]
    fn test_rejected_setup_discards_earlier_pending_run() {
        let mut engine = pair_engine(&[(0, 100), (0, 100)]);
        engine.setup(RunParameters::new(1, 100, 2).with_seed(0, 0)).unwrap();
        let err = engine
            .setup(RunParameters::new(2, 100, 2).with_seed(0, 0).with_probability(0.0))
            .unwrap_err();
        assert!(matches!(err, CascadeError::Params(_)));

        assert!(matches!(engine.simulate(), Err(CascadeError::NotConfigured)));
        assert!(engine.sink().is_empty(), "run 1 must not execute after run 2 was rejected");
    }

    #[test]
    fn test_isolated_seed_does_nothing() {
        let graph = ContactGraph::from_edges(Some(3), &[(0, 1)]).unwrap();
        let windows = ConnectivityWindows::always_online(3);
        let mut engine =
            CascadeEngine::with_sink(graph, windows, VariateSource::seeded(0), Vec::<TraceRecord>::new()).unwrap();
        let params = RunParameters::new(0, 50, 3).with_uniform_rate(2.0).with_seed(2, 4);
        let (last, summary) = engine.run(params).unwrap();
        assert_eq!(last, 4);
        assert_eq!(summary, RunSummary { num_infected: 1, cascade_links: 0, max_depth: 1 });
        assert!(engine.sink().is_empty());
        assert_eq!(engine.infection_time(2), Some(-4));
    }

    #[test]
    fn test_down_neighbor_is_retired_without_infection() {
        let mut engine = pair_engine(&[(0, 100), (0, 5)]);
        let params = RunParameters::new(0, 100, 2).with_seed(0, 10);
        let (_, summary) = engine.run(params).unwrap();
        assert_eq!(summary.num_infected, 1);
        assert_eq!(engine.visited_count(0), 1);
        assert!(!engine.is_infected(1));
    }

    fn mean_reschedule_delay(
        engine: &mut CascadeEngine<Vec<TraceRecord>>,
        params: &RunParameters,
        visited: usize,
        draws: usize,
    ) -> f64 {
        engine.visited[0] = visited;
        let mut total = 0;
        for _ in 0..draws {
            engine.reschedule(0, 0, params);
            total += engine.queue.pop().map(|e| e.time).unwrap();
        }
        total as f64 / draws as f64
    }

    #[test]
    fn test_reschedule_rate_grows_as_pool_shrinks() {
        let graph = ContactGraph::from_edges(None, &[(0, 1), (0, 2), (0, 3), (0, 4)]).unwrap();
        let mut engine =
            CascadeEngine::with_sink(graph, ConnectivityWindows::always_online(5), VariateSource::seeded(21), Vec::new())
                .unwrap();
        let params = RunParameters::new(0, Time::MAX, 5).with_uniform_rate(2.0).with_seed(0, 0);

        // effective parameter 2 * 4 / (4 - visited); E[floor(Exp(m))] = 1 / (e^(1/m) - 1)
        for (visited, expected) in [(0, 1.5415), (2, 3.5208), (3, 7.5104)] {
            let observed = mean_reschedule_delay(&mut engine, &params, visited, 20_000);
            assert!(
                (observed - expected).abs() < 0.05 * expected,
                "visited {}: mean delay {} vs {}",
                visited,
                observed,
                expected
            );
        }

        // nothing left to contact
        engine.visited[0] = 4;
        engine.reschedule(0, 0, &params);
        assert!(engine.queue.is_empty());
    }

    #[test]
    fn test_state_does_not_leak_between_runs() {
        let mut engine = pair_engine(&[(0, 100), (0, 100)]);
        engine.run(RunParameters::new(0, 100, 2).with_seed(0, 0)).unwrap();
        assert!(engine.is_infected(1));

        engine.run(RunParameters::new(0, 100, 2).with_seed(1, 3)).unwrap();
        assert!(engine.is_infected(0));
        assert_eq!(engine.depth(1), Some(1));
        assert_eq!(engine.depth(0), Some(2));
        assert_eq!(engine.infection_time(0), Some(3));
        assert_eq!(engine.sink().len(), 2);
    }
}
