// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Temporal Cascade Simulation Suite - Run Parameters
//
// The initial condition of one run: who is infected at the start and when,
// how likely a contact is to transmit, how long the run may last, and how
// active every node is.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::ParamsError;
use crate::rng::VariateSource;
use crate::types::{NodeId, RunId, Seed, Time};

#[derive(Debug, Clone)]
pub struct RunParameters {
    pub id: RunId,
    /// Last time step at which an event may be scheduled.
    pub bound: Time,
    /// Probability that a contact with an online neighbor transmits.
    pub infection_probability: f64,
    /// Per-node activity rate, shared between runs.
    pub activity_rates: Arc<[f64]>,
    pub seeds: Vec<Seed>,
}

impl RunParameters {
    /// A run with no seeds yet, probability 1 and every node inactive.
    pub fn new(id: RunId, bound: Time, node_count: usize) -> Self {
        Self {
            id,
            bound,
            infection_probability: 1.0,
            activity_rates: vec![0.0; node_count].into(),
            seeds: Vec::new(),
        }
    }

    pub fn with_probability(mut self, p: f64) -> Self {
        self.infection_probability = p;
        self
    }

    pub fn with_bound(mut self, bound: Time) -> Self {
        self.bound = bound;
        self
    }

    /// Share an existing activity table.
    pub fn with_rates(mut self, rates: Arc<[f64]>) -> Self {
        self.activity_rates = rates;
        self
    }

    /// Same activity rate for every node.
    pub fn with_uniform_rate(mut self, rate: f64) -> Self {
        let n = self.activity_rates.len();
        self.activity_rates = vec![rate; n].into();
        self
    }

    pub fn with_seed(mut self, node: NodeId, time: Time) -> Self {
        self.seeds.push(Seed::new(node, time));
        self
    }

    pub fn with_seeds(mut self, seeds: impl IntoIterator<Item = Seed>) -> Self {
        self.seeds.extend(seeds);
        self
    }

    /// Replace the seeds with `count` distinct nodes drawn uniformly from
    /// `0..node_count`, all active at time zero.
    ///
    /// When more than half the nodes are requested, the complement is drawn
    /// instead so the rejection loop stays short. Seeds come out in id order.
    pub fn with_random_seeds(mut self, count: usize, node_count: usize, rng: &mut VariateSource) -> Self {
        let count = count.min(node_count);
        let pick_complement = count > node_count / 2;
        let draws = if pick_complement { node_count - count } else { count };

        let mut picked = vec![false; node_count];
        for _ in 0..draws {
            let mut v = rng.uniform_int(node_count);
            while picked[v] {
                v = rng.uniform_int(node_count);
            }
            picked[v] = true;
        }

        self.seeds = picked
            .iter()
            .enumerate()
            .filter(|&(_, &p)| p != pick_complement)
            .map(|(v, _)| Seed::new(v as NodeId, 0))
            .collect();
        self
    }

    pub fn seed_count(&self) -> usize {
        self.seeds.len()
    }

    /// Check everything the engine relies on without re-checking.
    pub fn validate(&self, node_count: usize) -> Result<(), ParamsError> {
        let run = self.id;
        let p = self.infection_probability;
        if !(p > 0.0 && p <= 1.0) {
            return Err(ParamsError::Probability { run, p });
        }
        if self.bound <= 0 {
            return Err(ParamsError::Bound { run, bound: self.bound });
        }
        if self.activity_rates.len() != node_count {
            return Err(ParamsError::RateTableSize {
                run,
                expected: node_count,
                actual: self.activity_rates.len(),
            });
        }
        if let Some((node, &rate)) = self
            .activity_rates
            .iter()
            .enumerate()
            .find(|(_, r)| !(r.is_finite() && **r >= 0.0))
        {
            return Err(ParamsError::Rate { run, node: node as NodeId, rate });
        }
        if self.seeds.is_empty() {
            return Err(ParamsError::NoSeeds { run });
        }

        let mut seen = HashSet::with_capacity(self.seeds.len());
        for seed in &self.seeds {
            if seed.node as usize >= node_count {
                return Err(ParamsError::SeedOutOfRange { run, node: seed.node, node_count });
            }
            if !seen.insert(seed.node) {
                return Err(ParamsError::DuplicateSeed { run, node: seed.node });
            }
            if seed.time < 0 || seed.time > self.bound {
                return Err(ParamsError::SeedTime {
                    run,
                    node: seed.node,
                    time: seed.time,
                    bound: self.bound,
                });
            }
        }
        Ok(())
    }
}

/// `count` runs with ids `0..count`, each seeded by one uniformly random
/// node at time zero.
pub fn random_runs(
    count: usize,
    node_count: usize,
    bound: Time,
    rates: Arc<[f64]>,
    rng: &mut VariateSource,
) -> Vec<RunParameters> {
    (0..count)
        .map(|i| {
            let node = rng.uniform_int(node_count) as NodeId;
            RunParameters::new(i as RunId, bound, node_count)
                .with_rates(Arc::clone(&rates))
                .with_seed(node, 0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> RunParameters {
        RunParameters::new(3, 100, 4).with_seed(0, 0)
    }

    #[test]
    fn test_valid_parameters() {
        assert_eq!(base().validate(4), Ok(()));
        assert_eq!(base().with_uniform_rate(2.5).validate(4), Ok(()));
    }

    #[test]
    fn test_probability_bounds() {
        assert!(matches!(
            base().with_probability(0.0).validate(4),
            Err(ParamsError::Probability { run: 3, .. })
        ));
        assert!(matches!(
            base().with_probability(1.5).validate(4),
            Err(ParamsError::Probability { .. })
        ));
        assert!(matches!(
            base().with_probability(f64::NAN).validate(4),
            Err(ParamsError::Probability { .. })
        ));
    }

    #[test]
    fn test_bound_and_rate_table() {
        assert_eq!(base().with_bound(0).validate(4), Err(ParamsError::Bound { run: 3, bound: 0 }));
        assert_eq!(
            base().validate(5),
            Err(ParamsError::RateTableSize { run: 3, expected: 5, actual: 4 })
        );
        let rates: Arc<[f64]> = vec![0.0, -1.0, 0.0, 0.0].into();
        assert!(matches!(
            base().with_rates(rates).validate(4),
            Err(ParamsError::Rate { node: 1, .. })
        ));
    }

    #[test]
    fn test_seed_checks() {
        assert_eq!(RunParameters::new(1, 10, 4).validate(4), Err(ParamsError::NoSeeds { run: 1 }));
        assert_eq!(
            base().with_seed(9, 0).validate(4),
            Err(ParamsError::SeedOutOfRange { run: 3, node: 9, node_count: 4 })
        );
        assert_eq!(
            base().with_seed(0, 5).validate(4),
            Err(ParamsError::DuplicateSeed { run: 3, node: 0 })
        );
        assert_eq!(
            base().with_seed(1, 101).validate(4),
            Err(ParamsError::SeedTime { run: 3, node: 1, time: 101, bound: 100 })
        );
        assert!(base().with_seed(1, -1).validate(4).is_err());
    }

    #[test]
    fn test_random_seeds_are_distinct() {
        let mut rng = VariateSource::seeded(5);
        for count in [1, 3, 7, 10] {
            let params = RunParameters::new(0, 10, 10).with_random_seeds(count, 10, &mut rng);
            assert_eq!(params.seed_count(), count);
            assert_eq!(params.validate(10), Ok(()));
            assert!(params.seeds.iter().all(|s| s.time == 0));
        }
    }

    #[test]
    fn test_random_runs_share_rate_table() {
        let mut rng = VariateSource::seeded(9);
        let rates: Arc<[f64]> = vec![1.0; 6].into();
        let runs = random_runs(4, 6, 50, Arc::clone(&rates), &mut rng);
        assert_eq!(runs.len(), 4);
        for (i, run) in runs.iter().enumerate() {
            assert_eq!(run.id, i as RunId);
            assert_eq!(run.seed_count(), 1);
            assert!(Arc::ptr_eq(&run.activity_rates, &rates));
            assert_eq!(run.validate(6), Ok(()));
        }
    }
}
