// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Temporal Cascade Simulation Suite - Random Variates
//
// Every stochastic decision of the engine draws from one seedable
// ChaCha8 stream, so a fixed seed reproduces a run exactly.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeded source of the uniform, exponential and geometric variates used by
/// the cascade engine.
#[derive(Debug, Clone)]
pub struct VariateSource {
    rng: ChaCha8Rng,
}

impl VariateSource {
    /// Deterministic stream for a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    /// Stream seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self { rng: ChaCha8Rng::from_entropy() }
    }

    /// Uniform in [0, 1).
    pub fn uniform01(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Uniform integer in [0, n). `n` must be positive.
    pub fn uniform_int(&mut self, n: usize) -> usize {
        debug_assert!(n > 0, "uniform_int over an empty range");
        self.rng.gen_range(0..n)
    }

    /// Exponential variate with the given mean: `-ln(U) * mean`.
    ///
    /// `U == 0` yields `+inf`; callers saturate when converting to time.
    pub fn exponential(&mut self, mean: f64) -> f64 {
        -self.uniform01().ln() * mean
    }

    /// `floor(exponential(rate))` as a non-negative time delta.
    ///
    /// The parameter is used directly as the exponential's mean; this is the
    /// only delay variate the engine schedules with.
    pub fn geometric_from_rate(&mut self, rate: f64) -> i64 {
        to_delay(self.exponential(rate).floor())
    }

    /// Geometric variate with success probability `p` in (0, 1):
    /// if `X ~ Exp(mean)` then `floor(X) ~ Geo(1 - e^(-1/mean))`.
    pub fn geometric(&mut self, p: f64) -> i64 {
        let mean = -1.0 / (1.0 - p).ln();
        to_delay(self.exponential(mean).floor())
    }
}

/// Float-to-int conversion saturates, so `+inf` becomes `i64::MAX` and any
/// NaN (from a degenerate mean) becomes zero.
fn to_delay(x: f64) -> i64 {
    (x as i64).max(0)
}
