use std::fmt;

use log::debug;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{ensure_interval, util::max_index, Result};

use super::{ensure_nonempty, Selector};

/// Epsilon greedy action selection
///
/// Selects the option with the greatest score with probability `1 - epsilon` and a
/// uniformly random option with probability `epsilon`. Of several greatest scores the
/// first one is always taken, which biases the greedy choice toward lower indices.
#[derive(Debug, Clone)]
pub struct EpsilonGreedy<R = StdRng> {
    epsilon: f64,
    rng: R,
}

impl EpsilonGreedy {
    /// Initialize epsilon greedy selection with an entropy-seeded generator
    ///
    /// Fails with [`InvalidParameter`](crate::Error::InvalidParameter) if `epsilon` is not in the interval `[0,1]`
    pub fn new(epsilon: f64) -> Result<Self> {
        Self::with_rng(epsilon, StdRng::from_entropy())
    }

    /// Initialize epsilon greedy selection with a reproducible generator
    pub fn seeded(epsilon: f64, seed: u64) -> Result<Self> {
        Self::with_rng(epsilon, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> EpsilonGreedy<R> {
    pub fn with_rng(epsilon: f64, rng: R) -> Result<Self> {
        ensure_interval!(epsilon, 0.0, 1.0);
        debug!("New EpsilonGreedy({epsilon})");
        Ok(Self { epsilon, rng })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn set_epsilon(&mut self, epsilon: f64) -> Result<()> {
        ensure_interval!(epsilon, 0.0, 1.0);
        debug!("Epsilon set to {epsilon}");
        self.epsilon = epsilon;
        Ok(())
    }
}

impl Default for EpsilonGreedy {
    /// Epsilon 0.1
    fn default() -> Self {
        Self {
            epsilon: 0.1,
            rng: StdRng::from_entropy(),
        }
    }
}

impl<R: Rng> Selector for EpsilonGreedy<R> {
    fn select(&mut self, scores: &[f64]) -> Result<usize> {
        ensure_nonempty(scores)?;
        if self.rng.gen_bool(self.epsilon) {
            Ok(self.rng.gen_range(0..scores.len()))
        } else {
            Ok(max_index(scores).unwrap_or_default())
        }
    }
}

impl<R> fmt::Display for EpsilonGreedy<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EpsilonGreedy({})", self.epsilon)
    }
}
