use crate::{Error, Result};

mod epsilon_greedy;
mod softmax;

pub use epsilon_greedy::EpsilonGreedy;
pub use softmax::Boltzmann;

/// A stochastic action selection policy
///
/// Selects one of `scores.len()` options given a score for each. Score vectors may change
/// length between calls.
pub trait Selector {
    /// Select an index in `[0, scores.len())`
    ///
    /// Fails with [`Error::InvalidParameter`] if `scores` is empty
    fn select(&mut self, scores: &[f64]) -> Result<usize>;
}

fn ensure_nonempty(scores: &[f64]) -> Result<()> {
    if scores.is_empty() {
        return Err(Error::invalid("scores", "there must be at least one option"));
    }
    Ok(())
}
