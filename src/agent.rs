use std::sync::{Arc, Mutex, PoisonError};

use crate::{Result, StateVector};

/// The react/reinforce/reset protocol through which a runner drives a learner
///
/// Every [`react`](Agent::react) must be answered with exactly one
/// [`reinforce`](Agent::reinforce) before the next `react` or a `reset`.
pub trait Agent {
    /// Choose an action for state `x` and remember the pair for credit assignment
    fn react(&mut self, x: &StateVector) -> Result<usize>;

    /// Receive the reward for the last action
    fn reinforce(&mut self, r: f64) -> Result<()>;

    /// End the current trial, crediting its unfinished experiences
    fn reset(&mut self) -> Result<()>;

    /// Forget everything learned so far
    fn clear_knowledge(&mut self);
}

/// A shared agent can be inspected from another thread between the runner's calls
impl<T: Agent> Agent for Arc<Mutex<T>> {
    fn react(&mut self, x: &StateVector) -> Result<usize> {
        self.lock().unwrap_or_else(PoisonError::into_inner).react(x)
    }

    fn reinforce(&mut self, r: f64) -> Result<()> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .reinforce(r)
    }

    fn reset(&mut self) -> Result<()> {
        self.lock().unwrap_or_else(PoisonError::into_inner).reset()
    }

    fn clear_knowledge(&mut self) {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear_knowledge()
    }
}
