use std::sync::{Arc, Mutex, PoisonError};

use crate::{Result, StateVector};

/// Notification emitted by an [`Environment`]
///
/// The payload is the tag only; observers re-query the environment for details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvEvent {
    /// The state has changed (after [`execute`](Environment::execute) or [`reset`](Environment::reset))
    State,
    /// The configuration has changed
    Properties,
}

/// Represents the environment a learner interacts with: a discrete-time process with
/// numeric states and a fixed, environment-defined number of integer actions.
///
/// Implementations that support observers must notify [`EnvEvent::State`] after the
/// state mutation in `execute` and `reset` has completed, never before.
pub trait Environment {
    /// Get the current state
    fn state(&self) -> StateVector;

    /// Make a state transition in response to `action` and produce the reward for it
    ///
    /// Fails with [`OutOfRange`](crate::Error::OutOfRange) for an action the environment does not know.
    fn execute(&mut self, action: usize) -> Result<f64>;

    /// Determine if a terminal state has been reached, ending the trial
    fn is_terminal(&self) -> bool;

    /// Reset the environment to an initial state
    fn reset(&mut self);
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A shared environment can be polled from another thread while a runner drives it;
/// every call holds the lock for its whole duration.
impl<E: Environment> Environment for Arc<Mutex<E>> {
    fn state(&self) -> StateVector {
        lock(self).state()
    }

    fn execute(&mut self, action: usize) -> Result<f64> {
        lock(self).execute(action)
    }

    fn is_terminal(&self) -> bool {
        lock(self).is_terminal()
    }

    fn reset(&mut self) {
        lock(self).reset()
    }
}
