use std::fmt;

use crate::{Result, StateVector};

mod buffer;
mod ttd;

pub use buffer::{Experience, ExperienceBuffer};
pub use ttd::Ttd;

/// Callback access to a learner's value function, handed to a [`CreditAssigner`] on every call
pub trait UtilityFunction {
    /// Utility of `(x, a)` taken as the current experience
    fn utility0(&self, x: &StateVector, a: usize) -> Result<f64>;

    /// Utility of `(x, a)` taken as the successor of the previous experience
    fn utility1(&self, x: &StateVector, a: usize) -> Result<f64>;

    /// Move the value of `(x, a)` by the error `delta`
    fn update(&mut self, x: &StateVector, a: usize, delta: f64) -> Result<()>;
}

/// The operations of the credit assignment protocol, used to validate their order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    /// No call since construction
    None,
    StateAndAction,
    Reward,
    Reset,
}

impl Call {
    /// Whether `next` may directly follow `self`
    ///
    /// A trial starts with `state_and_action`, every `state_and_action` is followed by
    /// exactly one `reward`, and `reset` ends a trial at any point except between a
    /// `state_and_action` and its `reward`.
    pub fn admits(self, next: Call) -> bool {
        match (self, next) {
            (_, Call::None) => false,
            (Call::StateAndAction, Call::Reward) => true,
            (Call::StateAndAction, _) => false,
            (_, Call::StateAndAction) => true,
            (_, Call::Reward) => false,
            (_, Call::Reset) => true,
        }
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Call::None => "none",
            Call::StateAndAction => "state_and_action",
            Call::Reward => "reward",
            Call::Reset => "reset",
        })
    }
}

/// A temporal credit assignment algorithm
///
/// Consumes the stream of experiences of a learner and decides when and how to update
/// its value estimates through the [`UtilityFunction`] callback. The three operations
/// must be called in the order described by [`Call::admits`]; violations fail with
/// [`InvalidState`](crate::Error::InvalidState).
pub trait CreditAssigner {
    /// Bookkeeping for the state-action pair of the current step
    fn state_and_action(
        &mut self,
        x: &StateVector,
        a: usize,
        uf: &mut dyn UtilityFunction,
    ) -> Result<()>;

    /// Bookkeeping for the reward of the current step
    fn reward(&mut self, r: f64, uf: &mut dyn UtilityFunction) -> Result<()>;

    /// End of trial
    fn reset(&mut self, uf: &mut dyn UtilityFunction) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_order() {
        use Call::*;
        assert!(None.admits(StateAndAction));
        assert!(None.admits(Reset), "a fresh assigner may be reset");
        assert!(!None.admits(Reward));

        assert!(StateAndAction.admits(Reward));
        assert!(!StateAndAction.admits(StateAndAction));
        assert!(!StateAndAction.admits(Reset));

        assert!(Reward.admits(StateAndAction));
        assert!(Reward.admits(Reset));
        assert!(!Reward.admits(Reward));

        assert!(Reset.admits(StateAndAction));
        assert!(Reset.admits(Reset));
        assert!(!Reset.admits(Reward));
    }
}
