use std::fmt;

use log::debug;

use crate::{
    agent::Agent,
    credit::{CreditAssigner, Ttd, UtilityFunction},
    exploration::{Boltzmann, Selector},
    Result, StateVector,
};

pub mod q;

pub use q::{Bootstrap, QFunction};

/// The value-function side of a learning algorithm
///
/// Besides the [`UtilityFunction`] hooks used for credit assignment, an algorithm scores every
/// action in a state so that a [`Selector`] can pick one.
pub trait Algorithm: UtilityFunction {
    /// Value estimates for every action in state `x`
    fn policy(&mut self, x: &StateVector) -> Result<&[f64]>;

    /// Forget everything learned so far
    fn clear_knowledge(&mut self);
}

/// A reinforcement learner
///
/// Composes an [`Algorithm`] with the credit assigner and action selector it was built with;
/// neither can be exchanged afterwards, only tuned through the accessors.
///
/// ### Generics
/// - `A` - The [`Algorithm`] holding the value estimates
/// - `C` - The [`CreditAssigner`] deciding which estimates to update
/// - `S` - The [`Selector`] picking actions from the estimates
#[derive(Debug, Clone)]
pub struct Learner<A, C = Ttd, S = Boltzmann> {
    algorithm: A,
    credit_assigner: C,
    action_selector: S,
}

impl<A, C, S> Learner<A, C, S>
where
    A: Algorithm,
    C: CreditAssigner,
    S: Selector,
{
    pub fn new(algorithm: A, credit_assigner: C, action_selector: S) -> Self {
        debug!("New learner");
        Self {
            algorithm,
            credit_assigner,
            action_selector,
        }
    }

    pub fn algorithm(&self) -> &A {
        &self.algorithm
    }

    pub fn algorithm_mut(&mut self) -> &mut A {
        &mut self.algorithm
    }

    pub fn credit_assigner(&self) -> &C {
        &self.credit_assigner
    }

    pub fn credit_assigner_mut(&mut self) -> &mut C {
        &mut self.credit_assigner
    }

    pub fn action_selector(&self) -> &S {
        &self.action_selector
    }

    pub fn action_selector_mut(&mut self) -> &mut S {
        &mut self.action_selector
    }
}

impl<A, C, S> Agent for Learner<A, C, S>
where
    A: Algorithm,
    C: CreditAssigner,
    S: Selector,
{
    fn react(&mut self, x: &StateVector) -> Result<usize> {
        let scores = self.algorithm.policy(x)?;
        let a = self.action_selector.select(scores)?;
        self.credit_assigner
            .state_and_action(x, a, &mut self.algorithm)?;
        Ok(a)
    }

    fn reinforce(&mut self, r: f64) -> Result<()> {
        self.credit_assigner.reward(r, &mut self.algorithm)
    }

    fn reset(&mut self) -> Result<()> {
        self.credit_assigner.reset(&mut self.algorithm)
    }

    fn clear_knowledge(&mut self) {
        debug!("Clearing knowledge");
        self.algorithm.clear_knowledge();
    }
}

impl<A, C, S> fmt::Display for Learner<A, C, S>
where
    A: fmt::Display,
    C: fmt::Display,
    S: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.algorithm)?;
        writeln!(f, "  credit assignment: {}", self.credit_assigner)?;
        write!(f, "  action selection: {}", self.action_selector)
    }
}
