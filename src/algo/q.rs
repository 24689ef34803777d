use std::fmt;

use log::{debug, trace};

use crate::{
    approx::{FunctionApproximator, LookUpTable},
    credit::{CreditAssigner, UtilityFunction},
    ensure_interval,
    exploration::Selector,
    Error, Result, StateVector,
};

use super::{Algorithm, Learner};

/// How the utility of a successor state-action pair is estimated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Bootstrap {
    /// The greatest Q-value in the successor state, whatever action was taken (Q-learning)
    #[default]
    Greedy,
    /// The Q-value of the action actually taken next (Sarsa)
    OnPolicy,
}

impl fmt::Display for Bootstrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Bootstrap::Greedy => "Q-learning",
            Bootstrap::OnPolicy => "Sarsa",
        })
    }
}

/// A Q-function represented by one function approximator per action
///
/// Serves both Q-learning and Sarsa; the two differ only in their [`Bootstrap`].
#[derive(Debug, Clone)]
pub struct QFunction<F = LookUpTable> {
    qfun: Vec<F>,
    q: Vec<f64>, // scores returned by `policy`
    beta: f64,   // step size
    bootstrap: Bootstrap,
}

impl<F: FunctionApproximator> QFunction<F> {
    /// Initialize a Q-function with one approximator per action
    ///
    /// ### Parameters
    /// - `qfun` - The approximator of each action's values, indexed by action
    /// - `beta` - The step size of updates - must be between 0 and 1
    /// - `bootstrap` - The successor utility estimate
    ///
    /// Fails with [`Error::InvalidParameter`] if `qfun` is empty or `beta` is not in the interval `[0,1]`
    pub fn new(qfun: Vec<F>, beta: f64, bootstrap: Bootstrap) -> Result<Self> {
        if qfun.is_empty() {
            return Err(Error::invalid("qfun", "at least one action is required"));
        }
        ensure_interval!(beta, 0.0, 1.0);
        debug!("New {bootstrap} Q-function: {} actions, beta {beta}", qfun.len());
        Ok(Self {
            q: vec![0.0; qfun.len()],
            qfun,
            beta,
            bootstrap,
        })
    }

    /// Number of actions
    pub fn actions(&self) -> usize {
        self.qfun.len()
    }

    pub fn approximators(&self) -> &[F] {
        &self.qfun
    }

    pub fn bootstrap(&self) -> Bootstrap {
        self.bootstrap
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn set_beta(&mut self, beta: f64) -> Result<()> {
        ensure_interval!(beta, 0.0, 1.0);
        debug!("Beta set to {beta}");
        self.beta = beta;
        Ok(())
    }

    fn approximator(&self, a: usize) -> Result<&F> {
        self.qfun
            .get(a)
            .ok_or_else(|| Error::out_of_range("action", a, self.qfun.len()))
    }
}

impl<F: FunctionApproximator> UtilityFunction for QFunction<F> {
    fn utility0(&self, x: &StateVector, a: usize) -> Result<f64> {
        self.approximator(a)?.restore(x)
    }

    fn utility1(&self, x: &StateVector, a: usize) -> Result<f64> {
        match self.bootstrap {
            Bootstrap::OnPolicy => self.utility0(x, a),
            Bootstrap::Greedy => self
                .qfun
                .iter()
                .try_fold(f64::MIN, |qmax, f| Ok(qmax.max(f.restore(x)?))),
        }
    }

    fn update(&mut self, x: &StateVector, a: usize, delta: f64) -> Result<()> {
        let actions = self.qfun.len();
        let f = self
            .qfun
            .get_mut(a)
            .ok_or_else(|| Error::out_of_range("action", a, actions))?;
        trace!("Q({x}, {a}) += {} * {delta}", self.beta);
        f.update(x, delta, self.beta)
    }
}

impl<F: FunctionApproximator> Algorithm for QFunction<F> {
    fn policy(&mut self, x: &StateVector) -> Result<&[f64]> {
        for (q, f) in self.q.iter_mut().zip(&self.qfun) {
            *q = f.restore(x)?;
        }
        Ok(&self.q)
    }

    fn clear_knowledge(&mut self) {
        for f in self.qfun.iter_mut() {
            f.initialize(0.0);
        }
    }
}

impl<F> fmt::Display for QFunction<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} actions, beta {})",
            self.bootstrap,
            self.qfun.len(),
            self.beta
        )
    }
}

impl<F, C, S> Learner<QFunction<F>, C, S>
where
    F: FunctionApproximator,
    C: CreditAssigner,
    S: Selector,
{
    /// Initialize a Q-learning learner
    ///
    /// See [`QFunction::new`] for the parameters and failures
    pub fn q_learning(credit_assigner: C, action_selector: S, qfun: Vec<F>, beta: f64) -> Result<Self> {
        let q = QFunction::new(qfun, beta, Bootstrap::Greedy)?;
        Ok(Self::new(q, credit_assigner, action_selector))
    }

    /// Initialize a Sarsa learner
    ///
    /// See [`QFunction::new`] for the parameters and failures
    pub fn sarsa(credit_assigner: C, action_selector: S, qfun: Vec<F>, beta: f64) -> Result<Self> {
        let q = QFunction::new(qfun, beta, Bootstrap::OnPolicy)?;
        Ok(Self::new(q, credit_assigner, action_selector))
    }

    pub fn beta(&self) -> f64 {
        self.algorithm().beta()
    }

    pub fn set_beta(&mut self, beta: f64) -> Result<()> {
        self.algorithm_mut().set_beta(beta)
    }
}
