use std::fmt;

use log::{debug, trace};

use crate::{ensure_interval, Error, Result, StateVector};

use super::{Call, CreditAssigner, ExperienceBuffer, UtilityFunction};

/// Credit assignment with TTD (Truncated Temporal Differences)
///
/// Keeps the `m` most recent experiences and, once per step, moves the value of the
/// oldest one toward its truncated TD(λ) return
///
/// z = r<sub>t</sub> + γ (λ z + (1 - λ) u<sub>t+1</sub>)
///
/// computed backward over the window. The window is flushed at the end of each trial
/// by [`reset`](CreditAssigner::reset).
#[derive(Debug, Clone)]
pub struct Ttd {
    lambda: f64, // recency factor
    m: usize,    // truncation period
    gamma: f64,  // discount factor
    buffer: ExperienceBuffer,
    last: Call,
}

impl Ttd {
    /// Initialize TTD with recency factor `lambda`, truncation period `m` and discount factor `gamma`
    ///
    /// Fails with [`Error::InvalidParameter`] if `lambda` or `gamma` is not in the interval `[0,1]`,
    /// or `m` is less than 1
    pub fn new(lambda: f64, m: usize, gamma: f64) -> Result<Self> {
        ensure_interval!(lambda, 0.0, 1.0);
        ensure_interval!(gamma, 0.0, 1.0);
        check_m(m)?;
        debug!("New TTD({lambda}, {m}, {gamma})");
        Ok(Self {
            lambda,
            m,
            gamma,
            buffer: ExperienceBuffer::new(m),
            last: Call::None,
        })
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    pub fn m(&self) -> usize {
        self.m
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn set_lambda(&mut self, lambda: f64) -> Result<()> {
        ensure_interval!(lambda, 0.0, 1.0);
        debug!("TTD lambda set to {lambda}");
        self.lambda = lambda;
        Ok(())
    }

    /// Change the truncation period, keeping as many of the most recent experiences as fit
    pub fn set_m(&mut self, m: usize) -> Result<()> {
        check_m(m)?;
        debug!("TTD m set to {m}");
        self.buffer = ExperienceBuffer::resized(m, &self.buffer);
        self.m = m;
        Ok(())
    }

    pub fn set_gamma(&mut self, gamma: f64) -> Result<()> {
        ensure_interval!(gamma, 0.0, 1.0);
        debug!("TTD gamma set to {gamma}");
        self.gamma = gamma;
        Ok(())
    }

    pub fn buffer(&self) -> &ExperienceBuffer {
        &self.buffer
    }

    /// The most recently accepted call
    pub fn last_call(&self) -> Call {
        self.last
    }

    fn accept(&mut self, call: Call) -> Result<()> {
        if !self.last.admits(call) {
            return Err(Error::InvalidState {
                call,
                last: self.last,
            });
        }
        self.last = call;
        Ok(())
    }

    fn is_warm(&self) -> bool {
        self.buffer.nsteps() >= self.m as u64
    }

    /// The TTD return for experiences `t0..=m`, 0 until `m` steps have been made
    fn ttd_return(&self, t0: usize) -> f64 {
        if !self.is_warm() {
            return 0.0;
        }
        let &Self { lambda, gamma, .. } = self;
        (t0..=self.m).fold(self.buffer.u1(t0), |z, t| {
            self.buffer.r(t) + gamma * (lambda * z + (1.0 - lambda) * self.buffer.u1(t))
        })
    }

    /// Update the oldest experience in the buffer toward its TTD return for `t0..=m`
    fn ttd(&self, t0: usize, uf: &mut dyn UtilityFunction) -> Result<()> {
        let z = self.ttd_return(t0);
        if !self.is_warm() {
            return Ok(());
        }
        // a slot that was never written has nothing to update
        let (Some(x), Some(a)) = (self.buffer.x(self.m), self.buffer.a(self.m)) else {
            return Ok(());
        };
        let delta = z - uf.utility0(x, a)?;
        trace!("TTD({t0}) update of {x}, action {a}: return {z}, error {delta}");
        uf.update(x, a, delta)
    }
}

fn check_m(m: usize) -> Result<()> {
    if m < 1 {
        return Err(Error::invalid("m", format!("{m} is less than 1")));
    }
    Ok(())
}

impl Default for Ttd {
    /// TTD(0.5, 10, 0.95)
    fn default() -> Self {
        Self {
            lambda: 0.5,
            m: 10,
            gamma: 0.95,
            buffer: ExperienceBuffer::new(10),
            last: Call::None,
        }
    }
}

impl CreditAssigner for Ttd {
    fn state_and_action(
        &mut self,
        x: &StateVector,
        a: usize,
        uf: &mut dyn UtilityFunction,
    ) -> Result<()> {
        self.accept(Call::StateAndAction)?;
        let u1 = uf.utility1(x, a)?;
        self.buffer.insert(x, a, u1);
        self.ttd(1, uf)?;
        self.buffer.tick();
        Ok(())
    }

    fn reward(&mut self, r: f64, _uf: &mut dyn UtilityFunction) -> Result<()> {
        self.accept(Call::Reward)?;
        self.buffer.insert_reward(r);
        Ok(())
    }

    fn reset(&mut self, uf: &mut dyn UtilityFunction) -> Result<()> {
        self.accept(Call::Reset)?;
        self.buffer.insert_terminal();
        for t0 in 1..=self.m {
            self.ttd(t0, uf)?;
            self.buffer.tick();
        }
        self.buffer.reset();
        Ok(())
    }
}

impl fmt::Display for Ttd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TTD({}, {}, {})", self.lambda, self.m, self.gamma)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fixed utilities indexed by the first state component; updates are recorded, not applied
    struct Fixed {
        u: Vec<f64>,
        updates: Vec<(usize, usize, f64)>,
    }

    impl Fixed {
        fn new(u: &[f64]) -> Self {
            Self {
                u: u.to_vec(),
                updates: Vec::new(),
            }
        }
    }

    impl UtilityFunction for Fixed {
        fn utility0(&self, x: &StateVector, _a: usize) -> Result<f64> {
            Ok(self.u[x[0] as usize])
        }

        fn utility1(&self, x: &StateVector, a: usize) -> Result<f64> {
            self.utility0(x, a)
        }

        fn update(&mut self, x: &StateVector, a: usize, delta: f64) -> Result<()> {
            self.updates.push((x[0] as usize, a, delta));
            Ok(())
        }
    }

    fn s(i: usize) -> StateVector {
        StateVector::from([i as f64])
    }

    /// Run `state_and_action` + `reward` for each `(state, reward)`
    fn steps(ttd: &mut Ttd, uf: &mut Fixed, seq: &[(usize, f64)]) {
        for &(x, r) in seq {
            ttd.state_and_action(&s(x), 0, uf).unwrap();
            ttd.reward(r, uf).unwrap();
        }
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert!(Ttd::new(-0.1, 10, 0.9).is_err());
        assert!(Ttd::new(0.5, 0, 0.9).is_err());
        assert!(Ttd::new(0.5, 10, 1.1).is_err());

        let mut ttd = Ttd::default();
        assert!(ttd.set_lambda(2.0).is_err());
        assert!(ttd.set_gamma(-1.0).is_err());
        assert!(ttd.set_m(0).is_err());
        assert_eq!(ttd.to_string(), "TTD(0.5, 10, 0.95)", "failed setters change nothing");
    }

    #[test]
    fn reward_first_is_invalid() {
        let mut uf = Fixed::new(&[0.0]);
        let mut ttd = Ttd::default();
        assert_eq!(
            ttd.reward(1.0, &mut uf),
            Err(Error::InvalidState {
                call: Call::Reward,
                last: Call::None
            })
        );

        ttd.reset(&mut uf).unwrap();
        assert!(
            ttd.reward(1.0, &mut uf).is_err(),
            "reward right after reset is invalid"
        );
    }

    #[test]
    fn call_sequence_enforced() {
        let mut uf = Fixed::new(&[0.0]);
        let mut ttd = Ttd::default();

        ttd.state_and_action(&s(0), 0, &mut uf).unwrap();
        assert!(matches!(
            ttd.state_and_action(&s(0), 0, &mut uf),
            Err(Error::InvalidState {
                call: Call::StateAndAction,
                last: Call::StateAndAction
            })
        ));
        assert!(ttd.reset(&mut uf).is_err(), "no reset before the reward");

        ttd.reward(0.0, &mut uf).unwrap();
        assert!(ttd.reward(0.0, &mut uf).is_err(), "one reward per step");
        ttd.reset(&mut uf).unwrap();
        ttd.state_and_action(&s(0), 0, &mut uf).unwrap();
        assert_eq!(ttd.last_call(), Call::StateAndAction);
    }

    #[test]
    fn no_return_before_m_steps() {
        let mut uf = Fixed::new(&[3.0, 4.0, 5.0]);
        let mut ttd = Ttd::new(0.7, 3, 0.9).unwrap();

        steps(&mut ttd, &mut uf, &[(0, 1.0), (1, 1.0)]);
        ttd.state_and_action(&s(2), 0, &mut uf).unwrap();
        assert_eq!(ttd.buffer().nsteps(), 3);
        assert!(uf.updates.is_empty(), "no update while fewer than m steps");

        let mut fresh = Ttd::new(0.7, 3, 0.9).unwrap();
        steps(&mut fresh, &mut uf, &[(0, 1.0), (1, 1.0)]);
        for t0 in 1..=3 {
            assert_eq!(fresh.ttd_return(t0), 0.0);
        }
    }

    /// Delta of the first update after three steps through states 0, 1, 2 with rewards 1, 2
    fn first_delta(lambda: f64, gamma: f64, u: &[f64], rewards: [f64; 2]) -> f64 {
        let mut uf = Fixed::new(u);
        let mut ttd = Ttd::new(lambda, 2, gamma).unwrap();
        steps(&mut ttd, &mut uf, &[(0, rewards[0]), (1, rewards[1])]);
        ttd.state_and_action(&s(2), 0, &mut uf).unwrap();
        assert_eq!(uf.updates.len(), 1);
        assert_eq!(uf.updates[0].0, 0, "oldest state is updated");
        uf.updates[0].2
    }

    #[test]
    fn ttd_update_values() {
        let u = [10.0, 20.0, 30.0];
        // one-step backup: 1 + 0.5 * 20 - 10
        assert_eq!(first_delta(0.0, 0.5, &u, [1.0, 2.0]), 1.0);
        // full return: 1 + 0.5 * (2 + 0.5 * 30) - 10
        assert_eq!(first_delta(1.0, 0.5, &u, [1.0, 2.0]), -0.5);
        // blend: 1 + 0.5 * (0.5 * 17 + 0.5 * 20) - 10
        assert_eq!(first_delta(0.5, 0.5, &u, [1.0, 2.0]), 0.25);
    }

    #[test]
    fn lambda_matters_only_for_nonuniform_utilities() {
        let flat = [4.0, 4.0, 4.0];
        let d0 = first_delta(0.0, 1.0, &flat, [0.0, 0.0]);
        for lambda in [0.3, 0.5, 1.0] {
            let d = first_delta(lambda, 1.0, &flat, [0.0, 0.0]);
            assert!((d - d0).abs() < 1e-12, "lambda {lambda}: {d} != {d0}");
        }

        let slope = [4.0, 6.0, 9.0];
        let d0 = first_delta(0.0, 1.0, &slope, [0.0, 0.0]);
        assert_eq!(d0, 2.0, "one-step backup");
        for lambda in [0.3, 0.5, 1.0] {
            let d = first_delta(lambda, 1.0, &slope, [0.0, 0.0]);
            assert!((d - d0).abs() > 1e-6, "lambda {lambda} changes the return");
        }
    }

    #[test]
    fn reset_flushes_short_trial() {
        let mut uf = Fixed::new(&[10.0, 20.0]);
        let mut ttd = Ttd::new(0.5, 3, 0.5).unwrap();

        ttd.reset(&mut uf).unwrap();
        assert!(uf.updates.is_empty(), "nothing to flush at the start");

        steps(&mut ttd, &mut uf, &[(0, 1.0), (1, 2.0)]);
        ttd.reset(&mut uf).unwrap();

        // state 0: 1 + 0.5 * (0.5 * 2 + 0.5 * 20) - 10, state 1: terminal, 2 - 20
        assert_eq!(uf.updates, [(0, 0, -3.5), (1, 0, -18.0)]);
        assert_eq!(ttd.buffer().nsteps(), 0);
    }

    #[test]
    fn long_trial_updates_each_step_once() {
        let mut uf = Fixed::new(&[0.0; 8]);
        let mut ttd = Ttd::new(0.5, 2, 0.9).unwrap();

        let seq: Vec<_> = (0..6).map(|i| (i, -1.0)).collect();
        steps(&mut ttd, &mut uf, &seq);
        assert_eq!(
            uf.updates.iter().map(|u| u.0).collect::<Vec<_>>(),
            [0, 1, 2, 3],
            "updates lag m steps behind"
        );

        ttd.reset(&mut uf).unwrap();
        assert_eq!(
            uf.updates.iter().map(|u| u.0).collect::<Vec<_>>(),
            [0, 1, 2, 3, 4, 5],
            "reset flushes the rest"
        );
    }

    #[test]
    fn resize_keeps_protocol_state() {
        let mut uf = Fixed::new(&[0.0; 4]);
        let mut ttd = Ttd::new(0.5, 3, 0.9).unwrap();
        steps(&mut ttd, &mut uf, &[(0, 0.0), (1, 0.0), (2, 0.0)]);
        ttd.state_and_action(&s(3), 0, &mut uf).unwrap();

        ttd.set_m(2).unwrap();
        assert_eq!(ttd.m(), 2);
        assert_eq!(ttd.buffer().nsteps(), 2);
        assert!(
            ttd.state_and_action(&s(3), 0, &mut uf).is_err(),
            "still waiting for a reward"
        );
        ttd.reward(0.0, &mut uf).unwrap();
    }
}
