use std::sync::mpsc::Receiver;

use log::{debug, info, trace, warn};

use crate::{agent::Agent, env::Environment, notify::Observers, Result};

mod control;
mod report;

pub use control::RunControl;
pub use report::{StepSink, TrialSink, TsvReport};

/// Configuration for the [`Runner`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Number of trials per [`run`](Runner::run)
    ///
    /// **Default**: `u32::MAX`
    pub trials: u32,
    /// Step budget of a trial; a trial that has not reached a terminal state by then ends anyway
    ///
    /// **Default**: `u64::MAX`
    pub max_steps: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            trials: u32::MAX,
            max_steps: u64::MAX,
        }
    }
}

impl RunnerConfig {
    pub fn trials(mut self, v: u32) -> Self {
        self.trials = v;
        self
    }

    pub fn max_steps(mut self, v: u64) -> Self {
        self.max_steps = v;
        self
    }
}

/// Notification emitted by a [`Runner`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunnerEvent {
    /// Environment and learner have been reset for a new trial
    Reset,
    /// A step has completed
    Step,
    /// A trial has completed
    Trial,
}

/// Outcome of a single trial
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialSummary {
    /// Trial number, counted from 1
    pub trial: u32,
    pub steps: u64,
    /// Mean reward per step, 0 for a trial without steps
    pub mean_reward: f64,
    /// Whether the trial ended in a terminal state rather than on its step budget or a stop
    pub terminal: bool,
}

/// Outcome of a [`run`](Runner::run)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub trials: u32,
    pub steps: u64,
    pub terminal_trials: u32,
}

/// Drives the trial/step loop between an [`Agent`] and an [`Environment`]
///
/// Each step hands the current state to the agent, executes the chosen action, and returns
/// the reward to the agent. The first step of every trial resets both sides. Errors from
/// either side abort the run and are returned to the caller.
pub struct Runner<L, E> {
    learner: L,
    environment: E,
    config: RunnerConfig,
    trial: u32, // trials completed so far
    step_sinks: Vec<Box<dyn StepSink + Send>>,
    trial_sinks: Vec<Box<dyn TrialSink + Send>>,
    observers: Observers<RunnerEvent>,
    control: RunControl,
}

impl<L: Agent, E: Environment> Runner<L, E> {
    pub fn new(learner: L, environment: E, config: RunnerConfig) -> Self {
        debug!(
            "New runner: {} trials, {} steps per trial",
            config.trials, config.max_steps
        );
        Self {
            learner,
            environment,
            config,
            trial: 0,
            step_sinks: Vec::new(),
            trial_sinks: Vec::new(),
            observers: Observers::new(),
            control: RunControl::new(),
        }
    }

    pub fn with_step_sink(mut self, sink: impl StepSink + Send + 'static) -> Self {
        self.add_step_sink(sink);
        self
    }

    pub fn with_trial_sink(mut self, sink: impl TrialSink + Send + 'static) -> Self {
        self.add_trial_sink(sink);
        self
    }

    pub fn add_step_sink(&mut self, sink: impl StepSink + Send + 'static) {
        self.step_sinks.push(Box::new(sink));
    }

    pub fn add_trial_sink(&mut self, sink: impl TrialSink + Send + 'static) {
        self.trial_sinks.push(Box::new(sink));
    }

    /// Register an observer, called synchronously after each reset, step and trial
    pub fn subscribe(&mut self, f: impl FnMut(RunnerEvent) + Send + 'static) {
        self.observers.subscribe(f);
    }

    /// Receive the runner's notifications through a channel
    pub fn events(&mut self) -> Receiver<RunnerEvent> {
        self.observers.channel()
    }

    /// A handle to stop or pause this runner from another thread
    pub fn control(&self) -> RunControl {
        self.control.clone()
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Number of trials completed so far
    pub fn trials(&self) -> u32 {
        self.trial
    }

    pub fn learner(&self) -> &L {
        &self.learner
    }

    pub fn learner_mut(&mut self) -> &mut L {
        &mut self.learner
    }

    pub fn environment(&self) -> &E {
        &self.environment
    }

    pub fn environment_mut(&mut self) -> &mut E {
        &mut self.environment
    }

    pub fn into_parts(self) -> (L, E) {
        (self.learner, self.environment)
    }

    /// Run the configured number of trials, or fewer if stopped
    pub fn run(&mut self) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for _ in 0..self.config.trials {
            if self.control.is_stopped() {
                break;
            }
            let trial = self.run_trial()?;
            summary.trials += 1;
            summary.steps += trial.steps;
            if trial.terminal {
                summary.terminal_trials += 1;
            }
        }
        debug!(
            "Run finished: {} trials, {} steps, {} terminal",
            summary.trials, summary.steps, summary.terminal_trials
        );
        Ok(summary)
    }

    /// Run a single trial, until a terminal state, the step budget, or a stop
    pub fn run_trial(&mut self) -> Result<TrialSummary> {
        let trial = self.trial;
        let max_steps = self.config.max_steps;
        let mut steps = 0;
        let mut total = 0.0;
        let mut terminal = false;

        while steps < max_steps && !terminal {
            if !self.control.checkpoint() {
                debug!("Trial {} stopped after {steps} steps", trial + 1);
                break;
            }
            if steps == 0 {
                self.environment.reset();
                self.learner.reset()?;
                self.observers.notify(RunnerEvent::Reset);
            }

            let x = self.environment.state();
            let a = self.learner.react(&x)?;
            let r = self.environment.execute(a)?;
            self.learner.reinforce(r)?;
            terminal = self.environment.is_terminal();
            trace!("Trial {trial}, step {steps}: {x} -> {a}, reward {r}");

            for sink in self.step_sinks.iter_mut() {
                sink.step(trial, steps, r);
            }
            total += r;
            steps += 1;
            self.observers.notify(RunnerEvent::Step);
        }

        if !terminal && steps == max_steps {
            warn!("Trial {} exhausted its budget of {max_steps} steps", trial + 1);
        }

        self.trial += 1;
        let summary = TrialSummary {
            trial: self.trial,
            steps,
            mean_reward: if steps > 0 { total / steps as f64 } else { 0.0 },
            terminal,
        };
        info!(
            "Trial {}: {} steps, mean reward {}",
            summary.trial, summary.steps, summary.mean_reward
        );
        if steps > 0 {
            for sink in self.trial_sinks.iter_mut() {
                sink.trial(&summary);
            }
        }
        self.observers.notify(RunnerEvent::Trial);
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::{
        approx::LookUpTable, credit::Ttd, env::tests::Corridor, exploration::EpsilonGreedy,
        Learner, StateVector,
    };

    fn learner(actions: usize) -> Learner<crate::QFunction, Ttd, EpsilonGreedy> {
        let qf = (0..actions)
            .map(|_| LookUpTable::unit_quants(&[0], &[10], 1).unwrap())
            .collect();
        Learner::q_learning(
            Ttd::new(0.5, 2, 0.9).unwrap(),
            EpsilonGreedy::seeded(0.1, 42).unwrap(),
            qf,
            0.5,
        )
        .unwrap()
    }

    #[test]
    fn runs_trials_to_terminal() {
        let mut runner = Runner::new(learner(2), Corridor::new(4, 2), RunnerConfig::default().trials(3));
        let events = runner.events();

        let summary = runner.run().unwrap();
        assert_eq!(
            summary,
            RunSummary {
                trials: 3,
                steps: 9,
                terminal_trials: 3
            }
        );
        assert_eq!(runner.trials(), 3);

        let events: Vec<_> = events.try_iter().collect();
        let trial = [
            RunnerEvent::Reset,
            RunnerEvent::Step,
            RunnerEvent::Step,
            RunnerEvent::Step,
            RunnerEvent::Trial,
        ];
        assert_eq!(events, trial.repeat(3));
    }

    #[test]
    fn step_budget_ends_trial() {
        let mut runner = Runner::new(learner(1), Corridor::new(10, 1), RunnerConfig::default().max_steps(4));
        let t = runner.run_trial().unwrap();
        assert_eq!(
            t,
            TrialSummary {
                trial: 1,
                steps: 4,
                mean_reward: -1.0,
                terminal: false
            }
        );

        // the next trial starts from a reset environment
        runner.run_trial().unwrap();
        assert_eq!(runner.environment().pos, 4);
    }

    #[test]
    fn sinks_receive_reports() {
        let steps = Arc::new(Mutex::new(Vec::new()));
        let trials = Arc::new(Mutex::new(Vec::new()));
        let (s, t) = (Arc::clone(&steps), Arc::clone(&trials));

        let mut runner = Runner::new(learner(2), Corridor::new(3, 2), RunnerConfig::default().trials(2))
            .with_step_sink(move |trial, step, r| s.lock().unwrap().push((trial, step, r)))
            .with_trial_sink(move |summary: &TrialSummary| t.lock().unwrap().push(*summary));
        runner.run().unwrap();

        assert_eq!(
            *steps.lock().unwrap(),
            [(0, 0, -1.0), (0, 1, 0.0), (1, 0, -1.0), (1, 1, 0.0)]
        );
        let trials = trials.lock().unwrap();
        assert_eq!(trials.len(), 2);
        assert_eq!(trials[1].trial, 2);
        assert_eq!(trials[1].mean_reward, -0.5);
    }

    #[test]
    fn errors_abort_the_run() {
        // the learner knows 3 actions, the environment only 1
        let mut runner = Runner::new(learner(3), Corridor::new(5, 1), RunnerConfig::default().trials(10));
        runner.learner_mut().action_selector_mut().set_epsilon(1.0).unwrap();
        let err = runner.run();
        assert!(err.is_err());
    }

    #[test]
    fn stop_before_run() {
        let mut runner = Runner::new(learner(1), Corridor::new(3, 1), RunnerConfig::default());
        runner.control().stop();
        assert_eq!(runner.run().unwrap(), RunSummary::default());

        let t = runner.run_trial().unwrap();
        assert_eq!(t.steps, 0);
        assert_eq!(runner.environment().state(), StateVector::from([0.0]));
    }

    #[test]
    fn stop_from_observer() {
        let mut runner = Runner::new(learner(1), Corridor::new(100, 1), RunnerConfig::default());
        let control = runner.control();
        let mut seen = 0;
        runner.subscribe(move |e| {
            if e == RunnerEvent::Step {
                seen += 1;
                if seen == 5 {
                    control.stop();
                }
            }
        });

        let summary = runner.run().unwrap();
        assert_eq!(summary.trials, 1);
        assert_eq!(summary.steps, 5);
        assert_eq!(summary.terminal_trials, 0);
    }
}
