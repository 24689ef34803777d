use std::{
    sync::{Arc, Mutex},
    thread,
};

use ttd::{
    approx::{FunctionApproximator, LookUpTable},
    credit::Ttd,
    exploration::{Boltzmann, EpsilonGreedy},
    gym::{Cell, Grid},
    Environment, Error, Learner, Result, Runner, RunnerConfig, RunnerEvent, StateVector,
};

/// 10x10 grid with two hooked walls; the goal sits inside the right one, the start inside the left
fn hooks() -> Grid {
    let mut map = vec![vec![Cell::Empty; 10]; 10];
    let mut wall = |x: usize, ys: std::ops::RangeInclusive<usize>| {
        for y in ys {
            map[x][y] = Cell::Obstacle;
        }
    };
    wall(1, 2..=2);
    wall(2, 2..=2);
    wall(3, 2..=7);
    wall(2, 7..=7);
    wall(1, 7..=7);
    wall(8, 2..=2);
    wall(7, 2..=2);
    wall(6, 2..=7);
    wall(7, 7..=7);
    wall(8, 7..=7);
    map[7][3] = Cell::Goal;
    Grid::seeded(map, Some((2, 6)), 1).unwrap()
}

fn tables(actions: usize, quants: &[usize], high: f64) -> Vec<LookUpTable> {
    (0..actions)
        .map(|_| LookUpTable::new(quants, &vec![0.0; quants.len()], &vec![high; quants.len()], 1).unwrap())
        .collect()
}

#[test]
fn q_learning_finds_the_goal() {
    let learner = Learner::q_learning(
        Ttd::new(0.5, 10, 0.95).unwrap(),
        Boltzmann::seeded(0.1, 7).unwrap(),
        tables(4, &[10, 10], 10.0),
        0.5,
    )
    .unwrap();
    let mut runner = Runner::new(learner, hooks(), RunnerConfig::default().trials(50).max_steps(1000));

    let steps = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&steps);
    runner.add_trial_sink(move |t: &ttd::runner::TrialSummary| s.lock().unwrap().push(t.steps));

    let summary = runner.run().unwrap();
    assert_eq!(summary.trials, 50);
    assert!(summary.terminal_trials >= 1, "the goal was never reached");

    let steps = steps.lock().unwrap();
    let late = steps[40..].iter().sum::<u64>() as f64 / 10.0;
    assert!(late < 200.0, "no improvement: {steps:?}");
}

/// A corridor where every action leads one cell closer to the terminal end
struct Corridor {
    pos: usize,
    len: usize,
}

impl Environment for Corridor {
    fn state(&self) -> StateVector {
        StateVector::from([self.pos as f64])
    }

    fn execute(&mut self, action: usize) -> Result<f64> {
        if action > 1 {
            return Err(Error::OutOfRange {
                what: "action",
                index: action as i64,
                len: 2,
            });
        }
        self.pos += 1;
        Ok(if self.is_terminal() { 0.0 } else { -1.0 })
    }

    fn is_terminal(&self) -> bool {
        self.pos == self.len - 1
    }

    fn reset(&mut self) {
        self.pos = 0;
    }
}

#[test]
fn q_learning_and_sarsa_agree_when_policies_coincide() {
    const GAMMA: f64 = 0.95;
    let config = RunnerConfig::default().trials(300);
    let corridor = || Corridor { pos: 0, len: 5 };

    let q = Learner::q_learning(
        Ttd::new(0.5, 3, GAMMA).unwrap(),
        EpsilonGreedy::seeded(1.0, 3).unwrap(),
        tables(2, &[5], 5.0),
        0.5,
    )
    .unwrap();
    let sarsa = Learner::sarsa(
        Ttd::new(0.5, 3, GAMMA).unwrap(),
        EpsilonGreedy::seeded(1.0, 3).unwrap(),
        tables(2, &[5], 5.0),
        0.5,
    )
    .unwrap();

    let mut q = Runner::new(q, corridor(), config);
    let mut sarsa = Runner::new(sarsa, corridor(), config);
    q.run().unwrap();
    sarsa.run().unwrap();

    // -1 per step until the last one, which is worth 0
    let expected = [-1.0 - GAMMA * (1.0 + GAMMA), -1.0 - GAMMA, -1.0, 0.0];
    for (pos, v) in expected.into_iter().enumerate() {
        for a in 0..2 {
            let qv = q.learner().algorithm().approximators()[a].restore(&[pos as f64]).unwrap();
            let sv = sarsa.learner().algorithm().approximators()[a].restore(&[pos as f64]).unwrap();
            assert!((qv - v).abs() < 0.05, "Q-learning Q({pos}, {a}) = {qv}, expected {v}");
            assert!((sv - v).abs() < 0.05, "Sarsa Q({pos}, {a}) = {sv}, expected {v}");
            assert!((qv - sv).abs() < 0.1);
        }
    }
}

#[test]
fn shared_learner_can_be_inspected_while_paused() {
    let learner = Learner::sarsa(
        Ttd::default(),
        Boltzmann::seeded(0.1, 5).unwrap(),
        tables(4, &[10, 10], 10.0),
        0.5,
    )
    .unwrap();
    let learner = Arc::new(Mutex::new(learner));

    let mut runner = Runner::new(Arc::clone(&learner), hooks(), RunnerConfig::default());
    let control = runner.control();
    let events = runner.events();
    let handle = thread::spawn(move || runner.run());

    let mut trials = 0;
    while trials < 3 {
        if events.recv().unwrap() == RunnerEvent::Trial {
            trials += 1;
        }
    }
    control.pause();
    {
        let learner = learner.lock().unwrap();
        let values = learner.algorithm().approximators();
        let learned = (0..10)
            .flat_map(|x| (0..10).map(move |y| [x as f64, y as f64]))
            .any(|x| values.iter().any(|f| f.restore(&x).unwrap() != 0.0));
        assert!(learned, "three trials leave a trace");
    }
    control.stop();

    let summary = handle.join().unwrap().unwrap();
    assert!(summary.trials >= 3);
    assert!(control.is_stopped());
}
