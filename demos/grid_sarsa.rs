use std::io;

use ttd::{
    approx::LookUpTable,
    credit::Ttd,
    exploration::Boltzmann,
    gym::{parse_map, Grid},
    runner::TsvReport,
    Learner, Runner, RunnerConfig,
};

const MAP: &str = "
    ..........
    ..#....#..
    ..#....#..
    ..####.#..
    ..#....#..
    ..#....#..
    ..####.#..
    ..#G...#..
    ..#....#..
    ..........
";

fn main() -> ttd::Result<()> {
    env_logger::init();

    let grid = Grid::new(parse_map(MAP)?, Some((6, 2)))?;
    let qf = (0..4)
        .map(|_| LookUpTable::unit_quants(&[0, 0], &[10, 10], 1))
        .collect::<ttd::Result<Vec<_>>>()?;
    let sarsa = Learner::sarsa(Ttd::new(0.5, 10, 0.95)?, Boltzmann::new(0.1)?, qf, 0.5)?;
    eprintln!("{sarsa}");

    let mut runner = Runner::new(sarsa, grid, RunnerConfig::default().trials(200))
        .with_trial_sink(TsvReport::new(io::stdout()));
    let summary = runner.run()?;

    eprintln!(
        "{} trials, {} steps, goal reached in {}",
        summary.trials, summary.steps, summary.terminal_trials
    );
    eprintln!("{}", runner.environment());
    Ok(())
}
