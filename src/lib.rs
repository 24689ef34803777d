/// The react/reinforce/reset protocol
pub mod agent;

/// Learning algorithms
pub mod algo;

/// Function approximators
pub mod approx;

/// Credit assignment
pub mod credit;

/// Data structures
pub mod ds;

/// Environment
pub mod env;

/// Exploration policies
pub mod exploration;

/// Simulation driver
pub mod runner;

/// Testing environments
#[cfg(feature = "gym")]
pub mod gym;

mod error;
mod notify;
mod state;
mod util;

pub use agent::Agent;
pub use algo::{Algorithm, Bootstrap, Learner, QFunction};
pub use env::{EnvEvent, Environment};
pub use error::{Error, Result};
pub use runner::{Runner, RunnerConfig, RunnerEvent};
pub use state::StateVector;
