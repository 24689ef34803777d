use std::fmt;

use log::debug;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{Error, Result};

use super::{ensure_nonempty, Selector};

/// Boltzmann (softmax) action selection
///
/// Selects option `i` with probability proportional to exp(s<sub>i</sub> / τ) for a positive
/// temperature τ. High temperatures approach uniform selection, low temperatures approach
/// always selecting the greatest score.
#[derive(Debug, Clone)]
pub struct Boltzmann<R = StdRng> {
    temperature: f64,
    distribution: Vec<f64>,
    rng: R,
}

fn check_temperature(temperature: f64) -> Result<()> {
    if !(temperature > 0.0) {
        return Err(Error::invalid(
            "temperature",
            format!("{temperature} is not positive"),
        ));
    }
    Ok(())
}

impl Boltzmann {
    /// Initialize Boltzmann selection with an entropy-seeded generator
    ///
    /// Fails with [`Error::InvalidParameter`] if `temperature` is not positive
    pub fn new(temperature: f64) -> Result<Self> {
        Self::with_rng(temperature, StdRng::from_entropy())
    }

    /// Initialize Boltzmann selection with a reproducible generator
    pub fn seeded(temperature: f64, seed: u64) -> Result<Self> {
        Self::with_rng(temperature, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Boltzmann<R> {
    pub fn with_rng(temperature: f64, rng: R) -> Result<Self> {
        check_temperature(temperature)?;
        debug!("New Boltzmann({temperature})");
        Ok(Self {
            temperature,
            distribution: Vec::new(),
            rng,
        })
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn set_temperature(&mut self, temperature: f64) -> Result<()> {
        check_temperature(temperature)?;
        debug!("Temperature set to {temperature}");
        self.temperature = temperature;
        Ok(())
    }

    /// Fill the unnormalized distribution, relative to `shift`
    ///
    /// Returns the sum of the weights.
    fn weigh(&mut self, scores: &[f64], shift: f64) -> f64 {
        let tau = self.temperature;
        for (w, &s) in self.distribution.iter_mut().zip(scores) {
            *w = ((s - shift) / tau).exp();
        }
        self.distribution.iter().sum()
    }
}

impl Default for Boltzmann {
    /// Temperature 0.1
    fn default() -> Self {
        Self {
            temperature: 0.1,
            distribution: Vec::new(),
            rng: StdRng::from_entropy(),
        }
    }
}

impl<R: Rng> Selector for Boltzmann<R> {
    fn select(&mut self, scores: &[f64]) -> Result<usize> {
        ensure_nonempty(scores)?;
        if self.distribution.len() != scores.len() {
            self.distribution = vec![0.0; scores.len()];
        }

        // Weights relative to the first score; on overflow, relative to the greatest one
        let mut sum = self.weigh(scores, scores[0]);
        if !sum.is_finite() {
            let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            sum = self.weigh(scores, max);
        }

        // Inverse CDF over a uniform point in [0, sum)
        let p = self.rng.gen::<f64>() * sum;
        let last = scores.len() - 1;
        let mut choice = 0;
        let mut partial = self.distribution[0];
        while choice < last && partial < p {
            choice += 1;
            partial += self.distribution[choice];
        }
        Ok(choice)
    }
}

impl<R> fmt::Display for Boltzmann<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Boltzmann({})", self.temperature)
    }
}
