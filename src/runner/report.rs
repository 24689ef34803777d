use std::io;

use log::warn;

use super::TrialSummary;

/// Receives the reward of every step
pub trait StepSink {
    /// `trial` and `step` both count from 0
    fn step(&mut self, trial: u32, step: u64, reward: f64);
}

/// Receives the summary of every trial
pub trait TrialSink {
    fn trial(&mut self, summary: &TrialSummary);
}

impl<F: FnMut(u32, u64, f64)> StepSink for F {
    fn step(&mut self, trial: u32, step: u64, reward: f64) {
        self(trial, step, reward)
    }
}

impl<F: FnMut(&TrialSummary)> TrialSink for F {
    fn trial(&mut self, summary: &TrialSummary) {
        self(summary)
    }
}

/// A tab-separated report, one line per record
///
/// Step lines read `trial\tstep\treward`, trial lines `trial\tmean_reward\tsteps`. Every line
/// is flushed as soon as it is written. Write errors are logged and otherwise ignored so that a
/// broken report never interrupts learning.
pub struct TsvReport<W: io::Write> {
    writer: csv::Writer<W>,
}

impl<W: io::Write> TsvReport<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .delimiter(b'\t')
                .has_headers(false)
                .from_writer(writer),
        }
    }

    pub fn get_ref(&self) -> &W {
        self.writer.get_ref()
    }

    fn write(&mut self, record: [String; 3]) {
        let result = self
            .writer
            .write_record(&record)
            .and_then(|()| Ok(self.writer.flush()?));
        if let Err(e) = result {
            warn!("Failed to write report line: {e}");
        }
    }
}

impl<W: io::Write> StepSink for TsvReport<W> {
    fn step(&mut self, trial: u32, step: u64, reward: f64) {
        self.write([trial.to_string(), step.to_string(), format!("{reward:?}")]);
    }
}

impl<W: io::Write> TrialSink for TsvReport<W> {
    fn trial(&mut self, summary: &TrialSummary) {
        self.write([
            summary.trial.to_string(),
            format!("{:?}", summary.mean_reward),
            summary.steps.to_string(),
        ]);
    }
}
