use crate::{Error, Result};

mod lookup_table;

pub use lookup_table::LookUpTable;

/// A function approximator with one or more outputs
///
/// Updates are gradient-free: `update_output(x, o, delta, beta)` moves output `o` at `x`
/// by `beta * delta`. The single-output operations work on output 0.
pub trait FunctionApproximator {
    /// Number of outputs
    fn outputs(&self) -> usize;

    /// Restore the value of output `o` for input `x`
    fn restore_output(&self, x: &[f64], o: usize) -> Result<f64>;

    /// Update the value of output `o` for input `x` by `beta * delta`
    fn update_output(&mut self, x: &[f64], o: usize, delta: f64, beta: f64) -> Result<()>;

    /// Set every value, for any input and output, to `v`
    fn initialize(&mut self, v: f64);

    /// Restore the value of the first output for input `x`
    fn restore(&self, x: &[f64]) -> Result<f64> {
        self.restore_output(x, 0)
    }

    /// Update the value of the first output for input `x`
    fn update(&mut self, x: &[f64], delta: f64, beta: f64) -> Result<()> {
        self.update_output(x, 0, delta, beta)
    }

    /// Restore the values of the first `y.len()` outputs for input `x` into `y`
    fn restore_all(&self, x: &[f64], y: &mut [f64]) -> Result<()> {
        check_outputs(y.len(), self.outputs())?;
        for (o, v) in y.iter_mut().enumerate() {
            *v = self.restore_output(x, o)?;
        }
        Ok(())
    }

    /// Update the first `delta.len()` outputs for input `x`, each by its own error
    fn update_all(&mut self, x: &[f64], delta: &[f64], beta: f64) -> Result<()> {
        check_outputs(delta.len(), self.outputs())?;
        for (o, &d) in delta.iter().enumerate() {
            self.update_output(x, o, d, beta)?;
        }
        Ok(())
    }
}

fn check_outputs(requested: usize, outputs: usize) -> Result<()> {
    if requested > outputs {
        return Err(Error::out_of_range("output", requested - 1, outputs));
    }
    Ok(())
}
