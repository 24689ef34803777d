use log::debug;

use crate::{Error, Result};

use super::FunctionApproximator;

/// A look-up table function approximator
///
/// Handles both discrete and continuous inputs, the latter with a "boxes" representation:
/// each input dimension `i` is split into `quants[i]` equal intervals over `[low[i], high[i])`
/// and every combination of intervals gets its own table entry per output. Inputs outside
/// the range fall into the nearest boundary interval.
#[derive(Debug, Clone, PartialEq)]
pub struct LookUpTable {
    table: Vec<Vec<f64>>, // one row of entries per output
    quants: Vec<usize>,
    low: Vec<f64>,
    high: Vec<f64>,
}

impl LookUpTable {
    /// Construct a table with `quants[i]` intervals over `[low[i], high[i])` for every input
    /// dimension `i` and `outputs` outputs, all values 0
    ///
    /// Fails with [`Error::InvalidParameter`] if the three slices are empty or differ in length,
    /// a quant count is 0, a range is empty, or `outputs` is 0
    pub fn new(quants: &[usize], low: &[f64], high: &[f64], outputs: usize) -> Result<Self> {
        if quants.is_empty() {
            return Err(Error::invalid("quants", "at least one input is required"));
        }
        if low.len() != quants.len() || high.len() != quants.len() {
            return Err(Error::invalid(
                "low/high",
                format!(
                    "{} low and {} high bounds given for {} inputs",
                    low.len(),
                    high.len(),
                    quants.len()
                ),
            ));
        }
        if let Some(i) = quants.iter().position(|&q| q == 0) {
            return Err(Error::invalid("quants", format!("input {i} has no quants")));
        }
        if let Some(i) = (0..low.len()).find(|&i| !(low[i] < high[i])) {
            return Err(Error::invalid(
                "low/high",
                format!("empty range [{}, {}) for input {i}", low[i], high[i]),
            ));
        }
        if outputs < 1 {
            return Err(Error::invalid("outputs", "at least one output is required"));
        }

        let entries: usize = quants.iter().product();
        debug!("New look-up table: {quants:?} quants, {entries} entries, {outputs} outputs");
        Ok(Self {
            table: vec![vec![0.0; entries]; outputs],
            quants: quants.to_vec(),
            low: low.to_vec(),
            high: high.to_vec(),
        })
    }

    /// Construct a table with one quant per unit interval of every input range
    ///
    /// Suited to integer inputs: input `i` takes `high[i] - low[i]` distinct values.
    pub fn unit_quants(low: &[i64], high: &[i64], outputs: usize) -> Result<Self> {
        if low.len() != high.len() {
            return Err(Error::invalid(
                "low/high",
                format!("{} low and {} high bounds", low.len(), high.len()),
            ));
        }
        let quants: Vec<usize> = low
            .iter()
            .zip(high)
            .map(|(&l, &h)| usize::try_from(h - l).unwrap_or(0))
            .collect();
        let low: Vec<f64> = low.iter().map(|&l| l as f64).collect();
        let high: Vec<f64> = high.iter().map(|&h| h as f64).collect();
        Self::new(&quants, &low, &high, outputs)
    }

    /// Construct a table with the same quantization and range for each of `inputs` inputs
    pub fn uniform(inputs: usize, quants: usize, low: f64, high: f64, outputs: usize) -> Result<Self> {
        Self::new(
            &vec![quants; inputs],
            &vec![low; inputs],
            &vec![high; inputs],
            outputs,
        )
    }

    /// Construct a table with the given quantization over `[0, 1)` for every input
    pub fn unit_range(quants: &[usize], outputs: usize) -> Result<Self> {
        Self::new(
            quants,
            &vec![0.0; quants.len()],
            &vec![1.0; quants.len()],
            outputs,
        )
    }

    /// Number of inputs
    pub fn inputs(&self) -> usize {
        self.quants.len()
    }

    /// Number of entries per output
    pub fn entries(&self) -> usize {
        self.table[0].len()
    }

    /// Table entry number for input `x`
    pub fn entry(&self, x: &[f64]) -> Result<usize> {
        if x.len() != self.inputs() {
            return Err(Error::invalid(
                "x",
                format!("{} components given for {} inputs", x.len(), self.inputs()),
            ));
        }
        Ok((0..x.len()).fold(0, |e, i| e * self.quants[i] + self.quant(i, x[i])))
    }

    /// Quant number of value `v` along input dimension `i`, clamped to the valid quants
    fn quant(&self, i: usize, v: f64) -> usize {
        let n = self.quants[i];
        let q = ((v - self.low[i]) * n as f64 / (self.high[i] - self.low[i])) as i64;
        q.clamp(0, n as i64 - 1) as usize
    }

    fn row(&self, o: usize) -> Result<&[f64]> {
        self.table
            .get(o)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::out_of_range("output", o, self.table.len()))
    }
}

impl FunctionApproximator for LookUpTable {
    fn outputs(&self) -> usize {
        self.table.len()
    }

    fn restore_output(&self, x: &[f64], o: usize) -> Result<f64> {
        let e = self.entry(x)?;
        Ok(self.row(o)?[e])
    }

    fn update_output(&mut self, x: &[f64], o: usize, delta: f64, beta: f64) -> Result<()> {
        let e = self.entry(x)?;
        let outputs = self.table.len();
        let row = self
            .table
            .get_mut(o)
            .ok_or_else(|| Error::out_of_range("output", o, outputs))?;
        row[e] += beta * delta;
        Ok(())
    }

    fn initialize(&mut self, v: f64) {
        for row in self.table.iter_mut() {
            row.fill(v);
        }
    }
}
