/// Checks that a numerical value is in the provided closed interval `[a,b]` and returns
/// early with [`Error::InvalidParameter`](crate::Error::InvalidParameter) if not
///
/// ### Example
/// ```
/// # fn check(value: f64) -> ttd::Result<()> {
/// ttd::ensure_interval!(value, 0.0, 1.0);
/// # Ok(())
/// # }
/// assert!(check(2.0).is_err());
/// ```
/// The error message reads "invalid value for \`value\`: 2 is not in the interval \[0, 1\]".
#[macro_export]
macro_rules! ensure_interval {
    ($var:expr, $a:expr, $b:expr) => {
        if !($var >= $a && $var <= $b) {
            return Err($crate::Error::InvalidParameter {
                name: stringify!($var),
                reason: format!("{} is not in the interval [{}, {}]", $var, $a, $b),
            });
        }
    };
}

/// Index of the greatest element, the first one found on ties
///
/// Returns `None` for an empty slice.
pub(crate) fn max_index(values: &[f64]) -> Option<usize> {
    let (&first, rest) = values.split_first()?;
    let mut best = 0;
    let mut best_value = first;
    for (i, &v) in rest.iter().enumerate() {
        if v > best_value {
            best = i + 1;
            best_value = v;
        }
    }
    Some(best)
}
