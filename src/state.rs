use std::{fmt, ops::Deref};

/// An environment state: an ordered tuple of numeric components
///
/// The arity is fixed per environment. Learners and credit assigners only read states,
/// cloning them when they need to keep one around.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateVector(Vec<f64>);

impl StateVector {
    pub fn new(components: Vec<f64>) -> Self {
        Self(components)
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Set a single component
    ///
    /// **Panics** if `i` is not below [`len`](Self::len)
    pub fn set(&mut self, i: usize, value: f64) {
        self.0[i] = value;
    }

    /// Overwrite this state with the components of `other`, reusing the existing allocation
    pub fn assign(&mut self, other: &StateVector) {
        self.0.clear();
        self.0.extend_from_slice(&other.0);
    }
}

impl Deref for StateVector {
    type Target = [f64];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<f64>> for StateVector {
    fn from(components: Vec<f64>) -> Self {
        Self(components)
    }
}

impl<const N: usize> From<[f64; N]> for StateVector {
    fn from(components: [f64; N]) -> Self {
        Self(components.to_vec())
    }
}

impl FromIterator<f64> for StateVector {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, x) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{x}")?;
        }
        write!(f, ")")
    }
}
