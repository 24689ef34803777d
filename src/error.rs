//! Error types for the crate

use thiserror::Error;

use crate::credit::Call;

/// Errors raised by learners, credit assigners, function approximators and environments
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// A numeric parameter lies outside its documented domain
    #[error("invalid value for `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// A credit assignment operation was called out of sequence
    #[error("`{call}` may not follow `{last}`")]
    InvalidState { call: Call, last: Call },

    /// A coordinate, action or output index outside the valid domain
    #[error("{what} index {index} is out of range (must be below {len})")]
    OutOfRange {
        what: &'static str,
        index: i64,
        len: usize,
    },
}

impl Error {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    pub(crate) fn out_of_range(what: &'static str, index: impl TryInto<i64>, len: usize) -> Self {
        Error::OutOfRange {
            what,
            index: index.try_into().unwrap_or(i64::MAX),
            len,
        }
    }
}

/// Convenience type alias for results using the crate's [`Error`] type
pub type Result<T> = std::result::Result<T, Error>;
