//! Error types for dispatch and replay.
//!
//! Solvers never fail: an unreachable subproblem is a [`Value::Infinity`]
//! result, not an error. Errors only arise at the edges of the crate, when
//! selecting a solver or replaying a log.
//!
//! [`Value::Infinity`]: crate::step::Value::Infinity

use thiserror::Error;

use crate::builder::Problem;

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Problem selector that names none of the four solvers.
    #[error("unknown problem '{0}'")]
    UnknownProblem(String),

    /// View selector other than `tree`, `memo` or `table`.
    #[error("unknown view '{0}'")]
    UnknownView(String),

    /// Input handed to a solver of a different problem.
    #[error("input for {found} cannot drive the {expected} solver")]
    InputMismatch { expected: Problem, found: Problem },

    /// Knapsack weights and values of different lengths.
    #[error("knapsack needs one value per weight ({weights} weights, {values} values)")]
    MismatchedItems { weights: usize, values: usize },

    /// A field that should hold an integer did not parse.
    #[error("invalid number '{value}' for {field}")]
    InvalidNumber { field: &'static str, value: String },

    /// Replay index past the end of the log.
    #[error("step {index} is out of range for a log of {len} steps")]
    StepOutOfRange { index: usize, len: usize },

    /// A log whose call/return events do not nest.
    #[error("unbalanced step log at step {index}: {reason}")]
    UnbalancedLog { index: usize, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let err = Error::UnknownProblem("tsp".into());
        assert_eq!(err.to_string(), "unknown problem 'tsp'");

        let err = Error::InputMismatch {
            expected: Problem::Knapsack,
            found: Problem::Lcs,
        };
        assert_eq!(err.to_string(), "input for lcs cannot drive the knapsack solver");

        let err = Error::StepOutOfRange { index: 9, len: 3 };
        assert!(err.to_string().contains("log of 3 steps"));
    }
}
