//! The error taxonomy shared by every fallible operation in this crate.

use thiserror::Error;

/// Errors raised by rating updates, predictions, the batch engine, and the
/// registry.
///
/// There are no internal retries: the numeric kernel is total (it never
/// fails), so every error below is raised at a call boundary, before any
/// arithmetic runs.
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RatingError {
    /// A structural problem with the input: too few teams, an empty team,
    /// a rank/score/weight vector of the wrong length, or both `ranks` and
    /// `scores` supplied at once. The message names the offending field.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Human-readable description naming the offending field.
        message: String,
    },

    /// A semantic problem with an otherwise well-shaped numeric input:
    /// non-positive sigma, or a negative kappa/beta/tau.
    #[error("{field} is out of range: {value}")]
    OutOfRange {
        /// Name of the offending configuration field or rating component.
        field: &'static str,
        /// The offending value.
        value: f64,
    },

    /// A [`Registry`](crate::Registry) has no room left for another
    /// entity.
    #[error("registry capacity exceeded (capacity = {capacity})")]
    CapacityExceeded {
        /// The registry's fixed maximum entity count.
        capacity: usize,
    },

    /// Reserved for parity with the reference taxonomy: a [`Rating`](crate::Rating)
    /// compared against something other than another `Rating`. Rust's
    /// `PartialOrd`/`PartialEq` make this unreachable from safe code —
    /// `Rating` only implements those traits against `Rating` itself — so
    /// this variant is never constructed by the crate.
    #[error("a Rating can only be compared with another Rating")]
    ComparisonError,
}
