#![deny(
    missing_docs,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    // Rating/TeamRating names repeat the module name by design.
    clippy::module_name_repetitions,
    // Need to cast usizes to f64s where precision is not that important.
    clippy::cast_precision_loss,
    clippy::doc_markdown
)]
#![doc = include_str!("../README.md")]

pub mod batch;
pub mod error;
mod numerics;
pub mod predict;
pub mod rating;
pub mod registry;
mod team;

pub mod models {
    //! The five Weng-Lin rating-update models.
    pub mod bradley_terry_full;
    pub mod bradley_terry_part;
    pub mod plackett_luce;
    pub mod thurstone_mosteller_full;
    pub mod thurstone_mosteller_part;
}

pub use batch::{partition_waves, BatchProcessor, Game};
pub use error::RatingError;
pub use models::bradley_terry_full::BradleyTerryFull;
pub use models::bradley_terry_part::BradleyTerryPart;
pub use models::plackett_luce::PlackettLuce;
pub use models::thurstone_mosteller_full::ThurstoneMostellerFull;
pub use models::thurstone_mosteller_part::ThurstoneMostellerPart;
pub use rating::{Gamma, ModelConfig, Rating};
pub use registry::Registry;

/// Outcome of a match, either as a rank vector or a score vector, never both.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    /// Ranks, lower is better. Ties share a value.
    Ranks(Vec<f64>),
    /// Scores, higher is better.
    Scores(Vec<f64>),
}

/// Shared behaviour across all five rating-update models.
///
/// 📌 _**Important note:**_ Every model shares the same pre/post-processing
/// contract (tau injection, score-to-rank conversion, rank-stable
/// permutation, sigma clamp) described in the crate's top-level docs; the
/// models differ only in how they compute the per-team mean-shift and
/// variance-shrink factor from the aggregated team data.
pub trait RatingModel {
    /// Construct a model from its configuration.
    fn new(config: ModelConfig) -> Self;

    /// Returns this model's configuration.
    fn config(&self) -> &ModelConfig;

    /// Create a new [`Rating`] seeded with the model's defaults, or the
    /// given overrides.
    fn new_rating(&self, mu: Option<f64>, sigma: Option<f64>, name: Option<String>) -> Rating {
        Rating {
            mu: mu.unwrap_or(self.config().mu),
            sigma: sigma.unwrap_or(self.config().sigma),
            name,
        }
    }

    /// Update every player's rating from a single game outcome.
    ///
    /// # Errors
    /// Returns [`RatingError::InvalidInput`] if `teams` has fewer than two
    /// teams, an empty team, a rank/score vector of the wrong length, or
    /// both `ranks` and `scores` are supplied.
    fn rate(
        &self,
        teams: &[Vec<Rating>],
        outcome: Option<&Outcome>,
        weights: Option<&[Vec<f64>]>,
        tau: Option<f64>,
        limit_sigma: Option<bool>,
    ) -> Result<Vec<Vec<Rating>>, RatingError>;

    /// Probability of each team winning (see spec §4.3).
    ///
    /// # Errors
    /// Returns [`RatingError::InvalidInput`] if fewer than two teams are
    /// given.
    fn predict_win(&self, teams: &[Vec<Rating>]) -> Result<Vec<f64>, RatingError>;

    /// Probability that the game ends in a draw.
    ///
    /// # Errors
    /// Returns [`RatingError::InvalidInput`] if fewer than two teams are
    /// given.
    fn predict_draw(&self, teams: &[Vec<Rating>]) -> Result<f64, RatingError>;

    /// Competition-ranked, per-team win-probability prediction.
    ///
    /// # Errors
    /// Returns [`RatingError::InvalidInput`] if fewer than two teams are
    /// given.
    fn predict_rank(&self, teams: &[Vec<Rating>]) -> Result<Vec<(usize, f64)>, RatingError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_derives() {
        let outcome = Outcome::Ranks(vec![1.0, 2.0]);
        assert_eq!(outcome, outcome.clone());
        assert!(!format!("{outcome:?}").is_empty());
    }
}
