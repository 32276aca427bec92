//! Bradley-Terry Full: a pairwise logistic comparison against every other
//! team in the game.

use crate::error::RatingError;
use crate::rating::{GammaArgs, ModelConfig, Rating};
use crate::team;
use crate::{predict, Outcome, RatingModel};

/// The Bradley-Terry Full rating-update model.
#[derive(Clone, Debug)]
pub struct BradleyTerryFull {
    config: ModelConfig,
}

impl RatingModel for BradleyTerryFull {
    fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn rate(
        &self,
        teams: &[Vec<Rating>],
        outcome: Option<&Outcome>,
        weights: Option<&[Vec<f64>]>,
        tau: Option<f64>,
        limit_sigma: Option<bool>,
    ) -> Result<Vec<Vec<Rating>>, RatingError> {
        let cfg = &self.config;
        let tau = tau.unwrap_or(cfg.tau);
        let limit_sigma = limit_sigma.unwrap_or(cfg.limit_sigma);

        let prepared = team::prepare(
            teams,
            outcome,
            weights,
            tau,
            cfg.balance,
            cfg.kappa,
            cfg.weight_bounds.0,
            cfg.weight_bounds.1,
        )?;

        let n = prepared.aggs_sorted.len();
        let mut omega_delta = Vec::with_capacity(n);

        let weights_row_i = |i: usize| prepared.weights_sorted.as_ref().map(|w| w[i].as_slice());

        for i in 0..n {
            let agg_i = prepared.aggs_sorted[i];
            let mut omega = 0.0;
            let mut delta = 0.0;
            for q in 0..n {
                if q == i {
                    continue;
                }
                let agg_q = prepared.aggs_sorted[q];
                let c_iq = (agg_i.sigma_sq + agg_q.sigma_sq + 2.0 * cfg.beta * cfg.beta).sqrt();
                let p_iq = 1.0 / (1.0 + ((agg_q.mu - agg_i.mu) / c_iq).exp());
                let s = if prepared.ranks_sorted[q] > prepared.ranks_sorted[i] {
                    1.0
                } else if (prepared.ranks_sorted[q] - prepared.ranks_sorted[i]).abs() < f64::EPSILON
                {
                    0.5
                } else {
                    0.0
                };
                let gamma_val = cfg.gamma.eval(&GammaArgs {
                    c: c_iq,
                    k: n,
                    mu_i: agg_i.mu,
                    sigma_i_sq: agg_i.sigma_sq,
                    team: &prepared.teams_sorted[i],
                    rank: prepared.ranks_sorted[i] as usize,
                    weights: weights_row_i(i),
                });
                omega += (agg_i.sigma_sq / c_iq) * (s - p_iq);
                delta += gamma_val * (agg_i.sigma_sq / (c_iq * c_iq)) * p_iq * (1.0 - p_iq);
            }
            omega_delta.push((omega, delta));
        }

        Ok(team::finalize(&prepared, &omega_delta, cfg.kappa, limit_sigma))
    }

    fn predict_win(&self, teams: &[Vec<Rating>]) -> Result<Vec<f64>, RatingError> {
        predict::predict_win(teams, self.config.beta)
    }

    fn predict_draw(&self, teams: &[Vec<Rating>]) -> Result<f64, RatingError> {
        predict::predict_draw(teams, self.config.beta)
    }

    fn predict_rank(&self, teams: &[Vec<Rating>]) -> Result<Vec<(usize, f64)>, RatingError> {
        predict::predict_rank(teams, self.config.beta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_eq_float::assert_eq_float;

    fn default_team(mu: f64) -> Vec<Rating> {
        let cfg = ModelConfig::default();
        vec![Rating::new(mu, cfg.sigma, None)]
    }

    #[test]
    fn test_winner_gains_loser_loses() {
        let model = BradleyTerryFull::new(ModelConfig::default());
        let teams = vec![default_team(25.0), default_team(25.0)];
        let outcome = Outcome::Ranks(vec![0.0, 1.0]);
        let out = model.rate(&teams, Some(&outcome), None, None, None).unwrap();
        assert!(out[0][0].mu > 25.0);
        assert!(out[1][0].mu < 25.0);
    }

    #[test]
    fn test_five_player_free_for_all_orders_by_rank() {
        let model = BradleyTerryFull::new(ModelConfig::default());
        let teams: Vec<Vec<Rating>> = (0..5).map(|_| default_team(25.0)).collect();
        let outcome = Outcome::Ranks(vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        let out = model.rate(&teams, Some(&outcome), None, None, None).unwrap();
        for i in 0..4 {
            assert!(out[i][0].mu > out[i + 1][0].mu);
        }
    }

    #[test]
    fn test_tie_gives_equal_mu_shift() {
        let model = BradleyTerryFull::new(ModelConfig::default());
        let teams = vec![default_team(25.0), default_team(25.0)];
        let outcome = Outcome::Ranks(vec![0.0, 0.0]);
        let out = model.rate(&teams, Some(&outcome), None, None, None).unwrap();
        assert_eq_float!(out[0][0].mu, out[1][0].mu);
    }

    #[test]
    fn test_limit_sigma_never_grows() {
        let mut cfg = ModelConfig::default();
        cfg.limit_sigma = true;
        let model = BradleyTerryFull::new(cfg);
        let teams = vec![default_team(25.0), default_team(25.0)];
        let outcome = Outcome::Ranks(vec![0.0, 1.0]);
        let out = model.rate(&teams, Some(&outcome), None, None, None).unwrap();
        assert!(out[0][0].sigma <= teams[0][0].sigma);
        assert!(out[1][0].sigma <= teams[1][0].sigma);
    }
}
