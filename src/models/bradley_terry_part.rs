//! Bradley-Terry Part: identical to [`crate::models::bradley_terry_full`]
//! except each team is only compared against its rank-adjacent neighbours,
//! which keeps the update cost linear in the number of teams.

use crate::error::RatingError;
use crate::numerics::ladder_pairs;
use crate::rating::{GammaArgs, ModelConfig, Rating};
use crate::team;
use crate::{predict, Outcome, RatingModel};

/// The Bradley-Terry Part (ladder-pairing) rating-update model.
#[derive(Clone, Debug)]
pub struct BradleyTerryPart {
    config: ModelConfig,
}

impl RatingModel for BradleyTerryPart {
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
        let neighbours = ladder_pairs(n);
        let weights_row_i = |i: usize| prepared.weights_sorted.as_ref().map(|w| w[i].as_slice());
        let mut omega_delta = Vec::with_capacity(n);

        for i in 0..n {
            let agg_i = prepared.aggs_sorted[i];
            let mut omega = 0.0;
            let mut delta = 0.0;
            for &q in &neighbours[i] {
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
