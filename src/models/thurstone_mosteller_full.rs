//! Thurstone-Mosteller Full: a pairwise probit comparison against every
//! other team, using the `v`/`w`/`ṽ`/`w̃` correction functions from
//! Weng & Lin (2011) in place of Bradley-Terry's logistic.

use crate::error::RatingError;
use crate::numerics::{v, vt, w, wt};
use crate::rating::{GammaArgs, ModelConfig, Rating};
use crate::team;
use crate::{predict, Outcome, RatingModel};

/// The Thurstone-Mosteller Full rating-update model.
#[derive(Clone, Debug)]
pub struct ThurstoneMostellerFull {
    config: ModelConfig,
}

impl RatingModel for ThurstoneMostellerFull {
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
        let weights_row_i = |i: usize| prepared.weights_sorted.as_ref().map(|w| w[i].as_slice());
        let mut omega_delta = Vec::with_capacity(n);

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
                let delta_mu = (agg_i.mu - agg_q.mu) / c_iq;
                let eps = cfg.margin / c_iq;
                let gamma_val = cfg.gamma.eval(&GammaArgs {
                    c: c_iq,
                    k: n,
                    mu_i: agg_i.mu,
                    sigma_i_sq: agg_i.sigma_sq,
                    team: &prepared.teams_sorted[i],
                    rank: prepared.ranks_sorted[i] as usize,
                    weights: weights_row_i(i),
                });
                let factor = agg_i.sigma_sq / c_iq;
                let factor2 = agg_i.sigma_sq / (c_iq * c_iq);

                if prepared.ranks_sorted[q] > prepared.ranks_sorted[i] {
                    omega += factor * v(delta_mu, eps);
                    delta += gamma_val * factor2 * w(delta_mu, eps);
                } else if prepared.ranks_sorted[q] < prepared.ranks_sorted[i] {
                    omega += -factor * v(-delta_mu, eps);
                    delta += gamma_val * factor2 * w(-delta_mu, eps);
                } else {
                    omega += factor * vt(delta_mu, eps);
                    delta += gamma_val * factor2 * wt(delta_mu, eps);
                }
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
