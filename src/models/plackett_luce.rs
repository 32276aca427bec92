//! Plackett-Luce: a single global denominator shared across every team,
//! generalising the Bradley-Terry pairwise comparison to an arbitrary
//! number of simultaneously-ranked teams.

use crate::error::RatingError;
use crate::rating::{GammaArgs, ModelConfig, Rating};
use crate::team::{self, TeamAgg};
use crate::{predict, Outcome, RatingModel};

/// The Plackett-Luce rating-update model.
#[derive(Clone, Debug)]
pub struct PlackettLuce {
    config: ModelConfig,
}

impl RatingModel for PlackettLuce {
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
        // Per the reference this model never propagates per-player weights
        // — accepted for interface parity with the other models, silently
        // ignored here.
        _weights: Option<&[Vec<f64>]>,
        tau: Option<f64>,
        limit_sigma: Option<bool>,
    ) -> Result<Vec<Vec<Rating>>, RatingError> {
        let cfg = &self.config;
        let tau = tau.unwrap_or(cfg.tau);
        let limit_sigma = limit_sigma.unwrap_or(cfg.limit_sigma);

        let prepared = team::prepare(
            teams,
            outcome,
            None,
            tau,
            cfg.balance,
            cfg.kappa,
            cfg.weight_bounds.0,
            cfg.weight_bounds.1,
        )?;

        let n = prepared.aggs_sorted.len();
        let c = prepared
            .aggs_sorted
            .iter()
            .map(|a| a.sigma_sq + cfg.beta * cfg.beta)
            .sum::<f64>()
            .sqrt();

        let e: Vec<f64> = prepared.aggs_sorted.iter().map(|a| (a.mu / c).exp()).collect();

        // sum_q[q] = Σ_{s: rank_s >= rank_q} e_s ; a_q[q] = |{s: rank_s == rank_q}|
        let mut sum_q = vec![0.0; n];
        let mut a_q = vec![0usize; n];
        for q in 0..n {
            for s in 0..n {
                if prepared.ranks_sorted[s] >= prepared.ranks_sorted[q] {
                    sum_q[q] += e[s];
                }
                if prepared.ranks_sorted[s] == prepared.ranks_sorted[q] {
                    a_q[q] += 1;
                }
            }
        }

        let mut omega_delta = Vec::with_capacity(n);
        for i in 0..n {
            let agg: TeamAgg = prepared.aggs_sorted[i];
            let gamma_val = cfg.gamma.eval(&GammaArgs {
                c,
                k: n,
                mu_i: agg.mu,
                sigma_i_sq: agg.sigma_sq,
                team: &prepared.teams_sorted[i],
                rank: prepared.ranks_sorted[i] as usize,
                weights: None,
            });

            let mut omega = 0.0;
            let mut delta = 0.0;
            for q in 0..n {
                if prepared.ranks_sorted[q] > prepared.ranks_sorted[i] {
                    continue;
                }
                let ratio = e[i] / sum_q[q];
                let indicator = if q == i { 1.0 } else { 0.0 };
                omega += (indicator - ratio) / a_q[q] as f64;
                delta += (ratio * (1.0 - ratio)) / a_q[q] as f64;
            }
            omega *= agg.sigma_sq / c;
            delta *= (agg.sigma_sq / (c * c)) * gamma_val;
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
    fn test_two_player_default_rate_moves_winner_up() {
        let model = PlackettLuce::new(ModelConfig::default());
        let teams = vec![default_team(25.0), default_team(25.0)];
        let outcome = Outcome::Ranks(vec![0.0, 1.0]);
        let out = model.rate(&teams, Some(&outcome), None, None, None).unwrap();
        assert!(out[0][0].mu > 25.0);
        assert!(out[1][0].mu < 25.0);
        assert!(out[0][0].sigma < teams[0][0].sigma);
    }

    #[test]
    fn test_tie_keeps_mu_equal() {
        let model = PlackettLuce::new(ModelConfig::default());
        let teams = vec![default_team(25.0), default_team(25.0)];
        let outcome = Outcome::Ranks(vec![0.0, 0.0]);
        let out = model.rate(&teams, Some(&outcome), None, None, None).unwrap();
        assert_eq_float!(out[0][0].mu, out[1][0].mu);
    }

    #[test]
    fn test_free_for_all_preserves_rank_order_of_mu_shift() {
        let model = PlackettLuce::new(ModelConfig::default());
        let teams = vec![
            default_team(25.0),
            default_team(25.0),
            default_team(25.0),
            default_team(25.0),
            default_team(25.0),
        ];
        let outcome = Outcome::Ranks(vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        let out = model.rate(&teams, Some(&outcome), None, None, None).unwrap();
        for i in 0..4 {
            assert!(out[i][0].mu > out[i + 1][0].mu);
        }
    }

    #[test]
    fn test_weights_are_ignored() {
        let model = PlackettLuce::new(ModelConfig::default());
        let teams = vec![default_team(25.0), default_team(25.0)];
        let outcome = Outcome::Ranks(vec![0.0, 1.0]);
        let weights = vec![vec![1.0], vec![100.0]];
        let with_weights = model
            .rate(&teams, Some(&outcome), Some(&weights), None, None)
            .unwrap();
        let without = model.rate(&teams, Some(&outcome), None, None, None).unwrap();
        assert_eq_float!(with_weights[0][0].mu, without[0][0].mu);
    }

    #[test]
    fn test_rejects_single_team() {
        let model = PlackettLuce::new(ModelConfig::default());
        let teams = vec![default_team(25.0)];
        assert!(model.rate(&teams, None, None, None, None).is_err());
    }
}
