//! The pre/post-processing contract shared by all five rating-update
//! models: validation, tau injection, score-to-rank conversion, weight
//! normalisation, rank-stable permutation, team aggregation, and the
//! sigma-monotonicity clamp.
//!
//! Each model in [`crate::models`] calls [`prepare`], computes its own
//! `(omega, delta)` pair per rank-sorted team, then calls [`finalize`].
//! This keeps the five models limited to their actual mathematical
//! difference instead of re-deriving the shared plumbing five times.

use crate::error::RatingError;
use crate::numerics::{argsort, rank_data, weight_bounds};
use crate::rating::{ModelConfig, Rating};
use crate::Outcome;

/// A team's aggregated belief: combined mean and combined (post-tau)
/// variance, used by every model's formula in place of per-player values.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TeamAgg {
    pub mu: f64,
    pub sigma_sq: f64,
}

/// Aggregate one team's ratings (already tau-inflated) into a single
/// `(mu, sigma_sq)` pair, applying the optional balance re-weighting.
pub(crate) fn aggregate_team(team: &[Rating], balance: bool, kappa: f64) -> TeamAgg {
    if !balance {
        let mu = team.iter().map(|r| r.mu).sum();
        let sigma_sq = team.iter().map(|r| r.sigma * r.sigma).sum();
        return TeamAgg { mu, sigma_sq };
    }

    let max_ordinal = team
        .iter()
        .map(|r| r.ordinal(3.0, 1.0, 0.0))
        .fold(f64::NEG_INFINITY, f64::max);

    let mut mu = 0.0;
    let mut sigma_sq = 0.0;
    for r in team {
        let o = r.ordinal(3.0, 1.0, 0.0);
        let w = 1.0 + (max_ordinal - o) / (max_ordinal + kappa);
        mu += w * r.mu;
        let scaled_sigma = w * r.sigma;
        sigma_sq += scaled_sigma * scaled_sigma;
    }
    TeamAgg { mu, sigma_sq }
}

/// Everything a model needs after the shared pre-processing has run:
/// rank-sorted teams (post-tau), their aggregates, ranks, and normalised
/// weights, plus enough bookkeeping to un-permute and clamp afterward.
pub(crate) struct PreparedGame {
    pub teams_sorted: Vec<Vec<Rating>>,
    pub aggs_sorted: Vec<TeamAgg>,
    pub ranks_sorted: Vec<f64>,
    pub weights_sorted: Option<Vec<Vec<f64>>>,
    /// `tenet[sorted_pos]` is the position this team held in the caller's
    /// original input order.
    pub tenet: Vec<usize>,
    /// Pre-tau sigma snapshot, in the caller's original team/player order.
    pub sigma_snapshot: Vec<Vec<f64>>,
}

fn validate(
    teams: &[Vec<Rating>],
    outcome: Option<&Outcome>,
    weights: Option<&[Vec<f64>]>,
) -> Result<(), RatingError> {
    if teams.len() < 2 {
        return Err(RatingError::InvalidInput {
            message: format!("rate() requires at least two teams, got {}", teams.len()),
        });
    }
    for (i, team) in teams.iter().enumerate() {
        if team.is_empty() {
            return Err(RatingError::InvalidInput {
                message: format!("team {i} is empty"),
            });
        }
    }
    match outcome {
        Some(Outcome::Ranks(r)) if r.len() != teams.len() => {
            return Err(RatingError::InvalidInput {
                message: format!(
                    "ranks has length {} but there are {} teams",
                    r.len(),
                    teams.len()
                ),
            });
        }
        Some(Outcome::Scores(s)) if s.len() != teams.len() => {
            return Err(RatingError::InvalidInput {
                message: format!(
                    "scores has length {} but there are {} teams",
                    s.len(),
                    teams.len()
                ),
            });
        }
        _ => {}
    }
    if let Some(w) = weights {
        if w.len() != teams.len() {
            return Err(RatingError::InvalidInput {
                message: format!(
                    "weights has {} rows but there are {} teams",
                    w.len(),
                    teams.len()
                ),
            });
        }
        for (i, (row, team)) in w.iter().zip(teams.iter()).enumerate() {
            if row.len() != team.len() {
                return Err(RatingError::InvalidInput {
                    message: format!(
                        "weights row {i} has {} entries but team {i} has {} players",
                        row.len(),
                        team.len()
                    ),
                });
            }
        }
    }
    Ok(())
}

/// Run the shared pre-processing contract (§4.2.1, steps 1-5) on a single
/// game, leaving the model-specific compute (step 6) to the caller.
pub(crate) fn prepare(
    teams: &[Vec<Rating>],
    outcome: Option<&Outcome>,
    weights: Option<&[Vec<f64>]>,
    tau: f64,
    balance: bool,
    kappa: f64,
    weight_lo: f64,
    weight_hi: f64,
) -> Result<PreparedGame, RatingError> {
    validate(teams, outcome, weights)?;

    let sigma_snapshot: Vec<Vec<f64>> = teams
        .iter()
        .map(|team| team.iter().map(|r| r.sigma).collect())
        .collect();

    let tau_inflated: Vec<Vec<Rating>> = teams
        .iter()
        .map(|team| {
            team.iter()
                .map(|r| Rating::new(r.mu, (r.sigma * r.sigma + tau * tau).sqrt(), r.name.clone()))
                .collect()
        })
        .collect();

    let ranks: Vec<f64> = match outcome {
        Some(Outcome::Ranks(r)) => r.clone(),
        Some(Outcome::Scores(s)) => {
            let negated: Vec<f64> = s.iter().map(|&x| -x).collect();
            rank_data(&negated).into_iter().map(|r| r as f64).collect()
        }
        None => (0..teams.len()).map(|i| i as f64).collect(),
    };

    let normalized_weights: Option<Vec<Vec<f64>>> = weights.map(|w| {
        w.iter()
            .map(|row| weight_bounds(row, weight_lo, weight_hi))
            .collect()
    });

    let order = argsort(&ranks);
    let tenet = order.clone();

    let teams_sorted: Vec<Vec<Rating>> = order.iter().map(|&i| tau_inflated[i].clone()).collect();
    let ranks_sorted: Vec<f64> = order.iter().map(|&i| ranks[i]).collect();
    let weights_sorted = normalized_weights.map(|w| {
        order.iter().map(|&i| w[i].clone()).collect::<Vec<_>>()
    });
    let aggs_sorted: Vec<TeamAgg> = teams_sorted
        .iter()
        .map(|team| aggregate_team(team, balance, kappa))
        .collect();

    Ok(PreparedGame {
        teams_sorted,
        aggs_sorted,
        ranks_sorted,
        weights_sorted,
        tenet,
        sigma_snapshot,
    })
}

/// Apply per-player `(omega, delta)` for every rank-sorted team (§4.2.1
/// step 6 formula, steps 6-7 of post-processing), producing output teams
/// in the caller's original order.
pub(crate) fn finalize(
    prepared: &PreparedGame,
    omega_delta: &[(f64, f64)],
    kappa: f64,
    limit_sigma: bool,
) -> Vec<Vec<Rating>> {
    let n = prepared.teams_sorted.len();
    let mut sorted_output: Vec<Vec<Rating>> = Vec::with_capacity(n);

    for i in 0..n {
        let team = &prepared.teams_sorted[i];
        let agg = prepared.aggs_sorted[i];
        let (omega, delta) = omega_delta[i];
        let weights_row = prepared.weights_sorted.as_ref().map(|w| &w[i]);

        let mut out_team = Vec::with_capacity(team.len());
        for (j, player) in team.iter().enumerate() {
            let weight_factor = match weights_row {
                None => 1.0,
                Some(row) => {
                    if omega > 0.0 {
                        row[j]
                    } else {
                        1.0 / row[j]
                    }
                }
            };
            let share = player.sigma * player.sigma / agg.sigma_sq;
            let mu_new = player.mu + share * omega * weight_factor;
            let shrink = (1.0 - share * delta * weight_factor).max(kappa);
            let sigma_new = player.sigma * shrink.sqrt();
            out_team.push(Rating::new(mu_new, sigma_new, player.name.clone()));
        }
        sorted_output.push(out_team);
    }

    let mut output: Vec<Vec<Rating>> = vec![Vec::new(); n];
    for (sorted_pos, &orig_pos) in prepared.tenet.iter().enumerate() {
        output[orig_pos] = std::mem::take(&mut sorted_output[sorted_pos]);
    }

    if limit_sigma {
        for (i, team) in output.iter_mut().enumerate() {
            for (j, player) in team.iter_mut().enumerate() {
                player.sigma = player.sigma.min(prepared.sigma_snapshot[i][j]);
            }
        }
    }

    output
}

/// Convenience used by `predict_*`: sum mu and sigma² across a team
/// without tau injection or balance re-weighting.
pub(crate) fn plain_aggregate(team: &[Rating]) -> TeamAgg {
    TeamAgg {
        mu: team.iter().map(|r| r.mu).sum(),
        sigma_sq: team.iter().map(|r| r.sigma * r.sigma).sum(),
    }
}
