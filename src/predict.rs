//! The prediction algorithms (§4.3): win/draw/rank probabilities, shared
//! by all five models since they depend only on aggregated team `(μ, σ²)`
//! and the model's `β` — not on which update rule produced them.

use crate::error::RatingError;
use crate::numerics::{phi_major, phi_major_inverse, rank_data};
use crate::rating::Rating;
use crate::team::plain_aggregate;

fn validate_teams(teams: &[Vec<Rating>]) -> Result<(), RatingError> {
    if teams.len() < 2 {
        return Err(RatingError::InvalidInput {
            message: format!("prediction requires at least two teams, got {}", teams.len()),
        });
    }
    for (i, team) in teams.iter().enumerate() {
        if team.is_empty() {
            return Err(RatingError::InvalidInput {
                message: format!("team {i} is empty"),
            });
        }
    }
    Ok(())
}

/// Probability of each team winning outright (no draw).
///
/// # Errors
/// Returns [`RatingError::InvalidInput`] if fewer than two teams are given.
pub fn predict_win(teams: &[Vec<Rating>], beta: f64) -> Result<Vec<f64>, RatingError> {
    validate_teams(teams)?;
    let n = teams.len();
    let aggs: Vec<_> = teams.iter().map(|t| plain_aggregate(t)).collect();

    if n == 2 {
        let total_players: usize = teams.iter().map(Vec::len).sum();
        let denom = (total_players as f64 * beta * beta + aggs[0].sigma_sq + aggs[1].sigma_sq).sqrt();
        let p_a = phi_major((aggs[0].mu - aggs[1].mu) / denom);
        return Ok(vec![p_a, 1.0 - p_a]);
    }

    let mut scores = vec![0.0; n];
    for (a, agg_a) in aggs.iter().enumerate() {
        let mut sum = 0.0;
        for (b, agg_b) in aggs.iter().enumerate() {
            if a == b {
                continue;
            }
            let denom = (n as f64 * beta * beta + agg_a.sigma_sq + agg_b.sigma_sq).sqrt();
            sum += phi_major((agg_a.mu - agg_b.mu) / denom);
        }
        scores[a] = sum / (n - 1) as f64;
    }
    let total: f64 = scores.iter().sum();
    Ok(scores.iter().map(|&s| s / total).collect())
}

/// Probability that the game ends in a draw.
///
/// # Errors
/// Returns [`RatingError::InvalidInput`] if fewer than two teams are given.
pub fn predict_draw(teams: &[Vec<Rating>], beta: f64) -> Result<f64, RatingError> {
    validate_teams(teams)?;
    let n = teams.len();
    let total_players: usize = teams.iter().map(Vec::len).sum();
    let total_players = total_players as f64;
    let aggs: Vec<_> = teams.iter().map(|t| plain_aggregate(t)).collect();

    let p_draw = 1.0 / total_players;
    let draw_margin = total_players.sqrt() * beta * phi_major_inverse((1.0 + p_draw) / 2.0);

    let mut sum = 0.0;
    let mut pairs = 0usize;
    for (a, agg_a) in aggs.iter().enumerate() {
        for (b, agg_b) in aggs.iter().enumerate() {
            if a == b {
                continue;
            }
            let denom = (n as f64 * beta * beta + agg_a.sigma_sq + agg_b.sigma_sq).sqrt();
            let diff = agg_a.mu - agg_b.mu;
            sum += phi_major((draw_margin - diff) / denom) - phi_major((-draw_margin - diff) / denom);
            pairs += 1;
        }
    }
    Ok(sum / pairs as f64)
}

/// Competition-ranked, per-team win-probability prediction, aligned to
/// the caller's original team order.
///
/// # Errors
/// Returns [`RatingError::InvalidInput`] if fewer than two teams are given.
pub fn predict_rank(teams: &[Vec<Rating>], beta: f64) -> Result<Vec<(usize, f64)>, RatingError> {
    validate_teams(teams)?;
    let n = teams.len();
    let aggs: Vec<_> = teams.iter().map(|t| plain_aggregate(t)).collect();

    let mut beat_prob = vec![0.0; n];
    for (i, agg_i) in aggs.iter().enumerate() {
        let mut sum = 0.0;
        for (j, agg_j) in aggs.iter().enumerate() {
            if i == j {
                continue;
            }
            let denom = (n as f64 * beta * beta + agg_i.sigma_sq + agg_j.sigma_sq).sqrt();
            sum += phi_major((agg_i.mu - agg_j.mu) / denom);
        }
        beat_prob[i] = sum;
    }
    let total: f64 = beat_prob.iter().sum();
    let normalized: Vec<f64> = beat_prob.iter().map(|&p| p / total).collect();

    // Higher probability should earn a better (lower) rank, so rank the
    // negated probabilities with the same competition-ranking rule used
    // elsewhere in the kernel.
    let negated: Vec<f64> = normalized.iter().map(|&p| -p).collect();
    let ranks = rank_data(&negated);

    Ok(ranks
        .into_iter()
        .zip(normalized)
        .collect())
}
