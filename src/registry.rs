//! The in-place rating registry (§4.5): two contiguous arrays backing
//! every entity's belief, avoiding a per-game allocation once a
//! population of players has stabilised.

use std::collections::HashMap;

use crate::batch::{partition_waves, Game};
use crate::error::RatingError;
use crate::numerics::ordinal;
use crate::rating::Rating;
use crate::{Outcome, RatingModel};

/// Default fixed capacity, matching the reference engine's working-set
/// bound (two `f64` arrays of this length is 256 KB).
pub const DEFAULT_CAPACITY: usize = 16_000;

/// A read-through handle into one entity's live `(mu, sigma)` slot.
///
/// Borrowing a handle keeps the registry borrowed immutably for the
/// handle's lifetime, so the borrow checker itself enforces "no mutation
/// while a flyweight is outstanding".
pub struct RatingHandle<'a> {
    mus: &'a [f64],
    sigmas: &'a [f64],
    idx: usize,
}

impl RatingHandle<'_> {
    /// Current mean.
    #[must_use]
    pub fn mu(&self) -> f64 {
        self.mus[self.idx]
    }

    /// Current standard deviation.
    #[must_use]
    pub fn sigma(&self) -> f64 {
        self.sigmas[self.idx]
    }

    /// Conservative skill estimate, read live from the backing arrays.
    #[must_use]
    pub fn ordinal(&self, z: f64) -> f64 {
        ordinal(self.mu(), self.sigma(), z, 1.0, 0.0)
    }
}

/// A fixed-capacity, contiguous-array store of entity ratings, with
/// fast-path single-game and batch updates applied directly in place.
pub struct Registry<M: RatingModel + Sync> {
    model: M,
    capacity: usize,
    mus: Vec<f64>,
    sigmas: Vec<f64>,
    index: HashMap<String, usize>,
}

impl<M: RatingModel + Sync> Registry<M> {
    /// Construct an empty registry with the given fixed capacity.
    #[must_use]
    pub fn new(model: M, capacity: usize) -> Self {
        Self {
            model,
            capacity,
            mus: Vec::with_capacity(capacity),
            sigmas: Vec::with_capacity(capacity),
            index: HashMap::new(),
        }
    }

    /// Construct a registry with [`DEFAULT_CAPACITY`].
    #[must_use]
    pub fn with_default_capacity(model: M) -> Self {
        Self::new(model, DEFAULT_CAPACITY)
    }

    fn register(&mut self, id: &str, mu: f64, sigma: f64) -> Result<usize, RatingError> {
        if let Some(&idx) = self.index.get(id) {
            return Ok(idx);
        }
        if self.mus.len() >= self.capacity {
            return Err(RatingError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        let idx = self.mus.len();
        self.mus.push(mu);
        self.sigmas.push(sigma);
        self.index.insert(id.to_string(), idx);
        Ok(idx)
    }

    /// Look up `id`, auto-registering it with the model's default rating
    /// if it has not been seen before.
    ///
    /// # Errors
    /// Returns [`RatingError::CapacityExceeded`] if `id` is new and the
    /// registry is already full.
    pub fn get(&mut self, id: &str) -> Result<RatingHandle<'_>, RatingError> {
        let (default_mu, default_sigma) = {
            let cfg = self.model.config();
            (cfg.mu, cfg.sigma)
        };
        let idx = self.register(id, default_mu, default_sigma)?;
        Ok(RatingHandle {
            mus: &self.mus,
            sigmas: &self.sigmas,
            idx,
        })
    }

    /// Register `id` with explicit values (defaulting any field left
    /// unset to the model's default), or overwrite an existing entry.
    ///
    /// # Errors
    /// Returns [`RatingError::CapacityExceeded`] if `id` is new and the
    /// registry is already full.
    pub fn add(&mut self, id: &str, mu: Option<f64>, sigma: Option<f64>) -> Result<(), RatingError> {
        let cfg = self.model.config();
        let mu = mu.unwrap_or(cfg.mu);
        let sigma = sigma.unwrap_or(cfg.sigma);
        if let Some(&idx) = self.index.get(id) {
            self.mus[idx] = mu;
            self.sigmas[idx] = sigma;
            return Ok(());
        }
        self.register(id, mu, sigma)?;
        Ok(())
    }

    /// Snapshot every entity currently held, as `id -> (mu, sigma)`.
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, (f64, f64)> {
        self.index
            .iter()
            .map(|(id, &idx)| (id.clone(), (self.mus[idx], self.sigmas[idx])))
            .collect()
    }

    /// Run one game's fast-path update directly against the backing
    /// arrays (§4.4 "Game execution").
    ///
    /// # Errors
    /// Returns [`RatingError::CapacityExceeded`] if a new entity would
    /// overflow capacity, or [`RatingError::InvalidInput`] if the game is
    /// malformed.
    pub fn rate(
        &mut self,
        teams: &[Vec<String>],
        outcome: Option<&Outcome>,
        weights: Option<&[Vec<f64>]>,
    ) -> Result<(), RatingError> {
        let (default_mu, default_sigma) = {
            let cfg = self.model.config();
            (cfg.mu, cfg.sigma)
        };
        let mut indices: Vec<Vec<usize>> = Vec::with_capacity(teams.len());
        for team in teams {
            let mut row = Vec::with_capacity(team.len());
            for id in team {
                row.push(self.register(id, default_mu, default_sigma)?);
            }
            indices.push(row);
        }

        let rating_teams: Vec<Vec<Rating>> = indices
            .iter()
            .zip(teams.iter())
            .map(|(idx_row, id_row)| {
                idx_row
                    .iter()
                    .zip(id_row.iter())
                    .map(|(&idx, id)| Rating::new(self.mus[idx], self.sigmas[idx], Some(id.clone())))
                    .collect()
            })
            .collect();

        let updated = self.model.rate(&rating_teams, outcome, weights, None, None)?;

        for (idx_row, updated_team) in indices.iter().zip(updated.iter()) {
            for (&idx, rating) in idx_row.iter().zip(updated_team.iter()) {
                self.mus[idx] = rating.mu;
                self.sigmas[idx] = rating.sigma;
            }
        }
        Ok(())
    }

    /// Wave-partition `games` and apply every update in place, wave by
    /// wave. Sequential by construction: this is one valid interleaving
    /// of the disjoint-wave guarantee the spec requires every execution
    /// mode to agree on.
    ///
    /// # Errors
    /// Returns [`RatingError::CapacityExceeded`] if a new entity would
    /// overflow capacity, or [`RatingError::InvalidInput`] if any game is
    /// malformed.
    pub fn rate_batch(&mut self, games: &[Game]) -> Result<(), RatingError> {
        let (default_mu, default_sigma) = {
            let cfg = self.model.config();
            (cfg.mu, cfg.sigma)
        };
        for game in games {
            for team in &game.teams {
                for id in team {
                    self.register(id, default_mu, default_sigma)?;
                }
            }
        }

        let waves = partition_waves(games);
        for wave in &waves {
            for &gi in wave {
                let game = &games[gi];
                let outcome = match (&game.ranks, &game.scores) {
                    (Some(r), None) => Some(Outcome::Ranks(r.clone())),
                    (None, Some(s)) => Some(Outcome::Scores(s.clone())),
                    (None, None) => None,
                    (Some(_), Some(_)) => {
                        return Err(RatingError::InvalidInput {
                            message: "a game cannot supply both ranks and scores".to_string(),
                        })
                    }
                };
                self.rate(&game.teams, outcome.as_ref(), game.weights.as_deref())?;
            }
        }
        Ok(())
    }
}
