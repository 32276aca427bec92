//! The shared [`Rating`] value type and per-model [`ModelConfig`].

use std::fmt;
use std::sync::Arc;

use crate::numerics::ordinal;

/// A Gaussian belief over one player's latent skill.
///
/// Comparisons (`==`, `<`, ...) are defined via [`Rating::ordinal`] with the
/// default `z = 3`, matching the crate-wide convention that ordinal is the
/// single-number summary of a rating.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rating {
    /// Mean of the belief distribution.
    pub mu: f64,
    /// Standard deviation of the belief distribution.
    pub sigma: f64,
    /// Optional human-readable label, carried through updates unchanged.
    pub name: Option<String>,
}

impl Rating {
    /// Construct a rating directly from its components.
    #[must_use]
    pub const fn new(mu: f64, sigma: f64, name: Option<String>) -> Self {
        Self { mu, sigma, name }
    }

    /// The single-scalar conservative skill estimate, `α·((μ − z·σ) + target/α)`.
    #[must_use]
    pub fn ordinal(&self, z: f64, alpha: f64, target: f64) -> f64 {
        ordinal(self.mu, self.sigma, z, alpha, target)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rating(mu={:.4}, sigma={:.4})", self.mu, self.sigma)
    }
}

impl PartialEq for Rating {
    fn eq(&self, other: &Self) -> bool {
        self.ordinal(3.0, 1.0, 0.0) == other.ordinal(3.0, 1.0, 0.0)
    }
}

impl PartialOrd for Rating {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.ordinal(3.0, 1.0, 0.0)
            .partial_cmp(&other.ordinal(3.0, 1.0, 0.0))
    }
}

/// Arguments passed to a custom [`Gamma`] function.
#[derive(Clone, Debug)]
pub struct GammaArgs<'a> {
    /// `c_iq`, the combined-variance normaliser for this opponent pair (or,
    /// for Plackett-Luce, the single global denominator).
    pub c: f64,
    /// Number of teams in the game.
    pub k: usize,
    /// This team's aggregated mean.
    pub mu_i: f64,
    /// This team's aggregated variance (post-tau).
    pub sigma_i_sq: f64,
    /// This team's ratings, in rank-sorted order.
    pub team: &'a [Rating],
    /// This team's rank (0-based, competition ranking).
    pub rank: usize,
    /// This team's per-player weights, if any were supplied.
    pub weights: Option<&'a [f64]>,
}

/// The variance-shrink tuning function `γ(c, k, μ_i, σ_i², team, rank, weights?) → f64`.
///
/// Defaults to `σ_i / c`. A caller-supplied [`Gamma::Custom`] wraps a plain
/// closure: the batch engine and registry run entirely in-process, so a
/// `Send + Sync` closure is sufficient and no trait-object-per-model-type
/// machinery is needed.
#[derive(Clone)]
pub enum Gamma {
    /// The default `σ_i / c` factor used by every model unless overridden.
    Default,
    /// A user-supplied override.
    Custom(Arc<dyn Fn(&GammaArgs) -> f64 + Send + Sync>),
}

impl Gamma {
    /// Evaluate this gamma function.
    #[must_use]
    pub fn eval(&self, args: &GammaArgs) -> f64 {
        match self {
            Self::Default => args.sigma_i_sq.sqrt() / args.c,
            Self::Custom(f) => f(args),
        }
    }
}

impl fmt::Debug for Gamma {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "Gamma::Default"),
            Self::Custom(_) => write!(f, "Gamma::Custom(..)"),
        }
    }
}

impl Default for Gamma {
    fn default() -> Self {
        Self::Default
    }
}

/// Immutable, shareable configuration for a rating-update model.
///
/// One instance is typically constructed once and shared (by reference, or
/// cheaply cloned) across any number of concurrent `rate()` calls — nothing
/// here is mutated after construction.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelConfig {
    /// Default mean for newly created ratings.
    pub mu: f64,
    /// Default standard deviation for newly created ratings.
    pub sigma: f64,
    /// Performance-variability hyperparameter.
    pub beta: f64,
    /// Floor for the variance-shrink factor before the square root.
    pub kappa: f64,
    /// Additive-dynamics parameter, added in quadrature to σ before each update.
    pub tau: f64,
    /// If true, σ is clipped so it never grows across an update.
    pub limit_sigma: bool,
    /// If true, team aggregation is re-weighted toward the strongest member.
    pub balance: bool,
    /// Tie-margin parameter used by the Thurstone-Mosteller models.
    pub margin: f64,
    /// The `[lo, hi]` range per-player contribution weights are rescaled into.
    pub weight_bounds: (f64, f64),
    /// The variance-shrink tuning function. Not serialisable: a custom
    /// closure has no data representation, so this field is skipped by
    /// `serde` and resets to [`Gamma::Default`] on deserialisation.
    #[cfg_attr(feature = "serde", serde(skip, default))]
    pub gamma: Gamma,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let mu = 25.0;
        let sigma = mu / 3.0;
        Self {
            mu,
            sigma,
            beta: sigma / 2.0,
            kappa: 0.0001,
            tau: mu / 300.0,
            limit_sigma: false,
            balance: false,
            margin: 0.0001,
            weight_bounds: (1.0, 2.0),
            gamma: Gamma::Default,
        }
    }
}
