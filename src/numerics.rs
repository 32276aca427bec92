//! Scalar primitives shared by every rating-update model: the standard
//! normal CDF/PDF/inverse-CDF, the Weng-Lin correction functions `v`, `w`,
//! `vt`, `wt`, and small utilities (argsort, competition ranking, ladder
//! pairs, weight rescaling).
//!
//! Every function here is pure and deterministic: same inputs produce the
//! same bit pattern on the same platform. There is no failure mode — the
//! epsilon-machine fallbacks below make every function total.

use std::f64::consts::FRAC_1_SQRT_2;

/// `f64::EPSILON`-scale floor used where the reference falls back to avoid
/// dividing by (near) zero.
const EPS_MACH: f64 = f64::EPSILON;

/// Standard normal cumulative distribution function, `Φ(x)`.
#[must_use]
pub fn phi_major(x: f64) -> f64 {
    0.5 * erfc(-x * FRAC_1_SQRT_2)
}

/// Standard normal probability density function, `φ(x)`.
#[must_use]
pub fn phi_minor(x: f64) -> f64 {
    const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;
    FRAC_1_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Inverse standard normal CDF, `Φ⁻¹(p)`, for `p ∈ (0, 1)`.
///
/// Uses Acklam's rational approximation followed by one step of Halley's
/// method, which gives full `f64` precision without pulling in a
/// special-functions dependency for a single call site.
#[must_use]
pub fn phi_major_inverse(p: f64) -> f64 {
    debug_assert!(p > 0.0 && p < 1.0, "phi_major_inverse requires p in (0, 1)");

    // Coefficients for Acklam's algorithm.
    const A: [f64; 6] = [
        -3.969_683_028_665_376e+01,
        2.209_460_984_245_205e+02,
        -2.759_285_104_469_687e+02,
        1.383_577_518_672_690e+02,
        -3.066_479_806_614_716e+01,
        2.506_628_277_459_239e+00,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e+01,
        1.615_858_368_580_409e+02,
        -1.556_989_798_598_866e+02,
        6.680_131_188_771_972e+01,
        -1.328_068_155_288_572e+01,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-03,
        -3.223_964_580_411_365e-01,
        -2.400_758_277_161_838e+00,
        -2.549_732_539_343_734e+00,
        4.374_664_141_464_968e+00,
        2.938_163_982_698_783e+00,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-03,
        3.224_671_290_700_398e-01,
        2.445_134_137_142_996e+00,
        3.754_408_661_907_416e+00,
    ];

    const P_LOW: f64 = 0.024_25;
    const P_HIGH: f64 = 1.0 - P_LOW;

    let x = if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= P_HIGH {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };

    // One Halley step to polish the rational approximation to full
    // double precision.
    let e = 0.5 * erfc(-x * FRAC_1_SQRT_2) - p;
    let u = e * (2.0 * std::f64::consts::PI).sqrt() * (x * x / 2.0).exp();
    x - u / (1.0 + x * u / 2.0)
}

/// Complementary error function, via Abramowitz & Stegun 7.1.26.
fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = t
        * (-z * z - 1.265_512_23
            + t * (1.000_023_68
                + t * (0.374_091_96
                    + t * (0.096_784_18
                        + t * (-0.186_288_06
                            + t * (0.278_868_07
                                + t * (-1.135_203_98
                                    + t * (1.488_515_87
                                        + t * (-0.822_152_23 + t * 0.170_872_77)))))))))
        .exp();
    if x >= 0.0 {
        poly
    } else {
        2.0 - poly
    }
}

/// The function `v(x, t)` from Weng & Lin (2011), used by Bradley-Terry's
/// dual (the win-margin correction for Thurstone-Mosteller).
#[must_use]
pub fn v(x: f64, t: f64) -> f64 {
    let xt = x - t;
    let denom = phi_major(xt);
    if denom < EPS_MACH {
        -xt
    } else {
        phi_minor(xt) / denom
    }
}

/// The function `w(x, t)` from Weng & Lin (2011).
#[must_use]
pub fn w(x: f64, t: f64) -> f64 {
    let xt = x - t;
    let denom = phi_major(xt);
    if denom < EPS_MACH {
        if x < 0.0 { 1.0 } else { 0.0 }
    } else {
        v(x, t) * (v(x, t) + xt)
    }
}

/// The symmetric (tie) variant `ṽ(x, t)`.
#[must_use]
pub fn vt(x: f64, t: f64) -> f64 {
    let xx = x.abs();
    let b = phi_major(t - xx) - phi_major(-t - xx);
    if b < 1e-5 {
        return if x < 0.0 { -x - t } else { -x + t };
    }
    let a = phi_minor(-t - xx) - phi_minor(t - xx);
    (if x < 0.0 { -a } else { a }) / b
}

/// The symmetric (tie) variant `w̃(x, t)`.
#[must_use]
pub fn wt(x: f64, t: f64) -> f64 {
    let xx = x.abs();
    let b = phi_major(t - xx) - phi_major(-t - xx);
    if b < EPS_MACH {
        return 1.0;
    }
    ((t - xx) * phi_minor(t - xx) + (t + xx) * phi_minor(-t - xx)) / b + vt(x, t) * vt(x, t)
}

/// Indices that would sort `v` ascending (stable on ties).
#[must_use]
pub fn argsort(v: &[f64]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..v.len()).collect();
    idx.sort_by(|&a, &b| v[a].total_cmp(&v[b]));
    idx
}

/// Competition ranking (1, 1, 3, 4, ...) of `v`, 0-based: the lowest value
/// gets ordinal 0, ties share an ordinal, and the next distinct value
/// jumps by the tie count. Mirrors `scipy.stats.rankdata(method="min")`
/// shifted to 0-based indices.
#[must_use]
pub fn rank_data(v: &[f64]) -> Vec<usize> {
    let order = argsort(v);
    let n = v.len();
    let mut ranks = vec![0usize; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && v[order[j + 1]] == v[order[i]] {
            j += 1;
        }
        for &pos in &order[i..=j] {
            ranks[pos] = i;
        }
        i = j + 1;
    }
    ranks
}

/// The ordinal summary `α · ((μ − z·σ) + target/α)`, used both for sorting
/// and for exposing a single skill number to callers.
#[must_use]
pub fn ordinal(mu: f64, sigma: f64, z: f64, alpha: f64, target: f64) -> f64 {
    alpha * ((mu - z * sigma) + target / alpha)
}

/// Affine-rescale `w` onto `[lo, hi]`. If every element is equal, returns
/// an all-`hi` vector rather than dividing by zero — matching the
/// reference's `_normalize` behaviour exactly.
#[must_use]
pub fn weight_bounds(w: &[f64], lo: f64, hi: f64) -> Vec<f64> {
    let min = w.iter().copied().fold(f64::INFINITY, f64::min);
    let max = w.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if (max - min).abs() < EPS_MACH {
        return vec![hi; w.len()];
    }
    w.iter()
        .map(|&x| lo + (x - min) * (hi - lo) / (max - min))
        .collect()
}

/// For each position, the set of rank-adjacent positions `{i-1, i+1}`
/// (clipped at the ends), used by the "Part" partial-pairing models.
#[must_use]
pub fn ladder_pairs(n: usize) -> Vec<Vec<usize>> {
    (0..n)
        .map(|i| {
            let mut pairs = Vec::with_capacity(2);
            if i > 0 {
                pairs.push(i - 1);
            }
            if i + 1 < n {
                pairs.push(i + 1);
            }
            pairs
        })
        .collect()
}
