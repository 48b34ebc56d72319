//! Two-sample non-parametric tests
//!
//! Both tests are two-sided and depend only on the multiset of values in each
//! sample, so row order within a group never changes a result.

use serde::Serialize;

use crate::error::{CohortError, Result};

/// Largest sample size for which the Mann-Whitney exact distribution is used
const MWU_EXACT_MAX: usize = 8;

/// Largest `n1 * n2` for which the Kolmogorov-Smirnov p-value is exact
const KS_EXACT_MAX_PRODUCT: usize = 10_000;

/// A test statistic and its two-sided p-value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TestResult {
    pub statistic: f64,
    pub p_value: f64,
}

fn check_samples(x: &[f64], y: &[f64]) -> Result<()> {
    if x.is_empty() || y.is_empty() {
        return Err(CohortError::EmptySample {
            left: x.len(),
            right: y.len(),
        });
    }
    Ok(())
}

/// Mann-Whitney U test
///
/// The statistic is `U` of the first sample. Without ties and with both
/// samples of at most 8 values the p-value comes from the exact null
/// distribution; otherwise from the normal approximation with tie and
/// continuity correction.
#[allow(clippy::cast_precision_loss)]
pub fn mann_whitney_u(x: &[f64], y: &[f64]) -> Result<TestResult> {
    check_samples(x, y)?;
    let (n1, n2) = (x.len(), y.len());

    let pooled = x.iter().chain(y).copied().collect::<Vec<_>>();
    let (ranks, tie_term) = rank_with_ties(&pooled);
    let r1 = ranks[..n1].iter().sum::<f64>();

    let (n1f, n2f) = (n1 as f64, n2 as f64);
    let u1 = r1 - n1f * (n1f + 1.0) / 2.0;
    let u2 = n1f * n2f - u1;
    let u = u1.max(u2);

    let p_value = if n1 <= MWU_EXACT_MAX && n2 <= MWU_EXACT_MAX && tie_term == 0.0 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let u = u.round() as usize;
        2.0 * mwu_exact_sf(n1, n2, u)
    } else {
        let n = n1f + n2f;
        let sigma = (n1f * n2f / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)))).sqrt();
        if sigma > 0.0 {
            let z = (u - n1f * n2f / 2.0 - 0.5) / sigma;
            2.0 * normal_sf(z)
        } else {
            1.0
        }
    };

    Ok(TestResult {
        statistic: u1,
        p_value: p_value.clamp(0.0, 1.0),
    })
}

/// Two-sample Kolmogorov-Smirnov test
///
/// The statistic is the largest distance between the two empirical CDFs.
/// For `n1 * n2 <= 10 000` the p-value is exact (lattice path counting),
/// otherwise the asymptotic Kolmogorov distribution is used.
#[allow(clippy::cast_precision_loss)]
pub fn ks_2samp(x: &[f64], y: &[f64]) -> Result<TestResult> {
    check_samples(x, y)?;
    let (n1, n2) = (x.len(), y.len());

    let mut x = x.to_vec();
    let mut y = y.to_vec();
    x.sort_by(f64::total_cmp);
    y.sort_by(f64::total_cmp);

    // Distances are kept as integers `|i * n2 - j * n1|` so the exact
    // p-value compares lattice points without rounding.
    let (mut i, mut j, mut max_gap) = (0, 0, 0);
    while i < n1 || j < n2 {
        let next = match (x.get(i), y.get(j)) {
            (Some(&a), Some(&b)) => a.min(b),
            (Some(&a), None) => a,
            (None, Some(&b)) => b,
            (None, None) => break,
        };
        while i < n1 && x[i] <= next {
            i += 1;
        }
        while j < n2 && y[j] <= next {
            j += 1;
        }
        max_gap = max_gap.max((i * n2).abs_diff(j * n1));
    }

    let statistic = max_gap as f64 / (n1 * n2) as f64;
    let p_value = if n1 * n2 <= KS_EXACT_MAX_PRODUCT {
        ks_exact_sf(n1, n2, max_gap)
    } else {
        let en = (n1 * n2) as f64 / (n1 + n2) as f64;
        let root = en.sqrt();
        kolmogorov_sf((root + 0.12 + 0.11 / root) * statistic)
    };

    Ok(TestResult {
        statistic,
        p_value: p_value.clamp(0.0, 1.0),
    })
}

/// Mid-ranks (1-based) and the tie term `sum(t^3 - t)` over tie groups
#[allow(clippy::cast_precision_loss)]
fn rank_with_ties(values: &[f64]) -> (Vec<f64>, f64) {
    let mut order = (0..values.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut tie_term = 0.0;
    let mut start = 0;
    while start < order.len() {
        let mut end = start;
        while end + 1 < order.len() && values[order[end + 1]] == values[order[start]] {
            end += 1;
        }
        let rank = (start + end) as f64 / 2.0 + 1.0;
        for &idx in &order[start..=end] {
            ranks[idx] = rank;
        }
        let t = (end - start + 1) as f64;
        tie_term += t * t * t - t;
        start = end + 1;
    }
    (ranks, tie_term)
}

/// `P(U >= u)` under the null for samples of size `n1` and `n2` without ties
#[allow(clippy::cast_precision_loss)]
fn mwu_exact_sf(n1: usize, n2: usize, u: usize) -> f64 {
    // counts[i][j][k]: orderings of i and j values where U of the first is k
    let mut counts = vec![vec![Vec::<u64>::new(); n2 + 1]; n1 + 1];
    for i in 0..=n1 {
        for j in 0..=n2 {
            let mut dist = vec![0u64; i * j + 1];
            if i == 0 || j == 0 {
                dist[0] = 1;
            } else {
                for (k, &c) in counts[i - 1][j].iter().enumerate() {
                    dist[k + j] += c;
                }
                for (k, &c) in counts[i][j - 1].iter().enumerate() {
                    dist[k] += c;
                }
            }
            counts[i][j] = dist;
        }
    }

    let dist = &counts[n1][n2];
    let total = dist.iter().sum::<u64>() as f64;
    let upper = dist.iter().skip(u).sum::<u64>() as f64;
    upper / total
}

/// `P(D >= observed)` by walking the lattice of merge orders
///
/// Every merge order of the two samples is equally likely under the null.
/// `inside[i][j]` is the probability of reaching `(i, j)` without touching a
/// point whose gap reaches `max_gap`.
#[allow(clippy::cast_precision_loss)]
fn ks_exact_sf(n1: usize, n2: usize, max_gap: usize) -> f64 {
    let n = (n1 + n2) as f64;
    let mut inside = vec![vec![0.0_f64; n2 + 1]; n1 + 1];
    for i in 0..=n1 {
        for j in 0..=n2 {
            if (i * n2).abs_diff(j * n1) >= max_gap {
                continue;
            }
            if i == 0 && j == 0 {
                inside[i][j] = 1.0;
                continue;
            }
            let remaining = n - (i + j) as f64 + 1.0;
            let mut p = 0.0;
            if i > 0 {
                p += inside[i - 1][j] * (n1 - i + 1) as f64 / remaining;
            }
            if j > 0 {
                p += inside[i][j - 1] * (n2 - j + 1) as f64 / remaining;
            }
            inside[i][j] = p;
        }
    }
    1.0 - inside[n1][n2]
}

/// Survival function of the limiting Kolmogorov distribution
#[allow(clippy::cast_precision_loss)]
fn kolmogorov_sf(lambda: f64) -> f64 {
    if lambda < 1e-3 {
        return 1.0;
    }
    let a2 = -2.0 * lambda * lambda;
    let mut sign = 2.0;
    let mut sum = 0.0;
    let mut previous = 0.0;
    for k in 1..=100 {
        let k = f64::from(k);
        let term = sign * (a2 * k * k).exp();
        sum += term;
        if term.abs() <= 1e-10 * previous || term.abs() <= 1e-16 * sum {
            return sum;
        }
        sign = -sign;
        previous = term.abs();
    }
    // The series only fails to converge for tiny lambda, where the
    // distribution is 1.
    1.0
}

/// Upper tail of the standard normal distribution
pub(crate) fn normal_sf(z: f64) -> f64 {
    0.5 * erfc(z / std::f64::consts::SQRT_2)
}

/// Complementary error function, fractional error below 1.2e-7
fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -z * z - 1.265_512_23
        + t * (1.000_023_68
            + t * (0.374_091_96
                + t * (0.096_784_18
                    + t * (-0.186_288_06
                        + t * (0.278_868_07
                            + t * (-1.135_203_98
                                + t * (1.488_515_87 + t * (-0.822_152_23 + t * 0.170_872_77))))))));
    let ans = t * poly.exp();
    if x >= 0.0 { ans } else { 2.0 - ans }
}
