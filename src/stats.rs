//! Descriptive statistics primitives shared by the analysis modules.
//!
//! All functions return `Option`: `None` signals degenerate input (empty,
//! too short, or non-finite values) rather than a panic. Callers at the
//! DataFrame level translate `None` into an [`EdaError`](crate::error::EdaError).
//!
//! # Algorithms
//!
//! - **Mean** — Kahan compensated summation.
//! - **Variance / standard deviation** — Welford's online algorithm with
//!   Bessel's correction (sample variance, denominator n − 1).
//!   Reference: Welford (1962), *Technometrics* 4(3).
//! - **Ranks** — mid-rank method: tied values receive the average of the
//!   ranks they occupy.

/// Computes the arithmetic mean using Kahan compensated summation.
///
/// Returns `None` if `data` is empty or contains non-finite values.
///
/// ```
/// use edalytics::stats::mean;
///
/// let v = [1.0, 2.0, 3.0, 4.0, 5.0];
/// assert!((mean(&v).unwrap() - 3.0).abs() < 1e-15);
/// ```
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() || data.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let mut sum = 0.0;
    let mut comp = 0.0;
    for &x in data {
        let y = x - comp;
        let t = sum + y;
        comp = (t - sum) - y;
        sum = t;
    }
    Some(sum / data.len() as f64)
}

/// Computes the sample variance (Bessel-corrected) via Welford's algorithm.
///
/// Returns `None` if fewer than 2 observations or non-finite values.
///
/// ```
/// use edalytics::stats::variance;
///
/// let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
/// assert!((variance(&v).unwrap() - 4.571428571428571).abs() < 1e-10);
/// ```
pub fn variance(data: &[f64]) -> Option<f64> {
    let n = data.len();
    if n < 2 || data.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let mut running_mean = 0.0;
    let mut m2 = 0.0;
    for (i, &x) in data.iter().enumerate() {
        let delta = x - running_mean;
        running_mean += delta / (i + 1) as f64;
        m2 += delta * (x - running_mean);
    }
    Some(m2 / (n - 1) as f64)
}

/// Computes the sample standard deviation.
///
/// Returns `None` under the same conditions as [`variance`].
pub fn std_dev(data: &[f64]) -> Option<f64> {
    variance(data).map(f64::sqrt)
}

/// Computes the sample covariance between two equal-length slices.
///
/// Returns `None` if the slices differ in length, have fewer than 2
/// observations, or contain non-finite values.
///
/// ```
/// use edalytics::stats::covariance;
///
/// let x = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let y = [2.0, 4.0, 6.0, 8.0, 10.0];
/// assert!((covariance(&x, &y).unwrap() - 5.0).abs() < 1e-10);
/// ```
pub fn covariance(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len();
    if n < 2 || n != y.len() {
        return None;
    }
    let mx = mean(x)?;
    let my = mean(y)?;
    let sum: f64 = x
        .iter()
        .zip(y.iter())
        .map(|(&a, &b)| (a - mx) * (b - my))
        .sum();
    Some(sum / (n - 1) as f64)
}

/// Assigns 1-based mid-ranks to each position of `data`.
///
/// Tied values receive the average of the ranks they would occupy,
/// the convention shared by Spearman correlation and rank-based tests.
///
/// ```
/// use edalytics::stats::mid_ranks;
///
/// let ranks = mid_ranks(&[1.0, 2.0, 2.0, 4.0]);
/// assert_eq!(ranks, vec![1.0, 2.5, 2.5, 4.0]);
/// ```
pub fn mid_ranks(data: &[f64]) -> Vec<f64> {
    let n = data.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        data[a]
            .partial_cmp(&data[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && (data[order[j]] - data[order[i]]).abs() < 1e-12 {
            j += 1;
        }
        // Positions i..j are tied; 1-based average rank = (i + 1 + j) / 2
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        for &idx in &order[i..j] {
            ranks[idx] = avg_rank;
        }
        i = j;
    }
    ranks
}

/// Computes the rank tie-correction term Σ tₖ(tₖ² − 1) over tie groups.
///
/// Used by the Mann-Whitney U variance with ties.
pub(crate) fn tie_correction(data: &[f64]) -> f64 {
    let mut sorted: Vec<f64> = data.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    let mut correction = 0.0;
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && (sorted[j] - sorted[i]).abs() < 1e-12 {
            j += 1;
        }
        let t = (j - i) as f64;
        if t > 1.0 {
            correction += t * (t * t - 1.0);
        }
        i = j;
    }
    correction
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_basic() {
        assert!((mean(&[1.0, 2.0, 3.0]).unwrap() - 2.0).abs() < 1e-15);
    }

    #[test]
    fn mean_rejects_empty_and_nan() {
        assert!(mean(&[]).is_none());
        assert!(mean(&[1.0, f64::NAN]).is_none());
        assert!(mean(&[1.0, f64::INFINITY]).is_none());
    }

    #[test]
    fn variance_known_value() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((variance(&v).unwrap() - 32.0 / 7.0).abs() < 1e-10);
    }

    #[test]
    fn variance_needs_two_points() {
        assert!(variance(&[1.0]).is_none());
    }

    #[test]
    fn std_dev_constant_is_zero() {
        assert!(std_dev(&[3.0, 3.0, 3.0]).unwrap().abs() < 1e-15);
    }

    #[test]
    fn covariance_anti_correlated() {
        let x = [1.0, 2.0, 3.0];
        let y = [3.0, 2.0, 1.0];
        assert!((covariance(&x, &y).unwrap() + 1.0).abs() < 1e-10);
    }

    #[test]
    fn covariance_length_mismatch() {
        assert!(covariance(&[1.0, 2.0], &[1.0]).is_none());
    }

    #[test]
    fn ranks_no_ties() {
        let ranks = mid_ranks(&[3.0, 1.0, 2.0]);
        assert_eq!(ranks, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn ranks_all_tied() {
        let ranks = mid_ranks(&[5.0, 5.0, 5.0]);
        assert_eq!(ranks, vec![2.0, 2.0, 2.0]);
    }

    #[test]
    fn tie_correction_no_ties_is_zero() {
        assert_eq!(tie_correction(&[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn tie_correction_single_group() {
        // One group of 3 ties: 3 * (9 - 1) = 24
        assert_eq!(tie_correction(&[1.0, 2.0, 2.0, 2.0, 5.0]), 24.0);
    }
}
