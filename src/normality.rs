//! Normality testing (NormalityClassifier).
//!
//! Two interchangeable test strategies against the null hypothesis
//! "the sample is drawn from a normal distribution":
//!
//! - **Shapiro-Wilk** — Royston's AS R94 approximation; the more
//!   powerful choice for small samples (n < 50).
//! - **Kolmogorov-Smirnov** — one-sample KS against the **standard**
//!   normal distribution (the sample is not standardized first),
//!   preferable for large samples.
//!
//! The caller selects the method; nothing auto-selects. The
//! DataFrame-level [`normality_test`] accepts the selector as a string
//! (`"shapiro"` or `"ks"`) and fails with
//! [`EdaError::UnsupportedMethod`] on anything else.
//!
//! # Example
//!
//! ```
//! use edalytics::dataframe::{Column, DataFrame, NullMask};
//! use edalytics::normality::normality_test;
//!
//! let mut df = DataFrame::new();
//! df.add_column(
//!     "metric".to_string(),
//!     Column::numeric(
//!         vec![-1.5, -1.0, -0.5, 0.0, 0.0, 0.5, 1.0, 1.5],
//!         NullMask::all_valid(8),
//!     ),
//! ).unwrap();
//!
//! let result = normality_test(&df, "metric", "ks", 0.05).unwrap();
//! assert!(result.is_normal);
//! ```

use std::str::FromStr;

use statrs::distribution::{ContinuousCDF, Normal};

use crate::dataframe::DataFrame;
use crate::error::EdaError;

// ── Method selection ──────────────────────────────────────────────────

/// Normality test strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalityMethod {
    /// Shapiro-Wilk (Royston AS R94). Preferable for small samples.
    Shapiro,
    /// One-sample Kolmogorov-Smirnov against the standard normal.
    Ks,
}

impl FromStr for NormalityMethod {
    type Err = EdaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shapiro" => Ok(Self::Shapiro),
            "ks" => Ok(Self::Ks),
            other => Err(EdaError::UnsupportedMethod {
                method: other.to_string(),
            }),
        }
    }
}

impl NormalityMethod {
    /// Returns the string selector for this method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shapiro => "shapiro",
            Self::Ks => "ks",
        }
    }
}

// ── Result types ──────────────────────────────────────────────────────

/// Result of the Shapiro-Wilk test.
#[derive(Debug, Clone, Copy)]
pub struct ShapiroWilkResult {
    /// The W statistic (0 < W ≤ 1). Values close to 1 suggest normality.
    pub w: f64,
    /// The p-value. Small values reject the null hypothesis of normality.
    pub p_value: f64,
}

/// Verdict of a DataFrame-level normality test on one metric.
#[derive(Debug, Clone)]
pub struct NormalityTest {
    /// Name of the tested metric column.
    pub metric: String,
    /// Method that produced the verdict.
    pub method: NormalityMethod,
    /// Test statistic (W for Shapiro-Wilk, D for Kolmogorov-Smirnov).
    pub statistic: f64,
    /// The p-value.
    pub p_value: f64,
    /// `true` when `p_value > alpha`: the sample looks normal.
    pub is_normal: bool,
    /// Significance level used.
    pub alpha: f64,
}

// ── Kolmogorov-Smirnov ────────────────────────────────────────────────

/// One-sample Kolmogorov-Smirnov test against the standard normal.
///
/// The sample is compared to N(0, 1) as-is, without estimating location
/// or scale, so data far from zero mean / unit variance is rejected even
/// when its shape is Gaussian.
///
/// The p-value uses the asymptotic Kolmogorov distribution with the
/// Stephens small-sample correction
/// (√n + 0.12 + 0.11/√n) · D.
///
/// # Returns
///
/// `(statistic, p_value)`, or `None` if fewer than 5 observations or
/// non-finite values.
///
/// # Examples
///
/// ```
/// use edalytics::normality::ks_test;
///
/// // Roughly standard-normal shaped
/// let data = [-1.2, -0.8, -0.3, 0.1, 0.5, 0.7, 1.1, 1.4];
/// let (_, p) = ks_test(&data).unwrap();
/// assert!(p > 0.05);
///
/// // Far from N(0, 1): strongly rejected
/// let shifted: Vec<f64> = (1..=10).map(f64::from).collect();
/// let (_, p) = ks_test(&shifted).unwrap();
/// assert!(p < 0.05);
/// ```
pub fn ks_test(data: &[f64]) -> Option<(f64, f64)> {
    let n = data.len();
    if n < 5 || data.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let normal = Normal::new(0.0, 1.0).ok()?;

    let mut sorted: Vec<f64> = data.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let nf = n as f64;
    let mut d = 0.0_f64;
    for (i, &x) in sorted.iter().enumerate() {
        let cdf = normal.cdf(x);
        let d_plus = (i + 1) as f64 / nf - cdf;
        let d_minus = cdf - i as f64 / nf;
        d = d.max(d_plus).max(d_minus);
    }

    let en = nf.sqrt();
    let p_value = kolmogorov_survival((en + 0.12 + 0.11 / en) * d);

    Some((d, p_value))
}

/// Kolmogorov distribution survival function Q(λ) = 2 Σ (−1)^{k−1} e^{−2k²λ²}.
fn kolmogorov_survival(lambda: f64) -> f64 {
    if lambda < 1e-10 {
        return 1.0;
    }
    let mut sum = 0.0;
    let mut sign = 1.0;
    for k in 1..=100 {
        let kf = k as f64;
        let term = (-2.0 * kf * kf * lambda * lambda).exp();
        sum += sign * term;
        sign = -sign;
        if term < 1e-12 {
            break;
        }
    }
    (2.0 * sum).clamp(0.0, 1.0)
}

// ── Shapiro-Wilk ──────────────────────────────────────────────────────

// Royston (1992, 1995) polynomial coefficients, AS R94.
const SW_C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.07119, 4.434685, -2.706056];
const SW_C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const SW_C3: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
const SW_C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const SW_C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const SW_C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const SW_G: [f64; 2] = [-2.273, 0.459];

// Horner evaluation of c[0] + c[1]x + c[2]x² + ...
fn sw_poly(c: &[f64], x: f64) -> f64 {
    let mut result = c[c.len() - 1];
    for i in (0..c.len() - 1).rev() {
        result = result * x + c[i];
    }
    result
}

/// Shapiro-Wilk normality test via Royston's AS R94 approximation.
///
/// Supported sample sizes: 3 ≤ n ≤ 5000.
///
/// # Returns
///
/// `None` if n is out of range, the data contains non-finite values,
/// or all values are identical.
///
/// # References
///
/// - Shapiro & Wilk (1965). "An analysis of variance test for
///   normality". Biometrika, 52(3-4), 591-611.
/// - Royston (1995). "Remark AS R94: A remark on Algorithm AS 181".
///   Applied Statistics, 44(4), 547-551.
///
/// # Examples
///
/// ```
/// use edalytics::normality::shapiro_wilk_test;
///
/// let data = [-1.5, -1.0, -0.5, 0.0, 0.5, 1.0, 1.5];
/// let r = shapiro_wilk_test(&data).unwrap();
/// assert!(r.w > 0.9);
/// assert!(r.p_value > 0.05);
/// ```
pub fn shapiro_wilk_test(data: &[f64]) -> Option<ShapiroWilkResult> {
    let n = data.len();
    if !(3..=5000).contains(&n) {
        return None;
    }
    if data.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let mut x: Vec<f64> = data.to_vec();
    x.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    if x[n - 1] - x[0] < 1e-300 {
        return None; // all values identical
    }

    if n == 3 {
        return shapiro_wilk_n3(&x);
    }

    let nn2 = n / 2;
    let a = sw_coefficients(n, nn2)?;
    let w = sw_statistic(&x, &a, n, nn2);

    if !(0.0..=1.0 + 1e-10).contains(&w) {
        return None;
    }
    let w = w.min(1.0);

    Some(ShapiroWilkResult {
        w,
        p_value: sw_p_value(w, n).clamp(0.0, 1.0),
    })
}

// n = 3: exact coefficients and p-value
fn shapiro_wilk_n3(x: &[f64]) -> Option<ShapiroWilkResult> {
    let a1 = std::f64::consts::FRAC_1_SQRT_2;
    let m = (x[0] + x[1] + x[2]) / 3.0;
    let ss = x.iter().map(|&v| (v - m).powi(2)).sum::<f64>();
    if ss < 1e-300 {
        return None;
    }

    let numerator = a1 * (x[2] - x[0]);
    let w = ((numerator * numerator) / ss).clamp(0.75, 1.0);
    let p = 1.0 - (6.0 / std::f64::consts::PI) * w.sqrt().acos();

    Some(ShapiroWilkResult {
        w,
        p_value: p.clamp(0.0, 1.0),
    })
}

// Coefficients from Blom-approximated normal order statistics with
// Royston's polynomial corrections to the first one or two entries.
fn sw_coefficients(n: usize, nn2: usize) -> Option<Vec<f64>> {
    let normal = Normal::new(0.0, 1.0).ok()?;

    let mut m = vec![0.0; nn2];
    let mut summ2 = 0.0;
    for (i, mi) in m.iter_mut().enumerate() {
        let p = (i as f64 + 1.0 - 0.375) / (n as f64 + 0.25);
        *mi = normal.inverse_cdf(p);
        summ2 += *mi * *mi;
    }
    summ2 *= 2.0;
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / (n as f64).sqrt();

    let mut a = vec![0.0; nn2];
    let a1 = sw_poly(&SW_C1, rsn) - m[0] / ssumm2;

    if n <= 5 {
        let fac_sq = summ2 - 2.0 * m[0] * m[0];
        let one_minus = 1.0 - 2.0 * a1 * a1;
        if fac_sq <= 0.0 || one_minus <= 0.0 {
            return None;
        }
        let fac = (fac_sq / one_minus).sqrt();
        a[0] = a1;
        for i in 1..nn2 {
            a[i] = -m[i] / fac;
        }
    } else {
        let a2 = -m[1] / ssumm2 + sw_poly(&SW_C2, rsn);
        let fac_sq = summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1];
        let one_minus = 1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2;
        if fac_sq <= 0.0 || one_minus <= 0.0 {
            return None;
        }
        let fac = (fac_sq / one_minus).sqrt();
        a[0] = a1;
        a[1] = a2;
        for i in 2..nn2 {
            a[i] = -m[i] / fac;
        }
    }

    Some(a)
}

// W = (Σ aᵢ (x₍ₙ₊₁₋ᵢ₎ − x₍ᵢ₎))² / Σ (xᵢ − x̄)²
fn sw_statistic(x: &[f64], a: &[f64], n: usize, nn2: usize) -> f64 {
    let mut sa = 0.0;
    for i in 0..nn2 {
        sa += a[i] * (x[n - 1 - i] - x[i]);
    }

    let m = x.iter().sum::<f64>() / n as f64;
    let ss: f64 = x.iter().map(|&v| (v - m).powi(2)).sum();
    if ss < 1e-300 {
        return 1.0;
    }

    (sa * sa) / ss
}

// Royston's normalizing transformation of W to a z-score.
fn sw_p_value(w: f64, n: usize) -> f64 {
    let nf = n as f64;
    let w1 = 1.0 - w;
    if w1 <= 0.0 {
        return 1.0;
    }
    let y = w1.ln();

    let z = if n <= 11 {
        let gamma = sw_poly(&SW_G, nf);
        if y >= gamma {
            return 0.0; // extremely non-normal
        }
        let y2 = -(gamma - y).ln();
        let m = sw_poly(&SW_C3, nf);
        let s = sw_poly(&SW_C4, nf).exp();
        if s < 1e-300 {
            return 0.0;
        }
        (y2 - m) / s
    } else {
        let xx = nf.ln();
        let m = sw_poly(&SW_C5, xx);
        let s = sw_poly(&SW_C6, xx).exp();
        if s < 1e-300 {
            return 0.0;
        }
        (y - m) / s
    };

    match Normal::new(0.0, 1.0) {
        Ok(normal) => 1.0 - normal.cdf(z),
        Err(_) => 0.0,
    }
}

// ── DataFrame-level operation ─────────────────────────────────────────

/// Tests a metric column for normality with the selected method.
///
/// Null values are dropped before testing. The verdict is
/// `p_value > alpha` → normal.
///
/// # Errors
///
/// - [`EdaError::UnsupportedMethod`] if `method` is neither `"shapiro"`
///   nor `"ks"`.
/// - [`EdaError::ColumnNotFound`] / [`EdaError::NonNumericColumn`] for
///   bad column references.
/// - [`EdaError::InsufficientData`] when the sample is too small or
///   degenerate for the selected test.
///
/// # Examples
///
/// ```
/// use edalytics::dataframe::{Column, DataFrame, NullMask};
/// use edalytics::normality::normality_test;
///
/// let mut df = DataFrame::new();
/// df.add_column(
///     "m".to_string(),
///     Column::numeric(vec![1.0, 2.0, 3.0, 4.0, 5.0], NullMask::all_valid(5)),
/// ).unwrap();
///
/// assert!(normality_test(&df, "m", "median", 0.05).is_err());
/// let r = normality_test(&df, "m", "shapiro", 0.05).unwrap();
/// assert!(r.is_normal); // evenly spaced points look normal to Shapiro-Wilk
/// ```
pub fn normality_test(
    df: &DataFrame,
    metric: &str,
    method: &str,
    alpha: f64,
) -> Result<NormalityTest, EdaError> {
    let method: NormalityMethod = method.parse()?;
    let data = df.numeric_values(metric)?;

    let (statistic, p_value) = match method {
        NormalityMethod::Shapiro => shapiro_wilk_test(&data)
            .map(|r| (r.w, r.p_value))
            .ok_or(EdaError::InsufficientData {
                min_required: 3,
                actual: data.len(),
            })?,
        NormalityMethod::Ks => ks_test(&data).ok_or(EdaError::InsufficientData {
            min_required: 5,
            actual: data.len(),
        })?,
    };

    Ok(NormalityTest {
        metric: metric.to_string(),
        method,
        statistic,
        p_value,
        is_normal: p_value > alpha,
        alpha,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────
