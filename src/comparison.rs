//! Two-group comparison via the Mann-Whitney U test.
//!
//! Non-parametric comparison of a metric between two groups (typically
//! control vs test in an experiment). The slice-level
//! [`mann_whitney_u_test`] works on raw samples; [`compare_groups`]
//! filters a [`DataFrame`] by a grouping column and tests a list of
//! metrics in one pass.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::dataframe::DataFrame;
use crate::error::EdaError;
use crate::stats;
use crate::DEFAULT_ALPHA;

/// Result of a Mann-Whitney U test.
#[derive(Debug, Clone, Copy)]
pub struct MannWhitneyResult {
    /// U statistic of the first sample.
    pub u_statistic: f64,
    /// Two-tailed p-value from the normal approximation.
    pub p_value: f64,
}

/// Mann-Whitney U test (two-tailed, normal approximation).
///
/// Ranks the pooled samples with mid-ranks, computes U for the first
/// sample, and evaluates significance through the tie-corrected normal
/// approximation. No continuity correction is applied.
///
/// # Returns
///
/// `None` if either sample has fewer than 2 observations, contains
/// non-finite values, or the pooled sample is entirely tied (zero rank
/// variance).
///
/// # Examples
///
/// ```
/// use edalytics::comparison::mann_whitney_u_test;
///
/// let control = [1.0, 2.0, 3.0];
/// let test = [10.0, 11.0, 12.0];
/// let r = mann_whitney_u_test(&control, &test).unwrap();
/// assert_eq!(r.u_statistic, 0.0); // complete separation
/// assert!(r.p_value < 0.05);
/// ```
pub fn mann_whitney_u_test(a: &[f64], b: &[f64]) -> Option<MannWhitneyResult> {
    let n1 = a.len();
    let n2 = b.len();
    if n1 < 2 || n2 < 2 {
        return None;
    }
    if a.iter().any(|v| !v.is_finite()) || b.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let mut pooled = Vec::with_capacity(n1 + n2);
    pooled.extend_from_slice(a);
    pooled.extend_from_slice(b);
    let ranks = stats::mid_ranks(&pooled);

    let r1: f64 = ranks[..n1].iter().sum();
    let n1f = n1 as f64;
    let n2f = n2 as f64;
    let nf = n1f + n2f;

    let u1 = r1 - n1f * (n1f + 1.0) / 2.0;
    let mu = n1f * n2f / 2.0;

    let tie = stats::tie_correction(&pooled);
    let sigma_sq = n1f * n2f / 12.0 * ((nf + 1.0) - tie / (nf * (nf - 1.0)));
    if sigma_sq <= 0.0 {
        return None; // pooled sample entirely tied
    }

    let z = (u1 - mu) / sigma_sq.sqrt();
    let normal = Normal::new(0.0, 1.0).ok()?;
    let p_value = (2.0 * (1.0 - normal.cdf(z.abs()))).clamp(0.0, 1.0);

    Some(MannWhitneyResult {
        u_statistic: u1,
        p_value,
    })
}

// ── DataFrame-level comparison ────────────────────────────────────────

/// Configuration for [`compare_groups`].
#[derive(Debug, Clone)]
pub struct GroupComparisonConfig {
    /// Name of the categorical column identifying group membership.
    pub group_column: String,
    /// Significance level for the medians-differ verdict.
    pub alpha: f64,
}

impl Default for GroupComparisonConfig {
    fn default() -> Self {
        Self {
            group_column: "test_group".to_string(),
            alpha: DEFAULT_ALPHA,
        }
    }
}

/// Verdict for one metric.
#[derive(Debug, Clone)]
pub struct GroupComparison {
    /// Name of the tested metric column.
    pub metric: String,
    /// U statistic of the control sample.
    pub u_statistic: f64,
    /// Two-tailed p-value.
    pub p_value: f64,
    /// `true` when `p_value < alpha`: the group medians differ.
    pub medians_differ: bool,
}

/// Compares each metric between two groups of a DataFrame.
///
/// For every metric, rows are split by the grouping column into the
/// `control_value` and `test_value` subsets (nulls dropped per subset),
/// then Mann-Whitney tested.
///
/// # Errors
///
/// [`EdaError::ColumnNotFound`] / [`EdaError::NonNumericColumn`] for bad
/// column references, [`EdaError::InsufficientData`] when either subset
/// is too small or degenerate for the test.
///
/// # Examples
///
/// ```
/// use edalytics::comparison::{compare_groups, GroupComparisonConfig};
/// use edalytics::dataframe::{Column, DataFrame, NullMask};
///
/// let mut df = DataFrame::new();
/// df.add_column(
///     "conversion".to_string(),
///     Column::numeric(vec![1.0, 2.0, 3.0, 10.0, 11.0, 12.0], NullMask::all_valid(6)),
/// ).unwrap();
/// df.add_column(
///     "test_group".to_string(),
///     Column::categorical(
///         vec!["control".into(), "control".into(), "control".into(),
///              "test".into(), "test".into(), "test".into()],
///         NullMask::all_valid(6),
///     ),
/// ).unwrap();
///
/// let results = compare_groups(
///     &df, &["conversion"], "control", "test", &GroupComparisonConfig::default(),
/// ).unwrap();
/// assert!(results[0].medians_differ);
/// ```
pub fn compare_groups(
    df: &DataFrame,
    metrics: &[&str],
    control_value: &str,
    test_value: &str,
    config: &GroupComparisonConfig,
) -> Result<Vec<GroupComparison>, EdaError> {
    let mut results = Vec::with_capacity(metrics.len());
    for &metric in metrics {
        let control = df.metric_in_group(metric, &config.group_column, control_value)?;
        let test = df.metric_in_group(metric, &config.group_column, test_value)?;

        let r = mann_whitney_u_test(&control, &test).ok_or(EdaError::InsufficientData {
            min_required: 2,
            actual: control.len().min(test.len()),
        })?;

        results.push(GroupComparison {
            metric: metric.to_string(),
            u_statistic: r.u_statistic,
            p_value: r.p_value,
            medians_differ: r.p_value < config.alpha,
        });
    }
    Ok(results)
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataframe::{Column, NullMask};

    fn experiment_df() -> DataFrame {
        let mut df = DataFrame::new();
        df.add_column(
            "revenue".to_string(),
            Column::numeric(
                vec![1.0, 2.0, 3.0, 10.0, 11.0, 12.0],
                NullMask::all_valid(6),
            ),
        )
        .unwrap();
        df.add_column(
            "sessions".to_string(),
            Column::numeric(vec![1.0, 2.0, 3.0, 1.5, 2.5, 3.5], NullMask::all_valid(6)),
        )
        .unwrap();
        df.add_column(
            "test_group".to_string(),
            Column::categorical(
                vec![
                    "control".into(),
                    "control".into(),
                    "control".into(),
                    "test".into(),
                    "test".into(),
                    "test".into(),
                ],
                NullMask::all_valid(6),
            ),
        )
        .unwrap();
        df
    }

    // ── slice-level ──────────────────────────────────────────────

    #[test]
    fn separated_samples_are_significant() {
        let r = mann_whitney_u_test(&[1.0, 2.0, 3.0], &[10.0, 11.0, 12.0]).unwrap();
        assert_eq!(r.u_statistic, 0.0);
        assert!((r.p_value - 0.0495).abs() < 0.001, "p = {}", r.p_value);
        assert!(r.p_value < 0.05);
    }

    #[test]
    fn identical_samples_are_not_significant() {
        let r = mann_whitney_u_test(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).unwrap();
        assert!((r.u_statistic - 4.5).abs() < 1e-12);
        assert!((r.p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn u_statistics_sum_to_n1_n2() {
        let a = [3.0, 7.0, 1.0, 9.0];
        let b = [4.0, 2.0, 8.0];
        let fwd = mann_whitney_u_test(&a, &b).unwrap();
        let rev = mann_whitney_u_test(&b, &a).unwrap();
        assert!((fwd.u_statistic + rev.u_statistic - 12.0).abs() < 1e-12);
        assert!((fwd.p_value - rev.p_value).abs() < 1e-12);
    }

    #[test]
    fn rejects_small_samples() {
        assert!(mann_whitney_u_test(&[1.0], &[2.0, 3.0]).is_none());
        assert!(mann_whitney_u_test(&[1.0, 2.0], &[]).is_none());
    }

    #[test]
    fn rejects_non_finite() {
        assert!(mann_whitney_u_test(&[1.0, f64::NAN], &[2.0, 3.0]).is_none());
    }

    #[test]
    fn rejects_fully_tied_pool() {
        // zero rank variance: no verdict possible
        assert!(mann_whitney_u_test(&[5.0, 5.0], &[5.0, 5.0]).is_none());
    }

    // ── DataFrame-level ──────────────────────────────────────────

    #[test]
    fn compare_groups_per_metric_verdicts() {
        let df = experiment_df();
        let results = compare_groups(
            &df,
            &["revenue", "sessions"],
            "control",
            "test",
            &GroupComparisonConfig::default(),
        )
        .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].metric, "revenue");
        assert!(results[0].medians_differ);
        assert_eq!(results[1].metric, "sessions");
        assert!(!results[1].medians_differ); // overlapping samples
        assert!(results[1].p_value > 0.4);
    }

    #[test]
    fn compare_groups_missing_columns() {
        let df = experiment_df();
        assert!(matches!(
            compare_groups(
                &df,
                &["ghost"],
                "control",
                "test",
                &GroupComparisonConfig::default()
            ),
            Err(EdaError::ColumnNotFound { .. })
        ));

        let config = GroupComparisonConfig {
            group_column: "cohort".to_string(),
            alpha: DEFAULT_ALPHA,
        };
        assert!(matches!(
            compare_groups(&df, &["revenue"], "control", "test", &config),
            Err(EdaError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn compare_groups_unknown_group_value() {
        let df = experiment_df();
        // "variant_b" matches no rows: empty sample, too small to test
        assert!(matches!(
            compare_groups(
                &df,
                &["revenue"],
                "control",
                "variant_b",
                &GroupComparisonConfig::default()
            ),
            Err(EdaError::InsufficientData { .. })
        ));
    }

    #[test]
    fn config_defaults() {
        let config = GroupComparisonConfig::default();
        assert_eq!(config.group_column, "test_group");
        assert_eq!(config.alpha, DEFAULT_ALPHA);
    }
}
