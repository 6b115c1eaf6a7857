//! Linearity-aware correlation analysis.
//!
//! Three stages, usable separately or via [`identify_correlations`]:
//!
//! 1. [`identify_linearity`] — partitions column pairs into linear and
//!    non-linear by testing each column for normality (KS against the
//!    standard normal). A pair is linear only when both columns pass.
//! 2. [`identify_correlations`] — computes a Pearson matrix over the
//!    columns of the linear partition and a Spearman matrix over the
//!    columns of the non-linear partition.
//! 3. [`classify_correlations`] — buckets a matrix's unique pairs by
//!    correlation strength (weak / moderate / strong).

use std::collections::{HashMap, HashSet};

use crate::correlation::{CorrelationMatrix, CorrelationMethod};
use crate::dataframe::DataFrame;
use crate::error::EdaError;
use crate::normality::ks_test;

// ── Linearity detection ───────────────────────────────────────────────

/// Column pairs split by the linearity heuristic.
///
/// Relative input order is preserved within each partition.
#[derive(Debug, Clone, Default)]
pub struct LinearityPartition {
    /// Pairs where both columns test normal: Pearson is appropriate.
    pub linear: Vec<(String, String)>,
    /// Pairs where at least one column is non-normal: use Spearman.
    pub non_linear: Vec<(String, String)>,
}

/// Enumerates all 2-combinations of the numeric columns, in column order.
///
/// ```
/// use edalytics::analysis::numeric_column_pairs;
/// use edalytics::dataframe::{Column, DataFrame, NullMask};
///
/// let mut df = DataFrame::new();
/// for name in ["a", "b", "c"] {
///     df.add_column(
///         name.to_string(),
///         Column::numeric(vec![1.0, 2.0], NullMask::all_valid(2)),
///     ).unwrap();
/// }
/// df.add_column(
///     "label".to_string(),
///     Column::categorical(vec!["x".into(), "y".into()], NullMask::all_valid(2)),
/// ).unwrap();
///
/// let pairs = numeric_column_pairs(&df);
/// assert_eq!(pairs.len(), 3);
/// assert_eq!(pairs[0], ("a".to_string(), "b".to_string()));
/// assert_eq!(pairs[2], ("b".to_string(), "c".to_string()));
/// ```
pub fn numeric_column_pairs(df: &DataFrame) -> Vec<(String, String)> {
    let names = df.numeric_column_names();
    let mut pairs = Vec::with_capacity(names.len() * names.len().saturating_sub(1) / 2);
    for i in 0..names.len() {
        for j in (i + 1)..names.len() {
            pairs.push((names[i].to_string(), names[j].to_string()));
        }
    }
    pairs
}

/// Splits column pairs into linear and non-linear partitions.
///
/// Each column is KS-tested against the standard normal (nulls dropped);
/// a pair is linear iff both columns have p > `alpha`. The verdict
/// depends only on the two columns, never on their order in the pair.
///
/// # Errors
///
/// [`EdaError::ColumnNotFound`] / [`EdaError::NonNumericColumn`] for bad
/// column references, [`EdaError::InsufficientData`] when a column has
/// fewer than 5 non-null values.
pub fn identify_linearity(
    df: &DataFrame,
    pairs: &[(String, String)],
    alpha: f64,
) -> Result<LinearityPartition, EdaError> {
    let mut verdicts: HashMap<String, bool> = HashMap::new();
    let mut partition = LinearityPartition::default();

    for (left, right) in pairs {
        let a = column_is_normal(df, left, alpha, &mut verdicts)?;
        let b = column_is_normal(df, right, alpha, &mut verdicts)?;
        if a && b {
            partition.linear.push((left.clone(), right.clone()));
        } else {
            partition.non_linear.push((left.clone(), right.clone()));
        }
    }
    Ok(partition)
}

// KS verdict per column, cached so shared columns are tested once.
fn column_is_normal(
    df: &DataFrame,
    name: &str,
    alpha: f64,
    cache: &mut HashMap<String, bool>,
) -> Result<bool, EdaError> {
    if let Some(&verdict) = cache.get(name) {
        return Ok(verdict);
    }
    let data = df.numeric_values(name)?;
    let (_, p) = ks_test(&data).ok_or(EdaError::InsufficientData {
        min_required: 5,
        actual: data.len(),
    })?;
    let verdict = p > alpha;
    cache.insert(name.to_string(), verdict);
    Ok(verdict)
}

// ── Correlation computation ───────────────────────────────────────────

/// Correlation matrices per linearity partition.
///
/// A field is `Some` iff its partition contains at least one pair. A
/// column may appear in both matrices when it participates in pairs of
/// both kinds.
#[derive(Debug, Clone, Default)]
pub struct CorrelationMatrices {
    /// Pearson matrix over the columns of the linear partition.
    pub pearson: Option<CorrelationMatrix>,
    /// Spearman matrix over the columns of the non-linear partition.
    pub spearman: Option<CorrelationMatrix>,
}

/// Computes linearity-aware correlation matrices for all numeric columns.
///
/// Enumerates all numeric column pairs, partitions them with
/// [`identify_linearity`], then computes a Pearson matrix over the union
/// of columns in the linear partition and a Spearman matrix over the
/// union of columns in the non-linear partition (union in
/// first-appearance order). Matrices use pairwise-complete observations.
///
/// Fewer than two numeric columns is not an error: both fields come back
/// `None`.
///
/// # Errors
///
/// Propagates [`identify_linearity`] and matrix-computation failures.
pub fn identify_correlations(
    df: &DataFrame,
    alpha: f64,
) -> Result<CorrelationMatrices, EdaError> {
    let pairs = numeric_column_pairs(df);
    if pairs.is_empty() {
        return Ok(CorrelationMatrices::default());
    }

    let partition = identify_linearity(df, &pairs, alpha)?;

    let pearson = if partition.linear.is_empty() {
        None
    } else {
        let names = pair_union(&partition.linear);
        Some(CorrelationMatrix::compute(
            df,
            &names,
            CorrelationMethod::Pearson,
        )?)
    };
    let spearman = if partition.non_linear.is_empty() {
        None
    } else {
        let names = pair_union(&partition.non_linear);
        Some(CorrelationMatrix::compute(
            df,
            &names,
            CorrelationMethod::Spearman,
        )?)
    };

    Ok(CorrelationMatrices { pearson, spearman })
}

// Distinct column names across pairs, in first-appearance order.
fn pair_union(pairs: &[(String, String)]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for (a, b) in pairs {
        for name in [a, b] {
            if seen.insert(name.clone()) {
                names.push(name.clone());
            }
        }
    }
    names
}

// ── Strength classification ───────────────────────────────────────────

/// One classified column pair.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationRecord {
    pub col_a: String,
    pub col_b: String,
    /// Signed correlation coefficient.
    pub r: f64,
}

/// Unique matrix pairs bucketed by correlation strength.
#[derive(Debug, Clone, Default)]
pub struct CorrelationBuckets {
    /// 0.1 ≤ |r| < 0.3
    pub weak: Vec<CorrelationRecord>,
    /// 0.3 ≤ |r| < 0.7
    pub moderate: Vec<CorrelationRecord>,
    /// |r| ≥ 0.7
    pub strong: Vec<CorrelationRecord>,
}

impl CorrelationBuckets {
    /// Returns `true` when every bucket is empty.
    pub fn is_empty(&self) -> bool {
        self.weak.is_empty() && self.moderate.is_empty() && self.strong.is_empty()
    }
}

/// Buckets the unique off-diagonal pairs of a matrix by |r|.
///
/// Each unordered pair is classified once, in row-major encounter order.
/// Pairs with |r| < 0.1 and NaN cells are dropped.
pub fn classify_correlations(matrix: &CorrelationMatrix) -> CorrelationBuckets {
    let mut buckets = CorrelationBuckets::default();
    let mut seen: HashSet<(usize, usize)> = HashSet::new();
    let size = matrix.size();

    for i in 0..size {
        for j in 0..size {
            if i == j {
                continue;
            }
            let key = (i.min(j), i.max(j));
            if !seen.insert(key) {
                continue;
            }
            let r = matrix.get(i, j);
            let record = CorrelationRecord {
                col_a: matrix.labels()[i].clone(),
                col_b: matrix.labels()[j].clone(),
                r,
            };
            let strength = r.abs();
            if strength >= 0.7 {
                buckets.strong.push(record);
            } else if strength >= 0.3 {
                buckets.moderate.push(record);
            } else if strength >= 0.1 {
                buckets.weak.push(record);
            }
            // |r| < 0.1 and NaN fall through unrecorded
        }
    }
    buckets
}

// ── Tests ─────────────────────────────────────────────────────────────
