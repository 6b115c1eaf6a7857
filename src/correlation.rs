//! Correlation coefficients and labeled correlation matrices.
//!
//! Pearson and Spearman coefficients with t-test p-values, plus a
//! string-labeled symmetric [`CorrelationMatrix`] computed from a
//! [`DataFrame`] over pairwise-complete observations (rows where both
//! columns are non-null), matching `pandas.DataFrame.corr`.
//!
//! # Examples
//!
//! ```
//! use edalytics::correlation::{pearson, spearman};
//!
//! let x = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let y = [2.0, 4.0, 6.0, 8.0, 10.0];
//! let r = pearson(&x, &y).unwrap();
//! assert!((r.r - 1.0).abs() < 1e-10);
//!
//! let cubes: Vec<f64> = x.iter().map(|v| v.powi(3)).collect();
//! let s = spearman(&x, &cubes).unwrap();
//! assert!((s.r - 1.0).abs() < 1e-10); // monotone → perfect rank correlation
//! ```

use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::dataframe::{DataFrame, NullMask};
use crate::error::EdaError;
use crate::stats;

// ── Coefficients ──────────────────────────────────────────────────────

/// Correlation method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationMethod {
    /// Pearson product-moment correlation (assumes linear relationship).
    Pearson,
    /// Spearman rank correlation (robust to monotone non-linearity).
    Spearman,
}

impl CorrelationMethod {
    /// Returns the lowercase method name ("pearson" / "spearman").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pearson => "pearson",
            Self::Spearman => "spearman",
        }
    }
}

/// Result of a correlation computation.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationResult {
    /// Correlation coefficient in [-1, 1].
    pub r: f64,
    /// Two-tailed p-value for H₀: ρ = 0.
    pub p_value: f64,
    /// Sample size.
    pub n: usize,
}

/// Computes the Pearson product-moment correlation with p-value.
///
/// p-value via t-test: t = r·√(n−2) / √(1−r²), df = n−2.
///
/// # Returns
///
/// `None` if fewer than 3 observations, the slices differ in length,
/// either variable has zero variance, or values are non-finite.
///
/// ```
/// use edalytics::correlation::pearson;
///
/// let x = [68.0, 71.0, 62.0, 75.0, 58.0, 60.0, 67.0, 68.0, 71.0, 69.0];
/// let y = [4.1, 4.6, 3.8, 4.4, 3.2, 3.1, 3.8, 4.1, 4.3, 3.7];
/// let r = pearson(&x, &y).unwrap();
/// assert!((r.r - 0.8816).abs() < 0.01);
/// ```
pub fn pearson(x: &[f64], y: &[f64]) -> Option<CorrelationResult> {
    let n = x.len();
    if n < 3 || n != y.len() {
        return None;
    }
    if x.iter().any(|v| !v.is_finite()) || y.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let cov = stats::covariance(x, y)?;
    let sx = stats::std_dev(x)?;
    let sy = stats::std_dev(y)?;

    if sx < 1e-300 || sy < 1e-300 {
        return None; // zero variance
    }

    let r = (cov / (sx * sy)).clamp(-1.0, 1.0);
    Some(CorrelationResult {
        r,
        p_value: correlation_p_value(r, n),
        n,
    })
}

/// Computes the Spearman rank correlation with p-value.
///
/// Mid-ranks both variables, then applies [`pearson`] to the ranks.
///
/// # Returns
///
/// `None` under the same conditions as [`pearson`] (applied to the ranks).
pub fn spearman(x: &[f64], y: &[f64]) -> Option<CorrelationResult> {
    let n = x.len();
    if n < 3 || n != y.len() {
        return None;
    }
    if x.iter().any(|v| !v.is_finite()) || y.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let rx = stats::mid_ranks(x);
    let ry = stats::mid_ranks(y);
    pearson(&rx, &ry)
}

/// Two-tailed p-value for a correlation coefficient via the t-distribution.
fn correlation_p_value(r: f64, n: usize) -> f64 {
    if n < 3 {
        return 1.0;
    }
    let df = (n - 2) as f64;
    let r2 = r * r;
    if r2 >= 1.0 - 1e-15 {
        return 0.0; // perfect correlation
    }
    let t = r * (df / (1.0 - r2)).sqrt();
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => 2.0 * (1.0 - dist.cdf(t.abs())),
        Err(_) => 1.0,
    }
}

// ── Labeled matrix ────────────────────────────────────────────────────

/// Square, symmetric correlation matrix labeled by column name.
///
/// The diagonal is 1.0. Cells whose pair could not be computed
/// (degenerate data after pairwise null-dropping) hold NaN, mirroring
/// `pandas.DataFrame.corr`.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    method: CorrelationMethod,
    labels: Vec<String>,
    values: Vec<f64>, // row-major, size × size
}

impl CorrelationMatrix {
    /// Computes the matrix for the named numeric columns of `df`.
    ///
    /// Each off-diagonal cell uses pairwise-complete observations: rows
    /// where both columns are non-null.
    ///
    /// # Errors
    ///
    /// [`EdaError::ColumnNotFound`] / [`EdaError::NonNumericColumn`] if a
    /// name does not refer to a numeric column,
    /// [`EdaError::InsufficientData`] if fewer than 2 names are given.
    ///
    /// ```
    /// use edalytics::correlation::{CorrelationMatrix, CorrelationMethod};
    /// use edalytics::dataframe::{Column, DataFrame, NullMask};
    ///
    /// let mut df = DataFrame::new();
    /// df.add_column(
    ///     "x".to_string(),
    ///     Column::numeric(vec![1.0, 2.0, 3.0, 4.0, 5.0], NullMask::all_valid(5)),
    /// ).unwrap();
    /// df.add_column(
    ///     "y".to_string(),
    ///     Column::numeric(vec![10.0, 8.0, 6.0, 4.0, 2.0], NullMask::all_valid(5)),
    /// ).unwrap();
    ///
    /// let m = CorrelationMatrix::compute(
    ///     &df, &["x".into(), "y".into()], CorrelationMethod::Pearson,
    /// ).unwrap();
    /// assert!((m.value_between("x", "y").unwrap() + 1.0).abs() < 1e-10);
    /// ```
    pub fn compute(
        df: &DataFrame,
        names: &[String],
        method: CorrelationMethod,
    ) -> Result<Self, EdaError> {
        let size = names.len();
        if size < 2 {
            return Err(EdaError::InsufficientData {
                min_required: 2,
                actual: size,
            });
        }

        // Resolve all columns up front
        let mut columns: Vec<(&[f64], &NullMask)> = Vec::with_capacity(size);
        for name in names {
            let column = df.column(name).ok_or_else(|| EdaError::ColumnNotFound {
                name: name.clone(),
            })?;
            let values = column
                .as_numeric()
                .ok_or_else(|| EdaError::NonNumericColumn {
                    column: name.clone(),
                })?;
            columns.push((values, column.nulls()));
        }

        let mut values = vec![f64::NAN; size * size];
        for i in 0..size {
            values[i * size + i] = 1.0;
            for j in (i + 1)..size {
                let (xs, ys) = pairwise_complete(columns[i], columns[j]);
                let r = match method {
                    CorrelationMethod::Pearson => pearson(&xs, &ys),
                    CorrelationMethod::Spearman => spearman(&xs, &ys),
                }
                .map_or(f64::NAN, |res| res.r);
                values[i * size + j] = r;
                values[j * size + i] = r;
            }
        }

        Ok(Self {
            method,
            labels: names.to_vec(),
            values,
        })
    }

    #[cfg(test)]
    pub(crate) fn from_raw(
        method: CorrelationMethod,
        labels: Vec<String>,
        values: Vec<f64>,
    ) -> Self {
        assert_eq!(values.len(), labels.len() * labels.len());
        Self {
            method,
            labels,
            values,
        }
    }

    /// Returns the correlation method this matrix was computed with.
    pub fn method(&self) -> CorrelationMethod {
        self.method
    }

    /// Returns the column labels, in matrix order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Returns the number of rows (= columns).
    pub fn size(&self) -> usize {
        self.labels.len()
    }

    /// Returns the value at (row, col).
    ///
    /// # Panics
    ///
    /// Panics if an index is out of bounds.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(row < self.size() && col < self.size(), "index out of bounds");
        self.values[row * self.size() + col]
    }

    /// Returns the correlation between two named columns, or `None` if
    /// either label is absent.
    pub fn value_between(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == a)?;
        let j = self.labels.iter().position(|l| l == b)?;
        Some(self.get(i, j))
    }
}

// Rows where both columns are valid.
fn pairwise_complete(a: (&[f64], &NullMask), b: (&[f64], &NullMask)) -> (Vec<f64>, Vec<f64>) {
    let n = a.0.len().min(b.0.len());
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for row in 0..n {
        if a.1.is_valid(row) && b.1.is_valid(row) {
            xs.push(a.0[row]);
            ys.push(b.0[row]);
        }
    }
    (xs, ys)
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataframe::Column;

    fn df_from(columns: &[(&str, Vec<Option<f64>>)]) -> DataFrame {
        let mut df = DataFrame::new();
        for (name, values) in columns {
            df.add_column(name.to_string(), Column::from_options(values.clone()))
                .unwrap();
        }
        df
    }

    // ── pearson ──────────────────────────────────────────────────

    #[test]
    fn pearson_perfect_positive() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 6.0, 8.0, 10.0];
        let r = pearson(&x, &y).unwrap();
        assert!((r.r - 1.0).abs() < 1e-10);
        assert!(r.p_value < 1e-10);
    }

    #[test]
    fn pearson_perfect_negative() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [10.0, 8.0, 6.0, 4.0, 2.0];
        let r = pearson(&x, &y).unwrap();
        assert!((r.r + 1.0).abs() < 1e-10);
    }

    #[test]
    fn pearson_known_value() {
        let x = [68.0, 71.0, 62.0, 75.0, 58.0, 60.0, 67.0, 68.0, 71.0, 69.0];
        let y = [4.1, 4.6, 3.8, 4.4, 3.2, 3.1, 3.8, 4.1, 4.3, 3.7];
        let r = pearson(&x, &y).unwrap();
        assert!((r.r - 0.8816).abs() < 0.01, "r = {}", r.r);
    }

    #[test]
    fn pearson_degenerate_inputs() {
        assert!(pearson(&[1.0, 2.0], &[3.0, 4.0]).is_none());
        assert!(pearson(&[1.0, 2.0, 3.0], &[4.0, 5.0]).is_none());
        assert!(pearson(&[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0]).is_none());
        assert!(pearson(&[1.0, f64::NAN, 3.0], &[4.0, 5.0, 6.0]).is_none());
    }

    #[test]
    fn pearson_weak_correlation_not_significant() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [5.0, 1.0, 3.0, 5.0, 1.0];
        let r = pearson(&x, &y).unwrap();
        assert!(r.p_value > 0.3);
    }

    // ── spearman ─────────────────────────────────────────────────

    #[test]
    fn spearman_monotone_nonlinear() {
        let x: [f64; 5] = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y: Vec<f64> = x.iter().map(|&v| v.exp()).collect();
        let r = spearman(&x, &y).unwrap();
        assert!((r.r - 1.0).abs() < 1e-10);
    }

    #[test]
    fn spearman_with_ties() {
        let x = [1.0, 2.0, 2.0, 4.0, 5.0];
        let y = [1.0, 3.0, 3.0, 4.0, 5.0];
        let r = spearman(&x, &y).unwrap();
        assert!(r.r > 0.9);
    }

    #[test]
    fn spearman_anti_monotone() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [25.0, 16.0, 9.0, 4.0, 1.0];
        let r = spearman(&x, &y).unwrap();
        assert!((r.r + 1.0).abs() < 1e-10);
    }

    // ── matrix ───────────────────────────────────────────────────

    #[test]
    fn matrix_symmetric_with_unit_diagonal() {
        let df = df_from(&[
            ("x", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)]),
            ("y", vec![Some(2.0), Some(4.0), Some(6.0), Some(8.0), Some(10.0)]),
            ("z", vec![Some(5.0), Some(4.0), Some(3.0), Some(2.0), Some(1.0)]),
        ]);
        let names: Vec<String> = vec!["x".into(), "y".into(), "z".into()];
        let m = CorrelationMatrix::compute(&df, &names, CorrelationMethod::Pearson).unwrap();

        assert_eq!(m.size(), 3);
        for i in 0..3 {
            assert!((m.get(i, i) - 1.0).abs() < 1e-12);
            for j in 0..3 {
                assert!((m.get(i, j) - m.get(j, i)).abs() < 1e-15);
            }
        }
        assert!((m.get(0, 1) - 1.0).abs() < 1e-10);
        assert!((m.get(0, 2) + 1.0).abs() < 1e-10);
    }

    #[test]
    fn matrix_pairwise_complete_nulls() {
        // Null in "y" row 2 removes that row only for pairs involving y
        let df = df_from(&[
            ("x", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)]),
            ("y", vec![Some(1.0), Some(2.0), None, Some(4.0), Some(5.0)]),
        ]);
        let names: Vec<String> = vec!["x".into(), "y".into()];
        let m = CorrelationMatrix::compute(&df, &names, CorrelationMethod::Pearson).unwrap();
        assert!((m.get(0, 1) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn matrix_degenerate_pair_is_nan() {
        let df = df_from(&[
            ("x", vec![Some(1.0), Some(2.0), Some(3.0)]),
            ("flat", vec![Some(7.0), Some(7.0), Some(7.0)]),
        ]);
        let names: Vec<String> = vec!["x".into(), "flat".into()];
        let m = CorrelationMatrix::compute(&df, &names, CorrelationMethod::Pearson).unwrap();
        assert!(m.get(0, 1).is_nan());
        assert!((m.get(1, 1) - 1.0).abs() < 1e-12); // diagonal stays 1
    }

    #[test]
    fn matrix_requires_two_columns() {
        let df = df_from(&[("x", vec![Some(1.0), Some(2.0)])]);
        assert!(matches!(
            CorrelationMatrix::compute(&df, &["x".into()], CorrelationMethod::Pearson),
            Err(EdaError::InsufficientData { .. })
        ));
    }

    #[test]
    fn matrix_value_between() {
        let df = df_from(&[
            ("a", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]),
            ("b", vec![Some(2.0), Some(4.0), Some(6.0), Some(8.0)]),
        ]);
        let m = CorrelationMatrix::compute(
            &df,
            &["a".into(), "b".into()],
            CorrelationMethod::Spearman,
        )
        .unwrap();
        assert!((m.value_between("a", "b").unwrap() - 1.0).abs() < 1e-10);
        assert!(m.value_between("a", "nope").is_none());
        assert_eq!(m.method(), CorrelationMethod::Spearman);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn paired_vecs(min_len: usize, max_len: usize) -> BoxedStrategy<(Vec<f64>, Vec<f64>)> {
        proptest::collection::vec(-1e6_f64..1e6, min_len..=max_len)
            .prop_flat_map(|x| {
                let n = x.len();
                (Just(x), proptest::collection::vec(-1e6_f64..1e6, n..=n))
            })
            .boxed()
    }

    proptest! {
        #[test]
        fn pearson_bounded((x, y) in paired_vecs(5, 50)) {
            if let Some(r) = pearson(&x, &y) {
                prop_assert!((-1.0..=1.0).contains(&r.r), "r out of bounds: {}", r.r);
                prop_assert!((0.0..=1.0).contains(&r.p_value), "p out of bounds: {}", r.p_value);
            }
        }

        #[test]
        fn spearman_bounded((x, y) in paired_vecs(5, 50)) {
            if let Some(r) = spearman(&x, &y) {
                prop_assert!((-1.0..=1.0).contains(&r.r), "r out of bounds: {}", r.r);
                prop_assert!((0.0..=1.0).contains(&r.p_value), "p out of bounds: {}", r.p_value);
            }
        }

        #[test]
        fn pearson_symmetric((x, y) in paired_vecs(5, 50)) {
            match (pearson(&x, &y), pearson(&y, &x)) {
                (Some(a), Some(b)) => {
                    prop_assert!((a.r - b.r).abs() < 1e-10, "not symmetric: {} vs {}", a.r, b.r);
                }
                (None, None) => {}
                _ => prop_assert!(false, "one direction computed, the other did not"),
            }
        }
    }
}
