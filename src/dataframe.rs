//! Column-major DataFrame for tabular data.
//!
//! The [`DataFrame`] stores named, equal-length columns with a bit-packed
//! [`NullMask`] tracking missing values per column. Two column types cover
//! everything the analysis modules consume: [`Numeric`](Column::Numeric)
//! for metrics and [`Categorical`](Column::Categorical) for grouping
//! variables.
//!
//! # Example
//!
//! ```
//! use edalytics::dataframe::{Column, DataFrame, NullMask};
//!
//! let mut df = DataFrame::new();
//! df.add_column(
//!     "score".to_string(),
//!     Column::numeric(vec![1.5, 2.3, 3.1], NullMask::all_valid(3)),
//! ).unwrap();
//! assert_eq!(df.row_count(), 3);
//! assert_eq!(df.numeric_column_names(), vec!["score"]);
//! ```

use crate::error::EdaError;

// ── NullMask ──────────────────────────────────────────────────────────

/// Bit-packed validity mask: one bit per row, set when the row is valid.
#[derive(Debug, Clone, PartialEq)]
pub struct NullMask {
    words: Vec<u64>,
    len: usize,
}

impl NullMask {
    /// Creates a mask where every one of `len` rows is valid.
    pub fn all_valid(len: usize) -> Self {
        let n_words = len.div_ceil(64);
        let mut words = vec![u64::MAX; n_words];
        let trailing = len % 64;
        if trailing != 0 {
            words[n_words - 1] = (1u64 << trailing) - 1;
        }
        Self { words, len }
    }

    /// Creates a mask from per-row validity flags.
    pub fn from_flags(flags: &[bool]) -> Self {
        let mut mask = Self {
            words: vec![0u64; flags.len().div_ceil(64)],
            len: flags.len(),
        };
        for (i, &valid) in flags.iter().enumerate() {
            if valid {
                mask.words[i / 64] |= 1u64 << (i % 64);
            }
        }
        mask
    }

    /// Returns `true` if the row at `idx` is valid (not null).
    #[inline]
    pub fn is_valid(&self, idx: usize) -> bool {
        debug_assert!(idx < self.len, "row {idx} out of bounds (len={})", self.len);
        (self.words[idx / 64] >> (idx % 64)) & 1 == 1
    }

    /// Marks the row at `idx` as null.
    pub fn set_null(&mut self, idx: usize) {
        debug_assert!(idx < self.len, "row {idx} out of bounds (len={})", self.len);
        self.words[idx / 64] &= !(1u64 << (idx % 64));
    }

    /// Returns the number of tracked rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the mask tracks zero rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Counts valid rows (hardware popcount per word).
    pub fn valid_count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Counts null rows.
    pub fn null_count(&self) -> usize {
        self.len - self.valid_count()
    }
}

// ── Column ────────────────────────────────────────────────────────────

/// Semantic data type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// Continuous or integer values, stored as `f64`.
    Numeric,
    /// String-valued grouping or label column.
    Categorical,
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric => write!(f, "Numeric"),
            Self::Categorical => write!(f, "Categorical"),
        }
    }
}

/// A typed column with a null mask. Null positions hold a placeholder
/// value (0.0 or the empty string) that is ignored via the mask.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Dense `f64` values.
    Numeric { values: Vec<f64>, nulls: NullMask },
    /// String values.
    Categorical { values: Vec<String>, nulls: NullMask },
}

impl Column {
    /// Creates a numeric column.
    pub fn numeric(values: Vec<f64>, nulls: NullMask) -> Self {
        Self::Numeric { values, nulls }
    }

    /// Creates a numeric column where `None` entries are null.
    pub fn from_options(values: Vec<Option<f64>>) -> Self {
        let flags: Vec<bool> = values.iter().map(Option::is_some).collect();
        let dense: Vec<f64> = values.into_iter().map(|v| v.unwrap_or(0.0)).collect();
        Self::Numeric {
            values: dense,
            nulls: NullMask::from_flags(&flags),
        }
    }

    /// Creates a categorical column.
    pub fn categorical(values: Vec<String>, nulls: NullMask) -> Self {
        Self::Categorical { values, nulls }
    }

    /// Returns the data type of this column.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Numeric { .. } => DataType::Numeric,
            Self::Categorical { .. } => DataType::Categorical,
        }
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.nulls().len()
    }

    /// Returns `true` if the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the null mask.
    pub fn nulls(&self) -> &NullMask {
        match self {
            Self::Numeric { nulls, .. } | Self::Categorical { nulls, .. } => nulls,
        }
    }

    /// Returns `true` if the row at `idx` is valid.
    pub fn is_valid(&self, idx: usize) -> bool {
        self.nulls().is_valid(idx)
    }

    /// Returns the dense numeric values, or `None` for a categorical column.
    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Self::Numeric { values, .. } => Some(values),
            Self::Categorical { .. } => None,
        }
    }

    /// Returns valid numeric values with nulls dropped, or `None` for a
    /// categorical column.
    pub fn valid_numeric(&self) -> Option<Vec<f64>> {
        match self {
            Self::Numeric { values, nulls } => Some(
                values
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| nulls.is_valid(*i))
                    .map(|(_, &v)| v)
                    .collect(),
            ),
            Self::Categorical { .. } => None,
        }
    }

    /// Returns the numeric value at `idx`, or `None` if null or categorical.
    pub fn numeric_at(&self, idx: usize) -> Option<f64> {
        match self {
            Self::Numeric { values, nulls } if nulls.is_valid(idx) => Some(values[idx]),
            _ => None,
        }
    }

    /// Returns the category string at `idx`, or `None` if null or numeric.
    pub fn category_at(&self, idx: usize) -> Option<&str> {
        match self {
            Self::Categorical { values, nulls } if nulls.is_valid(idx) => {
                Some(values[idx].as_str())
            }
            _ => None,
        }
    }
}

// ── DataFrame ─────────────────────────────────────────────────────────

/// Column-major tabular data: named columns of equal length.
///
/// # Example
///
/// ```
/// use edalytics::dataframe::{Column, DataFrame, NullMask};
///
/// let mut df = DataFrame::new();
/// df.add_column(
///     "x".to_string(),
///     Column::numeric(vec![1.0, 2.0], NullMask::all_valid(2)),
/// ).unwrap();
/// df.add_column(
///     "group".to_string(),
///     Column::categorical(vec!["a".into(), "b".into()], NullMask::all_valid(2)),
/// ).unwrap();
/// assert_eq!(df.column_count(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DataFrame {
    names: Vec<String>,
    columns: Vec<Column>,
    row_count: usize,
}

impl DataFrame {
    /// Creates an empty DataFrame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named column.
    ///
    /// The first column fixes the row count; later columns must match it.
    pub fn add_column(&mut self, name: String, column: Column) -> Result<(), EdaError> {
        let len = column.len();
        if self.columns.is_empty() {
            self.row_count = len;
        } else if len != self.row_count {
            return Err(EdaError::DimensionMismatch {
                expected: self.row_count,
                actual: len,
            });
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    /// Returns the number of rows.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Returns the number of columns.
    #[inline]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the DataFrame has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns all column names in insertion order.
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Returns the column with the given name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.columns[i])
    }

    /// Returns the names of all numeric columns, in insertion order.
    pub fn numeric_column_names(&self) -> Vec<&str> {
        self.names
            .iter()
            .zip(self.columns.iter())
            .filter(|(_, c)| c.data_type() == DataType::Numeric)
            .map(|(n, _)| n.as_str())
            .collect()
    }

    /// Returns (name, type) pairs for every column.
    pub fn schema(&self) -> Vec<(&str, DataType)> {
        self.names
            .iter()
            .zip(self.columns.iter())
            .map(|(n, c)| (n.as_str(), c.data_type()))
            .collect()
    }

    /// Returns the valid (nulls dropped) values of a numeric column.
    ///
    /// # Errors
    ///
    /// [`EdaError::ColumnNotFound`] if no column has that name,
    /// [`EdaError::NonNumericColumn`] if the column is categorical.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<f64>, EdaError> {
        let column = self.column(name).ok_or_else(|| EdaError::ColumnNotFound {
            name: name.to_string(),
        })?;
        column
            .valid_numeric()
            .ok_or_else(|| EdaError::NonNumericColumn {
                column: name.to_string(),
            })
    }

    /// Returns valid values of `metric` restricted to rows where the
    /// categorical column `group_column` equals `group_value`.
    ///
    /// Rows where either cell is null are skipped.
    pub fn metric_in_group(
        &self,
        metric: &str,
        group_column: &str,
        group_value: &str,
    ) -> Result<Vec<f64>, EdaError> {
        let metric_col = self.column(metric).ok_or_else(|| EdaError::ColumnNotFound {
            name: metric.to_string(),
        })?;
        if metric_col.data_type() != DataType::Numeric {
            return Err(EdaError::NonNumericColumn {
                column: metric.to_string(),
            });
        }
        let group_col = self
            .column(group_column)
            .ok_or_else(|| EdaError::ColumnNotFound {
                name: group_column.to_string(),
            })?;

        let mut out = Vec::new();
        for row in 0..self.row_count {
            if group_col.category_at(row) == Some(group_value) {
                if let Some(v) = metric_col.numeric_at(row) {
                    out.push(v);
                }
            }
        }
        Ok(out)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────
