//! Utility classifiers for experiment metadata.
//!
//! [`categorize`] maps a raw categorical value onto one of two
//! experiment groups; [`determine_problem_type`] detects whether a
//! metric is binary (a proportion) or continuous (a mean).

use std::fmt;

use crate::dataframe::{Column, DataFrame};
use crate::error::EdaError;

// ── Group labeling ────────────────────────────────────────────────────

/// Which experiment group a categorical value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupLabel {
    GroupA,
    GroupB,
    /// The value matched neither membership list.
    Unknown,
}

impl fmt::Display for GroupLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GroupA => write!(f, "group_a"),
            Self::GroupB => write!(f, "group_b"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Maps a raw value onto an experiment group by membership.
///
/// `group_a` is checked first, so a value listed in both comes back
/// [`GroupLabel::GroupA`]. Values in neither list are
/// [`GroupLabel::Unknown`]; the function is total and never fails.
///
/// ```
/// use edalytics::metrics::{categorize, GroupLabel};
///
/// let a = ["US", "CA"];
/// let b = ["DE", "FR"];
/// assert_eq!(categorize("CA", &a, &b), GroupLabel::GroupA);
/// assert_eq!(categorize("FR", &a, &b), GroupLabel::GroupB);
/// assert_eq!(categorize("JP", &a, &b), GroupLabel::Unknown);
/// ```
pub fn categorize(value: &str, group_a: &[&str], group_b: &[&str]) -> GroupLabel {
    if group_a.contains(&value) {
        GroupLabel::GroupA
    } else if group_b.contains(&value) {
        GroupLabel::GroupB
    } else {
        GroupLabel::Unknown
    }
}

// ── Problem-type detection ────────────────────────────────────────────

/// Statistical treatment a metric calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemType {
    /// Binary outcomes: analyze as success proportions.
    Proportions,
    /// Continuous outcomes: analyze as means.
    Means,
}

impl fmt::Display for ProblemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Proportions => write!(f, "proportions"),
            Self::Means => write!(f, "means"),
        }
    }
}

/// Detects whether a metric is binary or continuous.
///
/// A numeric column whose valid values all lie in {0, 1} is
/// [`ProblemType::Proportions`]; anything else, including categorical
/// columns, is [`ProblemType::Means`]. A fully-null numeric column
/// classifies as proportions (the empty value set is a subset of {0, 1}).
///
/// # Errors
///
/// [`EdaError::ColumnNotFound`] if no column has that name.
///
/// ```
/// use edalytics::dataframe::{Column, DataFrame, NullMask};
/// use edalytics::metrics::{determine_problem_type, ProblemType};
///
/// let mut df = DataFrame::new();
/// df.add_column(
///     "converted".to_string(),
///     Column::numeric(vec![0.0, 1.0, 0.0, 1.0], NullMask::all_valid(4)),
/// ).unwrap();
/// df.add_column(
///     "revenue".to_string(),
///     Column::numeric(vec![0.0, 12.5, 3.2, 0.0], NullMask::all_valid(4)),
/// ).unwrap();
///
/// assert_eq!(determine_problem_type(&df, "converted").unwrap(), ProblemType::Proportions);
/// assert_eq!(determine_problem_type(&df, "revenue").unwrap(), ProblemType::Means);
/// ```
pub fn determine_problem_type(df: &DataFrame, metric: &str) -> Result<ProblemType, EdaError> {
    let column = df.column(metric).ok_or_else(|| EdaError::ColumnNotFound {
        name: metric.to_string(),
    })?;

    match column {
        Column::Numeric { .. } => {
            let binary = column
                .valid_numeric()
                .map_or(true, |values| values.iter().all(|&v| v == 0.0 || v == 1.0));
            if binary {
                Ok(ProblemType::Proportions)
            } else {
                Ok(ProblemType::Means)
            }
        }
        Column::Categorical { .. } => Ok(ProblemType::Means),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataframe::NullMask;

    fn df_with(name: &str, column: Column) -> DataFrame {
        let mut df = DataFrame::new();
        df.add_column(name.to_string(), column).unwrap();
        df
    }

    // ── categorize ───────────────────────────────────────────────

    #[test]
    fn categorize_membership() {
        let a = ["red", "blue"];
        let b = ["green"];
        assert_eq!(categorize("red", &a, &b), GroupLabel::GroupA);
        assert_eq!(categorize("green", &a, &b), GroupLabel::GroupB);
        assert_eq!(categorize("yellow", &a, &b), GroupLabel::Unknown);
    }

    #[test]
    fn categorize_overlap_prefers_group_a() {
        let a = ["x"];
        let b = ["x"];
        assert_eq!(categorize("x", &a, &b), GroupLabel::GroupA);
    }

    #[test]
    fn categorize_empty_lists() {
        assert_eq!(categorize("anything", &[], &[]), GroupLabel::Unknown);
    }

    #[test]
    fn group_label_display() {
        assert_eq!(GroupLabel::GroupA.to_string(), "group_a");
        assert_eq!(GroupLabel::GroupB.to_string(), "group_b");
        assert_eq!(GroupLabel::Unknown.to_string(), "Unknown");
    }

    // ── determine_problem_type ───────────────────────────────────

    #[test]
    fn binary_metric_is_proportions() {
        let df = df_with(
            "converted",
            Column::numeric(vec![0.0, 1.0, 0.0, 1.0], NullMask::all_valid(4)),
        );
        assert_eq!(
            determine_problem_type(&df, "converted").unwrap(),
            ProblemType::Proportions
        );
    }

    #[test]
    fn three_valued_metric_is_means() {
        let df = df_with(
            "level",
            Column::numeric(vec![0.0, 1.0, 2.0], NullMask::all_valid(3)),
        );
        assert_eq!(
            determine_problem_type(&df, "level").unwrap(),
            ProblemType::Means
        );
    }

    #[test]
    fn constant_zero_metric_is_proportions() {
        let df = df_with(
            "flag",
            Column::numeric(vec![0.0, 0.0, 0.0], NullMask::all_valid(3)),
        );
        assert_eq!(
            determine_problem_type(&df, "flag").unwrap(),
            ProblemType::Proportions
        );
    }

    #[test]
    fn all_null_metric_is_proportions() {
        // Empty value set: vacuously binary
        let df = df_with("empty", Column::from_options(vec![None, None, None]));
        assert_eq!(
            determine_problem_type(&df, "empty").unwrap(),
            ProblemType::Proportions
        );
    }

    #[test]
    fn nulls_excluded_from_value_set() {
        let df = df_with(
            "partial",
            Column::from_options(vec![Some(0.0), None, Some(1.0)]),
        );
        assert_eq!(
            determine_problem_type(&df, "partial").unwrap(),
            ProblemType::Proportions
        );
    }

    #[test]
    fn categorical_metric_is_means() {
        let df = df_with(
            "plan",
            Column::categorical(vec!["free".into(), "pro".into()], NullMask::all_valid(2)),
        );
        assert_eq!(
            determine_problem_type(&df, "plan").unwrap(),
            ProblemType::Means
        );
    }

    #[test]
    fn missing_column_errors() {
        let df = df_with("x", Column::numeric(vec![1.0], NullMask::all_valid(1)));
        assert!(matches!(
            determine_problem_type(&df, "nope"),
            Err(EdaError::ColumnNotFound { .. })
        ));
    }
}
