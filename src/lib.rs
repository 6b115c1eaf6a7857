//! edalytics — statistical helpers for exploratory data analysis.
//!
//! Built around a column-major [`DataFrame`](dataframe::DataFrame) with
//! null tracking, the crate answers the questions that come up when
//! analyzing experiment data:
//!
//! - Is this metric normally distributed?
//!   ([`normality`](normality::normality_test), Shapiro-Wilk or
//!   Kolmogorov-Smirnov)
//! - Which column pairs can be treated as linear, and how correlated are
//!   they? ([`analysis`](analysis::identify_correlations), Pearson for
//!   linear pairs, Spearman otherwise)
//! - Which correlations matter?
//!   ([`analysis::classify_correlations`], weak / moderate / strong)
//! - Do the control and test groups differ on a metric?
//!   ([`comparison`](comparison::compare_groups), Mann-Whitney U)
//! - Is a metric binary or continuous, and which experiment group does a
//!   value belong to? ([`metrics`])
//!
//! Results are structured values; [`report`] renders them as sentences.
//!
//! # Quick start
//!
//! ```
//! use edalytics::comparison::{compare_groups, GroupComparisonConfig};
//! use edalytics::dataframe::{Column, DataFrame, NullMask};
//! use edalytics::normality::normality_test;
//! use edalytics::DEFAULT_ALPHA;
//!
//! let mut df = DataFrame::new();
//! df.add_column(
//!     "lift".to_string(),
//!     Column::numeric(
//!         vec![-1.5, -1.0, -0.5, 0.0, 0.0, 0.5, 1.0, 1.5],
//!         NullMask::all_valid(8),
//!     ),
//! )?;
//! df.add_column(
//!     "test_group".to_string(),
//!     Column::categorical(
//!         vec![
//!             "control".into(), "test".into(), "control".into(), "control".into(),
//!             "test".into(), "test".into(), "control".into(), "test".into(),
//!         ],
//!         NullMask::all_valid(8),
//!     ),
//! )?;
//!
//! let normality = normality_test(&df, "lift", "ks", DEFAULT_ALPHA)?;
//! assert!(normality.is_normal);
//!
//! let verdicts = compare_groups(
//!     &df, &["lift"], "control", "test", &GroupComparisonConfig::default(),
//! )?;
//! assert!(!verdicts[0].medians_differ);
//! # Ok::<(), edalytics::error::EdaError>(())
//! ```

pub mod analysis;
pub mod comparison;
pub mod correlation;
pub mod dataframe;
pub mod error;
pub mod metrics;
pub mod normality;
pub mod report;
pub mod stats;

/// Default significance level for every test in the crate.
pub const DEFAULT_ALPHA: f64 = 0.05;
