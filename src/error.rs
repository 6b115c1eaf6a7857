//! Error types for edalytics.

use std::fmt;

/// All errors produced by edalytics operations.
#[derive(Debug, Clone, PartialEq)]
pub enum EdaError {
    /// Column not found in DataFrame.
    ColumnNotFound { name: String },
    /// Column is not numeric where numeric data is required.
    NonNumericColumn { column: String },
    /// Method selector is not one of the supported values.
    UnsupportedMethod { method: String },
    /// Insufficient data for the requested operation.
    InsufficientData { min_required: usize, actual: usize },
    /// Column length does not match the DataFrame row count.
    DimensionMismatch { expected: usize, actual: usize },
}

impl fmt::Display for EdaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ColumnNotFound { name } => {
                write!(f, "column '{name}' not found")
            }
            Self::NonNumericColumn { column } => {
                write!(f, "column '{column}' is not numeric")
            }
            Self::UnsupportedMethod { method } => {
                write!(f, "unsupported method '{method}': use 'shapiro' or 'ks'")
            }
            Self::InsufficientData {
                min_required,
                actual,
            } => {
                write!(f, "need at least {min_required} observations, got {actual}")
            }
            Self::DimensionMismatch { expected, actual } => {
                write!(f, "expected {expected} rows, got {actual}")
            }
        }
    }
}

impl std::error::Error for EdaError {}
