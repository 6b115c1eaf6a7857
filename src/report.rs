//! Human-readable rendering of analysis results.
//!
//! The analysis modules return structured values; this module turns them
//! into the verdict sentences an analyst reads. Kept separate so callers
//! embedding the library never pay for string formatting they discard.

use std::fmt::Write;

use crate::analysis::{CorrelationBuckets, CorrelationRecord};
use crate::comparison::GroupComparison;
use crate::normality::NormalityTest;

/// Renders a normality verdict as a sentence.
///
/// ```
/// use edalytics::normality::{NormalityMethod, NormalityTest};
/// use edalytics::report::format_normality;
///
/// let t = NormalityTest {
///     metric: "revenue".to_string(),
///     method: NormalityMethod::Shapiro,
///     statistic: 0.97,
///     p_value: 0.4321,
///     is_normal: true,
///     alpha: 0.05,
/// };
/// assert_eq!(
///     format_normality(&t),
///     "The data for the metric 'revenue' follows a normal distribution (p-value = 0.4321)."
/// );
/// ```
pub fn format_normality(test: &NormalityTest) -> String {
    if test.is_normal {
        format!(
            "The data for the metric '{}' follows a normal distribution (p-value = {:.4}).",
            test.metric, test.p_value
        )
    } else {
        format!(
            "The data for the metric '{}' does not follow a normal distribution (p-value = {:.4}).",
            test.metric, test.p_value
        )
    }
}

/// Renders classified correlations as three labeled sections.
pub fn format_correlation_buckets(buckets: &CorrelationBuckets) -> String {
    let mut out = String::new();
    write_bucket(&mut out, "Weak Correlations:", &buckets.weak);
    out.push('\n');
    write_bucket(&mut out, "Moderate Correlations:", &buckets.moderate);
    out.push('\n');
    write_bucket(&mut out, "Strong Correlations:", &buckets.strong);
    out
}

fn write_bucket(out: &mut String, header: &str, records: &[CorrelationRecord]) {
    out.push_str(header);
    for record in records {
        // String's fmt::Write never fails
        let _ = write!(
            out,
            "\nBetween {} and {}: {:.2}",
            record.col_a, record.col_b, record.r
        );
    }
    out.push('\n');
}

/// Renders group-comparison verdicts, one sentence per metric.
pub fn format_group_comparisons(comparisons: &[GroupComparison]) -> String {
    let mut lines = Vec::with_capacity(comparisons.len());
    for c in comparisons {
        let verdict = if c.medians_differ {
            "different"
        } else {
            "the same"
        };
        lines.push(format!(
            "For the metric '{}', the medians are {} (p-value = {:.4}).",
            c.metric, verdict, c.p_value
        ));
    }
    lines.join("\n")
}

// ── Tests ─────────────────────────────────────────────────────────────
