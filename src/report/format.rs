//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the selection/classification code stays clean and testable
//! - output changes are localized

use crate::catalog::CurveCatalog;
use crate::classify::ClassificationSummary;
use crate::domain::{AcceptancePolicy, SelectionResult, Series};

/// Format the run header (inputs + catalog + policy).
pub fn format_run_summary(
    training: &[Series],
    catalog: &CurveCatalog,
    test: &Series,
    policy: &AcceptancePolicy,
) -> String {
    let mut out = String::new();
    let (x_min, x_max) = catalog.domain();

    out.push_str("=== idealfit - Ideal Function Selection ===\n");
    out.push_str(&format!(
        "Catalog: {} functions | x=[{x_min:.3}, {x_max:.3}] | {} samples\n",
        catalog.count(),
        catalog.xs().len(),
    ));
    out.push_str(&format!("Training: {} series\n", training.len()));
    for s in training {
        out.push_str(&format!("  - {} (n={})\n", s.label, s.len()));
    }
    out.push_str(&format!("Test: {} (n={})\n", test.label, test.len()));
    out.push_str(&format!("Acceptance: {}\n", policy.describe()));
    out.push('\n');

    out
}

/// Format the chosen functions table.
pub fn format_selection(selection: &SelectionResult) -> String {
    let mut out = String::new();

    out.push_str("Selected reference functions:\n");
    out.push_str(
        format!(
            "{:>4} {:<16} {:>6} {:>16} {:>14} {}\n",
            "rank", "name", "id", "sse", "max_dev", "fitted"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!("{:-<4} {:-<16} {:-<6} {:-<16} {:-<14} {:-<6}\n", "", "", "", "", "", "").trim_end(),
    );
    out.push('\n');

    for (rank, f) in selection.chosen.iter().enumerate() {
        out.push_str(
            format!(
                "{:>4} {:<16} {:>6} {:>16.6} {:>14.6} {}\n",
                rank + 1,
                truncate(&f.name, 16),
                f.id,
                f.score,
                f.max_deviation,
                f.fitted_series.as_deref().unwrap_or("-"),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format assignment counts per selected function.
pub fn format_classification(summary: &ClassificationSummary, selection: &SelectionResult) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Classified {} test points: {} assigned, {} unassigned\n",
        summary.total, summary.assigned, summary.unassigned
    ));
    for f in &selection.chosen {
        let n = summary.per_function.get(&f.id).copied().unwrap_or(0);
        out.push_str(&format!("  {:<16} {n}\n", truncate(&f.name, 16)));
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
