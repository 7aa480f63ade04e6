//! Test-point classification against the selected reference functions.
//!
//! For each test point every selected function is evaluated. A function is a
//! candidate only if its absolute deviation is within the limit the configured
//! [`AcceptancePolicy`] gives that function (boundary inclusive). The point goes
//! to the candidate with the smallest absolute deviation, ties keeping the
//! earlier entry in selection order; with no candidate it stays unassigned.
//! `Nearest` is a separate policy, not a fallback.

use std::collections::BTreeMap;

use crate::catalog::CurveCatalog;
use crate::domain::{AcceptancePolicy, Assignment, SelectionResult, Series};
use crate::error::AppError;

pub struct Classifier<'a> {
    catalog: &'a CurveCatalog,
    selection: &'a SelectionResult,
    policy: AcceptancePolicy,
}

impl<'a> Classifier<'a> {
    pub fn new(catalog: &'a CurveCatalog, selection: &'a SelectionResult, policy: AcceptancePolicy) -> Self {
        Self {
            catalog,
            selection,
            policy,
        }
    }

    pub fn policy(&self) -> AcceptancePolicy {
        self.policy
    }

    /// Classify every point of `test`, in input order.
    pub fn classify(&self, test: &Series) -> Result<Vec<Assignment>, AppError> {
        if self.selection.is_empty() {
            return Err(AppError::NoReferenceFunctions);
        }
        test.points
            .iter()
            .map(|p| self.classify_point(p.x, p.y))
            .collect()
    }

    pub fn classify_point(&self, x: f64, y: f64) -> Result<Assignment, AppError> {
        if self.selection.is_empty() {
            return Err(AppError::NoReferenceFunctions);
        }

        let mut nearest: Option<(usize, f64)> = None;
        for f in &self.selection.chosen {
            let deviation = y - self.catalog.evaluate(f.id, x)?;
            let within = self
                .policy
                .max_allowed(f)
                .is_none_or(|limit| deviation.abs() <= limit);
            if within && nearest.is_none_or(|(_, best)| deviation.abs() < best.abs()) {
                nearest = Some((f.id, deviation));
            }
        }

        Ok(match nearest {
            Some((id, deviation)) => Assignment {
                x,
                y,
                function_id: Some(id),
                deviation: Some(deviation),
            },
            None => Assignment::unassigned(x, y),
        })
    }
}

/// Counts for terminal reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationSummary {
    pub total: usize,
    pub assigned: usize,
    pub unassigned: usize,
    /// Assigned point count per function id.
    pub per_function: BTreeMap<usize, usize>,
}

pub fn summarize(assignments: &[Assignment]) -> ClassificationSummary {
    let mut summary = ClassificationSummary {
        total: assignments.len(),
        ..Default::default()
    };
    for a in assignments {
        match a.function_id {
            Some(id) => {
                summary.assigned += 1;
                *summary.per_function.entry(id).or_default() += 1;
            }
            None => summary.unassigned += 1,
        }
    }
    summary
}
