//! Best-fit selection of reference functions.
//!
//! Every candidate is scored once against the pooled training set (sum of
//! squared deviations across all series). Then, k times, the not-yet-chosen
//! candidate with the strictly smallest score is picked. Candidates are
//! scanned in id order with `<`, so on ties the lowest id wins.

use crate::catalog::CurveCatalog;
use crate::domain::{SelectedFunction, SelectionResult, Series};
use crate::error::AppError;
use crate::fit::score::{fitted_bound, score_pooled};

/// Choose the `k` reference functions with minimal pooled deviation.
pub fn select(series_set: &[Series], catalog: &CurveCatalog, k: usize) -> Result<SelectionResult, AppError> {
    let available = catalog.count();
    if k > available {
        return Err(AppError::InsufficientCandidates {
            requested: k,
            available,
        });
    }

    let scores = score_all(series_set, catalog)?;

    let mut taken = vec![false; available];
    let mut chosen = Vec::with_capacity(k);

    for round in 0..k {
        let mut best: Option<usize> = None;
        for (id, &s) in scores.iter().enumerate() {
            if taken[id] {
                continue;
            }
            if best.is_none_or(|b| s < scores[b]) {
                best = Some(id);
            }
        }

        // k <= available guarantees an untaken candidate remains.
        let Some(id) = best else { break };
        taken[id] = true;

        let name = catalog.name(id)?.to_string();
        log::debug!("selection round {}: {name} (id={id}) score={:.6}", round + 1, scores[id]);

        let (fitted_series, max_deviation) = match fitted_bound(series_set, catalog, id)? {
            Some((series, max)) => (Some(series.label.clone()), max),
            None => (None, 0.0),
        };

        chosen.push(SelectedFunction {
            id,
            name,
            score: scores[id],
            max_deviation,
            fitted_series,
        });
    }

    Ok(SelectionResult { chosen })
}

/// Pooled score for every candidate, in id order (for diagnostics).
pub fn score_all(series_set: &[Series], catalog: &CurveCatalog) -> Result<Vec<f64>, AppError> {
    catalog
        .ids()
        .map(|id| score_pooled(series_set, catalog, id))
        .collect()
}
