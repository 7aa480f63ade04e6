//! Deviation scoring between observed series and reference functions.
//!
//! All functions here are pure. Evaluation failures propagate (wrapped with
//! the offending series label); they are never treated as a zero deviation.

use crate::catalog::CurveCatalog;
use crate::domain::Series;
use crate::error::AppError;

/// Sum of squared deviations `Σ (y - f(x))²` of one series against function `id`.
pub fn score(series: &Series, catalog: &CurveCatalog, id: usize) -> Result<f64, AppError> {
    let mut sse = 0.0;
    for p in &series.points {
        let y_ref = catalog.evaluate(id, p.x).map_err(|e| in_series(series, e))?;
        let d = p.y - y_ref;
        sse += d * d;
    }
    Ok(sse)
}

/// Pooled score: per-series scores summed across the whole training set.
pub fn score_pooled(series_set: &[Series], catalog: &CurveCatalog, id: usize) -> Result<f64, AppError> {
    series_set
        .iter()
        .try_fold(0.0, |acc, s| Ok(acc + score(s, catalog, id)?))
}

/// Largest `|y - f(x)|` over the points of one series (`0.0` when empty).
pub fn max_abs_deviation(series: &Series, catalog: &CurveCatalog, id: usize) -> Result<f64, AppError> {
    let mut max = 0.0_f64;
    for p in &series.points {
        let y_ref = catalog.evaluate(id, p.x).map_err(|e| in_series(series, e))?;
        max = max.max((p.y - y_ref).abs());
    }
    Ok(max)
}

/// The training series function `id` fits best, with its largest absolute
/// deviation against that series.
///
/// "Best" is the lowest per-series score; ties keep the earlier series.
/// Series the function does not fit (other curves in a pooled training set)
/// never widen the bound. `None` for an empty training set.
pub fn fitted_bound<'s>(
    series_set: &'s [Series],
    catalog: &CurveCatalog,
    id: usize,
) -> Result<Option<(&'s Series, f64)>, AppError> {
    let mut best: Option<(&Series, f64)> = None;
    for s in series_set {
        let sse = score(s, catalog, id)?;
        if best.is_none_or(|(_, b)| sse < b) {
            best = Some((s, sse));
        }
    }

    match best {
        Some((s, _)) => Ok(Some((s, max_abs_deviation(s, catalog, id)?))),
        None => Ok(None),
    }
}

fn in_series(series: &Series, err: AppError) -> AppError {
    AppError::Scoring {
        series: series.label.clone(),
        source: Box::new(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::linear_pair;

    #[test]
    fn score_sums_squared_deviations() {
        let catalog = linear_pair();
        let s = Series::from_pairs("s", &[(1.0, 2.0), (2.0, 1.0), (3.0, 3.0)]);
        // f0(x) = x: deviations 1, -1, 0
        assert_eq!(score(&s, &catalog, 0).unwrap(), 2.0);
        // f1(x) = 2x: deviations 0, -3, -3
        assert_eq!(score(&s, &catalog, 1).unwrap(), 18.0);
    }

    #[test]
    fn pooled_score_adds_series() {
        let catalog = linear_pair();
        let a = Series::from_pairs("a", &[(1.0, 2.0)]);
        let b = Series::from_pairs("b", &[(4.0, 1.0)]);
        assert_eq!(score_pooled(&[a, b], &catalog, 0).unwrap(), 1.0 + 9.0);
        assert_eq!(score_pooled(&[], &catalog, 0).unwrap(), 0.0);
    }

    #[test]
    fn out_of_domain_point_fails_with_series_label() {
        let catalog = linear_pair();
        let s = Series::from_pairs("train:y3", &[(1.0, 1.0), (11.0, 11.0)]);
        let err = score(&s, &catalog, 0).unwrap_err();
        match &err {
            AppError::Scoring { series, source } => {
                assert_eq!(series, "train:y3");
                assert!(matches!(**source, AppError::OutOfRange { function_id: 0, .. }));
            }
            other => panic!("expected Scoring error, got {other:?}"),
        }
        assert!(max_abs_deviation(&s, &catalog, 0).is_err());
    }

    #[test]
    fn max_abs_deviation_takes_largest_magnitude() {
        let catalog = linear_pair();
        let a = Series::from_pairs("a", &[(1.0, 1.5), (2.0, 2.0), (3.0, 2.25)]);
        assert_eq!(max_abs_deviation(&a, &catalog, 0).unwrap(), 0.75);
    }

    #[test]
    fn bound_comes_from_the_best_fitting_series_only() {
        let catalog = linear_pair();
        // `near` follows f0 = x; `far` follows f1 = 2x.
        let near = Series::from_pairs("near", &[(1.0, 1.5), (2.0, 2.0), (3.0, 3.0)]);
        let far = Series::from_pairs("far", &[(1.0, 2.0), (2.0, 4.0), (3.0, 6.25)]);
        let set = [near, far];

        let (series, max) = fitted_bound(&set, &catalog, 0).unwrap().unwrap();
        assert_eq!(series.label, "near");
        assert_eq!(max, 0.5);

        let (series, max) = fitted_bound(&set, &catalog, 1).unwrap().unwrap();
        assert_eq!(series.label, "far");
        assert_eq!(max, 0.25);

        assert!(fitted_bound(&[], &catalog, 0).unwrap().is_none());
    }
}
