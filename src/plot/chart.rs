//! SVG classification chart (Plotters).
//!
//! Elements:
//! - selected reference functions as lines (one palette color each)
//! - assigned test points with vertical error bars spanning `y ± deviation`
//! - unassigned test points as hollow red markers

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::catalog::CurveCatalog;
use crate::domain::{Assignment, SelectionResult};
use crate::error::AppError;

const CHART_SIZE: (u32, u32) = (1280, 800);

/// A named polyline drawn under the test points.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartCurve {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

/// Curves for every selected function, sampled on the catalog grid.
pub fn curves_for_selection(catalog: &CurveCatalog, selection: &SelectionResult) -> Result<Vec<ChartCurve>, AppError> {
    curves_for_ids(catalog, selection.chosen.iter().map(|f| f.id))
}

/// Curves for arbitrary catalog ids, in the given order.
pub fn curves_for_ids(
    catalog: &CurveCatalog,
    ids: impl IntoIterator<Item = usize>,
) -> Result<Vec<ChartCurve>, AppError> {
    ids.into_iter()
        .map(|id| {
            let function = catalog.function(id)?;
            Ok(ChartCurve {
                name: function.name.clone(),
                points: catalog.xs().iter().copied().zip(function.samples().iter().copied()).collect(),
            })
        })
        .collect()
}

/// Render the chart to an SVG file at `path`.
pub fn render_chart(assignments: &[Assignment], curves: &[ChartCurve], path: &Path) -> Result<(), AppError> {
    let (x_range, y_range) =
        chart_bounds(assignments, curves).ok_or_else(|| AppError::Plot("nothing to plot".to_string()))?;

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    draw(&root, assignments, curves, x_range, y_range).map_err(|e| AppError::Plot(e.to_string()))?;
    root.present().map_err(|e| AppError::Plot(e.to_string()))?;
    Ok(())
}

fn draw(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    assignments: &[Assignment],
    curves: &[ChartCurve],
    (x0, x1): (f64, f64),
    (y0, y1): (f64, f64),
) -> Result<(), Box<dyn std::error::Error>> {
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(root)
        .caption("Test point classification", ("sans-serif", 24))
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart.configure_mesh().x_desc("x").y_desc("y").draw()?;

    for (i, curve) in curves.iter().enumerate() {
        let color = Palette99::pick(i).to_rgba();
        chart
            .draw_series(LineSeries::new(curve.points.iter().copied(), color.stroke_width(2)))?
            .label(curve.name.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    let assigned: Vec<(f64, f64, f64)> = assignments
        .iter()
        .filter_map(|a| a.deviation.map(|d| (a.x, a.y, d)))
        .collect();

    chart.draw_series(assigned.iter().map(|&(x, y, d)| {
        let (lo, hi) = ((y - d).min(y + d), (y - d).max(y + d));
        ErrorBar::new_vertical(x, lo, y, hi, BLUE.filled(), 6)
    }))?;
    chart
        .draw_series(assigned.iter().map(|&(x, y, _)| Circle::new((x, y), 3, BLUE.filled())))?
        .label("assigned")
        .legend(|(x, y)| Circle::new((x, y), 3, BLUE.filled()));

    chart
        .draw_series(
            assignments
                .iter()
                .filter(|a| !a.is_assigned())
                .map(|a| Circle::new((a.x, a.y), 4, RED.stroke_width(1))),
        )?
        .label("unassigned")
        .legend(|(x, y)| Circle::new((x, y), 4, RED.stroke_width(1)));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

/// Padded `(x_range, y_range)` covering points, error bars and curves.
fn chart_bounds(assignments: &[Assignment], curves: &[ChartCurve]) -> Option<((f64, f64), (f64, f64))> {
    let mut xs = Bounds::default();
    let mut ys = Bounds::default();

    for a in assignments {
        xs.add(a.x);
        ys.add(a.y);
        if let Some(d) = a.deviation {
            ys.add(a.y - d);
            ys.add(a.y + d);
        }
    }
    for &(x, y) in curves.iter().flat_map(|c| c.points.iter()) {
        xs.add(x);
        ys.add(y);
    }

    Some((xs.padded()?, ys.padded()?))
}

#[derive(Debug, Clone, Copy)]
struct Bounds {
    min: f64,
    max: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl Bounds {
    fn add(&mut self, v: f64) {
        if v.is_finite() {
            self.min = self.min.min(v);
            self.max = self.max.max(v);
        }
    }

    fn padded(self) -> Option<(f64, f64)> {
        if !(self.min.is_finite() && self.max.is_finite()) {
            return None;
        }
        let span = self.max - self.min;
        let pad = if span > 0.0 { span * 0.05 } else { 1.0 };
        Some((self.min - pad, self.max + pad))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::linear_pair;
    use crate::domain::SelectedFunction;
    use crate::store::csv_dir::tests::scratch_dir;

    #[test]
    fn bounds_include_error_bars_and_pad() {
        let rows = vec![
            Assignment { x: 0.0, y: 1.0, function_id: Some(0), deviation: Some(-2.0) },
            Assignment::unassigned(10.0, 2.0),
        ];
        let ((x0, x1), (y0, y1)) = chart_bounds(&rows, &[]).unwrap();
        assert_eq!((x0, x1), (-0.5, 10.5));
        // y spans [-1, 3] before padding.
        assert!((y0 - (-1.2)).abs() < 1e-12);
        assert!((y1 - 3.2).abs() < 1e-12);
    }

    #[test]
    fn empty_chart_is_an_error() {
        let dir = scratch_dir("chart-empty");
        let err = render_chart(&[], &[], &dir.join("c.svg")).unwrap_err();
        assert!(matches!(err, AppError::Plot(_)));
    }

    #[test]
    fn writes_svg_with_curves_and_points() {
        let catalog = linear_pair();
        let selection = SelectionResult {
            chosen: vec![SelectedFunction {
                id: 0,
                name: "y1".into(),
                score: 0.0,
                max_deviation: 0.5,
                fitted_series: None,
            }],
        };
        let curves = curves_for_selection(&catalog, &selection).unwrap();
        assert_eq!(curves[0].points.len(), 11);
        assert_eq!(curves[0].points[3], (3.0, 3.0));

        let rows = vec![
            Assignment { x: 5.0, y: 5.2, function_id: Some(0), deviation: Some(0.2) },
            Assignment::unassigned(5.0, 20.0),
        ];
        let dir = scratch_dir("chart");
        let path = dir.join("classification.svg");
        render_chart(&rows, &curves, &path).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("unassigned"));
    }
}
