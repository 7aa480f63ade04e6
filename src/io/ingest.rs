//! CSV ingest and column-role validation.
//!
//! This module turns the raw input CSVs (training, ideal, test) into numeric
//! [`Table`]s, and stored tables back into [`Series`].
//!
//! Design goals:
//! - **Strict schema**: column roles are explicit and validated up front
//! - **Fail fast**: any unparsable cell aborts with file, line and column
//! - **Separation of concerns**: no selection or classification logic here

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{ColumnRoles, Point, Series};
use crate::error::AppError;
use crate::store::Table;

/// Read a numeric CSV file into a [`Table`], keeping only the columns `roles`
/// names (x first, then the y columns in order).
pub fn load_csv_table(path: &Path, roles: &ColumnRoles) -> Result<Table, AppError> {
    let source = path.display().to_string();
    let file = File::open(path).map_err(|e| AppError::io(format!("Failed to open CSV '{source}'"), e))?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::load(&source, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    let selected = resolve_columns(&source, &headers, &header_map, roles)?;

    let columns: Vec<String> = selected
        .iter()
        .map(|&idx| normalize_header_name(&headers[idx]))
        .collect();

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: 1-based lines, plus the header line.
        let line = idx + 2;
        let record = result.map_err(|e| AppError::load(&source, format!("line {line}: CSV parse error: {e}")))?;

        let row = selected
            .iter()
            .zip(&columns)
            .map(|(&col, name)| parse_cell(&source, line, name, record.get(col)).map(Some))
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(AppError::load(&source, "No data rows."));
    }

    log::debug!("read {} rows x {} columns from {source}", rows.len(), columns.len());
    Ok(Table::with_rows(columns, rows))
}

/// Split a table into one [`Series`] per non-x column.
///
/// Labels are `<prefix>:<column>`. Duplicate x within a series, empty cells
/// and non-finite values are load errors.
pub fn series_from_table(prefix: &str, table: &Table, x_column: &str) -> Result<Vec<Series>, AppError> {
    let x_idx = x_index(prefix, table, x_column)?;

    let mut out = Vec::new();
    for (col, name) in table.columns.iter().enumerate() {
        if col == x_idx {
            continue;
        }
        let label = format!("{prefix}:{name}");
        let points = column_points(&label, table, x_idx, col)?;
        ensure_unique_x(&label, &points)?;
        out.push(Series::new(label, points));
    }

    if out.is_empty() {
        return Err(AppError::load(prefix, "No y columns."));
    }
    Ok(out)
}

/// Read the single y column of a test table.
///
/// Unlike training series, test points may repeat an x value.
pub fn test_series_from_table(name: &str, table: &Table, x_column: &str) -> Result<Series, AppError> {
    let x_idx = x_index(name, table, x_column)?;
    let y_cols: Vec<usize> = (0..table.columns.len()).filter(|&c| c != x_idx).collect();
    let [col] = y_cols[..] else {
        return Err(AppError::load(
            name,
            format!("Expected exactly one y column, found {}.", y_cols.len()),
        ));
    };

    let label = format!("{name}:{}", table.columns[col]);
    let points = column_points(&label, table, x_idx, col)?;
    Ok(Series::new(label, points))
}

fn x_index(source: &str, table: &Table, x_column: &str) -> Result<usize, AppError> {
    table
        .column_index(x_column)
        .ok_or_else(|| AppError::load(source, format!("Missing x column `{x_column}`.")))
}

fn column_points(label: &str, table: &Table, x_idx: usize, col: usize) -> Result<Vec<Point>, AppError> {
    table
        .rows
        .iter()
        .enumerate()
        .map(|(r, row)| {
            let (Some(x), Some(y)) = (row[x_idx], row[col]) else {
                return Err(AppError::load(label, format!("Row {r}: empty cell.")));
            };
            if !(x.is_finite() && y.is_finite()) {
                return Err(AppError::load(label, format!("Row {r}: non-finite value.")));
            }
            Ok(Point { x, y })
        })
        .collect()
}

fn ensure_unique_x(label: &str, points: &[Point]) -> Result<(), AppError> {
    let mut xs: Vec<f64> = points.iter().map(|p| p.x).collect();
    xs.sort_by(f64::total_cmp);
    match xs.windows(2).find(|w| w[0] == w[1]) {
        Some(w) => Err(AppError::load(label, format!("Duplicate x value {}.", w[0]))),
        None => Ok(()),
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM;
    // without stripping it the x column would not be found.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

/// Map column roles to header indices: x first, then y columns.
fn resolve_columns(
    source: &str,
    headers: &StringRecord,
    header_map: &HashMap<String, usize>,
    roles: &ColumnRoles,
) -> Result<Vec<usize>, AppError> {
    let lookup = |name: &str| -> Result<usize, AppError> {
        header_map
            .get(&normalize_header_name(name))
            .copied()
            .ok_or_else(|| AppError::load(source, format!("Missing required column: `{name}`")))
    };

    let x_idx = lookup(&roles.x)?;
    let mut selected = vec![x_idx];

    match &roles.y {
        Some(names) => {
            for name in names {
                let idx = lookup(name)?;
                if idx == x_idx {
                    return Err(AppError::load(source, format!("Column `{name}` cannot be both x and y.")));
                }
                if selected.contains(&idx) {
                    return Err(AppError::load(source, format!("Column `{name}` listed twice.")));
                }
                selected.push(idx);
            }
        }
        None => selected.extend((0..headers.len()).filter(|&i| i != x_idx)),
    }

    if selected.len() < 2 {
        return Err(AppError::load(source, "No y columns besides the x column."));
    }
    Ok(selected)
}

fn parse_cell(source: &str, line: usize, column: &str, raw: Option<&str>) -> Result<f64, AppError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::load(source, format!("line {line}: missing value in column `{column}`")))?;
    let v = raw
        .parse::<f64>()
        .map_err(|_| AppError::load(source, format!("line {line}: column `{column}`: not a number: '{raw}'")))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(AppError::load(source, format!("line {line}: column `{column}`: non-finite value")))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::store::csv_dir::tests::scratch_dir;

    fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn reads_all_columns_with_bom_and_case() {
        let dir = scratch_dir("ingest-bom");
        let path = write(&dir, "train.csv", "\u{feff}X , Y1,Y2\n0,1,2\n1,3,4\n");
        let table = load_csv_table(&path, &ColumnRoles::all_y("x")).unwrap();
        assert_eq!(table.columns, vec!["x", "y1", "y2"]);
        assert_eq!(table.rows[1], vec![Some(1.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn explicit_roles_project_and_reorder() {
        let dir = scratch_dir("ingest-roles");
        let path = write(&dir, "test.csv", "y,extra,x\n5,9,1\n6,9,2\n");
        let table = load_csv_table(&path, &ColumnRoles::single_y("x", "y")).unwrap();
        assert_eq!(table.columns, vec!["x", "y"]);
        assert_eq!(table.rows[0], vec![Some(1.0), Some(5.0)]);
    }

    #[test]
    fn missing_column_and_bad_cell_are_load_errors() {
        let dir = scratch_dir("ingest-bad");
        let path = write(&dir, "test.csv", "a,y\n1,2\n");
        let err = load_csv_table(&path, &ColumnRoles::single_y("x", "y")).unwrap_err();
        assert!(err.to_string().contains("`x`"));

        let path = write(&dir, "bad.csv", "x,y\n1,2\n2,oops\n");
        let err = load_csv_table(&path, &ColumnRoles::all_y("x")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("line 3") && msg.contains("`y`"), "{msg}");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_csv_table(Path::new("/definitely/not/here.csv"), &ColumnRoles::all_y("x")).unwrap_err();
        assert!(matches!(err, AppError::Io { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn series_per_y_column_with_labels() {
        let table = Table::with_rows(
            vec!["x".into(), "y1".into(), "y2".into()],
            vec![vec![Some(0.0), Some(1.0), Some(2.0)], vec![Some(1.0), Some(3.0), Some(4.0)]],
        );
        let series = series_from_table("train", &table, "x").unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].label, "train:y1");
        assert_eq!(series[1].points[1], Point { x: 1.0, y: 4.0 });
    }

    #[test]
    fn duplicate_x_in_series_is_rejected() {
        let table = Table::with_rows(
            vec!["x".into(), "y".into()],
            vec![vec![Some(1.0), Some(1.0)], vec![Some(1.0), Some(2.0)]],
        );
        assert!(matches!(series_from_table("test", &table, "x"), Err(AppError::Load { .. })));
    }

    #[test]
    fn test_table_keeps_repeated_x() {
        let table = Table::with_rows(
            vec!["x".into(), "y".into()],
            vec![vec![Some(1.0), Some(2.0)], vec![Some(1.0), Some(5.0)]],
        );
        let series = test_series_from_table("test_data", &table, "x").unwrap();
        assert_eq!(series.label, "test_data:y");
        assert_eq!(series.len(), 2);

        let wide = Table::with_rows(
            vec!["x".into(), "y1".into(), "y2".into()],
            vec![vec![Some(1.0), Some(2.0), Some(3.0)]],
        );
        assert!(matches!(
            test_series_from_table("test_data", &wide, "x"),
            Err(AppError::Load { .. })
        ));
    }
}
