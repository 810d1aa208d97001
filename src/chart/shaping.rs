//! Per-kind transformations from dataset rows to a series payload.
//!
//! All functions are pure and keep source row order wherever order matters:
//! pie categories appear in first-seen order, projected columns are colored
//! by their row index.

use indexmap::IndexMap;

use super::numeric::{number_or_zero, parse_number};
use super::{CategoryTotal, ChartKind, ProjectedColumn};
use crate::dataset::{CellValue, Record};

/// Rows rendered by the projected 3D column chart.
pub const PROJECTED_COLUMN_CAP: usize = 20;

/// Output height range of a projected column is `[HEIGHT_FLOOR, HEIGHT_FLOOR + HEIGHT_SPAN]`.
pub const HEIGHT_FLOOR: f64 = 0.5;
pub const HEIGHT_SPAN: f64 = 5.0;

/// Distance between neighbouring columns along the x axis.
pub const COLUMN_SPACING: f64 = 1.2;

pub const LABEL_MAX_CHARS: usize = 8;

pub const COLUMN_PALETTE: [&str; 5] = [
    "#3B82F6", // blue
    "#F59E0B", // amber
    "#EF4444", // red
    "#10B981", // emerald
    "#8B5CF6", // violet
];

/// Group rows by the text of `x_field` and sum `y_field` within each group.
pub fn aggregate_by_category(rows: &[Record], x_field: &str, y_field: &str) -> Vec<CategoryTotal> {
    let mut totals: IndexMap<String, f64> = IndexMap::new();

    for row in rows {
        let category = row.get(x_field).map(CellValue::to_string).unwrap_or_default();
        let value = row.get(y_field).map(number_or_zero).unwrap_or(0.0);
        *totals.entry(category).or_insert(0.0) += value;
    }

    totals
        .into_iter()
        .map(|(category, total)| CategoryTotal { category, total })
        .collect()
}

/// Whether a row survives axis filtering for `kind`.
///
/// The x cell must be present and non-blank. The y cell must parse as a
/// number, except for bar charts which keep non-numeric y values.
pub fn is_plottable(row: &Record, x_field: &str, y_field: &str, kind: ChartKind) -> bool {
    let has_x = row.get(x_field).is_some_and(|cell| !cell.is_blank());
    if !has_x {
        return false;
    }
    kind == ChartKind::Bar || row.get(y_field).and_then(parse_number).is_some()
}

/// Drop rows that cannot be plotted. Dropping is silent; the caller only
/// learns how many went.
pub fn filter_plottable(
    rows: &[Record],
    x_field: &str,
    y_field: &str,
    kind: ChartKind,
) -> Vec<Record> {
    rows.iter()
        .filter(|row| is_plottable(row, x_field, y_field, kind))
        .cloned()
        .collect()
}

/// Normalize the first [`PROJECTED_COLUMN_CAP`] rows into column heights.
///
/// Rows are taken as they come, without the axis filter: a blank x gives an
/// empty label and an unparseable y counts as zero.
pub fn project_columns(rows: &[Record], x_field: &str, y_field: &str) -> Vec<ProjectedColumn> {
    let capped = &rows[..rows.len().min(PROJECTED_COLUMN_CAP)];
    let values: Vec<f64> = capped
        .iter()
        .map(|row| row.get(y_field).map(number_or_zero).unwrap_or(0.0))
        .collect();

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    // all-equal values collapse to the floor instead of dividing by zero
    let range = if max - min == 0.0 { 1.0 } else { max - min };
    let half = capped.len() as f64 / 2.0;

    capped
        .iter()
        .zip(values)
        .enumerate()
        .map(|(index, (row, value))| ProjectedColumn {
            label: truncate_label(row.get(x_field)),
            value,
            height: HEIGHT_FLOOR + (value - min) / range * HEIGHT_SPAN,
            color: COLUMN_PALETTE[index % COLUMN_PALETTE.len()],
            offset: (index as f64 - half) * COLUMN_SPACING,
        })
        .collect()
}

fn truncate_label(cell: Option<&CellValue>) -> String {
    cell.map(CellValue::to_string)
        .unwrap_or_default()
        .chars()
        .take(LABEL_MAX_CHARS)
        .collect()
}
