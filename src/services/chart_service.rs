use tracing::{debug, info};

use crate::chart::numeric::is_numeric_value;
use crate::chart::shaping::{aggregate_by_category, filter_plottable, project_columns};
use crate::chart::{ChartDescriptor, ChartKind, ChartRequest, SeriesPayload};
use crate::dataset::TabularDataset;
use crate::errors::{ChartError, ChartResult};

/// Leading records inspected when deciding whether a column is numeric.
pub const NUMERIC_SAMPLE_SIZE: usize = 10;

/// Chart specification engine.
///
/// Validates a request against a dataset and derives the series payload for
/// the requested kind. Registration of the descriptor is left to the caller.
#[derive(Clone, Debug, Default)]
pub struct ChartService;

impl ChartService {
    pub fn new() -> Self {
        Self
    }

    /// Validate `request` and produce a fresh descriptor plus its payload.
    ///
    /// Checks run in a fixed order and stop at the first failure: title,
    /// then x field, then y field, then the numeric sample for kinds that
    /// plot y as a number.
    pub fn build_chart(
        &self,
        dataset: &TabularDataset,
        request: ChartRequest,
    ) -> ChartResult<(ChartDescriptor, SeriesPayload)> {
        let request = validate_request(dataset, request)?;
        let descriptor = ChartDescriptor::new(request, dataset.id());
        let payload = self.derive_series(dataset, &descriptor)?;

        info!(
            "Built {} chart '{}' on {} ({} points)",
            descriptor.kind(),
            descriptor.title(),
            dataset.source_name(),
            payload.len()
        );
        Ok((descriptor, payload))
    }

    /// Recompute the payload for an existing descriptor.
    ///
    /// Field presence is checked again because a descriptor may be rendered
    /// against a dataset other than the one it was built on.
    pub fn derive_series(
        &self,
        dataset: &TabularDataset,
        descriptor: &ChartDescriptor,
    ) -> ChartResult<SeriesPayload> {
        if descriptor.dataset_id() != dataset.id() {
            return Err(ChartError::DatasetNotFound(descriptor.dataset_id()));
        }
        for field in [descriptor.x_field(), descriptor.y_field()] {
            if !dataset.has_column(field) {
                return Err(ChartError::UnknownField {
                    field: field.to_string(),
                });
            }
        }

        let (x, y) = (descriptor.x_field(), descriptor.y_field());
        let payload = match descriptor.kind() {
            ChartKind::Pie => SeriesPayload::Categories(aggregate_by_category(dataset.rows(), x, y)),
            ChartKind::ProjectedColumn => SeriesPayload::Columns(project_columns(dataset.rows(), x, y)),
            kind @ (ChartKind::Bar | ChartKind::Line | ChartKind::Area | ChartKind::Scatter) => {
                let kept = filter_plottable(dataset.rows(), x, y, kind);
                let dropped = dataset.row_count() - kept.len();
                if dropped > 0 {
                    debug!("Dropped {} unplottable rows for {} chart", dropped, kind);
                }
                SeriesPayload::Records(kept)
            }
        };
        Ok(payload)
    }

    /// Columns offered as a numeric y axis, in column order.
    pub fn numeric_columns<'a>(&self, dataset: &'a TabularDataset) -> Vec<&'a str> {
        let mut seen = Vec::new();
        for column in dataset.columns() {
            if !seen.contains(&column.as_str()) && column_is_numeric(dataset, column) {
                seen.push(column.as_str());
            }
        }
        seen
    }
}

/// The title is stored as typed; trimming only decides whether it is empty.
fn validate_request(dataset: &TabularDataset, request: ChartRequest) -> ChartResult<ChartRequest> {
    if request.title.trim().is_empty() {
        return Err(ChartError::MissingTitle);
    }

    for field in [&request.x_field, &request.y_field] {
        if !dataset.has_column(field) {
            return Err(ChartError::UnknownField {
                field: field.clone(),
            });
        }
    }

    if request.kind.requires_numeric_y() && !column_is_numeric(dataset, &request.y_field) {
        return Err(ChartError::NonNumericAxis {
            field: request.y_field,
        });
    }

    Ok(request)
}

/// At least one of the first [`NUMERIC_SAMPLE_SIZE`] records holds a value
/// that is a finite number as a whole. Unit-suffixed text like `"5kg"` does
/// not count here even though shaping would read its prefix.
fn column_is_numeric(dataset: &TabularDataset, column: &str) -> bool {
    dataset
        .rows()
        .iter()
        .take(NUMERIC_SAMPLE_SIZE)
        .filter_map(|row| row.get(column))
        .any(is_numeric_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::CategoryTotal;
    use crate::dataset::{CellValue, OwnerId};

    fn dataset(columns: &[&str], rows: Vec<Vec<CellValue>>) -> TabularDataset {
        TabularDataset::from_grid(
            "fixture.csv",
            OwnerId::new("owner"),
            columns.iter().map(|c| c.to_string()).collect(),
            rows,
        )
    }

    fn sales() -> TabularDataset {
        dataset(
            &["cat", "v", "note"],
            vec![
                vec!["x".into(), 1.0.into(), "first".into()],
                vec!["x".into(), 3.0.into(), "".into()],
                vec!["y".into(), 2.0.into(), "last".into()],
            ],
        )
    }

    #[test]
    fn test_pie_totals_in_first_seen_order() {
        let service = ChartService::new();
        let (descriptor, payload) = service
            .build_chart(&sales(), ChartRequest::new("Share", ChartKind::Pie, "cat", "v"))
            .expect("Should build pie chart");

        assert_eq!(descriptor.kind(), ChartKind::Pie);
        assert_eq!(
            payload,
            SeriesPayload::Categories(vec![
                CategoryTotal {
                    category: "x".to_string(),
                    total: 4.0
                },
                CategoryTotal {
                    category: "y".to_string(),
                    total: 2.0
                },
            ])
        );
    }

    #[test]
    fn test_blank_title_rejected_first() {
        let err = ChartService::new()
            .build_chart(&sales(), ChartRequest::new("   ", ChartKind::Line, "nope", "nope"))
            .expect_err("Should reject blank title");
        assert_eq!(err, ChartError::MissingTitle);
    }

    #[test]
    fn test_title_is_stored_as_typed() {
        let (descriptor, _) = ChartService::new()
            .build_chart(&sales(), ChartRequest::new("  Sales ", ChartKind::Bar, "cat", "v"))
            .expect("Should build bar chart");
        assert_eq!(descriptor.title(), "  Sales ");
    }

    #[test]
    fn test_unit_suffixed_column_is_not_numeric() {
        let ds = dataset(
            &["item", "weight"],
            vec![
                vec!["a".into(), "5kg".into()],
                vec!["b".into(), "3kg".into()],
            ],
        );
        let service = ChartService::new();
        let err = service
            .build_chart(&ds, ChartRequest::new("t", ChartKind::Line, "item", "weight"))
            .expect_err("Unit-suffixed values are not a numeric axis");
        assert_eq!(
            err,
            ChartError::NonNumericAxis {
                field: "weight".to_string()
            }
        );
        assert!(service.numeric_columns(&ds).is_empty());

        // pie still reads the numeric prefix when summing
        let (_, payload) = service
            .build_chart(&ds, ChartRequest::new("t", ChartKind::Pie, "item", "weight"))
            .expect("Pie skips the numeric check");
        match payload {
            SeriesPayload::Categories(totals) => {
                assert_eq!(totals[0].total, 5.0);
                assert_eq!(totals[1].total, 3.0);
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_unknown_x_reported_before_y() {
        let err = ChartService::new()
            .build_chart(&sales(), ChartRequest::new("t", ChartKind::Line, "missing_x", "missing_y"))
            .expect_err("Should reject unknown fields");
        assert_eq!(
            err,
            ChartError::UnknownField {
                field: "missing_x".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_y_field() {
        let err = ChartService::new()
            .build_chart(&sales(), ChartRequest::new("t", ChartKind::Pie, "cat", "total"))
            .expect_err("Should reject unknown y");
        assert_eq!(
            err,
            ChartError::UnknownField {
                field: "total".to_string()
            }
        );
    }

    #[test]
    fn test_non_numeric_axis_rejected_except_for_pie() {
        let service = ChartService::new();
        for kind in ChartKind::ALL {
            let result = service.build_chart(&sales(), ChartRequest::new("t", kind, "cat", "note"));
            if kind == ChartKind::Pie {
                assert!(result.is_ok(), "pie should aggregate text y");
            } else {
                assert_eq!(
                    result.expect_err("Should reject text y"),
                    ChartError::NonNumericAxis {
                        field: "note".to_string()
                    }
                );
            }
        }
    }

    #[test]
    fn test_numeric_sample_only_looks_at_first_ten_rows() {
        let mut rows: Vec<Vec<CellValue>> =
            (0..10).map(|i| vec![format!("r{}", i).into(), "n/a".into()]).collect();
        rows.push(vec!["late".into(), 5.0.into()]);
        let ds = dataset(&["x", "y"], rows);

        let err = ChartService::new()
            .build_chart(&ds, ChartRequest::new("t", ChartKind::Line, "x", "y"))
            .expect_err("Numeric value past the sample should not count");
        assert!(matches!(err, ChartError::NonNumericAxis { .. }));
        assert!(ChartService::new().numeric_columns(&ds).is_empty());
    }

    #[test]
    fn test_line_drops_unplottable_rows() {
        let ds = dataset(
            &["x", "y"],
            vec![
                vec!["a".into(), "1".into()],
                vec![CellValue::Missing, "2".into()],
                vec!["c".into(), "n/a".into()],
                vec!["d".into(), 4.0.into()],
            ],
        );
        let (_, payload) = ChartService::new()
            .build_chart(&ds, ChartRequest::new("t", ChartKind::Line, "x", "y"))
            .expect("Should build line chart");

        match payload {
            SeriesPayload::Records(records) => {
                assert_eq!(records.len(), 2);
                assert_eq!(records[0].get("x"), Some(&CellValue::from("a")));
                assert_eq!(records[1].get("y"), Some(&CellValue::Number(4.0)));
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_projected_equal_values_share_height() {
        let ds = dataset(
            &["x", "y"],
            (0..3).map(|i| vec![format!("r{}", i).into(), 1.0.into()]).collect(),
        );
        let (_, payload) = ChartService::new()
            .build_chart(&ds, ChartRequest::new("t", ChartKind::ProjectedColumn, "x", "y"))
            .expect("Should build projected chart");

        match payload {
            SeriesPayload::Columns(columns) => {
                assert_eq!(columns.len(), 3);
                assert!(columns.iter().all(|c| c.height == columns[0].height));
                assert!((0.5..=5.5).contains(&columns[0].height));
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_header_only_dataset_fails_numeric_check() {
        let ds = dataset(&["x", "y"], Vec::new());
        let err = ChartService::new()
            .build_chart(&ds, ChartRequest::new("t", ChartKind::Bar, "x", "y"))
            .expect_err("No sample rows means no numeric evidence");
        assert!(matches!(err, ChartError::NonNumericAxis { .. }));

        let (_, payload) = ChartService::new()
            .build_chart(&ds, ChartRequest::new("t", ChartKind::Pie, "x", "y"))
            .expect("Pie skips the numeric check");
        assert!(payload.is_empty());
    }

    #[test]
    fn test_numeric_columns() {
        assert_eq!(ChartService::new().numeric_columns(&sales()), vec!["v"]);
    }

    #[test]
    fn test_derive_series_rejects_foreign_dataset() {
        let service = ChartService::new();
        let (descriptor, _) = service
            .build_chart(&sales(), ChartRequest::new("t", ChartKind::Pie, "cat", "v"))
            .expect("Should build pie chart");
        let other = sales();
        let err = service
            .derive_series(&other, &descriptor)
            .expect_err("Should not derive against another dataset");
        assert_eq!(err, ChartError::DatasetNotFound(descriptor.dataset_id()));
    }
}
