use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ## Structure
/// The canonical in-memory table produced by ingestion.
///
/// ```text
/// TabularDataset
///   ├── id: DatasetId
///   ├── source_name: String
///   ├── ingested_at: DateTime<Utc>
///   ├── owner_id: OwnerId
///   ├── columns: Vec<String>
///   └── rows: Vec<Record>
///       └── Record = IndexMap<column, CellValue>
///           ├── String(String)
///           ├── Number(f64)
///           └── Missing
/// ```

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetId(Uuid);

impl DatasetId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DatasetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for DatasetId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Identifier of the principal that ingested a file
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A single cell. Missing cells are kept explicitly so every record carries
/// every column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    String(String),
    Number(f64),
    #[default]
    Missing,
}

impl CellValue {
    /// True for `Missing` and for the empty string.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Missing => true,
            CellValue::String(s) => s.is_empty(),
            CellValue::Number(_) => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => f.write_str(s),
            CellValue::Number(n) => f.write_str(&format_number(*n)),
            CellValue::Missing => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::String(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::String(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

/// Renders integral floats without a fractional part (`3.0` -> `"3"`).
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// One data row, keyed by column name in column order.
pub type Record = IndexMap<String, CellValue>;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TabularDataset {
    id: DatasetId,
    source_name: String,
    ingested_at: DateTime<Utc>,
    owner_id: OwnerId,
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl TabularDataset {
    /// Build a dataset from a header row and a grid of cells.
    ///
    /// Short rows are padded with `Missing`; cells past the header width are
    /// dropped. When two headers share a name the later cell wins.
    pub fn from_grid(
        source_name: impl Into<String>,
        owner_id: OwnerId,
        columns: Vec<String>,
        grid: Vec<Vec<CellValue>>,
    ) -> Self {
        let rows = grid
            .into_iter()
            .map(|cells| {
                let mut cells = cells.into_iter();
                let mut record = Record::with_capacity(columns.len());
                for column in &columns {
                    let value = cells.next().unwrap_or_default();
                    record.insert(column.clone(), value);
                }
                record
            })
            .collect();

        Self {
            id: DatasetId::new(),
            source_name: source_name.into(),
            ingested_at: Utc::now(),
            owner_id,
            columns,
            rows,
        }
    }

    pub fn id(&self) -> DatasetId {
        self.id
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn ingested_at(&self) -> DateTime<Utc> {
        self.ingested_at
    }

    pub fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        self.rows.get(row).and_then(|record| record.get(column))
    }

    /// First `limit` column names plus how many were left out.
    pub fn column_preview(&self, limit: usize) -> (Vec<&str>, usize) {
        let shown = self
            .columns
            .iter()
            .take(limit)
            .map(String::as_str)
            .collect::<Vec<_>>();
        let remaining = self.columns.len().saturating_sub(shown.len());
        (shown, remaining)
    }
}
