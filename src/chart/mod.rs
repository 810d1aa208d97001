//! Chart model: kinds, requests, descriptors and the derived series payload.

pub mod numeric;
pub mod shaping;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dataset::{DatasetId, Record};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartId(Uuid);

impl ChartId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ChartId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ChartId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartKind {
    #[serde(rename = "bar")]
    Bar,
    #[serde(rename = "line")]
    Line,
    #[serde(rename = "pie")]
    Pie,
    #[serde(rename = "scatter")]
    Scatter,
    #[serde(rename = "area")]
    Area,
    #[serde(rename = "3d-column")]
    ProjectedColumn,
}

impl ChartKind {
    pub const ALL: [ChartKind; 6] = [
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Pie,
        ChartKind::Scatter,
        ChartKind::Area,
        ChartKind::ProjectedColumn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Pie => "pie",
            ChartKind::Scatter => "scatter",
            ChartKind::Area => "area",
            ChartKind::ProjectedColumn => "3d-column",
        }
    }

    /// Pie aggregates whatever it finds, every other kind plots a numeric y.
    pub fn requires_numeric_y(&self) -> bool {
        !matches!(self, ChartKind::Pie)
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bar" | "categorical-bar" => Ok(ChartKind::Bar),
            "line" => Ok(ChartKind::Line),
            "pie" => Ok(ChartKind::Pie),
            "scatter" => Ok(ChartKind::Scatter),
            "area" => Ok(ChartKind::Area),
            "3d-column" | "projected-3d-column" => Ok(ChartKind::ProjectedColumn),
            other => Err(format!("Invalid chart kind: {}", other)),
        }
    }
}

/// What a caller asks for. Validated by the chart service before anything
/// is built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRequest {
    pub title: String,
    pub kind: ChartKind,
    pub x_field: String,
    pub y_field: String,
}

impl ChartRequest {
    pub fn new(
        title: impl Into<String>,
        kind: ChartKind,
        x_field: impl Into<String>,
        y_field: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            kind,
            x_field: x_field.into(),
            y_field: y_field.into(),
        }
    }
}

/// Persisted description of one chart. Immutable once built; an edit is a
/// new descriptor replacing the old one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChartDescriptor {
    id: ChartId,
    title: String,
    kind: ChartKind,
    x_field: String,
    y_field: String,
    dataset_id: DatasetId,
    created_at: DateTime<Utc>,
}

impl ChartDescriptor {
    pub(crate) fn new(request: ChartRequest, dataset_id: DatasetId) -> Self {
        Self {
            id: ChartId::new(),
            title: request.title,
            kind: request.kind,
            x_field: request.x_field,
            y_field: request.y_field,
            dataset_id,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> ChartId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    pub fn x_field(&self) -> &str {
        &self.x_field
    }

    pub fn y_field(&self) -> &str {
        &self.y_field
    }

    pub fn dataset_id(&self) -> DatasetId {
        self.dataset_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// One bar of the projected 3D column chart.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProjectedColumn {
    pub label: String,
    pub value: f64,
    pub height: f64,
    pub color: &'static str,
    pub offset: f64,
}

/// Shaped data handed to the renderer. Never persisted.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "shape", content = "data", rename_all = "snake_case")]
pub enum SeriesPayload {
    Records(Vec<Record>),
    Categories(Vec<CategoryTotal>),
    Columns(Vec<ProjectedColumn>),
}

impl SeriesPayload {
    pub fn len(&self) -> usize {
        match self {
            SeriesPayload::Records(records) => records.len(),
            SeriesPayload::Categories(totals) => totals.len(),
            SeriesPayload::Columns(columns) => columns.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
