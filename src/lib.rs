//! Spreadsheet ingestion and chart specification.
//!
//! Raw `.xlsx`, `.xls` or `.csv` bytes are normalized into a
//! [`TabularDataset`](dataset::TabularDataset) by the
//! [`IngestService`](services::IngestService). The
//! [`ChartService`](services::ChartService) validates a chart request against
//! a dataset and derives the series payload a renderer draws. Both kinds of
//! record live in a [`DatasetRegistry`](services::DatasetRegistry) that
//! answers owner-scoped queries. [`AppContext`] ties them together.

pub mod chart;
pub mod config;
pub mod dataset;
pub mod errors;
pub mod services;

pub mod app_context;
pub use app_context::AppContext;
