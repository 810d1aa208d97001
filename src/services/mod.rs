pub mod authorization;
pub mod chart_service;
pub mod file_type_detection;
pub mod ingest_service;
pub mod registry;
pub mod stats_service;

pub use authorization::{Principal, Role};
pub use chart_service::ChartService;
pub use ingest_service::{IngestService, Upload};
pub use registry::DatasetRegistry;
pub use stats_service::{OwnerActivity, StatsService, UsageOverview};
