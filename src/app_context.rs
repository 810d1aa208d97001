use std::sync::Arc;

use tracing::info;

use crate::chart::{ChartDescriptor, ChartId, ChartRequest, SeriesPayload};
use crate::config::SheetchartConfig;
use crate::dataset::{DatasetId, TabularDataset};
use crate::errors::{RegistryError, SheetchartResult};
use crate::services::{
    ChartService, DatasetRegistry, IngestService, Principal, StatsService, Upload,
};

/// A freshly built chart together with the payload to render.
#[derive(Debug, Clone)]
pub struct BuiltChart {
    pub descriptor: ChartDescriptor,
    pub payload: SeriesPayload,
}

/// Shared application context wiring ingestion, charting and the registry
/// together for the CLI and any embedding host.
#[derive(Clone)]
pub struct AppContext {
    config: SheetchartConfig,
    registry: DatasetRegistry,
    ingest_service: Arc<IngestService>,
    chart_service: Arc<ChartService>,
    stats_service: Arc<StatsService>,
}

impl AppContext {
    pub fn new(config: SheetchartConfig) -> Self {
        Self::with_registry(config, DatasetRegistry::new())
    }

    pub fn with_registry(config: SheetchartConfig, registry: DatasetRegistry) -> Self {
        let ingest_service = Arc::new(IngestService::new(config.clone()));
        let chart_service = Arc::new(ChartService::new());
        let stats_service = Arc::new(StatsService::new(registry.clone()));

        Self {
            config,
            registry,
            ingest_service,
            chart_service,
            stats_service,
        }
    }

    pub fn config(&self) -> &SheetchartConfig {
        &self.config
    }

    pub fn registry(&self) -> &DatasetRegistry {
        &self.registry
    }

    pub fn ingest_service(&self) -> &Arc<IngestService> {
        &self.ingest_service
    }

    pub fn chart_service(&self) -> &Arc<ChartService> {
        &self.chart_service
    }

    pub fn stats_service(&self) -> &Arc<StatsService> {
        &self.stats_service
    }

    /// Ingest an upload on behalf of `principal` and register the result.
    pub async fn upload(
        &self,
        principal: &Principal,
        upload: Upload<'_>,
    ) -> SheetchartResult<Arc<TabularDataset>> {
        let dataset = self.ingest_service.ingest(upload, principal.id.clone())?;
        Ok(self.registry.put_dataset(dataset).await?)
    }

    /// Build a chart on a visible dataset and register its descriptor.
    /// Nothing is registered when validation fails.
    pub async fn create_chart(
        &self,
        principal: &Principal,
        dataset_id: DatasetId,
        request: ChartRequest,
    ) -> SheetchartResult<BuiltChart> {
        let dataset = self.visible_dataset(principal, dataset_id).await?;
        let (descriptor, payload) = self.chart_service.build_chart(&dataset, request)?;
        let descriptor = self.registry.put_chart(descriptor).await?;
        Ok(BuiltChart {
            descriptor,
            payload,
        })
    }

    /// Recompute the payload of a stored chart.
    pub async fn render_chart(
        &self,
        principal: &Principal,
        chart_id: ChartId,
    ) -> SheetchartResult<BuiltChart> {
        let descriptor = self.registry.find_chart(chart_id).await?;
        let dataset = self
            .visible_dataset(principal, descriptor.dataset_id())
            .await?;
        let payload = self.chart_service.derive_series(&dataset, &descriptor)?;
        Ok(BuiltChart {
            descriptor,
            payload,
        })
    }

    /// Edit a chart by building a new descriptor and swapping it in for the
    /// old one. The old descriptor survives if the new request is invalid,
    /// and nothing is registered if the old one vanished in the meantime.
    pub async fn replace_chart(
        &self,
        principal: &Principal,
        chart_id: ChartId,
        request: ChartRequest,
    ) -> SheetchartResult<BuiltChart> {
        let old = self.registry.find_chart(chart_id).await?;
        let dataset = self.visible_dataset(principal, old.dataset_id()).await?;
        let (descriptor, payload) = self.chart_service.build_chart(&dataset, request)?;
        let descriptor = self.registry.replace_chart(chart_id, descriptor).await?;
        info!("Chart {} now {}", chart_id, descriptor.id());
        Ok(BuiltChart {
            descriptor,
            payload,
        })
    }

    pub async fn delete_chart(
        &self,
        principal: &Principal,
        chart_id: ChartId,
    ) -> SheetchartResult<ChartDescriptor> {
        principal.require_admin("delete chart")?;
        Ok(self.registry.remove_chart(chart_id).await?)
    }

    /// Remove a dataset and every chart built on it. Returns the ids of the
    /// removed charts.
    pub async fn delete_dataset(
        &self,
        principal: &Principal,
        dataset_id: DatasetId,
    ) -> SheetchartResult<Vec<ChartId>> {
        principal.require_admin("delete dataset")?;
        Ok(self.registry.remove_dataset(dataset_id).await?)
    }

    // Datasets owned by someone else look the same as missing ones.
    async fn visible_dataset(
        &self,
        principal: &Principal,
        dataset_id: DatasetId,
    ) -> SheetchartResult<Arc<TabularDataset>> {
        let dataset = self.registry.find_dataset(dataset_id).await?;
        if !principal.can_view_owner(dataset.owner_id()) {
            return Err(RegistryError::not_found("Dataset", dataset_id).into());
        }
        Ok(dataset)
    }
}
