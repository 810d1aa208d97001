use std::sync::Arc;

use indexmap::IndexMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::chart::{ChartDescriptor, ChartId};
use crate::dataset::{DatasetId, TabularDataset};
use crate::errors::{RegistryError, RegistryResult};
use crate::services::authorization::Principal;

const DATASET: &str = "Dataset";
const CHART: &str = "Chart";

#[derive(Debug, Default)]
struct RegistryState {
    datasets: IndexMap<DatasetId, Arc<TabularDataset>>,
    charts: IndexMap<ChartId, ChartDescriptor>,
}

/// In-memory store of datasets and chart descriptors.
///
/// Cloning yields another handle onto the same store. Records are never
/// updated in place: a dataset or descriptor is inserted once and later
/// removed, and every mutation happens under a single write guard.
/// Listings come back in insertion order.
#[derive(Clone, Debug, Default)]
pub struct DatasetRegistry {
    inner: Arc<RwLock<RegistryState>>,
}

impl DatasetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_dataset(&self, dataset: TabularDataset) -> RegistryResult<Arc<TabularDataset>> {
        let id = dataset.id();
        let dataset = Arc::new(dataset);

        let mut guard = self.inner.write().await;
        if guard.datasets.contains_key(&id) {
            return Err(RegistryError::DuplicateId {
                entity: DATASET,
                id: id.to_string(),
            });
        }
        guard.datasets.insert(id, Arc::clone(&dataset));
        info!("Registered dataset {} ({})", id, dataset.source_name());
        Ok(dataset)
    }

    /// Register a descriptor. The referenced dataset must still be present.
    pub async fn put_chart(&self, descriptor: ChartDescriptor) -> RegistryResult<ChartDescriptor> {
        let id = descriptor.id();

        let mut guard = self.inner.write().await;
        if guard.charts.contains_key(&id) {
            return Err(RegistryError::DuplicateId {
                entity: CHART,
                id: id.to_string(),
            });
        }
        if !guard.datasets.contains_key(&descriptor.dataset_id()) {
            return Err(RegistryError::not_found(DATASET, descriptor.dataset_id()));
        }
        guard.charts.insert(id, descriptor.clone());
        info!("Registered chart {} on dataset {}", id, descriptor.dataset_id());
        Ok(descriptor)
    }

    pub async fn remove_chart(&self, id: ChartId) -> RegistryResult<ChartDescriptor> {
        let mut guard = self.inner.write().await;
        let removed = guard
            .charts
            .shift_remove(&id)
            .ok_or_else(|| RegistryError::not_found(CHART, id))?;
        info!("Removed chart {}", id);
        Ok(removed)
    }

    /// Swap `old_id` for `replacement` under one write guard. Either the old
    /// descriptor is gone and the new one registered, or nothing changed.
    pub async fn replace_chart(
        &self,
        old_id: ChartId,
        replacement: ChartDescriptor,
    ) -> RegistryResult<ChartDescriptor> {
        let new_id = replacement.id();

        let mut guard = self.inner.write().await;
        if !guard.charts.contains_key(&old_id) {
            return Err(RegistryError::not_found(CHART, old_id));
        }
        if guard.charts.contains_key(&new_id) {
            return Err(RegistryError::DuplicateId {
                entity: CHART,
                id: new_id.to_string(),
            });
        }
        if !guard.datasets.contains_key(&replacement.dataset_id()) {
            return Err(RegistryError::not_found(DATASET, replacement.dataset_id()));
        }
        guard.charts.shift_remove(&old_id);
        guard.charts.insert(new_id, replacement.clone());
        info!("Replaced chart {} with {}", old_id, new_id);
        Ok(replacement)
    }

    /// Remove a dataset together with every descriptor that references it.
    /// Returns the ids of the removed descriptors.
    pub async fn remove_dataset(&self, id: DatasetId) -> RegistryResult<Vec<ChartId>> {
        let mut guard = self.inner.write().await;
        if guard.datasets.shift_remove(&id).is_none() {
            return Err(RegistryError::not_found(DATASET, id));
        }

        let dependent: Vec<ChartId> = guard
            .charts
            .values()
            .filter(|chart| chart.dataset_id() == id)
            .map(ChartDescriptor::id)
            .collect();
        guard.charts.retain(|_, chart| chart.dataset_id() != id);

        info!(
            "Removed dataset {} and {} dependent charts",
            id,
            dependent.len()
        );
        Ok(dependent)
    }

    /// Datasets visible to `principal`: all of them for an admin, otherwise
    /// the ones it owns.
    pub async fn list_datasets(&self, principal: &Principal) -> Vec<Arc<TabularDataset>> {
        let guard = self.inner.read().await;
        let visible: Vec<_> = guard
            .datasets
            .values()
            .filter(|dataset| principal.can_view_owner(dataset.owner_id()))
            .cloned()
            .collect();
        debug!(
            "{} of {} datasets visible to {}",
            visible.len(),
            guard.datasets.len(),
            principal.id
        );
        visible
    }

    /// Descriptors visible to `principal`. Ownership comes from the
    /// referenced dataset, descriptors carry no owner of their own.
    pub async fn list_charts(&self, principal: &Principal) -> Vec<ChartDescriptor> {
        let guard = self.inner.read().await;
        guard
            .charts
            .values()
            .filter(|chart| {
                principal.is_admin()
                    || guard
                        .datasets
                        .get(&chart.dataset_id())
                        .is_some_and(|dataset| principal.can_view_owner(dataset.owner_id()))
            })
            .cloned()
            .collect()
    }

    pub async fn find_dataset(&self, id: DatasetId) -> RegistryResult<Arc<TabularDataset>> {
        let guard = self.inner.read().await;
        guard
            .datasets
            .get(&id)
            .cloned()
            .ok_or_else(|| RegistryError::not_found(DATASET, id))
    }

    pub async fn find_chart(&self, id: ChartId) -> RegistryResult<ChartDescriptor> {
        let guard = self.inner.read().await;
        guard
            .charts
            .get(&id)
            .cloned()
            .ok_or_else(|| RegistryError::not_found(CHART, id))
    }

    pub async fn dataset_count(&self) -> usize {
        self.inner.read().await.datasets.len()
    }

    pub async fn chart_count(&self) -> usize {
        self.inner.read().await.charts.len()
    }
}
