use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::dataset::OwnerId;
use crate::errors::RegistryResult;
use crate::services::authorization::Principal;
use crate::services::registry::DatasetRegistry;

/// Totals across everything a principal can see.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UsageOverview {
    pub dataset_count: usize,
    pub chart_count: usize,
    pub total_rows: usize,
    pub total_columns: usize,
}

/// Per-owner summary shown to admins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerActivity {
    pub owner_id: OwnerId,
    pub dataset_count: usize,
    pub chart_count: usize,
    pub total_rows: usize,
    pub last_activity: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct StatsService {
    registry: DatasetRegistry,
}

impl StatsService {
    pub fn new(registry: DatasetRegistry) -> Self {
        Self { registry }
    }

    pub async fn overview(&self, principal: &Principal) -> UsageOverview {
        let datasets = self.registry.list_datasets(principal).await;
        let charts = self.registry.list_charts(principal).await;

        UsageOverview {
            dataset_count: datasets.len(),
            chart_count: charts.len(),
            total_rows: datasets.iter().map(|d| d.row_count()).sum(),
            total_columns: datasets.iter().map(|d| d.column_count()).sum(),
        }
    }

    /// Activity grouped by owner, in the order owners first uploaded.
    /// Admin only.
    pub async fn owner_activity(&self, principal: &Principal) -> RegistryResult<Vec<OwnerActivity>> {
        principal.require_admin("owner activity")?;

        let datasets = self.registry.list_datasets(principal).await;
        let charts = self.registry.list_charts(principal).await;

        let mut by_owner: IndexMap<OwnerId, OwnerActivity> = IndexMap::new();
        for dataset in &datasets {
            let entry = by_owner
                .entry(dataset.owner_id().clone())
                .or_insert_with(|| OwnerActivity {
                    owner_id: dataset.owner_id().clone(),
                    dataset_count: 0,
                    chart_count: 0,
                    total_rows: 0,
                    last_activity: dataset.ingested_at(),
                });
            entry.dataset_count += 1;
            entry.total_rows += dataset.row_count();
            entry.last_activity = entry.last_activity.max(dataset.ingested_at());
        }

        for chart in &charts {
            let owner = datasets
                .iter()
                .find(|d| d.id() == chart.dataset_id())
                .map(|d| d.owner_id());
            if let Some(activity) = owner.and_then(|owner| by_owner.get_mut(owner)) {
                activity.chart_count += 1;
                activity.last_activity = activity.last_activity.max(chart.created_at());
            }
        }

        Ok(by_owner.into_values().collect())
    }
}
