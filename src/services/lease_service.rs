use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::database::InventoryStore;
use crate::dto::{CreateLeaseContractDto, LeaseContractDto, UpdateLeaseContractDto};
use crate::error::AppResult;
use crate::mapping;

pub struct LeaseService {
    store: Arc<dyn InventoryStore>,
    today: NaiveDate,
}

impl LeaseService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self::on(store, Utc::now().date_naive())
    }

    /// Evaluates lease activity as of `today`.
    pub fn on(store: Arc<dyn InventoryStore>, today: NaiveDate) -> Self {
        Self { store, today }
    }

    pub async fn list(&self, active_only: bool) -> AppResult<Vec<LeaseContractDto>> {
        let leases = self.store.list_leases().await?;
        Ok(leases
            .into_iter()
            .map(|lease| LeaseContractDto::from_entity(lease, self.today))
            .filter(|dto| !active_only || dto.is_active)
            .collect())
    }

    pub async fn get(&self, id: i64) -> AppResult<LeaseContractDto> {
        let lease = self.store.get_lease(id).await?;
        Ok(LeaseContractDto::from_entity(lease, self.today))
    }

    pub async fn create(&self, dto: &CreateLeaseContractDto) -> AppResult<LeaseContractDto> {
        let lease = self.store.insert_lease(mapping::lease_fields(dto)?).await?;
        info!("Created lease contract {} ({})", lease.contract_number, lease.id);
        Ok(LeaseContractDto::from_entity(lease, self.today))
    }

    pub async fn update(&self, id: i64, dto: &UpdateLeaseContractDto) -> AppResult<LeaseContractDto> {
        let lease = self.store.update_lease(id, mapping::lease_fields(dto)?).await?;
        Ok(LeaseContractDto::from_entity(lease, self.today))
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.store.delete_lease(id).await?;
        info!("Deleted lease contract {}", id);
        Ok(())
    }
}
