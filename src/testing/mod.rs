//! Fixtures for unit tests.

use chrono::{NaiveDate, Utc};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::models::{Asset, AssetTemplate};
use crate::database::MemoryStore;
use crate::graph::DisabledDirectory;
use crate::state::AppState;
use crate::types::AssetStatus;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid fixture date")
}

pub fn sample_asset() -> Asset {
    let now = Utc::now();
    Asset {
        id: 1,
        asset_code: "LAP-24-DELL-00001".to_string(),
        asset_name: Some("Latitude 5440".to_string()),
        category: "Laptop".to_string(),
        is_dummy: false,
        serial_number: "5CG1234XYZ".to_string(),
        status: AssetStatus::Stock,
        owner: None,
        building: Some("HQ".to_string()),
        department: None,
        job_title: None,
        office_location: None,
        brand: Some("Dell".to_string()),
        model: Some("Latitude 5440".to_string()),
        purchase_date: Some(date(2024, 2, 1)),
        warranty_expiry: Some(date(2027, 2, 1)),
        installation_date: None,
        intune_device_id: None,
        notes: None,
        row_version: 1,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}

pub fn sample_template() -> AssetTemplate {
    let now = Utc::now();
    AssetTemplate {
        id: 1,
        template_name: "Dell Latitude standard".to_string(),
        asset_name: Some("Latitude 5440".to_string()),
        category: Some("Laptop".to_string()),
        brand: Some("Dell".to_string()),
        model: Some("Latitude 5440".to_string()),
        owner: None,
        building: Some("HQ".to_string()),
        department: Some("IT".to_string()),
        office_location: None,
        purchase_date: Some(date(2024, 2, 1)),
        warranty_expiry: Some(date(2027, 2, 1)),
        installation_date: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

/// Development configuration with auth disabled, on an empty in-memory store.
pub fn memory_state() -> AppState {
    AppState::new(
        Arc::new(AppConfig::development()),
        Arc::new(MemoryStore::new()),
        Arc::new(DisabledDirectory),
        None,
    )
}
