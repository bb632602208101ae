use async_trait::async_trait;

use super::manager::DatabaseError;
use super::models::{
    Asset, AssetPage, AssetQuery, AssetTemplate, LeaseContract, LeaseFields, NewAsset,
    TemplateFields,
};

/// Persistence seam used by services and handlers.
///
/// Lookups that name a single record return `DatabaseError::NotFound` when it
/// does not exist (or is soft-deleted); unique violations surface as
/// `DatabaseError::Duplicate` and stale asset writes as
/// `DatabaseError::Concurrency`.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn ping(&self) -> Result<(), DatabaseError>;

    async fn list_assets(&self, query: &AssetQuery) -> Result<AssetPage, DatabaseError>;
    async fn get_asset(&self, id: i64) -> Result<Asset, DatabaseError>;
    async fn find_asset_by_code(&self, asset_code: &str) -> Result<Option<Asset>, DatabaseError>;
    /// Includes soft-deleted assets: codes are never reused.
    async fn asset_code_exists(&self, asset_code: &str) -> Result<bool, DatabaseError>;
    /// Includes soft-deleted assets: serial numbers are never reused.
    async fn serial_number_exists(
        &self,
        serial_number: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, DatabaseError>;
    /// All codes starting with `stem` (e.g. `LAP-24-DELL-`).
    async fn asset_codes_with_stem(&self, stem: &str) -> Result<Vec<String>, DatabaseError>;
    async fn insert_asset(&self, asset: NewAsset) -> Result<Asset, DatabaseError>;
    /// Writes every mutable column of `asset`, provided the stored
    /// `row_version` still equals `asset.row_version`.
    async fn update_asset(&self, asset: &Asset) -> Result<Asset, DatabaseError>;
    async fn delete_asset(&self, id: i64) -> Result<(), DatabaseError>;

    async fn list_templates(&self, include_inactive: bool) -> Result<Vec<AssetTemplate>, DatabaseError>;
    async fn get_template(&self, id: i64) -> Result<AssetTemplate, DatabaseError>;
    async fn insert_template(&self, fields: TemplateFields) -> Result<AssetTemplate, DatabaseError>;
    async fn update_template(
        &self,
        id: i64,
        fields: TemplateFields,
    ) -> Result<AssetTemplate, DatabaseError>;
    async fn deactivate_template(&self, id: i64) -> Result<(), DatabaseError>;

    async fn list_leases(&self) -> Result<Vec<LeaseContract>, DatabaseError>;
    async fn get_lease(&self, id: i64) -> Result<LeaseContract, DatabaseError>;
    async fn insert_lease(&self, fields: LeaseFields) -> Result<LeaseContract, DatabaseError>;
    async fn update_lease(&self, id: i64, fields: LeaseFields) -> Result<LeaseContract, DatabaseError>;
    async fn delete_lease(&self, id: i64) -> Result<(), DatabaseError>;
}

/// Escape `%`, `_` and `\` so a search term matches literally inside LIKE.
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("dell"), "%dell%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
