use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::manager::{DatabaseError, DatabaseManager};
use super::models::{
    Asset, AssetPage, AssetQuery, AssetRow, AssetTemplate, LeaseContract, LeaseFields, NewAsset,
    TemplateFields,
};
use super::store::{like_pattern, InventoryStore};

/// `InventoryStore` backed by PostgreSQL
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn push_asset_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &AssetQuery) {
        if let Some(status) = query.status {
            builder.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(category) = &query.category {
            builder
                .push(" AND LOWER(category) = LOWER(")
                .push_bind(category.clone())
                .push(")");
        }
        if let Some(search) = &query.search {
            let pattern = like_pattern(search);
            builder.push(" AND (");
            let columns = ["asset_code", "serial_number", "asset_name", "owner", "brand", "model"];
            for (i, column) in columns.iter().enumerate() {
                if i > 0 {
                    builder.push(" OR ");
                }
                builder
                    .push(*column)
                    .push(" ILIKE ")
                    .push_bind(pattern.clone());
            }
            builder.push(")");
        }
    }

    async fn asset_exists(&self, id: i64) -> Result<bool, DatabaseError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM assets WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}

const TEMPLATE_COLUMNS: &str = "id, template_name, asset_name, category, brand, model, owner, building, \
    department, office_location, purchase_date, warranty_expiry, installation_date, is_active, \
    created_at, updated_at";

const LEASE_COLUMNS: &str = "id, contract_number, vendor, start_date, end_date, monthly_rate, notes, \
    is_active_override, created_at, updated_at";

#[async_trait]
impl InventoryStore for PgStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }

    async fn list_assets(&self, query: &AssetQuery) -> Result<AssetPage, DatabaseError> {
        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM assets WHERE deleted_at IS NULL",
        );
        Self::push_asset_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM assets WHERE deleted_at IS NULL");
        Self::push_asset_filters(&mut select, query);
        select
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(i64::from(query.page_size))
            .push(" OFFSET ")
            .push_bind(query.offset() as i64);

        let rows: Vec<AssetRow> = select.build_query_as().fetch_all(&self.pool).await?;
        let items = rows
            .into_iter()
            .map(Asset::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AssetPage { items, total })
    }

    async fn get_asset(&self, id: i64) -> Result<Asset, DatabaseError> {
        let row = sqlx::query_as::<_, AssetRow>(
            "SELECT * FROM assets WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("Asset {} not found", id)))?;
        Asset::try_from(row)
    }

    async fn find_asset_by_code(&self, asset_code: &str) -> Result<Option<Asset>, DatabaseError> {
        let row = sqlx::query_as::<_, AssetRow>(
            "SELECT * FROM assets WHERE asset_code = UPPER($1) AND deleted_at IS NULL",
        )
        .bind(asset_code)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Asset::try_from).transpose()
    }

    async fn asset_code_exists(&self, asset_code: &str) -> Result<bool, DatabaseError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM assets WHERE asset_code = UPPER($1))",
        )
        .bind(asset_code)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn serial_number_exists(
        &self,
        serial_number: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, DatabaseError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM assets WHERE serial_number = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(serial_number)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn asset_codes_with_stem(&self, stem: &str) -> Result<Vec<String>, DatabaseError> {
        let pattern = format!("{}%", stem.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_"));
        let codes: Vec<String> =
            sqlx::query_scalar("SELECT asset_code FROM assets WHERE asset_code LIKE $1")
                .bind(pattern)
                .fetch_all(&self.pool)
                .await?;
        Ok(codes)
    }

    async fn insert_asset(&self, asset: NewAsset) -> Result<Asset, DatabaseError> {
        let row = sqlx::query_as::<_, AssetRow>(
            r#"
            INSERT INTO assets (
                asset_code, asset_name, category, is_dummy, serial_number, status,
                owner, building, department, job_title, office_location, brand, model,
                purchase_date, warranty_expiry, installation_date, intune_device_id, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING *
            "#,
        )
        .bind(&asset.asset_code)
        .bind(&asset.asset_name)
        .bind(&asset.category)
        .bind(asset.is_dummy)
        .bind(&asset.serial_number)
        .bind(asset.status.as_str())
        .bind(&asset.owner)
        .bind(&asset.building)
        .bind(&asset.department)
        .bind(&asset.job_title)
        .bind(&asset.office_location)
        .bind(&asset.brand)
        .bind(&asset.model)
        .bind(asset.purchase_date)
        .bind(asset.warranty_expiry)
        .bind(asset.installation_date)
        .bind(asset.intune_device_id)
        .bind(&asset.notes)
        .fetch_one(&self.pool)
        .await?;
        Asset::try_from(row)
    }

    async fn update_asset(&self, asset: &Asset) -> Result<Asset, DatabaseError> {
        let row = sqlx::query_as::<_, AssetRow>(
            r#"
            UPDATE assets SET
                asset_name = $3, category = $4, serial_number = $5, status = $6,
                owner = $7, building = $8, department = $9, job_title = $10,
                office_location = $11, brand = $12, model = $13, purchase_date = $14,
                warranty_expiry = $15, installation_date = $16, intune_device_id = $17,
                notes = $18, row_version = row_version + 1, updated_at = NOW()
            WHERE id = $1 AND row_version = $2 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(asset.id)
        .bind(asset.row_version)
        .bind(&asset.asset_name)
        .bind(&asset.category)
        .bind(&asset.serial_number)
        .bind(asset.status.as_str())
        .bind(&asset.owner)
        .bind(&asset.building)
        .bind(&asset.department)
        .bind(&asset.job_title)
        .bind(&asset.office_location)
        .bind(&asset.brand)
        .bind(&asset.model)
        .bind(asset.purchase_date)
        .bind(asset.warranty_expiry)
        .bind(asset.installation_date)
        .bind(asset.intune_device_id)
        .bind(&asset.notes)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Asset::try_from(row),
            None if self.asset_exists(asset.id).await? => Err(DatabaseError::Concurrency(format!(
                "Asset {} was modified by another request",
                asset.id
            ))),
            None => Err(DatabaseError::NotFound(format!("Asset {} not found", asset.id))),
        }
    }

    async fn delete_asset(&self, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE assets SET deleted_at = NOW(), updated_at = NOW(), row_version = row_version + 1 \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Asset {} not found", id)));
        }
        Ok(())
    }

    async fn list_templates(&self, include_inactive: bool) -> Result<Vec<AssetTemplate>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM asset_templates WHERE ($1 OR is_active) ORDER BY template_name",
            TEMPLATE_COLUMNS
        );
        let templates = sqlx::query_as::<_, AssetTemplate>(&sql)
            .bind(include_inactive)
            .fetch_all(&self.pool)
            .await?;
        Ok(templates)
    }

    async fn get_template(&self, id: i64) -> Result<AssetTemplate, DatabaseError> {
        let sql = format!("SELECT {} FROM asset_templates WHERE id = $1", TEMPLATE_COLUMNS);
        sqlx::query_as::<_, AssetTemplate>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Asset template {} not found", id)))
    }

    async fn insert_template(&self, fields: TemplateFields) -> Result<AssetTemplate, DatabaseError> {
        let sql = format!(
            "INSERT INTO asset_templates (template_name, asset_name, category, brand, model, owner, \
             building, department, office_location, purchase_date, warranty_expiry, installation_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING {}",
            TEMPLATE_COLUMNS
        );
        let template = sqlx::query_as::<_, AssetTemplate>(&sql)
            .bind(&fields.template_name)
            .bind(&fields.asset_name)
            .bind(&fields.category)
            .bind(&fields.brand)
            .bind(&fields.model)
            .bind(&fields.owner)
            .bind(&fields.building)
            .bind(&fields.department)
            .bind(&fields.office_location)
            .bind(fields.purchase_date)
            .bind(fields.warranty_expiry)
            .bind(fields.installation_date)
            .fetch_one(&self.pool)
            .await?;
        Ok(template)
    }

    async fn update_template(
        &self,
        id: i64,
        fields: TemplateFields,
    ) -> Result<AssetTemplate, DatabaseError> {
        let sql = format!(
            "UPDATE asset_templates SET template_name = $2, asset_name = $3, category = $4, brand = $5, \
             model = $6, owner = $7, building = $8, department = $9, office_location = $10, \
             purchase_date = $11, warranty_expiry = $12, installation_date = $13, updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            TEMPLATE_COLUMNS
        );
        sqlx::query_as::<_, AssetTemplate>(&sql)
            .bind(id)
            .bind(&fields.template_name)
            .bind(&fields.asset_name)
            .bind(&fields.category)
            .bind(&fields.brand)
            .bind(&fields.model)
            .bind(&fields.owner)
            .bind(&fields.building)
            .bind(&fields.department)
            .bind(&fields.office_location)
            .bind(fields.purchase_date)
            .bind(fields.warranty_expiry)
            .bind(fields.installation_date)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Asset template {} not found", id)))
    }

    async fn deactivate_template(&self, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE asset_templates SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Asset template {} not found", id)));
        }
        Ok(())
    }

    async fn list_leases(&self) -> Result<Vec<LeaseContract>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM lease_contracts ORDER BY end_date DESC, id DESC",
            LEASE_COLUMNS
        );
        let leases = sqlx::query_as::<_, LeaseContract>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(leases)
    }

    async fn get_lease(&self, id: i64) -> Result<LeaseContract, DatabaseError> {
        let sql = format!("SELECT {} FROM lease_contracts WHERE id = $1", LEASE_COLUMNS);
        sqlx::query_as::<_, LeaseContract>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Lease contract {} not found", id)))
    }

    async fn insert_lease(&self, fields: LeaseFields) -> Result<LeaseContract, DatabaseError> {
        let sql = format!(
            "INSERT INTO lease_contracts (contract_number, vendor, start_date, end_date, monthly_rate, \
             notes, is_active_override) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            LEASE_COLUMNS
        );
        let lease = sqlx::query_as::<_, LeaseContract>(&sql)
            .bind(&fields.contract_number)
            .bind(&fields.vendor)
            .bind(fields.start_date)
            .bind(fields.end_date)
            .bind(fields.monthly_rate)
            .bind(&fields.notes)
            .bind(fields.is_active_override)
            .fetch_one(&self.pool)
            .await?;
        Ok(lease)
    }

    async fn update_lease(&self, id: i64, fields: LeaseFields) -> Result<LeaseContract, DatabaseError> {
        let sql = format!(
            "UPDATE lease_contracts SET contract_number = $2, vendor = $3, start_date = $4, end_date = $5, \
             monthly_rate = $6, notes = $7, is_active_override = $8, updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            LEASE_COLUMNS
        );
        sqlx::query_as::<_, LeaseContract>(&sql)
            .bind(id)
            .bind(&fields.contract_number)
            .bind(&fields.vendor)
            .bind(fields.start_date)
            .bind(fields.end_date)
            .bind(fields.monthly_rate)
            .bind(&fields.notes)
            .bind(fields.is_active_override)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Lease contract {} not found", id)))
    }

    async fn delete_lease(&self, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM lease_contracts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Lease contract {} not found", id)));
        }
        Ok(())
    }
}
