//! Explicit conversions between request/response DTOs and stored entities.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::warn;
use uuid::Uuid;

use crate::database::models::{
    Asset, AssetTemplate, LeaseContract, LeaseFields, NewAsset, TemplateFields,
};
use crate::dto::{
    AssetDetails, AssetDto, AssetTemplateDto, BulkCreateAssetDto, CreateAssetDto,
    CreateAssetTemplateDto, CreateLeaseContractDto, LeaseContractDto, UpdateAssetDto,
};
use crate::error::{AppError, AppResult};
use crate::types::AssetStatus;

/// Trimmed value, with blank strings treated as absent.
fn clean(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required(value: &Option<String>, field: &str) -> AppResult<String> {
    clean(value).ok_or_else(|| AppError::field(field, format!("{} is required", field)))
}

/// Case-insensitive status parsing. Missing or unknown values yield
/// `fallback`; unknown values are logged.
pub fn parse_status(raw: Option<&str>, fallback: AssetStatus) -> AssetStatus {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => fallback,
        Some(value) => value.parse().unwrap_or_else(|err| {
            warn!("{}; using {}", err, fallback);
            fallback
        }),
    }
}

fn parse_device_id(raw: &Option<String>) -> AppResult<Option<Uuid>> {
    clean(raw)
        .map(|id| {
            Uuid::parse_str(&id)
                .map_err(|_| AppError::field("intuneDeviceId", "Device ID must be a valid GUID"))
        })
        .transpose()
}

pub fn new_asset_from_create(dto: &CreateAssetDto, asset_code: String) -> AppResult<NewAsset> {
    let d = &dto.details;
    Ok(NewAsset {
        asset_code,
        asset_name: clean(&d.asset_name),
        category: required(&dto.category, "category")?,
        is_dummy: dto.is_dummy,
        serial_number: required(&dto.serial_number, "serialNumber")?,
        status: parse_status(d.status.as_deref(), AssetStatus::Stock),
        owner: clean(&d.owner),
        building: clean(&d.building),
        department: clean(&d.department),
        job_title: clean(&d.job_title),
        office_location: clean(&d.office_location),
        brand: clean(&d.brand),
        model: clean(&d.model),
        purchase_date: d.purchase_date,
        warranty_expiry: d.warranty_expiry,
        installation_date: d.installation_date,
        intune_device_id: parse_device_id(&d.intune_device_id)?,
        notes: clean(&d.notes),
    })
}

/// Request values win; the template fills whatever the request leaves empty.
pub fn new_asset_from_bulk(
    dto: &BulkCreateAssetDto,
    template: Option<&AssetTemplate>,
    asset_code: String,
    serial_number: String,
) -> AppResult<NewAsset> {
    let d = &dto.details;
    let from_template = |value: &Option<String>, pick: fn(&AssetTemplate) -> &Option<String>| {
        clean(value).or_else(|| template.and_then(|t| clean(pick(t))))
    };
    let date_or_template = |value: Option<NaiveDate>, pick: fn(&AssetTemplate) -> Option<NaiveDate>| {
        value.or_else(|| template.and_then(pick))
    };

    Ok(NewAsset {
        asset_code,
        asset_name: from_template(&d.asset_name, |t| &t.asset_name),
        category: from_template(&dto.category, |t| &t.category)
            .ok_or_else(|| AppError::field("category", "category is required"))?,
        is_dummy: dto.is_dummy,
        serial_number,
        status: parse_status(d.status.as_deref(), AssetStatus::Stock),
        owner: from_template(&d.owner, |t| &t.owner),
        building: from_template(&d.building, |t| &t.building),
        department: from_template(&d.department, |t| &t.department),
        job_title: clean(&d.job_title),
        office_location: from_template(&d.office_location, |t| &t.office_location),
        brand: from_template(&d.brand, |t| &t.brand),
        model: from_template(&d.model, |t| &t.model),
        purchase_date: date_or_template(d.purchase_date, |t| t.purchase_date),
        warranty_expiry: date_or_template(d.warranty_expiry, |t| t.warranty_expiry),
        installation_date: date_or_template(d.installation_date, |t| t.installation_date),
        intune_device_id: None,
        notes: clean(&d.notes),
    })
}

/// Copies the mutable field set onto `asset`. Code, identity, dummy flag and
/// timestamps are never touched; an unparseable status keeps the current one.
pub fn apply_asset_update(asset: &mut Asset, dto: &UpdateAssetDto) -> AppResult<()> {
    let d: &AssetDetails = &dto.details;
    asset.category = required(&dto.category, "category")?;
    asset.serial_number = required(&dto.serial_number, "serialNumber")?;
    asset.status = parse_status(d.status.as_deref(), asset.status);
    asset.asset_name = clean(&d.asset_name);
    asset.owner = clean(&d.owner);
    asset.building = clean(&d.building);
    asset.department = clean(&d.department);
    asset.job_title = clean(&d.job_title);
    asset.office_location = clean(&d.office_location);
    asset.brand = clean(&d.brand);
    asset.model = clean(&d.model);
    asset.purchase_date = d.purchase_date;
    asset.warranty_expiry = d.warranty_expiry;
    asset.installation_date = d.installation_date;
    asset.intune_device_id = parse_device_id(&d.intune_device_id)?;
    asset.notes = clean(&d.notes);
    if let Some(version) = dto.row_version {
        asset.row_version = version;
    }
    Ok(())
}

pub fn template_fields(dto: &CreateAssetTemplateDto) -> AppResult<TemplateFields> {
    Ok(TemplateFields {
        template_name: required(&dto.template_name, "templateName")?,
        asset_name: clean(&dto.asset_name),
        category: clean(&dto.category),
        brand: clean(&dto.brand),
        model: clean(&dto.model),
        owner: clean(&dto.owner),
        building: clean(&dto.building),
        department: clean(&dto.department),
        office_location: clean(&dto.office_location),
        purchase_date: dto.purchase_date,
        warranty_expiry: dto.warranty_expiry,
        installation_date: dto.installation_date,
    })
}

pub fn lease_fields(dto: &CreateLeaseContractDto) -> AppResult<LeaseFields> {
    Ok(LeaseFields {
        contract_number: required(&dto.contract_number, "contractNumber")?,
        vendor: required(&dto.vendor, "vendor")?,
        start_date: dto
            .start_date
            .ok_or_else(|| AppError::field("startDate", "startDate is required"))?,
        end_date: dto
            .end_date
            .ok_or_else(|| AppError::field("endDate", "endDate is required"))?,
        monthly_rate: dto.monthly_rate.unwrap_or(Decimal::ZERO).round_dp(2),
        notes: clean(&dto.notes),
        is_active_override: dto.is_active_override,
    })
}

impl From<Asset> for AssetDto {
    fn from(asset: Asset) -> Self {
        Self {
            id: asset.id,
            asset_code: asset.asset_code,
            asset_name: asset.asset_name,
            category: asset.category,
            is_dummy: asset.is_dummy,
            serial_number: asset.serial_number,
            status: asset.status,
            owner: asset.owner,
            building: asset.building,
            department: asset.department,
            job_title: asset.job_title,
            office_location: asset.office_location,
            brand: asset.brand,
            model: asset.model,
            purchase_date: asset.purchase_date,
            warranty_expiry: asset.warranty_expiry,
            installation_date: asset.installation_date,
            intune_device_id: asset.intune_device_id,
            notes: asset.notes,
            row_version: asset.row_version,
            created_at: asset.created_at,
            updated_at: asset.updated_at,
        }
    }
}

impl From<AssetTemplate> for AssetTemplateDto {
    fn from(t: AssetTemplate) -> Self {
        Self {
            id: t.id,
            template_name: t.template_name,
            asset_name: t.asset_name,
            category: t.category,
            brand: t.brand,
            model: t.model,
            owner: t.owner,
            building: t.building,
            department: t.department,
            office_location: t.office_location,
            purchase_date: t.purchase_date,
            warranty_expiry: t.warranty_expiry,
            installation_date: t.installation_date,
            is_active: t.is_active,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

impl LeaseContractDto {
    pub fn from_entity(lease: LeaseContract, today: NaiveDate) -> Self {
        let is_active = lease.is_active_on(today);
        Self {
            id: lease.id,
            contract_number: lease.contract_number,
            vendor: lease.vendor,
            start_date: lease.start_date,
            end_date: lease.end_date,
            monthly_rate: lease.monthly_rate,
            notes: lease.notes,
            is_active_override: lease.is_active_override,
            is_active,
            created_at: lease.created_at,
            updated_at: lease.updated_at,
        }
    }
}
