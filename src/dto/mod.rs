//! Request and response bodies (camelCase JSON).

pub mod asset;
pub mod intune;
pub mod lease;
pub mod template;

pub use asset::{
    AssetCodeDto, AssetDetails, AssetDto, AssetListDto, AssetListParams, BulkCreateAssetDto,
    BulkCreateResultDto, BulkFailureDto, CodeExistsDto, CreateAssetDto, NextCodeParams,
    UpdateAssetDto,
};
pub use intune::{DeviceSearchParams, IntuneDeviceDto};
pub use lease::{CreateLeaseContractDto, LeaseContractDto, LeaseListParams, UpdateLeaseContractDto};
pub use template::{
    AssetTemplateDto, CreateAssetTemplateDto, TemplateListParams, UpdateAssetTemplateDto,
};
