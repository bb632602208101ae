pub mod asset_code;
pub mod asset_service;
pub mod intune_service;
pub mod lease_service;
pub mod template_service;

pub use asset_code::{AssetCodeGenerator, CodeGenerationError, CodeRequest};
pub use asset_service::AssetService;
pub use intune_service::IntuneService;
pub use lease_service::LeaseService;
pub use template_service::TemplateService;
