pub mod asset;
pub mod lease;
pub mod template;

pub use asset::{Asset, AssetPage, AssetQuery, AssetRow, NewAsset};
pub use lease::{LeaseContract, LeaseFields};
pub use template::{AssetTemplate, TemplateFields};
