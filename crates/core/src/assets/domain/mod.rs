pub mod asset_error;
pub mod image_catalog;
