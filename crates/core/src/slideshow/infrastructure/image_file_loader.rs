use std::path::Path;

use crate::assets::domain::asset_error::AssetError;
use crate::shared::frame::Frame;
use crate::slideshow::domain::image_loader::ImageLoader;

/// Decodes slides with the `image` crate, converting to RGB.
#[derive(Default)]
pub struct ImageFileLoader;

impl ImageFileLoader {
    pub fn new() -> Self {
        Self
    }
}

impl ImageLoader for ImageFileLoader {
    fn load(&self, path: &Path) -> Result<Frame, Box<dyn std::error::Error>> {
        let img = image::open(path).map_err(|source| AssetError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Frame::from_image(img.to_rgb8(), 0))
    }
}
