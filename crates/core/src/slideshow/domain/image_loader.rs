use std::path::Path;

use crate::shared::frame::Frame;

/// Decodes a slide image from disk.
pub trait ImageLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Frame, Box<dyn std::error::Error>>;
}
