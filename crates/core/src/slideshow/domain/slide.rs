use std::path::{Path, PathBuf};

use crate::assets::domain::image_catalog::file_label;
use crate::shared::frame::Frame;
use crate::shared::group::Group;

/// One slideshow image ready to display.
#[derive(Clone, Debug)]
pub struct Slide {
    pub group: Group,
    /// Zero-based position in the group's list.
    pub position: usize,
    pub total: usize,
    pub path: PathBuf,
    pub image: Frame,
}

impl Slide {
    /// `"SCIENCE - 2/5"`.
    pub fn caption(&self) -> String {
        format!("{} - {}/{}", self.group.banner(), self.position + 1, self.total)
    }

    pub fn file_name(&self) -> String {
        file_label(&self.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
