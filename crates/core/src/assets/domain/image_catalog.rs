use std::path::{Path, PathBuf};

use crate::shared::group::{Group, GroupCatalog};

/// Ordered slide images per group.
///
/// Every catalog group has an entry, possibly empty. Order is the display
/// order of the slideshow.
#[derive(Clone, Debug)]
pub struct ImageCatalog {
    catalog: GroupCatalog,
    images: Vec<Vec<PathBuf>>,
}

impl ImageCatalog {
    pub fn new(catalog: GroupCatalog) -> Self {
        let images = vec![Vec::new(); catalog.len()];
        Self { catalog, images }
    }

    pub fn catalog(&self) -> &GroupCatalog {
        &self.catalog
    }

    /// Replaces the list for `group`. Groups outside the catalog are ignored.
    pub fn set(&mut self, group: &Group, paths: Vec<PathBuf>) {
        match self.slot(group) {
            Some(i) => self.images[i] = paths,
            None => log::warn!("Ignoring images for unknown group '{group}'"),
        }
    }

    pub fn images(&self, group: &Group) -> &[PathBuf] {
        self.slot(group).map_or(&[][..], |i| self.images[i].as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Group, &[PathBuf])> {
        self.catalog.iter().zip(self.images.iter().map(Vec::as_slice))
    }

    pub fn total(&self) -> usize {
        self.images.iter().map(Vec::len).sum()
    }

    fn slot(&self, group: &Group) -> Option<usize> {
        (self.catalog.get(group.name()) == Some(group)).then(|| group.rank())
    }
}

/// `a/b/poster.png` → `poster.png`; falls back to the full path.
pub fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
