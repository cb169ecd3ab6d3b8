use std::path::{Path, PathBuf};

use crate::assets::domain::asset_error::AssetError;
use crate::assets::domain::image_catalog::ImageCatalog;
use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::group::GroupCatalog;

/// Regular files in `dir` whose extension (case-insensitive) is one of
/// `extensions`, sorted by path.
pub fn list_files(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>, AssetError> {
    let io_err = |source| AssetError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && has_extension(&path, extensions) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

/// Builds the slide catalog from `<root>/<group>/` directories.
///
/// A missing or unreadable group directory is logged and leaves that group
/// with no slides.
pub fn scan_slides(root: &Path, catalog: &GroupCatalog) -> ImageCatalog {
    let mut images = ImageCatalog::new(catalog.clone());
    for group in catalog {
        let dir = root.join(group.name());
        if !dir.is_dir() {
            log::warn!("Slide directory not found: {}", dir.display());
            continue;
        }
        match list_files(&dir, IMAGE_EXTENSIONS) {
            Ok(paths) => {
                log::info!("Loaded {} {} slides", paths.len(), group);
                images.set(group, paths);
            }
            Err(e) => log::warn!("{e}"),
        }
    }
    images
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").unwrap();
    }

    #[test]
    fn test_list_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b.PNG");
        touch(dir.path(), "a.jpg");
        touch(dir.path(), "notes.txt");
        fs::create_dir(dir.path().join("nested.png")).unwrap();

        let files = list_files(dir.path(), IMAGE_EXTENSIONS).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.PNG"]);
    }

    #[test]
    fn test_list_files_missing_dir_errors() {
        let dir = tempfile::tempdir().unwrap();
        let result = list_files(&dir.path().join("absent"), IMAGE_EXTENSIONS);
        assert!(matches!(result, Err(AssetError::Io { .. })));
    }

    #[test]
    fn test_scan_slides_per_group() {
        let root = tempfile::tempdir().unwrap();
        let science = root.path().join("science");
        fs::create_dir(&science).unwrap();
        touch(&science, "2.png");
        touch(&science, "1.png");

        let catalog = GroupCatalog::default();
        let images = scan_slides(root.path(), &catalog);

        let science = catalog.get("science").unwrap();
        let arts = catalog.get("arts").unwrap();
        assert_eq!(images.images(science).len(), 2);
        assert!(images.images(science)[0].ends_with("1.png"));
        assert!(images.images(arts).is_empty());
    }

    #[test]
    fn test_scan_slides_missing_root_is_empty() {
        let root = tempfile::tempdir().unwrap();
        let images = scan_slides(&root.path().join("nope"), &GroupCatalog::default());
        assert_eq!(images.total(), 0);
    }
}
