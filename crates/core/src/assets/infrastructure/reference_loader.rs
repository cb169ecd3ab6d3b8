use std::path::Path;

use serde::Deserialize;

use crate::assets::domain::asset_error::AssetError;
use crate::assets::infrastructure::directory_scanner::{has_extension, list_files};
use crate::classification::domain::embedding::Embedding;
use crate::classification::domain::face_detector::FaceDetector;
use crate::classification::domain::face_encoder::FaceEncoder;
use crate::classification::domain::reference_set::ReferenceSet;
use crate::shared::constants::{EMBEDDING_EXTENSION, IMAGE_EXTENSIONS};
use crate::shared::frame::Frame;
use crate::shared::group::{Group, GroupCatalog};

/// Embedding file contents: one vector or a list of vectors.
#[derive(Deserialize)]
#[serde(untagged)]
enum EmbeddingFile {
    One(Embedding),
    Many(Vec<Embedding>),
}

/// Builds the [`ReferenceSet`] from `<root>/<group>/` directories.
///
/// Photos contribute the embedding of their first detected face; photos
/// without a face are skipped. `.json` files hold precomputed embeddings.
/// Missing directories and unreadable files are logged and skipped.
pub struct ReferenceLoader {
    detector: Box<dyn FaceDetector>,
    encoder: Box<dyn FaceEncoder>,
}

impl ReferenceLoader {
    pub fn new(detector: Box<dyn FaceDetector>, encoder: Box<dyn FaceEncoder>) -> Self {
        Self { detector, encoder }
    }

    /// Hands the models back once loading is done.
    pub fn into_parts(self) -> (Box<dyn FaceDetector>, Box<dyn FaceEncoder>) {
        (self.detector, self.encoder)
    }

    pub fn load(&mut self, root: &Path, catalog: &GroupCatalog) -> ReferenceSet {
        let mut references = ReferenceSet::new(catalog.clone());
        for group in catalog {
            let dir = root.join(group.name());
            if !dir.is_dir() {
                log::warn!("Reference directory not found: {}", dir.display());
                continue;
            }
            let loaded = self.load_group(&dir, group, &mut references);
            log::info!("Loaded {loaded} {group} reference faces");
        }
        references
    }

    fn load_group(&mut self, dir: &Path, group: &Group, references: &mut ReferenceSet) -> usize {
        let mut extensions = IMAGE_EXTENSIONS.to_vec();
        extensions.push(EMBEDDING_EXTENSION);
        let files = match list_files(dir, &extensions) {
            Ok(files) => files,
            Err(e) => {
                log::warn!("{e}");
                return 0;
            }
        };

        let mut loaded = 0;
        for path in files {
            log::debug!("Loading {}", path.display());
            let embeddings: Result<Vec<Embedding>, Box<dyn std::error::Error>> = if has_extension(&path, &[EMBEDDING_EXTENSION]) {
                read_embedding_file(&path).map_err(Box::from)
            } else {
                self.encode_photo(&path).map(|e| e.into_iter().collect())
            };
            match embeddings {
                Ok(embeddings) => {
                    for embedding in embeddings {
                        references.add(group, embedding);
                        loaded += 1;
                    }
                }
                Err(e) => log::warn!("Skipping {}: {e}", path.display()),
            }
        }
        loaded
    }

    fn encode_photo(&mut self, path: &Path) -> Result<Option<Embedding>, Box<dyn std::error::Error>> {
        let image = image::open(path).map_err(|source| AssetError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let frame = Frame::from_image(image.to_rgb8(), 0);

        let faces = self.detector.detect(&frame)?;
        let Some(face) = faces.first().and_then(|bbox| frame.crop(bbox)) else {
            log::info!("No face found in {}, skipping", path.display());
            return Ok(None);
        };
        Ok(Some(self.encoder.encode(&face)?))
    }
}

pub fn read_embedding_file(path: &Path) -> Result<Vec<Embedding>, AssetError> {
    let text = std::fs::read_to_string(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: EmbeddingFile = serde_json::from_str(&text).map_err(|source| AssetError::Embedding {
        path: path.to_path_buf(),
        source,
    })?;
    let embeddings = match parsed {
        EmbeddingFile::One(e) => vec![e],
        EmbeddingFile::Many(list) => list,
    };
    if embeddings.is_empty() || embeddings.iter().any(Embedding::is_empty) {
        return Err(AssetError::EmptyEmbedding(path.to_path_buf()));
    }
    Ok(embeddings)
}
