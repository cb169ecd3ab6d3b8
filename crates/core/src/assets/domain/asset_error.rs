use std::path::PathBuf;

use thiserror::Error;

/// Failure reading one asset file or directory.
///
/// Loaders log these and move on; a single bad file never aborts a load.
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("invalid embedding file {path}: {source}")]
    Embedding {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("embedding file {0} contains no values")]
    EmptyEmbedding(PathBuf),
}
