use std::path::PathBuf;
use thiserror::Error;

use crate::manifest::ManifestError;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no asset registered at '{0}'")]
    UnknownAsset(String),

    #[error("asset '{path}' of type {ty} has no serialized form")]
    NotSerializable {
        path: String,
        ty: tether_core::AssetType,
    },

    #[error(transparent)]
    Manifest(#[from] ManifestError),
}
