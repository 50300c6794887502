//! Error types for asset loading and configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Failure while fetching or decoding an asset from the hosting service.
///
/// Always carries the asset id so UI notifications can name the layer
/// that failed.
#[derive(Error, Debug, Clone)]
pub enum AssetError {
    /// The request to the hosting service failed (network, HTTP status).
    #[error("asset {asset_id}: request failed: {message}")]
    Fetch { asset_id: u64, message: String },

    /// The fetched bytes could not be decoded into the expected format.
    #[error("asset {asset_id}: decode failed: {message}")]
    Decode { asset_id: u64, message: String },

    /// A directory-backed source has no file for this id.
    #[error("asset {asset_id}: no matching file under {}", path.display())]
    NotFound { asset_id: u64, path: PathBuf },
}

impl AssetError {
    pub fn fetch(asset_id: u64, message: impl Into<String>) -> Self {
        AssetError::Fetch {
            asset_id,
            message: message.into(),
        }
    }

    pub fn decode(asset_id: u64, message: impl Into<String>) -> Self {
        AssetError::Decode {
            asset_id,
            message: message.into(),
        }
    }

    /// The asset id this error refers to.
    pub fn asset_id(&self) -> u64 {
        match self {
            AssetError::Fetch { asset_id, .. }
            | AssetError::Decode { asset_id, .. }
            | AssetError::NotFound { asset_id, .. } => *asset_id,
        }
    }
}

/// Failure while loading the viewer configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}
