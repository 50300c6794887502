//! Asset hosting service access.
//!
//! The hosting service is an external collaborator reached through the
//! [`AssetSource`] seam: fetch raw bytes by numeric asset id. Fetches run
//! on the `AsyncComputeTaskPool` (see the flood/utility/building modules),
//! so sources may block internally.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use bevy::prelude::*;

use crate::config::ViewerConfig;
use crate::error::AssetError;

/// Fetches raw asset bytes by id.
pub trait AssetSource: Send + Sync {
    fn fetch(&self, asset_id: u64) -> Result<Vec<u8>, AssetError>;
}

/// Shared handle to the configured asset source.
#[derive(Resource, Clone)]
pub struct AssetService(Arc<dyn AssetSource>);

impl AssetService {
    pub fn new(source: Arc<dyn AssetSource>) -> Self {
        Self(source)
    }

    /// Directory-backed when `assets_dir` is configured, remote otherwise.
    pub fn from_config(config: &ViewerConfig) -> Self {
        match &config.assets_dir {
            Some(dir) => Self::new(Arc::new(DirectoryAssetSource::new(dir.clone()))),
            None => Self::new(Arc::new(RemoteAssetSource::new(
                config.service_url.clone(),
                config.access_token.clone(),
            ))),
        }
    }

    /// Clone the source handle for moving into a fetch task.
    pub fn source(&self) -> Arc<dyn AssetSource> {
        Arc::clone(&self.0)
    }
}

/// Fetches `<service>/v1/assets/<id>/download` with a bearer token.
pub struct RemoteAssetSource {
    base_url: String,
    access_token: String,
    client: reqwest::blocking::Client,
}

impl RemoteAssetSource {
    pub fn new(base_url: String, access_token: String) -> Self {
        Self {
            base_url,
            access_token,
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl AssetSource for RemoteAssetSource {
    fn fetch(&self, asset_id: u64) -> Result<Vec<u8>, AssetError> {
        let url = format!(
            "{}/v1/assets/{}/download",
            self.base_url.trim_end_matches('/'),
            asset_id
        );
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|err| AssetError::fetch(asset_id, err.to_string()))?;
        let bytes = response
            .bytes()
            .map_err(|err| AssetError::fetch(asset_id, err.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Reads `<id>.geojson`, `<id>.json` or `<id>.png` from a local directory.
/// Used for offline datasets and in tests.
pub struct DirectoryAssetSource {
    root: PathBuf,
}

impl DirectoryAssetSource {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl AssetSource for DirectoryAssetSource {
    fn fetch(&self, asset_id: u64) -> Result<Vec<u8>, AssetError> {
        for extension in ["geojson", "json", "png"] {
            let path = self.root.join(format!("{asset_id}.{extension}"));
            if path.is_file() {
                return fs::read(&path)
                    .map_err(|err| AssetError::fetch(asset_id, err.to_string()));
            }
        }
        Err(AssetError::NotFound {
            asset_id,
            path: self.root.clone(),
        })
    }
}
