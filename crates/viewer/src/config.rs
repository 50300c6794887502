//! Viewer configuration.
//!
//! Asset ids and the service access token are configuration, not code:
//! the token in particular must come from the config file or the
//! environment. Defaults exist for the published dataset ids so a config
//! file only needs to override what differs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::flood::FloodYear;
use crate::utilities::UtilityKind;

/// Environment variable naming the JSON config file.
pub const CONFIG_PATH_ENV: &str = "FLOODSCOPE_CONFIG";

/// Environment variable overriding the access token.
pub const TOKEN_ENV: &str = "FLOODSCOPE_TOKEN";

#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Asset id of the building footprint dataset.
    pub building_asset: u64,
    /// Flood imagery asset ids, keyed by year.
    pub flood_assets: HashMap<FloodYear, u64>,
    /// Utility network dataset ids, keyed by category.
    pub utility_assets: HashMap<UtilityKind, u64>,
    /// Base URL of the asset hosting service.
    pub service_url: String,
    /// Access token for the hosting service.
    pub access_token: String,
    /// When set, assets are read from this directory (`<id>.geojson`,
    /// `<id>.json` or `<id>.png`) instead of the remote service.
    pub assets_dir: Option<PathBuf>,
}

fn default_flood_assets() -> HashMap<FloodYear, u64> {
    HashMap::from([
        (FloodYear::Y2008, 4_333_819),
        (FloodYear::Y2016, 4_333_063),
        (FloodYear::Y2017, 4_333_831),
        (FloodYear::Y2018, 4_333_835),
        (FloodYear::Y2020, 4_333_837),
    ])
}

fn default_utility_assets() -> HashMap<UtilityKind, u64> {
    HashMap::from([
        (UtilityKind::Road, 4_423_350),
        (UtilityKind::Rail, 4_424_598),
        (UtilityKind::Power, 4_426_151),
    ])
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            building_asset: 4_331_513,
            flood_assets: default_flood_assets(),
            utility_assets: default_utility_assets(),
            service_url: "https://api.cesium.com".to_string(),
            access_token: String::new(),
            assets_dir: None,
        }
    }
}

impl ViewerConfig {
    /// Load configuration: the `FLOODSCOPE_CONFIG` file when set, defaults
    /// otherwise. `FLOODSCOPE_TOKEN` always overrides the token.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            config.access_token = token;
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Asset id for a flood year, falling back to the published defaults
    /// when a partial config file omitted the entry.
    pub fn flood_asset(&self, year: FloodYear) -> u64 {
        match self.flood_assets.get(&year) {
            Some(&id) => id,
            None => default_flood_assets()[&year],
        }
    }

    pub fn utility_asset(&self, kind: UtilityKind) -> u64 {
        match self.utility_assets.get(&kind) {
            Some(&id) => id,
            None => default_utility_assets()[&kind],
        }
    }
}
