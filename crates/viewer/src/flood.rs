//! Flood-year imagery overlays.
//!
//! Each supported year is an independent toggle backed by one imagery
//! asset. Fetches run on the compute pool; completions are applied only
//! when their request token is still current (see [`crate::slots`]).

use bevy::prelude::*;
use bevy::tasks::{block_on, AsyncComputeTaskPool, Task};
use serde::{Deserialize, Serialize};

use crate::assets::AssetService;
use crate::config::ViewerConfig;
use crate::error::AssetError;
use crate::impact::{RecomputeFloodImpact, RecomputeInfrastructureImpact};
use crate::notifications::NotificationEvent;
use crate::slots::{ToggleAction, ToggleSlots};

/// The fixed set of flood years the dataset covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FloodYear {
    #[serde(rename = "2008")]
    Y2008,
    #[serde(rename = "2016")]
    Y2016,
    #[serde(rename = "2017")]
    Y2017,
    #[serde(rename = "2018")]
    Y2018,
    #[serde(rename = "2020")]
    Y2020,
}

impl FloodYear {
    pub const ALL: [FloodYear; 5] = [
        FloodYear::Y2008,
        FloodYear::Y2016,
        FloodYear::Y2017,
        FloodYear::Y2018,
        FloodYear::Y2020,
    ];

    pub fn year(self) -> u16 {
        match self {
            FloodYear::Y2008 => 2008,
            FloodYear::Y2016 => 2016,
            FloodYear::Y2017 => 2017,
            FloodYear::Y2018 => 2018,
            FloodYear::Y2020 => 2020,
        }
    }

    /// Label for toggle buttons and log lines.
    pub fn label(self) -> &'static str {
        match self {
            FloodYear::Y2008 => "2008",
            FloodYear::Y2016 => "2016",
            FloodYear::Y2017 => "2017",
            FloodYear::Y2018 => "2018",
            FloodYear::Y2020 => "2020",
        }
    }
}

/// Per-year overlay state.
#[derive(Resource, Default)]
pub struct FloodLayers {
    pub slots: ToggleSlots<FloodYear>,
}

impl FloodLayers {
    /// Number of years currently shown; feeds both the layer-count
    /// display and the impact inclusion probability.
    pub fn active_count(&self) -> usize {
        self.slots.active_count()
    }
}

/// User toggled a flood year.
#[derive(Event, Debug, Clone, Copy)]
pub struct ToggleFloodLayer(pub FloodYear);

/// Imagery fetched and the year confirmed active; the renderer turns
/// this into an overlay.
#[derive(Event)]
pub struct FloodImageryReady {
    pub year: FloodYear,
    pub bytes: Vec<u8>,
}

/// A year was toggled off; the renderer removes its overlay.
#[derive(Event, Debug, Clone, Copy)]
pub struct FloodLayerRemoved(pub FloodYear);

/// In-flight imagery fetch.
#[derive(Component)]
pub struct FloodFetch {
    year: FloodYear,
    token: u64,
    asset_id: u64,
    task: Task<Result<Vec<u8>, AssetError>>,
}

pub fn handle_flood_toggles(
    mut commands: Commands,
    mut events: EventReader<ToggleFloodLayer>,
    mut layers: ResMut<FloodLayers>,
    config: Res<ViewerConfig>,
    service: Res<AssetService>,
    mut removed: EventWriter<FloodLayerRemoved>,
    mut flood_impact: EventWriter<RecomputeFloodImpact>,
    mut infra_impact: EventWriter<RecomputeInfrastructureImpact>,
) {
    for &ToggleFloodLayer(year) in events.read() {
        match layers.slots.toggle(year) {
            ToggleAction::StartLoad { token } => {
                let asset_id = config.flood_asset(year);
                let source = service.source();
                let task = AsyncComputeTaskPool::get().spawn(async move { source.fetch(asset_id) });
                commands.spawn(FloodFetch {
                    year,
                    token,
                    asset_id,
                    task,
                });
                info!("flood {}: fetching imagery (asset {asset_id})", year.label());
            }
            ToggleAction::CancelLoad => {
                info!("flood {}: toggle-off before fetch resolved", year.label());
            }
            ToggleAction::Deactivate => {
                removed.send(FloodLayerRemoved(year));
                info!("flood {}: layer removed", year.label());
            }
        }
        // Every toggle refreshes both counters, as the layer count feeds
        // the inclusion probability.
        flood_impact.send(RecomputeFloodImpact);
        infra_impact.send(RecomputeInfrastructureImpact);
    }
}

pub fn poll_flood_fetches(
    mut commands: Commands,
    mut layers: ResMut<FloodLayers>,
    mut fetches: Query<(Entity, &mut FloodFetch)>,
    mut ready: EventWriter<FloodImageryReady>,
    mut flood_impact: EventWriter<RecomputeFloodImpact>,
    mut infra_impact: EventWriter<RecomputeInfrastructureImpact>,
    mut notifications: EventWriter<NotificationEvent>,
) {
    for (fetch_entity, mut fetch) in &mut fetches {
        let Some(result) = block_on(futures_lite::future::poll_once(&mut fetch.task)) else {
            continue;
        };
        let year = fetch.year;
        match result {
            Ok(bytes) => {
                if layers.slots.complete(year, fetch.token) {
                    ready.send(FloodImageryReady { year, bytes });
                    flood_impact.send(RecomputeFloodImpact);
                    infra_impact.send(RecomputeInfrastructureImpact);
                } else {
                    info!("flood {}: discarding stale fetch result", year.label());
                }
            }
            Err(err) => {
                // A failed toggle-on leaves the slot Off: no phantom
                // handle, the button never shows active.
                layers.slots.fail(year, fetch.token);
                warn!("flood {}: {err}", year.label());
                notifications.send(NotificationEvent::warning(format!(
                    "Flood {} layer (asset {}) failed to load: {err}",
                    year.label(),
                    fetch.asset_id
                )));
            }
        }
        commands.entity(fetch_entity).despawn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_year_has_a_distinct_label_and_number() {
        for a in FloodYear::ALL {
            assert_eq!(a.label(), a.year().to_string());
            for b in FloodYear::ALL {
                if a != b {
                    assert_ne!(a.year(), b.year());
                }
            }
        }
    }

    #[test]
    fn serde_uses_the_year_as_key() {
        let json = serde_json::to_string(&FloodYear::Y2018).unwrap();
        assert_eq!(json, "\"2018\"");
        let back: FloodYear = serde_json::from_str("\"2008\"").unwrap();
        assert_eq!(back, FloodYear::Y2008);
    }

    #[test]
    fn active_count_ignores_loading_years() {
        let mut layers = FloodLayers::default();
        let ToggleAction::StartLoad { token } = layers.slots.toggle(FloodYear::Y2016) else {
            panic!()
        };
        layers.slots.toggle(FloodYear::Y2020); // still loading
        assert_eq!(layers.active_count(), 0);
        assert!(layers.slots.complete(FloodYear::Y2016, token));
        assert_eq!(layers.active_count(), 1);
    }
}
