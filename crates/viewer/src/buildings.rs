//! Building dataset loading and building attributes.

use bevy::math::DVec2;
use bevy::prelude::*;
use bevy::tasks::{block_on, AsyncComputeTaskPool, Task};

use crate::assets::AssetService;
use crate::config::ViewerConfig;
use crate::error::AssetError;
use crate::geojson::{self, BuildingFeature};
use crate::notifications::NotificationEvent;

/// Extrusion height applied when a building has no resolvable height.
/// Height-bucket filtering uses a different fallback (0), on purpose:
/// see `Building::filter_height` and DESIGN.md.
pub const DEFAULT_STYLED_HEIGHT: f32 = 10.0;

/// One building from the dataset. Spawned once at load, never despawned;
/// highlight operations only change how it is drawn.
#[derive(Component, Debug, Clone)]
pub struct Building {
    /// `BUILD_TYPE` property, when present.
    pub building_type: Option<String>,
    /// Resolved height in meters, when present.
    pub height: Option<f32>,
}

impl Building {
    /// Height used for extrusion styling (missing -> 10 m).
    pub fn styled_height(&self) -> f32 {
        self.height.unwrap_or(DEFAULT_STYLED_HEIGHT)
    }

    /// Height used for bucket filtering (missing -> 0 m).
    pub fn filter_height(&self) -> f32 {
        self.height.unwrap_or(0.0)
    }
}

/// Footprint rings in lon/lat degrees; the renderer projects these.
#[derive(Component, Debug, Clone)]
pub struct Footprint {
    pub outer: Vec<DVec2>,
    pub holes: Vec<Vec<DVec2>>,
}

/// Distinct `BUILD_TYPE` values observed at load, sorted; feeds the type
/// selector in the UI.
#[derive(Resource, Debug, Default)]
pub struct BuildingTypes(pub Vec<String>);

/// Height filter buckets. Bounds are inclusive on both ends, so a
/// building at exactly 3 m matches both `0-3` and `3-6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeightBucket {
    UpToThree,
    ThreeToSix,
    SixToNine,
    NineAndUp,
}

impl HeightBucket {
    pub const ALL: [HeightBucket; 4] = [
        HeightBucket::UpToThree,
        HeightBucket::ThreeToSix,
        HeightBucket::SixToNine,
        HeightBucket::NineAndUp,
    ];

    /// Inclusive bounds in meters.
    pub fn bounds(self) -> (f32, f32) {
        match self {
            HeightBucket::UpToThree => (0.0, 3.0),
            HeightBucket::ThreeToSix => (3.0, 6.0),
            HeightBucket::SixToNine => (6.0, 9.0),
            HeightBucket::NineAndUp => (9.0, f32::INFINITY),
        }
    }

    pub fn contains(self, height: f32) -> bool {
        let (low, high) = self.bounds();
        height >= low && height <= high
    }

    /// Label for the height selector.
    pub fn label(self) -> &'static str {
        match self {
            HeightBucket::UpToThree => "0-3 m",
            HeightBucket::ThreeToSix => "3-6 m",
            HeightBucket::SixToNine => "6-9 m",
            HeightBucket::NineAndUp => "9+ m",
        }
    }
}

/// Sent once the building dataset has been decoded and spawned.
#[derive(Event, Debug, Clone, Copy)]
pub struct BuildingsLoaded {
    pub count: usize,
}

/// In-flight building dataset fetch.
#[derive(Component)]
pub struct BuildingFetch {
    asset_id: u64,
    task: Task<Result<Vec<BuildingFeature>, AssetError>>,
}

/// Kick off the dataset fetch at startup. Decoding happens on the task
/// too, so the main thread only spawns entities.
pub fn begin_building_load(
    mut commands: Commands,
    config: Res<ViewerConfig>,
    service: Res<AssetService>,
) {
    let asset_id = config.building_asset;
    let source = service.source();
    let task = AsyncComputeTaskPool::get().spawn(async move {
        let bytes = source.fetch(asset_id)?;
        geojson::decode_buildings(asset_id, &bytes)
    });
    commands.spawn(BuildingFetch { asset_id, task });
    info!("fetching building dataset (asset {asset_id})");
}

pub fn poll_building_load(
    mut commands: Commands,
    mut fetches: Query<(Entity, &mut BuildingFetch)>,
    mut types: ResMut<BuildingTypes>,
    mut loaded: EventWriter<BuildingsLoaded>,
    mut notifications: EventWriter<NotificationEvent>,
) {
    for (fetch_entity, mut fetch) in &mut fetches {
        let Some(result) = block_on(futures_lite::future::poll_once(&mut fetch.task)) else {
            continue;
        };
        match result {
            Ok(features) => {
                let count = features.len();
                let mut distinct: Vec<String> = Vec::new();
                for feature in features {
                    if let Some(kind) = &feature.building_type {
                        if !distinct.contains(kind) {
                            distinct.push(kind.clone());
                        }
                    }
                    commands.spawn((
                        Building {
                            building_type: feature.building_type,
                            height: feature.height.map(|h| h as f32),
                        },
                        Footprint {
                            outer: feature.outer,
                            holes: feature.holes,
                        },
                    ));
                }
                distinct.sort();
                types.0 = distinct;
                info!("building dataset loaded: {count} buildings");
                loaded.send(BuildingsLoaded { count });
            }
            Err(err) => {
                error!("building dataset failed to load: {err}");
                notifications.send(NotificationEvent::warning(format!(
                    "Building dataset (asset {}) failed to load: {err}",
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
    fn styled_and_filter_heights_use_different_fallbacks() {
        let missing = Building {
            building_type: None,
            height: None,
        };
        assert_eq!(missing.styled_height(), 10.0);
        assert_eq!(missing.filter_height(), 0.0);

        let present = Building {
            building_type: None,
            height: Some(4.5),
        };
        assert_eq!(present.styled_height(), 4.5);
        assert_eq!(present.filter_height(), 4.5);
    }

    #[test]
    fn bucket_boundaries_are_shared() {
        assert!(HeightBucket::UpToThree.contains(3.0));
        assert!(HeightBucket::ThreeToSix.contains(3.0));
        assert!(HeightBucket::ThreeToSix.contains(6.0));
        assert!(HeightBucket::SixToNine.contains(6.0));
    }

    #[test]
    fn top_bucket_is_unbounded() {
        assert!(HeightBucket::NineAndUp.contains(9.0));
        assert!(HeightBucket::NineAndUp.contains(250.0));
        assert!(!HeightBucket::NineAndUp.contains(8.99));
    }

    #[test]
    fn buckets_are_disjoint_away_from_boundaries() {
        let matching = |h: f32| {
            HeightBucket::ALL
                .iter()
                .filter(|bucket| bucket.contains(h))
                .count()
        };
        assert_eq!(matching(1.5), 1);
        assert_eq!(matching(4.0), 1);
        assert_eq!(matching(7.0), 1);
        assert_eq!(matching(12.0), 1);
        // Boundary values sit in two buckets.
        assert_eq!(matching(3.0), 2);
        assert_eq!(matching(6.0), 2);
        assert_eq!(matching(9.0), 2);
    }

    #[test]
    fn bucket_labels_are_distinct() {
        for a in HeightBucket::ALL {
            for b in HeightBucket::ALL {
                if a != b {
                    assert_ne!(a.label(), b.label());
                }
            }
        }
    }
}
