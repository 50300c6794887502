//! Utility network overlays: roads, rail and power lines.
//!
//! Unlike the flood overlays these are vector datasets; toggling one on
//! fetches and decodes its line features, and toggling it off despawns
//! the segment entities it created.

use bevy::math::DVec2;
use bevy::prelude::*;
use bevy::tasks::{block_on, AsyncComputeTaskPool, Task};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::assets::AssetService;
use crate::config::ViewerConfig;
use crate::error::AssetError;
use crate::geojson::{self, LineFeature};
use crate::impact::RecomputeInfrastructureImpact;
use crate::notifications::NotificationEvent;
use crate::slots::{ToggleAction, ToggleSlots};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UtilityKind {
    Road,
    Rail,
    Power,
}

impl UtilityKind {
    pub const ALL: [UtilityKind; 3] = [UtilityKind::Road, UtilityKind::Rail, UtilityKind::Power];

    pub fn label(self) -> &'static str {
        match self {
            UtilityKind::Road => "Roads",
            UtilityKind::Rail => "Rail",
            UtilityKind::Power => "Power lines",
        }
    }
}

/// One polyline from a utility dataset, in lon/lat degrees.
#[derive(Component, Debug, Clone)]
pub struct UtilitySegment {
    pub kind: UtilityKind,
}

/// The segment's path; separate from [`UtilitySegment`] so the renderer
/// can take the geometry without cloning the kind around.
#[derive(Component, Debug, Clone)]
pub struct SegmentPath(pub Vec<DVec2>);

/// Per-category overlay state plus the entities each active category owns.
#[derive(Resource, Default)]
pub struct UtilityLayers {
    pub slots: ToggleSlots<UtilityKind>,
    segments: HashMap<UtilityKind, Vec<Entity>>,
}

impl UtilityLayers {
    pub fn active_count(&self) -> usize {
        self.slots.active_count()
    }

    pub fn segment_count(&self, kind: UtilityKind) -> usize {
        self.segments.get(&kind).map_or(0, Vec::len)
    }
}

/// User toggled a utility category.
#[derive(Event, Debug, Clone, Copy)]
pub struct ToggleUtilityLayer(pub UtilityKind);

/// In-flight utility dataset fetch.
#[derive(Component)]
pub struct UtilityFetch {
    kind: UtilityKind,
    token: u64,
    asset_id: u64,
    task: Task<Result<Vec<LineFeature>, AssetError>>,
}

pub fn handle_utility_toggles(
    mut commands: Commands,
    mut events: EventReader<ToggleUtilityLayer>,
    mut layers: ResMut<UtilityLayers>,
    config: Res<ViewerConfig>,
    service: Res<AssetService>,
    mut recompute: EventWriter<RecomputeInfrastructureImpact>,
) {
    for &ToggleUtilityLayer(kind) in events.read() {
        match layers.slots.toggle(kind) {
            ToggleAction::StartLoad { token } => {
                let asset_id = config.utility_asset(kind);
                let source = service.source();
                let task = AsyncComputeTaskPool::get().spawn(async move {
                    let bytes = source.fetch(asset_id)?;
                    geojson::decode_lines(asset_id, &bytes)
                });
                commands.spawn(UtilityFetch {
                    kind,
                    token,
                    asset_id,
                    task,
                });
                info!("{}: fetching dataset (asset {asset_id})", kind.label());
            }
            ToggleAction::CancelLoad => {
                info!("{}: toggle-off before fetch resolved", kind.label());
            }
            ToggleAction::Deactivate => {
                let entities = layers.segments.remove(&kind).unwrap_or_default();
                info!("{}: removing {} segments", kind.label(), entities.len());
                for entity in entities {
                    commands.entity(entity).despawn();
                }
            }
        }
        recompute.send(RecomputeInfrastructureImpact);
    }
}

pub fn poll_utility_fetches(
    mut commands: Commands,
    mut layers: ResMut<UtilityLayers>,
    mut fetches: Query<(Entity, &mut UtilityFetch)>,
    mut recompute: EventWriter<RecomputeInfrastructureImpact>,
    mut notifications: EventWriter<NotificationEvent>,
) {
    for (fetch_entity, mut fetch) in &mut fetches {
        let Some(result) = block_on(futures_lite::future::poll_once(&mut fetch.task)) else {
            continue;
        };
        let kind = fetch.kind;
        match result {
            Ok(features) => {
                if layers.slots.complete(kind, fetch.token) {
                    let entities: Vec<Entity> = features
                        .into_iter()
                        .map(|feature| {
                            commands
                                .spawn((UtilitySegment { kind }, SegmentPath(feature.path)))
                                .id()
                        })
                        .collect();
                    info!("{}: {} segments loaded", kind.label(), entities.len());
                    layers.segments.insert(kind, entities);
                    recompute.send(RecomputeInfrastructureImpact);
                } else {
                    info!("{}: discarding stale fetch result", kind.label());
                }
            }
            Err(err) => {
                layers.slots.fail(kind, fetch.token);
                warn!("{}: {err}", kind.label());
                notifications.send(NotificationEvent::warning(format!(
                    "{} layer (asset {}) failed to load: {err}",
                    kind.label(),
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
    use bevy::tasks::TaskPool;

    use crate::notifications::NotificationEvent;

    #[test]
    fn kinds_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&UtilityKind::Road).unwrap(), "\"road\"");
        let kind: UtilityKind = serde_json::from_str("\"power\"").unwrap();
        assert_eq!(kind, UtilityKind::Power);
    }

    #[test]
    fn segment_count_is_zero_for_inactive_kinds() {
        let layers = UtilityLayers::default();
        for kind in UtilityKind::ALL {
            assert_eq!(layers.segment_count(kind), 0);
        }
    }

    fn toggle_test_app(dir: std::path::PathBuf) -> App {
        AsyncComputeTaskPool::get_or_init(TaskPool::new);
        let config = crate::config::ViewerConfig {
            assets_dir: Some(dir),
            ..Default::default()
        };
        let mut app = App::new();
        app.add_event::<ToggleUtilityLayer>();
        app.add_event::<RecomputeInfrastructureImpact>();
        app.add_event::<NotificationEvent>();
        app.init_resource::<UtilityLayers>();
        app.insert_resource(crate::assets::AssetService::from_config(&config));
        app.insert_resource(config);
        app.add_systems(
            Update,
            (handle_utility_toggles, poll_utility_fetches).chain(),
        );
        app
    }

    fn segment_entities(app: &mut App) -> usize {
        let mut query = app.world_mut().query::<&UtilitySegment>();
        query.iter(app.world()).count()
    }

    #[test]
    fn toggle_through_the_systems_spawns_then_despawns_segments() {
        let dir = std::env::temp_dir().join(format!("floodscope-roads-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let mut app = toggle_test_app(dir.clone());
        let asset_id = app
            .world()
            .resource::<crate::config::ViewerConfig>()
            .utility_asset(UtilityKind::Road);
        std::fs::write(
            dir.join(format!("{asset_id}.geojson")),
            r#"{"features": [
                {"geometry": {"type": "LineString", "coordinates": [[0,0],[1,1]]}},
                {"geometry": {"type": "LineString", "coordinates": [[2,2],[3,3],[4,4]]}}
            ]}"#,
        )
        .unwrap();

        app.world_mut().send_event(ToggleUtilityLayer(UtilityKind::Road));
        for _ in 0..200 {
            app.update();
            if app
                .world()
                .resource::<UtilityLayers>()
                .segment_count(UtilityKind::Road)
                > 0
            {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        {
            let layers = app.world().resource::<UtilityLayers>();
            assert_eq!(layers.segment_count(UtilityKind::Road), 2);
            assert!(layers.slots.is_active(UtilityKind::Road));
            assert_eq!(layers.active_count(), 1);
        }
        assert_eq!(segment_entities(&mut app), 2);

        // Second toggle deactivates: segment entities despawn and the
        // stored list empties.
        app.world_mut().send_event(ToggleUtilityLayer(UtilityKind::Road));
        app.update();
        {
            let layers = app.world().resource::<UtilityLayers>();
            assert_eq!(layers.segment_count(UtilityKind::Road), 0);
            assert_eq!(layers.active_count(), 0);
            assert!(layers.slots.phase(UtilityKind::Road).is_none());
        }
        assert_eq!(segment_entities(&mut app), 0);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn failed_fetch_through_the_systems_leaves_the_kind_off() {
        // Empty directory: every fetch reports NotFound.
        let dir = std::env::temp_dir().join(format!("floodscope-rail-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let mut app = toggle_test_app(dir.clone());

        app.world_mut().send_event(ToggleUtilityLayer(UtilityKind::Rail));
        for _ in 0..200 {
            app.update();
            if app
                .world()
                .resource::<UtilityLayers>()
                .slots
                .phase(UtilityKind::Rail)
                .is_none()
            {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        {
            let layers = app.world().resource::<UtilityLayers>();
            assert!(layers.slots.phase(UtilityKind::Rail).is_none());
            assert_eq!(layers.segment_count(UtilityKind::Rail), 0);
        }
        assert_eq!(segment_entities(&mut app), 0);

        std::fs::remove_dir_all(&dir).ok();
    }
}
