//! Flood imagery ground overlays.
//!
//! Each active flood year gets one translucent textured quad over the
//! dataset extent. Years stack at slightly different elevations so
//! coincident overlays do not z-fight.

use bevy::image::{CompressedImageFormats, ImageSampler, ImageType};
use bevy::prelude::*;
use bevy::render::render_asset::RenderAssetUsages;

use viewer::flood::{FloodImageryReady, FloodLayerRemoved, FloodYear};
use viewer::notifications::NotificationEvent;

use crate::projection::SceneBounds;

const OVERLAY_TINT: Color = Color::srgba(1.0, 1.0, 1.0, 0.6);
const OVERLAY_BASE_HEIGHT: f32 = 2.0;
const OVERLAY_HEIGHT_STEP: f32 = 0.5;
/// Quad size when the dataset has not loaded (or loaded empty).
const FALLBACK_EXTENT: f32 = 10_000.0;

#[derive(Component)]
pub struct FloodOverlay {
    pub year: FloodYear,
}

fn overlay_height(year: FloodYear) -> f32 {
    let index = FloodYear::ALL
        .iter()
        .position(|&candidate| candidate == year)
        .unwrap_or(0);
    OVERLAY_BASE_HEIGHT + index as f32 * OVERLAY_HEIGHT_STEP
}

/// Turn fetched imagery bytes into a textured ground quad. A decode
/// failure leaves the layer active but without an overlay; the failure is
/// logged rather than reverting the toggle.
pub fn spawn_flood_overlays(
    mut commands: Commands,
    mut events: EventReader<FloodImageryReady>,
    bounds: Res<SceneBounds>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut images: ResMut<Assets<Image>>,
    mut notifications: EventWriter<NotificationEvent>,
) {
    for event in events.read() {
        let image = match Image::from_buffer(
            &event.bytes,
            ImageType::Extension("png"),
            CompressedImageFormats::NONE,
            true,
            ImageSampler::linear(),
            RenderAssetUsages::RENDER_WORLD | RenderAssetUsages::MAIN_WORLD,
        ) {
            Ok(image) => image,
            Err(err) => {
                error!("flood {}: imagery decode failed: {err}", event.year.label());
                notifications.send(NotificationEvent::warning(format!(
                    "Flood {} imagery could not be decoded",
                    event.year.label()
                )));
                continue;
            }
        };

        let extent = if bounds.is_empty() {
            FALLBACK_EXTENT
        } else {
            bounds.extent()
        };
        let center = bounds.center();

        commands.spawn((
            FloodOverlay { year: event.year },
            Mesh3d(meshes.add(Plane3d::default().mesh().size(extent, extent))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: OVERLAY_TINT,
                base_color_texture: Some(images.add(image)),
                alpha_mode: AlphaMode::Blend,
                unlit: true,
                ..default()
            })),
            Transform::from_translation(center + Vec3::Y * overlay_height(event.year)),
        ));
        info!("flood {}: overlay shown", event.year.label());
    }
}

pub fn despawn_flood_overlays(
    mut commands: Commands,
    mut events: EventReader<FloodLayerRemoved>,
    overlays: Query<(Entity, &FloodOverlay)>,
) {
    for &FloodLayerRemoved(year) in events.read() {
        for (entity, overlay) in &overlays {
            if overlay.year == year {
                commands.entity(entity).despawn();
            }
        }
    }
}
