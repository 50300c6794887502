//! Scene rendering: camera, extruded buildings, highlight recoloring,
//! flood imagery overlays and utility polylines. State lives in the
//! viewer crate; this crate only draws it.

use bevy::prelude::*;

pub mod building_mesh;
pub mod building_render;
pub mod camera;
pub mod egui_input_guard;
pub mod flood_overlay;
pub mod projection;
pub mod utility_render;

use camera::DragState;
use projection::SceneBounds;

pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SceneBounds>()
            .init_resource::<DragState>()
            .add_systems(
                Startup,
                (
                    camera::setup_camera,
                    building_render::setup_building_palette,
                    utility_render::configure_segment_gizmos,
                ),
            )
            .add_systems(
                Update,
                (
                    camera::camera_pan_keyboard,
                    camera::camera_mouse_drag,
                    camera::camera_zoom,
                    camera::apply_orbit_camera,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    building_render::spawn_building_meshes,
                    camera::frame_loaded_dataset,
                    building_render::apply_highlight_colors,
                    building_render::draw_building_outlines,
                    flood_overlay::spawn_flood_overlays,
                    flood_overlay::despawn_flood_overlays,
                    utility_render::draw_utility_segments,
                )
                    .chain(),
            );
    }
}
