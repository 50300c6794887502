//! Utility segment rendering.
//!
//! Segments are polylines drawn with gizmos every frame, slightly above
//! the ground so they read over building bases and flood overlays.

use bevy::prelude::*;

use viewer::utilities::{SegmentPath, UtilitySegment};

use crate::projection::MapProjection;

const SEGMENT_COLOR: Color = Color::srgba(0.0, 1.0, 1.0, 1.0);
const SEGMENT_HEIGHT: f32 = 4.0;
pub const SEGMENT_LINE_WIDTH: f32 = 3.0;

pub fn configure_segment_gizmos(mut config_store: ResMut<GizmoConfigStore>) {
    let (config, _) = config_store.config_mut::<DefaultGizmoConfigGroup>();
    config.line_width = SEGMENT_LINE_WIDTH;
}

pub fn draw_utility_segments(
    mut gizmos: Gizmos,
    projection: Option<Res<MapProjection>>,
    segments: Query<&SegmentPath, With<UtilitySegment>>,
) {
    // Until the building dataset fixes the projection origin there is no
    // scene frame to draw the lines in.
    let Some(projection) = projection else {
        return;
    };
    for SegmentPath(path) in &segments {
        if path.len() < 2 {
            continue;
        }
        gizmos.linestrip(
            path.iter()
                .map(|&p| projection.project(p) + Vec3::Y * SEGMENT_HEIGHT),
            SEGMENT_COLOR,
        );
    }
}
