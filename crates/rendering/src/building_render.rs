//! Building mesh spawning and highlight recoloring.

use std::collections::HashSet;

use bevy::math::DVec2;
use bevy::prelude::*;

use viewer::buildings::{Building, Footprint};
use viewer::highlight::{BuildingFilter, HighlightState};

use crate::building_mesh::{extrude_footprint, ProjectedFootprint};
use crate::projection::{MapProjection, SceneBounds};

/// Base fill: translucent white.
const BASE_COLOR: Color = Color::srgba(1.0, 1.0, 1.0, 0.9);
/// Type-filter highlight fill.
const TYPE_HIGHLIGHT_COLOR: Color = Color::srgba(1.0, 0.0, 0.0, 0.9);
/// Height-filter highlight fill.
const HEIGHT_HIGHLIGHT_COLOR: Color = Color::srgba(1.0, 1.0, 0.0, 0.9);
/// Footprint outline, drawn at roof height.
const OUTLINE_COLOR: Color = Color::srgba(0.0, 0.0, 0.0, 0.3);

/// Shared material handles; highlighting swaps handles instead of
/// mutating materials per building.
#[derive(Resource)]
pub struct BuildingPalette {
    pub base: Handle<StandardMaterial>,
    pub type_highlight: Handle<StandardMaterial>,
    pub height_highlight: Handle<StandardMaterial>,
}

impl BuildingPalette {
    fn material_for(&self, filter: &BuildingFilter) -> Handle<StandardMaterial> {
        match filter {
            BuildingFilter::ByType(_) => self.type_highlight.clone(),
            BuildingFilter::ByHeight(_) => self.height_highlight.clone(),
        }
    }
}

/// Roof-level outline ring, drawn with gizmos each frame.
#[derive(Component)]
pub struct OutlineRing(pub Vec<Vec3>);

pub fn setup_building_palette(
    mut commands: Commands,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // Translucent extrusions look wrong with backface culling, so the
    // palette renders both sides.
    let mut fill = |color: Color| {
        materials.add(StandardMaterial {
            base_color: color,
            alpha_mode: AlphaMode::Blend,
            cull_mode: None,
            perceptual_roughness: 0.9,
            ..default()
        })
    };
    commands.insert_resource(BuildingPalette {
        base: fill(BASE_COLOR),
        type_highlight: fill(TYPE_HIGHLIGHT_COLOR),
        height_highlight: fill(HEIGHT_HIGHLIGHT_COLOR),
    });
}

/// Attach meshes to freshly decoded buildings. The first batch also fixes
/// the projection origin at the dataset centroid.
pub fn spawn_building_meshes(
    mut commands: Commands,
    pending: Query<(Entity, &Building, &Footprint), Without<Mesh3d>>,
    projection: Option<Res<MapProjection>>,
    mut bounds: ResMut<SceneBounds>,
    palette: Res<BuildingPalette>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    if pending.is_empty() {
        return;
    }

    let projection = match projection {
        Some(projection) => *projection,
        None => {
            let mut sum = DVec2::ZERO;
            let mut count = 0usize;
            for (_, _, footprint) in &pending {
                for &point in &footprint.outer {
                    sum += point;
                    count += 1;
                }
            }
            if count == 0 {
                return;
            }
            let projection = MapProjection::centered_on(sum / count as f64);
            commands.insert_resource(projection);
            projection
        }
    };

    let mut skipped = 0usize;
    for (entity, building, footprint) in &pending {
        let projected = ProjectedFootprint::project(&projection, &footprint.outer, &footprint.holes);
        let height = building.styled_height();
        let Some(mesh) = extrude_footprint(&projected, height) else {
            skipped += 1;
            commands.entity(entity).despawn();
            continue;
        };
        for point in &projected.outer {
            bounds.extend(*point);
        }
        let outline: Vec<Vec3> = projected
            .outer
            .iter()
            .map(|p| Vec3::new(p.x, height, p.z))
            .collect();
        commands.entity(entity).insert((
            Mesh3d(meshes.add(mesh)),
            MeshMaterial3d(palette.base.clone()),
            OutlineRing(outline),
        ));
    }
    if skipped > 0 {
        warn!("skipped {skipped} degenerate building footprints");
    }
}

/// Swap material handles whenever the highlight selection changes.
pub fn apply_highlight_colors(
    state: Res<HighlightState>,
    palette: Res<BuildingPalette>,
    mut buildings: Query<(Entity, &mut MeshMaterial3d<StandardMaterial>), With<Building>>,
) {
    if !state.is_changed() {
        return;
    }
    let selected: HashSet<Entity> = state.selected.iter().copied().collect();
    let highlight = state.filter.as_ref().map(|filter| palette.material_for(filter));
    for (entity, mut material) in &mut buildings {
        let wanted = match &highlight {
            Some(handle) if selected.contains(&entity) => handle.clone(),
            _ => palette.base.clone(),
        };
        if material.0 != wanted {
            material.0 = wanted;
        }
    }
}

pub fn draw_building_outlines(mut gizmos: Gizmos, outlines: Query<&OutlineRing>) {
    for OutlineRing(ring) in &outlines {
        if let (Some(&first), true) = (ring.first(), ring.len() >= 2) {
            gizmos.linestrip(ring.iter().copied().chain(std::iter::once(first)), OUTLINE_COLOR);
        }
    }
}
