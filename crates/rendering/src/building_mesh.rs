//! Extruded building meshes.
//!
//! The footprint polygon (with holes) is triangulated with earcutr for the
//! roof cap; side walls are quads per ring edge. Buildings sit on the
//! ground plane, so no floor cap is emitted.

use bevy::math::DVec2;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;

use crate::projection::MapProjection;

/// Projected footprint rings, ready for triangulation and outlining.
pub struct ProjectedFootprint {
    pub outer: Vec<Vec3>,
    pub holes: Vec<Vec<Vec3>>,
}

impl ProjectedFootprint {
    pub fn project(projection: &MapProjection, outer: &[DVec2], holes: &[Vec<DVec2>]) -> Self {
        let project_ring =
            |ring: &[DVec2]| ring.iter().map(|&p| projection.project(p)).collect::<Vec<_>>();
        Self {
            outer: project_ring(outer),
            holes: holes.iter().map(|hole| project_ring(hole)).collect(),
        }
    }
}

/// Build the extrusion mesh, or `None` for degenerate footprints.
pub fn extrude_footprint(footprint: &ProjectedFootprint, height: f32) -> Option<Mesh> {
    if footprint.outer.len() < 3 {
        return None;
    }

    // Flatten rings to (x, z) pairs for earcutr; holes follow the outer
    // ring, with their start offsets recorded.
    let mut flat: Vec<f64> = Vec::new();
    let mut hole_starts: Vec<usize> = Vec::new();
    let mut ring_points: Vec<Vec3> = Vec::new();
    for point in &footprint.outer {
        flat.push(point.x as f64);
        flat.push(point.z as f64);
        ring_points.push(*point);
    }
    for hole in &footprint.holes {
        if hole.len() < 3 {
            continue;
        }
        hole_starts.push(ring_points.len());
        for point in hole {
            flat.push(point.x as f64);
            flat.push(point.z as f64);
            ring_points.push(*point);
        }
    }

    let roof = earcutr::earcut(&flat, &hole_starts, 2).ok()?;
    if roof.is_empty() {
        return None;
    }

    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();

    // Roof cap at extrusion height. Winding from earcut follows the ring
    // orientation; the material is double sided, so either way renders.
    let roof_base = positions.len() as u32;
    for point in &ring_points {
        positions.push([point.x, height, point.z]);
        normals.push([0.0, 1.0, 0.0]);
    }
    for index in roof {
        indices.push(roof_base + index as u32);
    }

    // Side walls, one quad per ring edge.
    let mut wall_ring = |ring: &[Vec3]| {
        for (i, &a) in ring.iter().enumerate() {
            let b = ring[(i + 1) % ring.len()];
            let edge = Vec3::new(b.x - a.x, 0.0, b.z - a.z);
            if edge.length_squared() < f32::EPSILON {
                continue;
            }
            let normal = edge.cross(Vec3::Y).normalize();
            let base = positions.len() as u32;
            for corner in [
                Vec3::new(a.x, 0.0, a.z),
                Vec3::new(b.x, 0.0, b.z),
                Vec3::new(b.x, height, b.z),
                Vec3::new(a.x, height, a.z),
            ] {
                positions.push([corner.x, corner.y, corner.z]);
                normals.push([normal.x, normal.y, normal.z]);
            }
            indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
        }
    };
    wall_ring(&footprint.outer);
    for hole in &footprint.holes {
        if hole.len() >= 3 {
            wall_ring(hole);
        }
    }

    let uvs: Vec<[f32; 2]> = vec![[0.0, 0.0]; positions.len()];
    Some(
        Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::RENDER_WORLD | RenderAssetUsages::MAIN_WORLD,
        )
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
        .with_inserted_indices(Indices::U32(indices)),
    )
}
