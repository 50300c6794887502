//! Ground-plane projection.
//!
//! Footprints and segment paths arrive in lon/lat degrees. The scene uses a
//! local tangent plane centered on the dataset: x grows east, z grows south,
//! y is up, units are meters. Good enough at city scale; no toolkit-grade
//! geodesy here.

use bevy::math::DVec2;
use bevy::prelude::*;

const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

#[derive(Resource, Debug, Clone, Copy)]
pub struct MapProjection {
    origin: DVec2,
    meters_per_degree_lon: f64,
}

impl MapProjection {
    /// Tangent plane centered on `origin` (lon/lat degrees).
    pub fn centered_on(origin: DVec2) -> Self {
        Self {
            origin,
            meters_per_degree_lon: METERS_PER_DEGREE_LAT * origin.y.to_radians().cos(),
        }
    }

    /// Lon/lat degrees to scene meters on the ground plane.
    pub fn project(&self, lon_lat: DVec2) -> Vec3 {
        let east = (lon_lat.x - self.origin.x) * self.meters_per_degree_lon;
        let north = (lon_lat.y - self.origin.y) * METERS_PER_DEGREE_LAT;
        Vec3::new(east as f32, 0.0, -north as f32)
    }
}

/// Ground-plane extent of everything projected so far. Sizes the flood
/// overlay quads and frames the camera.
#[derive(Resource, Debug, Clone, Copy)]
pub struct SceneBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Default for SceneBounds {
    fn default() -> Self {
        Self {
            min: Vec2::splat(f32::INFINITY),
            max: Vec2::splat(f32::NEG_INFINITY),
        }
    }
}

impl SceneBounds {
    pub fn extend(&mut self, point: Vec3) {
        self.min = self.min.min(Vec2::new(point.x, point.z));
        self.max = self.max.max(Vec2::new(point.x, point.z));
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    pub fn center(&self) -> Vec3 {
        let mid = (self.min + self.max) / 2.0;
        Vec3::new(mid.x, 0.0, mid.y)
    }

    /// Longest ground-plane side, in meters.
    pub fn extent(&self) -> f32 {
        let size = self.max - self.min;
        size.x.max(size.y)
    }
}
