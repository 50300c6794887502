//! Orbital camera.
//!
//! The camera orbits a ground focus point. On dataset load it frames the
//! footprint extent with the fixed default heading, elevation and range;
//! after that the user pans, orbits and zooms freely.

use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy_egui::EguiContexts;

use viewer::buildings::BuildingsLoaded;

use crate::egui_input_guard::egui_wants_pointer;
use crate::projection::SceneBounds;

const PAN_SPEED: f32 = 500.0;
const ZOOM_SPEED: f32 = 0.15;
const MIN_DISTANCE: f32 = 50.0;
const MAX_DISTANCE: f32 = 20_000.0;
const MIN_PITCH: f32 = 5.0 * std::f32::consts::PI / 180.0;
const MAX_PITCH: f32 = 80.0 * std::f32::consts::PI / 180.0;
const ORBIT_SENSITIVITY: f32 = 0.005;
const FOCUS_MARGIN: f32 = 2_000.0;

/// Initial view: heading −6 rad, 40° elevation, 3 km out.
const DEFAULT_YAW: f32 = -6.0;
const DEFAULT_PITCH: f32 = 40.0 * std::f32::consts::PI / 180.0;
const DEFAULT_DISTANCE: f32 = 3_000.0;

/// Key bindings for ground-plane panning. Directions are screen-relative
/// and rotated by the current yaw before application.
const PAN_KEYS: [(KeyCode, Vec2); 8] = [
    (KeyCode::KeyW, Vec2::new(0.0, -1.0)),
    (KeyCode::ArrowUp, Vec2::new(0.0, -1.0)),
    (KeyCode::KeyS, Vec2::new(0.0, 1.0)),
    (KeyCode::ArrowDown, Vec2::new(0.0, 1.0)),
    (KeyCode::KeyA, Vec2::new(-1.0, 0.0)),
    (KeyCode::ArrowLeft, Vec2::new(-1.0, 0.0)),
    (KeyCode::KeyD, Vec2::new(1.0, 0.0)),
    (KeyCode::ArrowRight, Vec2::new(1.0, 0.0)),
];

/// Orbital camera model: position derived from focus, yaw, pitch, distance.
#[derive(Resource)]
pub struct OrbitCamera {
    pub focus: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            focus: Vec3::ZERO,
            yaw: DEFAULT_YAW,
            pitch: DEFAULT_PITCH,
            distance: DEFAULT_DISTANCE,
        }
    }
}

/// Cursor anchors for in-progress mouse drags, one per drag kind.
#[derive(Resource, Default)]
pub struct DragState {
    pan_from: Option<Vec2>,
    orbit_from: Option<Vec2>,
}

pub fn setup_camera(mut commands: Commands) {
    let orbit = OrbitCamera::default();
    let (pos, look_at) = orbit_to_transform(&orbit);

    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(pos).looking_at(look_at, Vec3::Y),
    ));
    commands.insert_resource(orbit);
}

/// Re-center the camera on the dataset once it has loaded. The load event
/// and the mesh spawn may land on different frames, so the request is held
/// until the scene bounds exist.
pub fn frame_loaded_dataset(
    mut events: EventReader<BuildingsLoaded>,
    bounds: Res<SceneBounds>,
    mut pending: Local<bool>,
    mut orbit: ResMut<OrbitCamera>,
) {
    if events.read().next().is_some() {
        *pending = true;
    }
    if !*pending || bounds.is_empty() {
        return;
    }
    *pending = false;
    orbit.focus = bounds.center();
    orbit.yaw = DEFAULT_YAW;
    orbit.pitch = DEFAULT_PITCH;
    orbit.distance = DEFAULT_DISTANCE;
}

fn clamp_focus(focus: &mut Vec3, bounds: &SceneBounds) {
    if bounds.is_empty() {
        return;
    }
    focus.x = focus.x.clamp(bounds.min.x - FOCUS_MARGIN, bounds.max.x + FOCUS_MARGIN);
    focus.z = focus.z.clamp(bounds.min.y - FOCUS_MARGIN, bounds.max.y + FOCUS_MARGIN);
}

fn orbit_to_transform(orbit: &OrbitCamera) -> (Vec3, Vec3) {
    // Spherical to cartesian offset from focus
    let x = orbit.distance * orbit.pitch.cos() * orbit.yaw.sin();
    let y = orbit.distance * orbit.pitch.sin();
    let z = orbit.distance * orbit.pitch.cos() * orbit.yaw.cos();
    let pos = orbit.focus + Vec3::new(x, y, z);
    (pos, orbit.focus)
}

/// Rotate a screen-space pan vector by the camera yaw onto the ground
/// plane.
fn yaw_to_ground(v: Vec2, yaw: f32) -> Vec3 {
    let (sin, cos) = yaw.sin_cos();
    Vec3::new(v.x * cos + v.y * sin, 0.0, -v.x * sin + v.y * cos)
}

/// Apply OrbitCamera state to the camera transform each frame.
pub fn apply_orbit_camera(
    orbit: Res<OrbitCamera>,
    mut query: Query<&mut Transform, With<Camera3d>>,
) {
    if !orbit.is_changed() {
        return;
    }
    let (pos, look_at) = orbit_to_transform(&orbit);
    let Ok(mut transform) = query.get_single_mut() else {
        return;
    };
    *transform = Transform::from_translation(pos).looking_at(look_at, Vec3::Y);
}

pub fn camera_pan_keyboard(
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    bounds: Res<SceneBounds>,
    mut orbit: ResMut<OrbitCamera>,
) {
    let mut dir = Vec2::ZERO;
    for (key, axis) in PAN_KEYS {
        if keys.pressed(key) {
            dir += axis;
        }
    }
    if dir == Vec2::ZERO {
        return;
    }
    let step = dir.normalize() * PAN_SPEED * (orbit.distance / 1000.0) * time.delta_secs();
    let offset = yaw_to_ground(step, orbit.yaw);
    orbit.focus += offset;
    clamp_focus(&mut orbit.focus, &bounds);
}

fn track_drag(
    buttons: &ButtonInput<MouseButton>,
    button: MouseButton,
    cursor: Option<Vec2>,
    over_ui: bool,
    anchor: &mut Option<Vec2>,
) {
    if buttons.just_pressed(button) && !over_ui {
        *anchor = cursor;
    }
    if buttons.just_released(button) {
        *anchor = None;
    }
}

/// Middle-drag pans the focus, right-drag orbits. Presses that begin over
/// an egui panel are ignored.
pub fn camera_mouse_drag(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window>,
    mut contexts: EguiContexts,
    bounds: Res<SceneBounds>,
    mut drag: ResMut<DragState>,
    mut orbit: ResMut<OrbitCamera>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let cursor = window.cursor_position();
    let over_ui = egui_wants_pointer(&mut contexts);

    track_drag(&buttons, MouseButton::Middle, cursor, over_ui, &mut drag.pan_from);
    track_drag(&buttons, MouseButton::Right, cursor, over_ui, &mut drag.orbit_from);

    let Some(cursor) = cursor else {
        return;
    };
    if let Some(from) = drag.pan_from {
        drag.pan_from = Some(cursor);
        let step = (from - cursor) * (orbit.distance / 1000.0);
        let offset = yaw_to_ground(step, orbit.yaw);
        orbit.focus += offset;
        clamp_focus(&mut orbit.focus, &bounds);
    }
    if let Some(from) = drag.orbit_from {
        drag.orbit_from = Some(cursor);
        let delta = cursor - from;
        orbit.yaw += delta.x * ORBIT_SENSITIVITY;
        orbit.pitch = (orbit.pitch - delta.y * ORBIT_SENSITIVITY).clamp(MIN_PITCH, MAX_PITCH);
    }
}

/// Scroll wheel zooms by scaling the orbit distance.
pub fn camera_zoom(
    mut wheel: EventReader<MouseWheel>,
    mut contexts: EguiContexts,
    mut orbit: ResMut<OrbitCamera>,
) {
    if egui_wants_pointer(&mut contexts) {
        wheel.clear();
        return;
    }
    let mut steps = 0.0;
    for event in wheel.read() {
        steps += match event.unit {
            MouseScrollUnit::Line => event.y,
            MouseScrollUnit::Pixel => event.y / 100.0,
        };
    }
    if steps != 0.0 {
        orbit.distance =
            (orbit.distance * (1.0 - steps * ZOOM_SPEED)).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_view_matches_the_fixed_framing() {
        let orbit = OrbitCamera::default();
        assert_eq!(orbit.yaw, -6.0);
        assert_eq!(orbit.distance, 3_000.0);
        let (pos, look_at) = orbit_to_transform(&orbit);
        assert_eq!(look_at, Vec3::ZERO);
        // 40 degrees of elevation at 3 km puts the camera ~1928 m up.
        assert!((pos.y - 3_000.0 * orbit.pitch.sin()).abs() < 0.01);
        assert!(((pos - look_at).length() - 3_000.0).abs() < 0.5);
    }

    #[test]
    fn focus_clamps_to_the_scene_margin() {
        let bounds = SceneBounds {
            min: Vec2::new(-100.0, -100.0),
            max: Vec2::new(100.0, 100.0),
        };
        let mut focus = Vec3::new(50_000.0, 0.0, -50_000.0);
        clamp_focus(&mut focus, &bounds);
        assert_eq!(focus.x, 100.0 + FOCUS_MARGIN);
        assert_eq!(focus.z, -100.0 - FOCUS_MARGIN);
    }

    #[test]
    fn pan_rotates_with_the_camera_yaw() {
        // Facing along default yaw 0: screen-down is world +z.
        let ground = yaw_to_ground(Vec2::new(0.0, 1.0), 0.0);
        assert!((ground - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-6);

        // A quarter turn swings the same input onto the x axis.
        let turned = yaw_to_ground(Vec2::new(0.0, 1.0), std::f32::consts::FRAC_PI_2);
        assert!((turned - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-6);
    }
}
