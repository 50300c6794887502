//! Egui input guard: prevents click-through from UI elements to the world.
//!
//! When egui (panels, toggles) is handling pointer input, camera drag and
//! zoom systems should skip processing to avoid the view lurching while the
//! user interacts with the UI.

use bevy_egui::EguiContexts;

/// Returns `true` when egui wants the pointer, i.e. the cursor is over an
/// egui panel or egui is actively handling a drag/click.
#[inline]
pub fn egui_wants_pointer(contexts: &mut EguiContexts) -> bool {
    let ctx = contexts.ctx_mut();
    ctx.wants_pointer_input() || ctx.is_pointer_over_area()
}
