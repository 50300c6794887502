//! Layer toggle panel: flood years and utility networks.
//!
//! A loading layer shows a pending marker and ignores clicks; the toggle
//! state machine would handle a mid-load click, but offering it in the UI
//! only invites accidental cancels.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use viewer::flood::{FloodLayers, FloodYear, ToggleFloodLayer};
use viewer::slots::SlotPhase;
use viewer::utilities::{ToggleUtilityLayer, UtilityKind, UtilityLayers};

fn layer_button(ui: &mut egui::Ui, label: &str, phase: Option<SlotPhase>) -> bool {
    match phase {
        Some(SlotPhase::Loading) => {
            ui.add_enabled(false, egui::SelectableLabel::new(false, format!("{label} ...")));
            false
        }
        Some(SlotPhase::On) => ui.selectable_label(true, label).clicked(),
        None => ui.selectable_label(false, label).clicked(),
    }
}

pub fn layers_panel_ui(
    mut contexts: EguiContexts,
    floods: Res<FloodLayers>,
    utilities: Res<UtilityLayers>,
    mut flood_toggles: EventWriter<ToggleFloodLayer>,
    mut utility_toggles: EventWriter<ToggleUtilityLayer>,
) {
    egui::Window::new("Layers")
        .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-10.0, 10.0))
        .resizable(false)
        .default_width(160.0)
        .show(contexts.ctx_mut(), |ui| {
            ui.label("Flood imagery:");
            ui.horizontal_wrapped(|ui| {
                for year in FloodYear::ALL {
                    if layer_button(ui, year.label(), floods.slots.phase(year)) {
                        flood_toggles.send(ToggleFloodLayer(year));
                    }
                }
            });

            ui.add_space(6.0);
            ui.label("Utilities:");
            ui.horizontal_wrapped(|ui| {
                for kind in UtilityKind::ALL {
                    if layer_button(ui, kind.label(), utilities.slots.phase(kind)) {
                        utility_toggles.send(ToggleUtilityLayer(kind));
                    }
                }
            });
        });
}
