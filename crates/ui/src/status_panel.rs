//! Impact status readout.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use viewer::flood::FloodLayers;
use viewer::impact::{FloodImpact, InfrastructureImpact};
use viewer::utilities::UtilityKind;

pub fn status_panel_ui(
    mut contexts: EguiContexts,
    floods: Res<FloodLayers>,
    flood_impact: Res<FloodImpact>,
    infra_impact: Res<InfrastructureImpact>,
) {
    egui::Window::new("Impact")
        .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(10.0, -10.0))
        .resizable(false)
        .default_width(220.0)
        .show(contexts.ctx_mut(), |ui| {
            ui.label(format!("Active flood layers: {}", floods.active_count()));
            ui.label(format!(
                "Affected buildings: {}",
                flood_impact.affected_buildings
            ));
            ui.separator();
            ui.label("Affected infrastructure:");
            for (kind, name) in [
                (UtilityKind::Road, "Roads"),
                (UtilityKind::Rail, "Railways"),
                (UtilityKind::Power, "Power lines"),
            ] {
                ui.label(format!("  {name}: {:.2} km", infra_impact.km(kind)));
            }
        });
}
