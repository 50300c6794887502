//! egui panels: building filters, layer toggles, impact readouts and the
//! notification ticker.

use bevy::prelude::*;
use bevy_egui::EguiPlugin;

pub mod filter_panel;
pub mod layers_panel;
pub mod notification_ticker;
pub mod status_panel;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin)
            .init_resource::<filter_panel::FilterSelection>()
            .add_systems(
                Update,
                (
                    filter_panel::filter_panel_ui,
                    layers_panel::layers_panel_ui,
                    status_panel::status_panel_ui,
                    notification_ticker::notification_ticker_ui,
                ),
            );
    }
}
