//! Viewer state and coordination: configuration, asset fetching, dataset
//! decoding, building filters, layer toggle machines, impact counters and
//! notifications. No rendering lives here.

use bevy::prelude::*;

pub mod assets;
pub mod buildings;
pub mod config;
pub mod error;
pub mod flood;
pub mod geojson;
pub mod highlight;
pub mod impact;
pub mod notifications;
pub mod slots;
pub mod utilities;

pub struct ViewerPlugin;

impl Plugin for ViewerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<buildings::BuildingTypes>()
            .init_resource::<highlight::HighlightState>()
            .init_resource::<flood::FloodLayers>()
            .init_resource::<utilities::UtilityLayers>()
            .init_resource::<impact::ImpactModel>()
            .init_resource::<impact::FloodImpact>()
            .init_resource::<impact::InfrastructureImpact>()
            .init_resource::<notifications::NotificationLog>()
            .add_event::<buildings::BuildingsLoaded>()
            .add_event::<highlight::SetBuildingFilter>()
            .add_event::<flood::ToggleFloodLayer>()
            .add_event::<flood::FloodImageryReady>()
            .add_event::<flood::FloodLayerRemoved>()
            .add_event::<utilities::ToggleUtilityLayer>()
            .add_event::<impact::RecomputeFloodImpact>()
            .add_event::<impact::RecomputeInfrastructureImpact>()
            .add_event::<notifications::NotificationEvent>()
            .add_systems(Startup, buildings::begin_building_load)
            .add_systems(
                Update,
                (
                    buildings::poll_building_load,
                    highlight::apply_building_filter,
                    flood::handle_flood_toggles,
                    flood::poll_flood_fetches,
                    utilities::handle_utility_toggles,
                    utilities::poll_utility_fetches,
                    impact::recompute_flood_impact,
                    impact::recompute_infrastructure_impact,
                    notifications::collect_notifications,
                )
                    .chain(),
            );
    }
}
