//! Building highlight selection.

use bevy::prelude::*;

use crate::buildings::{Building, HeightBucket};
use crate::impact::RecomputeFloodImpact;

/// The active building filter. The two UI selectors are mutually
/// exclusive: applying either kind replaces the whole filter.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildingFilter {
    /// Exact, case-sensitive `BUILD_TYPE` match.
    ByType(String),
    ByHeight(HeightBucket),
}

impl BuildingFilter {
    pub fn matches(&self, building: &Building) -> bool {
        match self {
            BuildingFilter::ByType(wanted) => {
                building.building_type.as_deref() == Some(wanted.as_str())
            }
            BuildingFilter::ByHeight(bucket) => bucket.contains(building.filter_height()),
        }
    }
}

/// The current highlight set. Owned here; the renderer only reads it to
/// recolor buildings.
#[derive(Resource, Debug, Default)]
pub struct HighlightState {
    pub filter: Option<BuildingFilter>,
    pub selected: Vec<Entity>,
}

/// Replace the active filter. `None` clears the highlight without
/// reselecting.
#[derive(Event, Debug, Clone)]
pub struct SetBuildingFilter(pub Option<BuildingFilter>);

/// Applies the most recent filter change: the previous selection is
/// always dropped first, then the new filter (if any) selects afresh.
pub fn apply_building_filter(
    mut events: EventReader<SetBuildingFilter>,
    buildings: Query<(Entity, &Building)>,
    mut state: ResMut<HighlightState>,
    mut recompute: EventWriter<RecomputeFloodImpact>,
) {
    let Some(SetBuildingFilter(filter)) = events.read().last().cloned() else {
        return;
    };
    state.selected.clear();
    state.filter = filter;
    if let Some(filter) = &state.filter {
        state.selected = buildings
            .iter()
            .filter(|(_, building)| filter.matches(building))
            .map(|(entity, _)| entity)
            .collect();
    }
    recompute.send(RecomputeFloodImpact);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn building(kind: Option<&str>, height: Option<f32>) -> Building {
        Building {
            building_type: kind.map(str::to_string),
            height,
        }
    }

    #[test]
    fn type_filter_is_exact_and_case_sensitive() {
        let filter = BuildingFilter::ByType("Residential".to_string());
        assert!(filter.matches(&building(Some("Residential"), None)));
        assert!(!filter.matches(&building(Some("residential"), None)));
        assert!(!filter.matches(&building(Some("Residential "), None)));
        assert!(!filter.matches(&building(None, None)));
    }

    #[test]
    fn height_filter_treats_missing_height_as_zero() {
        let filter = BuildingFilter::ByHeight(HeightBucket::UpToThree);
        // Missing height filters as 0, which the lowest bucket contains.
        assert!(filter.matches(&building(None, None)));
        assert!(!BuildingFilter::ByHeight(HeightBucket::NineAndUp).matches(&building(None, None)));
    }

    #[test]
    fn applying_a_new_filter_replaces_the_selection() {
        let mut app = App::new();
        app.add_event::<SetBuildingFilter>();
        app.add_event::<RecomputeFloodImpact>();
        app.init_resource::<HighlightState>();
        app.add_systems(Update, apply_building_filter);

        let residential_a = app
            .world_mut()
            .spawn(building(Some("Residential"), Some(4.0)))
            .id();
        let commercial = app
            .world_mut()
            .spawn(building(Some("Commercial"), Some(8.0)))
            .id();
        let residential_b = app
            .world_mut()
            .spawn(building(Some("Residential"), Some(2.0)))
            .id();

        app.world_mut()
            .send_event(SetBuildingFilter(Some(BuildingFilter::ByType(
                "Residential".to_string(),
            ))));
        app.update();
        {
            let state = app.world().resource::<HighlightState>();
            assert_eq!(state.selected.len(), 2);
            assert!(state.selected.contains(&residential_a));
            assert!(state.selected.contains(&residential_b));
        }

        app.world_mut()
            .send_event(SetBuildingFilter(Some(BuildingFilter::ByType(
                "Commercial".to_string(),
            ))));
        app.update();
        {
            let state = app.world().resource::<HighlightState>();
            assert_eq!(state.selected, vec![commercial]);
        }

        // Clearing deselects everything.
        app.world_mut().send_event(SetBuildingFilter(None));
        app.update();
        let state = app.world().resource::<HighlightState>();
        assert!(state.selected.is_empty());
        assert!(state.filter.is_none());
    }

    #[test]
    fn only_the_latest_filter_event_in_a_frame_wins() {
        let mut app = App::new();
        app.add_event::<SetBuildingFilter>();
        app.add_event::<RecomputeFloodImpact>();
        app.init_resource::<HighlightState>();
        app.add_systems(Update, apply_building_filter);

        app.world_mut().spawn(building(Some("Industrial"), None));

        app.world_mut()
            .send_event(SetBuildingFilter(Some(BuildingFilter::ByType(
                "Industrial".to_string(),
            ))));
        app.world_mut().send_event(SetBuildingFilter(None));
        app.update();

        let state = app.world().resource::<HighlightState>();
        assert!(state.filter.is_none());
        assert!(state.selected.is_empty());
    }
}
