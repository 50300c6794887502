//! Building filter panel.
//!
//! Two selectors, mutually exclusive: building type (populated from the
//! values observed in the dataset) and height bucket. Choosing either
//! replaces the whole filter; each has a clear entry.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use viewer::buildings::{BuildingTypes, HeightBucket};
use viewer::highlight::{BuildingFilter, SetBuildingFilter};

/// Current selector positions. Kept separate from the applied filter so
/// the combo boxes have something stable to render between frames.
#[derive(Resource, Default)]
pub struct FilterSelection {
    pub building_type: Option<String>,
    pub bucket: Option<HeightBucket>,
}

pub fn filter_panel_ui(
    mut contexts: EguiContexts,
    types: Res<BuildingTypes>,
    mut selection: ResMut<FilterSelection>,
    mut filters: EventWriter<SetBuildingFilter>,
) {
    egui::Window::new("Buildings")
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(10.0, 10.0))
        .resizable(false)
        .default_width(220.0)
        .show(contexts.ctx_mut(), |ui| {
            ui.label("Highlight by type:");
            let type_label = selection.building_type.as_deref().unwrap_or("All buildings");
            let mut picked_type: Option<Option<String>> = None;
            egui::ComboBox::from_id_salt("building_type_filter")
                .selected_text(type_label)
                .width(190.0)
                .show_ui(ui, |ui| {
                    if ui
                        .selectable_label(selection.building_type.is_none(), "All buildings")
                        .clicked()
                    {
                        picked_type = Some(None);
                    }
                    for kind in &types.0 {
                        let active = selection.building_type.as_deref() == Some(kind.as_str());
                        if ui.selectable_label(active, kind).clicked() {
                            picked_type = Some(Some(kind.clone()));
                        }
                    }
                });
            if let Some(choice) = picked_type {
                selection.building_type = choice.clone();
                selection.bucket = None;
                filters.send(SetBuildingFilter(choice.map(BuildingFilter::ByType)));
            }

            ui.add_space(6.0);
            ui.label("Highlight by height:");
            let bucket_label = selection.bucket.map_or("All heights", HeightBucket::label);
            let mut picked_bucket: Option<Option<HeightBucket>> = None;
            egui::ComboBox::from_id_salt("building_height_filter")
                .selected_text(bucket_label)
                .width(190.0)
                .show_ui(ui, |ui| {
                    if ui
                        .selectable_label(selection.bucket.is_none(), "All heights")
                        .clicked()
                    {
                        picked_bucket = Some(None);
                    }
                    for bucket in HeightBucket::ALL {
                        if ui
                            .selectable_label(selection.bucket == Some(bucket), bucket.label())
                            .clicked()
                        {
                            picked_bucket = Some(Some(bucket));
                        }
                    }
                });
            if let Some(choice) = picked_bucket {
                selection.bucket = choice;
                selection.building_type = None;
                filters.send(SetBuildingFilter(choice.map(BuildingFilter::ByHeight)));
            }
        });
}
