//! Notification ticker.
//!
//! Renders active notifications along the top edge, color-coded by
//! priority, each with a dismiss button. Expiry itself happens in the
//! viewer crate; this is display only.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use viewer::notifications::{NotificationLog, NotificationPriority};

const TICKER_Y_OFFSET: f32 = 4.0;

fn priority_color(priority: NotificationPriority) -> egui::Color32 {
    match priority {
        NotificationPriority::Warning => egui::Color32::from_rgb(255, 165, 0),
        NotificationPriority::Info => egui::Color32::from_rgb(220, 220, 220),
    }
}

fn priority_icon(priority: NotificationPriority) -> &'static str {
    match priority {
        NotificationPriority::Warning => "[W]",
        NotificationPriority::Info => "[i]",
    }
}

pub fn notification_ticker_ui(mut contexts: EguiContexts, mut log: ResMut<NotificationLog>) {
    if log.active.is_empty() {
        return;
    }

    let mut dismiss_id: Option<u64> = None;

    egui::Area::new(egui::Id::new("notification_ticker"))
        .fixed_pos(egui::pos2(0.0, TICKER_Y_OFFSET))
        .order(egui::Order::Middle)
        .show(contexts.ctx_mut(), |ui| {
            let screen_width = ui.ctx().screen_rect().width();
            egui::Frame::new()
                .fill(egui::Color32::from_rgba_premultiplied(20, 20, 30, 220))
                .inner_margin(egui::Margin::symmetric(6, 4))
                .show(ui, |ui| {
                    ui.set_min_width(screen_width);
                    ui.horizontal_wrapped(|ui| {
                        for notification in &log.active {
                            let color = priority_color(notification.priority);
                            let icon = priority_icon(notification.priority);
                            ui.label(
                                egui::RichText::new(format!("{icon} {}", notification.text))
                                    .color(color),
                            )
                            .on_hover_text(notification.priority.label());
                            if ui.small_button("x").clicked() {
                                dismiss_id = Some(notification.id);
                            }
                            ui.separator();
                        }
                    });
                });
        });

    if let Some(id) = dismiss_id {
        log.dismiss(id);
    }
}
