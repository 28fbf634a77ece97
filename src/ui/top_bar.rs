//! Top bar UI: app title, route status, and location controls.

use super::colors;
use crate::state::AppState;
use crate::view::LocationRecenter;
use eframe::egui::{self, Color32, RichText};

pub fn render_top_bar(ctx: &egui::Context, state: &mut AppState) {
    egui::TopBottomPanel::top("top_bar")
        .exact_height(36.0)
        .show(ctx, |ui| {
            ui.horizontal_centered(|ui| {
                // App title
                ui.label(
                    RichText::new("Track Viewer")
                        .strong()
                        .size(16.0)
                        .color(Color32::WHITE),
                );

                ui.separator();

                // Status text
                if !state.routes_resolved() {
                    ui.spinner();
                }
                ui.label(
                    RichText::new(&state.status_message)
                        .size(13.0)
                        .color(Color32::GRAY),
                );

                ui.separator();

                render_location_status(ui, state);

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    render_recenter_controls(ui, state);
                });
            });
        });
}

fn render_location_status(ui: &mut egui::Ui, state: &AppState) {
    if let Some(error) = state.sensor_error() {
        ui.label(
            RichText::new(format!("Location: {}", error))
                .size(12.0)
                .color(colors::ui::WARNING),
        );
        return;
    }

    match state.location() {
        Some(sample) => {
            ui.label(RichText::new("Location:").size(12.0).color(colors::ui::LABEL));
            ui.label(
                RichText::new(format!(
                    "{:.5}, {:.5} at {}",
                    sample.lat,
                    sample.lon,
                    sample.observed_at.format("%H:%M:%S UTC")
                ))
                .monospace()
                .size(12.0)
                .color(colors::ui::SUCCESS),
            );
        }
        None => {
            ui.label(
                RichText::new("Waiting for location...")
                    .size(12.0)
                    .color(colors::ui::VALUE),
            );
        }
    }
}

fn render_recenter_controls(ui: &mut egui::Ui, state: &mut AppState) {
    let mut policy = state.view.policy();
    egui::ComboBox::from_id_salt("location_recenter")
        .selected_text(policy.label())
        .show_ui(ui, |ui| {
            for option in LocationRecenter::all() {
                ui.selectable_value(&mut policy, *option, option.label());
            }
        });
    ui.label(RichText::new("Follow:").size(12.0).color(colors::ui::LABEL));

    if policy != state.view.policy() {
        log::info!("Location recenter policy set to {:?}", policy);
        state.view.set_policy(policy);
        state.settings.location_recenter = policy;
        state.settings.save();
    }

    if (state.view.has_user_gesture() || state.viz_state.has_gestures())
        && ui
            .button("Recenter")
            .on_hover_text("Hand the view back to routes and location")
            .clicked()
    {
        state.viz_state.reset_gestures();
        state.view.release_user_gesture();
    }
}
