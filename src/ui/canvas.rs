//! Central canvas UI: the map widget.
//!
//! Draws the render plan and turns pan/zoom gestures into user intent for
//! the view synchronizer.

use super::colors;
use crate::state::AppState;
use crate::view::{range_for_zoom, MapProjection, RenderPlan};
use eframe::egui::{self, Painter, Pos2, Rect, RichText, Sense, Stroke, Vec2};

/// Waypoint marker radius in pixels.
const WAYPOINT_RADIUS: f32 = 8.0;

pub fn render_canvas(ctx: &egui::Context, state: &mut AppState) {
    egui::CentralPanel::default()
        .frame(egui::Frame::NONE)
        .show(ctx, |ui| {
            let available_size = ui.available_size();
            let (response, painter) = ui.allocate_painter(available_size, Sense::click_and_drag());
            let rect = response.rect;

            // From here on the map can take recenter commands
            state.view.set_map_ready();

            painter.rect_filled(rect, 0.0, colors::canvas::BACKGROUND);

            let view = state.view.view();
            let mut projection = MapProjection::new(view.center, view.zoom);
            projection.update(state.viz_state.scale, state.viz_state.pan_offset, rect);

            draw_graticule(&painter, &projection);

            let plan = state.plan();
            draw_paths(&painter, &projection, plan);
            let waypoint_positions = draw_waypoints(&painter, &projection, plan);
            draw_user_marker(&painter, &projection, plan);

            draw_overlay_info(ui, &rect, state);

            if response.clicked() {
                state.viz_state.selected_waypoint = response
                    .interact_pointer_pos()
                    .and_then(|pos| hit_waypoint(&waypoint_positions, pos));
            }
            if let Some(index) = state.viz_state.selected_waypoint {
                if let Some(&pos) = waypoint_positions.get(index) {
                    show_waypoint_popup(ctx, state.plan(), index, pos);
                }
            }

            handle_canvas_interaction(&response, &rect, state);
        });
}

/// Light lat/lon grid so panning has visible reference.
fn draw_graticule(painter: &Painter, projection: &MapProjection) {
    let (min_lon, min_lat, max_lon, max_lat) = projection.visible_bounds();
    let step = grid_step(max_lat - min_lat);
    let stroke = Stroke::new(0.5, colors::canvas::graticule());
    let rect = projection.screen_rect;

    for lon in grid_lines(min_lon, max_lon, step) {
        let x = projection
            .geo_to_screen(geo_types::Coord { x: lon, y: min_lat })
            .x;
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
    }

    for lat in grid_lines(min_lat, max_lat, step) {
        let y = projection
            .geo_to_screen(geo_types::Coord { x: min_lon, y: lat })
            .y;
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
    }
}

/// Most grid lines drawn along one axis; denser grids are skipped.
const MAX_GRID_LINES: usize = 200;

/// Multiples of `step` from the one at or below `min` up to `max`, or none
/// when there would be more than `MAX_GRID_LINES` of them.
fn grid_lines(min: f64, max: f64, step: f64) -> Vec<f64> {
    if !(step.is_finite() && step > 0.0 && min.is_finite() && max.is_finite()) {
        return Vec::new();
    }
    let first = (min / step).floor() as i64;
    let last = (max / step).floor() as i64;
    let count = last.saturating_sub(first).saturating_add(1);
    if count <= 0 || count as usize > MAX_GRID_LINES {
        return Vec::new();
    }
    (first..=last).map(|i| i as f64 * step).collect()
}

/// Power-of-ten grid spacing giving roughly 4-10 lines across `span`.
fn grid_step(span: f64) -> f64 {
    if span <= 0.0 {
        return 0.0;
    }
    10f64.powf((span / 4.0).log10().floor())
}

fn draw_paths(painter: &Painter, projection: &MapProjection, plan: &RenderPlan) {
    for path in &plan.paths {
        let screen_points: Vec<Pos2> = path
            .points
            .iter()
            .map(|p| projection.geo_to_screen(p.to_coord()))
            .collect();
        painter.add(egui::Shape::line(screen_points, Stroke::new(4.0, path.color)));
    }
}

/// Draws waypoint markers and returns their screen positions, in plan order.
fn draw_waypoints(painter: &Painter, projection: &MapProjection, plan: &RenderPlan) -> Vec<Pos2> {
    plan.waypoints
        .iter()
        .map(|waypoint| {
            let pos = projection.geo_to_screen(waypoint.point.to_coord());
            painter.circle_filled(pos, WAYPOINT_RADIUS, colors::route::waypoint_fill());
            painter.circle_stroke(
                pos,
                WAYPOINT_RADIUS,
                Stroke::new(2.0, colors::route::WAYPOINT),
            );
            pos
        })
        .collect()
}

fn draw_user_marker(painter: &Painter, projection: &MapProjection, plan: &RenderPlan) {
    let Some(point) = plan
        .user_marker
        .filter(|p| projection.is_visible(p.to_coord(), 0.0))
    else {
        return;
    };
    let pos = projection.geo_to_screen(point.to_coord());
    painter.circle_filled(pos, 7.0, colors::canvas::USER_MARKER);
    painter.circle_stroke(
        pos,
        7.0,
        Stroke::new(2.0, colors::canvas::USER_MARKER_STROKE),
    );
    painter.text(
        pos + Vec2::new(10.0, -2.0),
        egui::Align2::LEFT_CENTER,
        "Your location",
        egui::FontId::proportional(11.0),
        colors::canvas::USER_MARKER,
    );
}

/// Index of the last-drawn waypoint under `pos`, so the topmost one wins.
fn hit_waypoint(positions: &[Pos2], pos: Pos2) -> Option<usize> {
    positions
        .iter()
        .rposition(|p| p.distance(pos) <= WAYPOINT_RADIUS + 2.0)
}

fn show_waypoint_popup(ctx: &egui::Context, plan: &RenderPlan, index: usize, pos: Pos2) {
    let Some(waypoint) = plan.waypoints.get(index) else {
        return;
    };
    egui::Area::new(egui::Id::new("waypoint_popup"))
        .order(egui::Order::Foreground)
        .fixed_pos(pos + Vec2::new(WAYPOINT_RADIUS, WAYPOINT_RADIUS))
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.label(
                    RichText::new(format!(
                        "{:.6}, {:.6}",
                        waypoint.point.lat, waypoint.point.lon
                    ))
                    .monospace()
                    .size(11.0),
                );
                ui.add(
                    egui::Hyperlink::from_label_and_url(
                        "Navigate to this point",
                        &waypoint.navigate_url,
                    )
                    .open_in_new_tab(true),
                );
            });
        });
}

fn draw_overlay_info(ui: &mut egui::Ui, rect: &Rect, state: &AppState) {
    let overlay_pos = rect.left_top() + Vec2::new(10.0, 10.0);
    let overlay_rect = Rect::from_min_size(overlay_pos, Vec2::new(220.0, 70.0));
    let view = state.view.view();

    ui.scope_builder(egui::UiBuilder::new().max_rect(overlay_rect), |ui| {
        ui.vertical(|ui| {
            ui.label(
                RichText::new(format!(
                    "Center: {:.5}, {:.5}",
                    view.center.lat, view.center.lon
                ))
                .monospace()
                .size(12.0)
                .color(colors::canvas::OVERLAY_TEXT),
            );
            ui.label(
                RichText::new(format!(
                    "Zoom: {} (x{:.2}, {:.3} deg)",
                    view.zoom,
                    state.viz_state.scale,
                    range_for_zoom(view.zoom)
                ))
                .monospace()
                .size(12.0)
                .color(colors::canvas::OVERLAY_TEXT),
            );
            if state.view.has_user_gesture() {
                ui.label(
                    RichText::new("Double-click to recenter")
                        .size(11.0)
                        .color(colors::ui::LABEL),
                );
            }
        });
    });
}

fn handle_canvas_interaction(response: &egui::Response, rect: &Rect, state: &mut AppState) {
    // Handle dragging for panning
    if response.dragged() {
        state.viz_state.pan_offset += response.drag_delta();
        state.view.on_user_gesture();
    }

    // Handle scroll for zooming relative to cursor position
    if response.hovered() {
        let scroll_delta = response.ctx.input(|i| i.raw_scroll_delta);
        if scroll_delta.y != 0.0 {
            let zoom_factor = 1.0 + scroll_delta.y * 0.001;
            let old_scale = state.viz_state.scale;
            let new_scale = (old_scale * zoom_factor).clamp(0.05, 20.0);

            // Adjust pan offset to keep the point under cursor stationary
            if let Some(cursor_pos) = response.hover_pos() {
                let cursor_rel = cursor_pos - rect.center();
                let ratio = new_scale / old_scale;
                state.viz_state.pan_offset =
                    cursor_rel * (1.0 - ratio) + state.viz_state.pan_offset * ratio;
            }

            state.viz_state.scale = new_scale;
            state.view.on_user_gesture();
        }
    }

    // Hand control back on double-click
    if response.double_clicked() {
        state.viz_state.reset_gestures();
        state.view.release_user_gesture();
    }
}
