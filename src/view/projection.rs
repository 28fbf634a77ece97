//! Map projection and coordinate transformation.
//!
//! Handles converting between geographic coordinates (lat/lon) and
//! screen coordinates for drawing routes on the canvas.

use crate::track::Point;
use eframe::egui::{Pos2, Rect, Vec2};
use geo_types::Coord;

/// Half-extent in degrees shown at zoom level 0.
const WORLD_HALF_EXTENT_DEG: f64 = 360.0;

/// Floor for the longitude shrink factor. `cos(90°)` is ~6e-17, which would
/// stretch the visible longitude span to ~1e14 degrees at the poles.
const MIN_LAT_CORRECTION: f64 = 1e-6;

/// Map projection for converting geographic to screen coordinates.
#[derive(Debug, Clone)]
pub struct MapProjection {
    /// Center latitude of the view
    pub center_lat: f64,
    /// Center longitude of the view
    pub center_lon: f64,
    /// Visible half-extent in degrees at scale 1.0
    pub range_deg: f64,
    /// Extra user zoom on top of the zoom level
    pub scale: f32,
    /// Pan offset in screen pixels
    pub pan_offset: Vec2,
    /// Screen rectangle for the canvas
    pub screen_rect: Rect,
}

impl Default for MapProjection {
    fn default() -> Self {
        Self {
            center_lat: 0.0,
            center_lon: 0.0,
            range_deg: WORLD_HALF_EXTENT_DEG,
            scale: 1.0,
            pan_offset: Vec2::ZERO,
            screen_rect: Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0)),
        }
    }
}

impl MapProjection {
    /// Creates a projection centered on `center` at a slippy-map zoom level.
    pub fn new(center: Point, zoom: u8) -> Self {
        Self {
            center_lat: center.lat,
            center_lon: center.lon,
            range_deg: range_for_zoom(zoom),
            ..Default::default()
        }
    }

    /// Updates the projection with current gesture state.
    pub fn update(&mut self, scale: f32, pan_offset: Vec2, screen_rect: Rect) {
        self.scale = scale;
        self.pan_offset = pan_offset;
        self.screen_rect = screen_rect;
    }

    /// Converts a point to screen position.
    ///
    /// Uses a simple equirectangular projection, adequate at street-level
    /// zoom where routes are drawn.
    pub fn geo_to_screen(&self, coord: Coord<f64>) -> Pos2 {
        let effective_range = self.range_deg / self.scale as f64;

        let rel_lon = coord.x - self.center_lon;
        let rel_lat = coord.y - self.center_lat;

        let corrected_lon = rel_lon * self.lat_correction();

        let norm_x = corrected_lon / effective_range;
        let norm_y = -rel_lat / effective_range; // screen Y grows downward

        let center = self.screen_rect.center() + self.pan_offset;
        let half_size = self.screen_rect.size().min_elem() / 2.0;

        Pos2::new(
            center.x + (norm_x as f32) * half_size,
            center.y + (norm_y as f32) * half_size,
        )
    }

    /// Converts screen position to geographic coordinates (lon, lat).
    pub fn screen_to_geo(&self, pos: Pos2) -> Coord<f64> {
        let effective_range = self.range_deg / self.scale as f64;

        let center = self.screen_rect.center() + self.pan_offset;
        let half_size = self.screen_rect.size().min_elem() / 2.0;

        let norm_x = (pos.x - center.x) / half_size;
        let norm_y = (pos.y - center.y) / half_size;

        let rel_lon = (norm_x as f64) * effective_range / self.lat_correction();
        let rel_lat = -(norm_y as f64) * effective_range;

        Coord {
            x: self.center_lon + rel_lon,
            y: self.center_lat + rel_lat,
        }
    }

    /// Shrinks longitude with latitude so shapes keep their aspect.
    fn lat_correction(&self) -> f64 {
        self.center_lat
            .to_radians()
            .cos()
            .max(MIN_LAT_CORRECTION)
    }

    /// Returns the visible geographic bounds as (min_lon, min_lat, max_lon, max_lat),
    /// clipped to the world (±180 longitude, ±90 latitude).
    pub fn visible_bounds(&self) -> (f64, f64, f64, f64) {
        let top_left = self.screen_to_geo(self.screen_rect.left_top());
        let bottom_right = self.screen_to_geo(self.screen_rect.right_bottom());

        (
            top_left.x.min(bottom_right.x).max(-180.0),
            top_left.y.min(bottom_right.y).max(-90.0),
            top_left.x.max(bottom_right.x).min(180.0),
            top_left.y.max(bottom_right.y).min(90.0),
        )
    }

    /// Checks if a coordinate is within the visible bounds (with margin).
    pub fn is_visible(&self, coord: Coord<f64>, margin_deg: f64) -> bool {
        let (min_lon, min_lat, max_lon, max_lat) = self.visible_bounds();
        coord.x >= min_lon - margin_deg
            && coord.x <= max_lon + margin_deg
            && coord.y >= min_lat - margin_deg
            && coord.y <= max_lat + margin_deg
    }
}

/// Half-extent in degrees for a slippy-map zoom level.
pub fn range_for_zoom(zoom: u8) -> f64 {
    WORLD_HALF_EXTENT_DEG / 2f64.powi(i32::from(zoom.min(22)))
}
