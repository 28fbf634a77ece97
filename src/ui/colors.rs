//! Centralized color constants for the UI.
//!
//! This module provides consistent colors across all UI panels.
//! Fetched routes take their colors from `track::color::PALETTE`.

use eframe::egui::Color32;

/// General UI colors for labels and values.
pub mod ui {
    use super::Color32;

    /// Muted gray for stat labels.
    pub const LABEL: Color32 = Color32::from_rgb(100, 100, 100);
    /// Slightly brighter for stat values.
    pub const VALUE: Color32 = Color32::from_rgb(160, 160, 160);
    /// Success/positive indicator.
    pub const SUCCESS: Color32 = Color32::from_rgb(100, 200, 100);
    /// Warning indicator.
    pub const WARNING: Color32 = Color32::from_rgb(255, 180, 50);
}

/// Colors for inline routes.
pub mod route {
    use super::Color32;

    /// Path connecting the points of an inline route.
    pub const INLINE_PATH: Color32 = Color32::from_rgb(0x4C, 0xAF, 0x50);
    /// Waypoint marker fill.
    pub const WAYPOINT: Color32 = Color32::from_rgb(0xFF, 0x57, 0x22);

    /// Waypoint fill at 80% opacity - requires alpha, use function.
    pub fn waypoint_fill() -> Color32 {
        Color32::from_rgba_unmultiplied(0xFF, 0x57, 0x22, 204)
    }
}

/// Colors for the map canvas.
pub mod canvas {
    use super::Color32;

    /// Background color.
    pub const BACKGROUND: Color32 = Color32::from_rgb(20, 20, 35);
    /// Overlay text.
    pub const OVERLAY_TEXT: Color32 = Color32::from_rgb(200, 200, 220);
    /// User location marker.
    pub const USER_MARKER: Color32 = Color32::from_rgb(50, 200, 255);
    /// User location marker stroke.
    pub const USER_MARKER_STROKE: Color32 = Color32::from_rgb(30, 150, 200);

    /// Graticule line color - requires alpha, use function.
    pub fn graticule() -> Color32 {
        Color32::from_rgba_unmultiplied(60, 80, 60, 120)
    }
}
