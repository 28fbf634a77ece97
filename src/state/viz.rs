//! Gesture state layered on top of the synchronized view.

use eframe::egui::Vec2;

/// Pan/zoom the user applied on top of the synchronized view.
///
/// The synchronized center stays authoritative; these offsets are reset
/// whenever control is handed back.
#[derive(Debug, Clone, PartialEq)]
pub struct VizState {
    /// Extra zoom factor (1.0 = none)
    pub scale: f32,

    /// Current pan offset from center, in pixels
    pub pan_offset: Vec2,

    /// Waypoint whose popup is open, by index into the render plan
    pub selected_waypoint: Option<usize>,
}

impl Default for VizState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            pan_offset: Vec2::ZERO,
            selected_waypoint: None,
        }
    }
}

impl VizState {
    /// Clears user pan/zoom.
    pub fn reset_gestures(&mut self) {
        self.scale = 1.0;
        self.pan_offset = Vec2::ZERO;
    }

    pub fn has_gestures(&self) -> bool {
        self.scale != 1.0 || self.pan_offset != Vec2::ZERO
    }
}
