//! UI modules for the Track Viewer application.
//!
//! The UI is split into distinct panels:
//! - Top bar: Title, route status, location status, and recenter policy
//! - Central canvas: Map with routes, waypoints, and the user marker

mod canvas;
pub mod colors;
mod top_bar;

pub use canvas::render_canvas;
pub use top_bar::render_top_bar;
