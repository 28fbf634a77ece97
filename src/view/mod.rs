//! Map view: center synchronization, projection, and the render plan.

mod projection;
mod render;
mod sync;

pub use projection::{range_for_zoom, MapProjection};
pub use render::{navigate_url, PathSpec, RenderPlan, Waypoint};
pub use sync::{initial_center, LocationRecenter, SyncEvent, ViewState, ViewSynchronizer};
