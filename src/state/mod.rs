//! Application state management.
//!
//! Route set, latest location sample, and view are separate named values.
//! Each is replaced whole through an update function; nothing is patched
//! in place.

mod settings;
mod viz;

pub use settings::Settings;
pub use viz::VizState;

use crate::error::SensorError;
use crate::location::LocationSample;
use crate::track::{Point, RouteSet};
use crate::view::{RenderPlan, SyncEvent, ViewSynchronizer};

/// Root application state containing all sub-states.
pub struct AppState {
    /// Loaded routes; replaced once when resolution completes
    routes: RouteSet,

    /// Whether `routes` holds the resolved set yet
    routes_resolved: bool,

    /// Latest location sample, if any arrived
    location: Option<LocationSample>,

    /// Number of location samples received
    location_version: u64,

    /// Most recent sensor failure, cleared by the next good sample
    sensor_error: Option<SensorError>,

    /// Derived map view
    pub view: ViewSynchronizer,

    /// User pan/zoom over the view
    pub viz_state: VizState,

    /// Render plan for the current routes and location
    plan: RenderPlan,

    /// Application status message displayed in top bar
    pub status_message: String,

    pub settings: Settings,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let routes = RouteSet::empty();
        let view = ViewSynchronizer::new(
            &routes,
            settings.fallback_center,
            settings.zoom,
            settings.location_recenter,
        );
        Self {
            routes,
            routes_resolved: false,
            location: None,
            location_version: 0,
            sensor_error: None,
            view,
            viz_state: VizState::default(),
            plan: RenderPlan::default(),
            status_message: "Loading routes...".to_string(),
            settings,
        }
    }

    pub fn routes(&self) -> &RouteSet {
        &self.routes
    }

    pub fn routes_resolved(&self) -> bool {
        self.routes_resolved
    }

    pub fn location(&self) -> Option<&LocationSample> {
        self.location.as_ref()
    }

    pub fn location_version(&self) -> u64 {
        self.location_version
    }

    pub fn sensor_error(&self) -> Option<&SensorError> {
        self.sensor_error.as_ref()
    }

    pub fn plan(&self) -> &RenderPlan {
        &self.plan
    }

    /// Installs the resolved route set and lets the view react.
    pub fn set_routes(&mut self, routes: RouteSet) -> Option<Point> {
        if self.routes_resolved {
            log::warn!("Route set already installed, ignoring replacement");
            return None;
        }
        self.status_message = route_status(&routes);
        self.routes = routes;
        self.routes_resolved = true;
        self.rebuild_plan();
        self.view.apply(SyncEvent::RoutesResolved(&self.routes))
    }

    /// Replaces the latest location sample and lets the view react.
    pub fn set_location(&mut self, sample: LocationSample) -> Option<Point> {
        self.location = Some(sample);
        self.location_version += 1;
        self.sensor_error = None;
        self.rebuild_plan();
        self.view.apply(SyncEvent::LocationUpdated(&sample))
    }

    /// Records a sensor failure. The last good sample stays on the map.
    pub fn set_sensor_error(&mut self, error: SensorError) {
        self.sensor_error = Some(error);
    }

    fn rebuild_plan(&mut self) {
        self.plan = RenderPlan::build(&self.routes, self.location.as_ref());
        debug_assert!(self.plan.all_points().all(|p| p.is_drawable()));
    }
}

fn route_status(routes: &RouteSet) -> String {
    let mut status = match (routes.tracks().len(), routes.is_single_inline_route()) {
        (0, _) => "No routes".to_string(),
        (_, true) => format!("Route with {} point(s)", routes.tracks()[0].len()),
        (1, false) => "1 route".to_string(),
        (n, false) => format!("{} routes", n),
    };
    if routes.dropped_points() > 0 {
        status.push_str(&format!(
            " ({} invalid point(s) skipped)",
            routes.dropped_points()
        ));
    }
    status
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{decode_track, decode_track_set};
    use chrono::Utc;

    #[test]
    fn test_routes_installed_once() {
        let mut state = AppState::new(Settings::default());
        state.view.set_map_ready();
        assert!(!state.routes_resolved());
        let center = state.set_routes(RouteSet::inline(decode_track("1,1|2,2|3,3")));
        assert_eq!(center, Some(Point::new(2.0, 2.0)));
        assert_eq!(state.plan().waypoints.len(), 3);
        assert!(state.routes_resolved());

        assert_eq!(state.set_routes(RouteSet::empty()), None);
        assert_eq!(state.routes().tracks().len(), 1);
    }

    #[test]
    fn test_location_replaces_whole_sample() {
        let mut state = AppState::new(Settings::default());
        state.set_routes(RouteSet::fetched(decode_track_set(&["1,2|3,4"])));
        state.set_location(LocationSample::new(10.0, 20.0, Utc::now()));
        state.set_location(LocationSample::new(11.0, 21.0, Utc::now()));

        assert_eq!(state.location_version(), 2);
        assert_eq!(state.location().map(|s| s.point()), Some(Point::new(11.0, 21.0)));
        assert_eq!(state.plan().paths.len(), 1);
        assert_eq!(state.plan().user_marker, Some(Point::new(11.0, 21.0)));
    }

    #[test]
    fn test_sensor_error_keeps_last_sample() {
        let mut state = AppState::new(Settings::default());
        state.set_location(LocationSample::new(10.0, 20.0, Utc::now()));
        state.set_sensor_error(SensorError::Timeout("slow".into()));
        assert!(state.sensor_error().is_some());
        assert!(state.location().is_some());

        state.set_location(LocationSample::new(10.0, 20.0, Utc::now()));
        assert!(state.sensor_error().is_none());
    }

    #[test]
    fn test_route_status() {
        assert_eq!(route_status(&RouteSet::empty()), "No routes");
        assert_eq!(
            route_status(&RouteSet::inline(decode_track("1,2|x,y"))),
            "Route with 1 point(s) (1 invalid point(s) skipped)"
        );
        assert_eq!(
            route_status(&RouteSet::fetched(decode_track_set(&["1,2", "3,4"]))),
            "2 routes"
        );
    }
}
