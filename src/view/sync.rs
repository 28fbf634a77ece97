//! View synchronization.
//!
//! The map center is derived state. Two independent event sources feed it:
//! the route set (resolved once) and location samples (one per poll tick).
//! Either may arrive first, and the route set may never arrive at all.

use crate::location::LocationSample;
use crate::track::{Point, RouteSet};
use serde::{Deserialize, Serialize};

/// Where the map is looking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub center: Point,
    pub zoom: u8,
}

/// When a location sample may move the map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationRecenter {
    /// Location never moves the map.
    Never,
    /// Center on the first fix, unless routes are already framing the view.
    #[default]
    FirstFix,
    /// Center on every fix. Fights manual panning, so opt-in only.
    Follow,
}

impl LocationRecenter {
    pub fn label(&self) -> &'static str {
        match self {
            LocationRecenter::Never => "Never",
            LocationRecenter::FirstFix => "First fix",
            LocationRecenter::Follow => "Follow",
        }
    }

    pub fn all() -> &'static [LocationRecenter] {
        &[
            LocationRecenter::Never,
            LocationRecenter::FirstFix,
            LocationRecenter::Follow,
        ]
    }
}

/// An update the synchronizer reacts to.
#[derive(Debug, Clone, Copy)]
pub enum SyncEvent<'a> {
    /// The route set became available. Delivered once per page load.
    RoutesResolved(&'a RouteSet),
    /// A new location sample arrived.
    LocationUpdated(&'a LocationSample),
}

/// Initial center: first point of the first route, or the fallback.
pub fn initial_center(routes: &RouteSet, fallback: Point) -> Point {
    routes.first_point().unwrap_or(fallback)
}

/// Keeps `ViewState` in line with the loaded routes and the live location.
#[derive(Debug, Clone)]
pub struct ViewSynchronizer {
    view: ViewState,
    fallback: Point,
    policy: LocationRecenter,
    route_center: Option<Point>,
    routes_resolved: bool,
    last_location: Option<Point>,
    location_recentered: bool,
    map_ready: bool,
    user_gesture: bool,
    torn_down: bool,
}

impl ViewSynchronizer {
    pub fn new(routes: &RouteSet, fallback: Point, zoom: u8, policy: LocationRecenter) -> Self {
        Self {
            view: ViewState {
                center: initial_center(routes, fallback),
                zoom,
            },
            fallback,
            policy,
            route_center: None,
            routes_resolved: false,
            last_location: None,
            location_recentered: false,
            map_ready: false,
            user_gesture: false,
            torn_down: false,
        }
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn policy(&self) -> LocationRecenter {
        self.policy
    }

    pub fn set_policy(&mut self, policy: LocationRecenter) {
        self.policy = policy;
    }

    /// The map widget exists and can take recenter commands.
    pub fn set_map_ready(&mut self) {
        self.map_ready = true;
    }

    pub fn has_user_gesture(&self) -> bool {
        self.user_gesture
    }

    /// The user panned or zoomed. Automatic recentering pauses.
    pub fn on_user_gesture(&mut self) {
        if !self.user_gesture {
            log::debug!("User moved the map, pausing automatic recentering");
        }
        self.user_gesture = true;
    }

    /// Hands control back and recenters on the preferred target.
    pub fn release_user_gesture(&mut self) -> Option<Point> {
        if self.torn_down {
            return None;
        }
        self.user_gesture = false;
        let target = self.home_center();
        self.recenter(target);
        Some(target)
    }

    /// Stops reacting to events. Anything arriving later is dropped.
    pub fn teardown(&mut self) {
        self.torn_down = true;
    }

    /// Route midpoint, else the live location (when allowed), else the fallback.
    pub fn home_center(&self) -> Point {
        self.route_center
            .or(match self.policy {
                LocationRecenter::Never => None,
                _ => self.last_location,
            })
            .unwrap_or(self.fallback)
    }

    /// Applies one event, returning the new center when the view moved.
    pub fn apply(&mut self, event: SyncEvent<'_>) -> Option<Point> {
        if self.torn_down {
            log::debug!("Ignoring {:?} after teardown", event);
            return None;
        }
        match event {
            SyncEvent::RoutesResolved(routes) => self.on_routes(routes),
            SyncEvent::LocationUpdated(sample) => self.on_location(sample),
        }
    }

    fn on_routes(&mut self, routes: &RouteSet) -> Option<Point> {
        if self.routes_resolved {
            log::warn!("Route set resolved twice, ignoring the second one");
            return None;
        }
        self.routes_resolved = true;
        self.route_center = routes.midpoint();

        let target = self.route_center?;
        if self.user_gesture {
            log::debug!("Routes loaded while user is navigating, not recentering");
            return None;
        }
        log::debug!("Centering on route midpoint {}", target);
        self.recenter(target)
    }

    fn on_location(&mut self, sample: &LocationSample) -> Option<Point> {
        let point = sample.point();
        if !point.is_drawable() {
            log::warn!("Ignoring undrawable location sample {}", point);
            return None;
        }
        self.last_location = Some(point);

        if !self.map_ready || self.user_gesture {
            return None;
        }

        let wanted = match self.policy {
            LocationRecenter::Never => false,
            LocationRecenter::FirstFix => !self.location_recentered && self.route_center.is_none(),
            LocationRecenter::Follow => true,
        };
        if !wanted {
            return None;
        }

        self.location_recentered = true;
        log::debug!("Centering on live location {}", point);
        self.recenter(point)
    }

    /// Replaces the center; zoom stays as it is.
    fn recenter(&mut self, center: Point) -> Option<Point> {
        self.view = ViewState {
            center,
            ..self.view
        };
        Some(center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{decode_track, decode_track_set};
    use chrono::Utc;

    const FALLBACK: Point = Point::new(57.6872946, 11.9974029);

    fn sample(lat: f64, lon: f64) -> LocationSample {
        LocationSample::new(lat, lon, Utc::now())
    }

    fn ready(policy: LocationRecenter) -> ViewSynchronizer {
        let mut sync = ViewSynchronizer::new(&RouteSet::empty(), FALLBACK, 15, policy);
        sync.set_map_ready();
        sync
    }

    #[test]
    fn test_initial_center_fallback_and_first_point() {
        let sync = ViewSynchronizer::new(&RouteSet::empty(), FALLBACK, 15, LocationRecenter::Never);
        assert_eq!(sync.view(), ViewState { center: FALLBACK, zoom: 15 });

        let routes = RouteSet::inline(decode_track("1,1|2,2|3,3"));
        let sync = ViewSynchronizer::new(&routes, FALLBACK, 15, LocationRecenter::Never);
        assert_eq!(sync.view().center, Point::new(1.0, 1.0));
    }

    #[test]
    fn test_routes_center_on_midpoint() {
        let mut sync = ready(LocationRecenter::FirstFix);
        let routes = RouteSet::fetched(decode_track_set(&["0,0|1,1|2,2|3,3", "9,9"]));
        assert_eq!(
            sync.apply(SyncEvent::RoutesResolved(&routes)),
            Some(Point::new(2.0, 2.0))
        );
        assert_eq!(sync.view().zoom, 15);
    }

    #[test]
    fn test_empty_routes_keep_center() {
        let mut sync = ready(LocationRecenter::FirstFix);
        assert_eq!(sync.apply(SyncEvent::RoutesResolved(&RouteSet::empty())), None);
        assert_eq!(sync.view().center, FALLBACK);
    }

    #[test]
    fn test_routes_resolve_only_once() {
        let mut sync = ready(LocationRecenter::Never);
        let first = RouteSet::inline(decode_track("1,1"));
        let second = RouteSet::inline(decode_track("5,5"));
        sync.apply(SyncEvent::RoutesResolved(&first));
        assert_eq!(sync.apply(SyncEvent::RoutesResolved(&second)), None);
        assert_eq!(sync.view().center, Point::new(1.0, 1.0));
    }

    #[test]
    fn test_first_fix_recenters_once() {
        let mut sync = ready(LocationRecenter::FirstFix);
        assert_eq!(
            sync.apply(SyncEvent::LocationUpdated(&sample(10.0, 20.0))),
            Some(Point::new(10.0, 20.0))
        );
        assert_eq!(sync.apply(SyncEvent::LocationUpdated(&sample(11.0, 21.0))), None);
        assert_eq!(sync.view().center, Point::new(10.0, 20.0));
    }

    #[test]
    fn test_first_fix_does_not_steal_from_routes() {
        let mut sync = ready(LocationRecenter::FirstFix);
        let routes = RouteSet::inline(decode_track("1,1|2,2|3,3"));
        sync.apply(SyncEvent::RoutesResolved(&routes));
        assert_eq!(sync.apply(SyncEvent::LocationUpdated(&sample(10.0, 20.0))), None);
        assert_eq!(sync.view().center, Point::new(2.0, 2.0));
    }

    #[test]
    fn test_location_before_routes_then_routes_win() {
        let mut sync = ready(LocationRecenter::FirstFix);
        sync.apply(SyncEvent::LocationUpdated(&sample(10.0, 20.0)));
        let routes = RouteSet::inline(decode_track("1,1|2,2|3,3"));
        assert_eq!(
            sync.apply(SyncEvent::RoutesResolved(&routes)),
            Some(Point::new(2.0, 2.0))
        );
    }

    #[test]
    fn test_follow_recenters_every_tick_without_touching_zoom() {
        let mut sync = ready(LocationRecenter::Follow);
        let routes = RouteSet::inline(decode_track("1,1|2,2"));
        sync.apply(SyncEvent::RoutesResolved(&routes));
        for i in 0..3 {
            let lat = 10.0 + f64::from(i);
            assert_eq!(
                sync.apply(SyncEvent::LocationUpdated(&sample(lat, 20.0))),
                Some(Point::new(lat, 20.0))
            );
        }
        assert_eq!(sync.view().zoom, 15);
    }

    #[test]
    fn test_never_policy_ignores_location() {
        let mut sync = ready(LocationRecenter::Never);
        assert_eq!(sync.apply(SyncEvent::LocationUpdated(&sample(10.0, 20.0))), None);
        assert_eq!(sync.home_center(), FALLBACK);
    }

    #[test]
    fn test_location_waits_for_map() {
        let mut sync =
            ViewSynchronizer::new(&RouteSet::empty(), FALLBACK, 15, LocationRecenter::FirstFix);
        assert_eq!(sync.apply(SyncEvent::LocationUpdated(&sample(10.0, 20.0))), None);
        sync.set_map_ready();
        assert_eq!(
            sync.apply(SyncEvent::LocationUpdated(&sample(10.5, 20.5))),
            Some(Point::new(10.5, 20.5))
        );
    }

    #[test]
    fn test_user_gesture_suppresses_recentering() {
        let mut sync = ready(LocationRecenter::Follow);
        sync.on_user_gesture();
        assert_eq!(sync.apply(SyncEvent::LocationUpdated(&sample(10.0, 20.0))), None);
        assert_eq!(sync.view().center, FALLBACK);

        assert_eq!(sync.release_user_gesture(), Some(Point::new(10.0, 20.0)));
        assert_eq!(
            sync.apply(SyncEvent::LocationUpdated(&sample(11.0, 20.0))),
            Some(Point::new(11.0, 20.0))
        );
    }

    #[test]
    fn test_events_after_teardown_are_ignored() {
        let mut sync = ready(LocationRecenter::Follow);
        sync.teardown();
        let routes = RouteSet::inline(decode_track("1,1"));
        assert_eq!(sync.apply(SyncEvent::RoutesResolved(&routes)), None);
        assert_eq!(sync.apply(SyncEvent::LocationUpdated(&sample(10.0, 20.0))), None);
        assert_eq!(sync.release_user_gesture(), None);
        assert_eq!(sync.view().center, FALLBACK);
    }

    #[test]
    fn test_nan_location_rejected() {
        let mut sync = ready(LocationRecenter::Follow);
        assert_eq!(sync.apply(SyncEvent::LocationUpdated(&sample(f64::NAN, 1.0))), None);
        assert_eq!(sync.view().center, FALLBACK);
    }
}
