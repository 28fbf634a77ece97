//! Render plan handed to the map widget.
//!
//! This is the last stop before drawing. Every point in a plan is
//! drawable; nothing non-finite crosses this boundary.

use crate::location::LocationSample;
use crate::track::{color_for, Point, RouteSet};
use crate::ui::colors;
use eframe::egui::Color32;

/// A connected path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSpec {
    pub points: Vec<Point>,
    pub color: Color32,
}

/// A per-point marker on an inline route, with its deep link.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    pub point: Point,
    pub navigate_url: String,
}

/// Everything the map widget needs for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderPlan {
    pub paths: Vec<PathSpec>,
    pub waypoints: Vec<Waypoint>,
    pub user_marker: Option<Point>,
}

impl RenderPlan {
    /// Builds the plan for the current routes and latest location.
    pub fn build(routes: &RouteSet, location: Option<&LocationSample>) -> Self {
        let mut plan = Self::default();

        for track in routes.tracks() {
            let points: Vec<Point> = track
                .points()
                .iter()
                .copied()
                .filter(Point::is_drawable)
                .collect();

            if routes.is_single_inline_route() {
                plan.waypoints.extend(points.iter().map(|&point| Waypoint {
                    point,
                    navigate_url: navigate_url(point),
                }));
            }

            if points.len() > 1 {
                let color = if routes.is_single_inline_route() {
                    colors::route::INLINE_PATH
                } else {
                    color_for(track)
                };
                plan.paths.push(PathSpec { points, color });
            }
        }

        plan.user_marker = location.map(LocationSample::point).filter(Point::is_drawable);
        plan
    }

    /// Every point in the plan, for boundary checks.
    pub fn all_points(&self) -> impl Iterator<Item = Point> + '_ {
        self.paths
            .iter()
            .flat_map(|p| p.points.iter().copied())
            .chain(self.waypoints.iter().map(|w| w.point))
            .chain(self.user_marker)
    }
}

/// Directions link to a point on an external mapping service.
pub fn navigate_url(point: Point) -> String {
    format!(
        "https://www.google.com/maps/dir/?api=1&destination={},{}",
        point.lat, point.lon
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{color::PALETTE, decode_track, decode_track_set};
    use chrono::Utc;

    #[test]
    fn test_inline_route_has_waypoints_and_path() {
        let routes = RouteSet::inline(decode_track("1,2|3,4|5,6"));
        let plan = RenderPlan::build(&routes, None);
        assert_eq!(plan.paths.len(), 1);
        assert_eq!(plan.paths[0].color, colors::route::INLINE_PATH);
        assert_eq!(plan.waypoints.len(), 3);
        assert_eq!(
            plan.waypoints[0].navigate_url,
            "https://www.google.com/maps/dir/?api=1&destination=1,2"
        );
    }

    #[test]
    fn test_single_point_inline_route_has_no_path() {
        let routes = RouteSet::inline(decode_track("1,2"));
        let plan = RenderPlan::build(&routes, None);
        assert!(plan.paths.is_empty());
        assert_eq!(plan.waypoints.len(), 1);
    }

    #[test]
    fn test_fetched_routes_are_colored_without_waypoints() {
        let routes = RouteSet::fetched(decode_track_set(&["1,2|3,4", "5,6|7,8"]));
        let plan = RenderPlan::build(&routes, None);
        assert_eq!(plan.paths.len(), 2);
        assert!(plan.waypoints.is_empty());
        for (path, track) in plan.paths.iter().zip(routes.tracks()) {
            assert_eq!(path.color, color_for(track));
            assert!(PALETTE.contains(&path.color));
        }
    }

    #[test]
    fn test_no_nan_reaches_the_map() {
        let routes = RouteSet::inline(decode_track("1.0,bad|2,2|nan,3|4,4"));
        let location = LocationSample::new(f64::NAN, 0.0, Utc::now());
        let plan = RenderPlan::build(&routes, Some(&location));
        assert_eq!(plan.user_marker, None);
        assert_eq!(plan.all_points().count(), 4);
        assert!(plan.all_points().all(|p| p.is_finite()));
    }

    #[test]
    fn test_user_marker_does_not_disturb_paths() {
        let routes = RouteSet::fetched(decode_track_set(&["1,2|3,4"]));
        let before = RenderPlan::build(&routes, None);
        let location = LocationSample::new(10.0, 20.0, Utc::now());
        let after = RenderPlan::build(&routes, Some(&location));
        assert_eq!(before.paths, after.paths);
        assert_eq!(after.user_marker, Some(Point::new(10.0, 20.0)));
    }
}
