//! The set of routes loaded for this page.
//!
//! A route set is built once per page load and never edited afterwards.
//! Construction applies the point policy: points that cannot be drawn
//! (NaN, infinite, out of range) are dropped, and tracks left empty are
//! dropped with them.

use super::codec::{Point, Track};

/// Routes currently loaded, plus how they were supplied.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSet {
    tracks: Vec<Track>,
    /// One route from the `q` parameter (drawn with waypoint markers),
    /// as opposed to routes fetched by `id`.
    is_single_inline_route: bool,
    dropped_points: usize,
}

impl Default for RouteSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl RouteSet {
    /// No routes. Counts as the inline mode, matching a page with no query.
    pub fn empty() -> Self {
        Self {
            tracks: Vec::new(),
            is_single_inline_route: true,
            dropped_points: 0,
        }
    }

    /// A single route supplied inline.
    pub fn inline(track: Track) -> Self {
        Self::build(vec![track], true)
    }

    /// Routes returned by the remote endpoint.
    pub fn fetched(tracks: Vec<Track>) -> Self {
        Self::build(tracks, false)
    }

    fn build(tracks: Vec<Track>, is_single_inline_route: bool) -> Self {
        let mut dropped_points = 0;
        let tracks = tracks
            .into_iter()
            .enumerate()
            .filter_map(|(index, track)| {
                let (kept, dropped) = sanitize(track);
                if dropped > 0 {
                    log::warn!(
                        "Dropped {} undrawable point(s) from track {}",
                        dropped,
                        index
                    );
                    dropped_points += dropped;
                }
                if kept.is_empty() {
                    log::warn!("Track {} has no drawable points, skipping", index);
                    None
                } else {
                    Some(kept)
                }
            })
            .collect();

        Self {
            tracks,
            is_single_inline_route,
            dropped_points,
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn is_single_inline_route(&self) -> bool {
        self.is_single_inline_route
    }

    /// Number of points removed by the point policy.
    pub fn dropped_points(&self) -> usize {
        self.dropped_points
    }

    /// First point of the first track.
    pub fn first_point(&self) -> Option<Point> {
        self.tracks.first().and_then(Track::first)
    }

    /// Midpoint element of the first track.
    pub fn midpoint(&self) -> Option<Point> {
        self.tracks.first().and_then(Track::midpoint)
    }
}

/// Removes undrawable points, returning the kept track and the drop count.
pub fn sanitize(track: Track) -> (Track, usize) {
    let total = track.len();
    let kept: Vec<Point> = track.0.into_iter().filter(Point::is_drawable).collect();
    let dropped = total - kept.len();
    (Track::new(kept), dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::codec::{decode_track, decode_track_set};

    #[test]
    fn test_nan_points_filtered() {
        let routes = RouteSet::inline(decode_track("1.0,bad|3,4"));
        assert_eq!(routes.tracks().len(), 1);
        assert_eq!(routes.tracks()[0].points(), &[Point::new(3.0, 4.0)]);
        assert_eq!(routes.dropped_points(), 1);
        assert!(routes
            .tracks()
            .iter()
            .flat_map(|t| t.points())
            .all(Point::is_finite));
    }

    #[test]
    fn test_fully_invalid_track_dropped() {
        let routes = RouteSet::fetched(decode_track_set(&["x,y", "1,2|3,4"]));
        assert_eq!(routes.tracks().len(), 1);
        assert!(!routes.is_single_inline_route());
        assert_eq!(routes.first_point(), Some(Point::new(1.0, 2.0)));
    }

    #[test]
    fn test_empty_defaults_to_inline_mode() {
        let routes = RouteSet::empty();
        assert!(routes.is_empty());
        assert!(routes.is_single_inline_route());
        assert_eq!(routes.midpoint(), None);
    }

    #[test]
    fn test_out_of_range_dropped() {
        let (kept, dropped) = sanitize(decode_track("95,0|10,10|0,200"));
        assert_eq!(kept.points(), &[Point::new(10.0, 10.0)]);
        assert_eq!(dropped, 2);
    }

    #[test]
    fn test_midpoint_of_first_track() {
        let routes = RouteSet::fetched(decode_track_set(&["0,0|1,1|2,2", "9,9"]));
        assert_eq!(routes.midpoint(), Some(Point::new(1.0, 1.0)));
    }
}
