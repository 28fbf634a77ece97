//! Coordinate codec for the inline route format.
//!
//! A track is encoded as `lat,lon|lat,lon|...`. Decoding never fails:
//! a malformed token yields a point with NaN fields, which the route set
//! filters out before anything is drawn.

use geo_types::Coord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between point tokens.
pub const POINT_SEPARATOR: char = '|';

/// Separator between latitude and longitude inside a token.
pub const FIELD_SEPARATOR: char = ',';

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

impl Point {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Both fields are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// Finite and within the valid latitude/longitude ranges.
    pub fn is_drawable(&self) -> bool {
        self.is_finite() && self.lat.abs() <= 90.0 && self.lon.abs() <= 180.0
    }

    /// Converts to a `geo_types` coordinate (x = lon, y = lat).
    pub fn to_coord(self) -> Coord<f64> {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.lat, FIELD_SEPARATOR, self.lon)
    }
}

/// An ordered path of points. Order defines the drawn direction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track(pub Vec<Point>);

impl Track {
    pub fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    pub fn points(&self) -> &[Point] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<Point> {
        self.0.first().copied()
    }

    /// The element at `len / 2`, used to frame a route rather than anchor it.
    pub fn midpoint(&self) -> Option<Point> {
        self.0.get(self.0.len() / 2).copied()
    }
}

impl From<Vec<Point>> for Track {
    fn from(points: Vec<Point>) -> Self {
        Self(points)
    }
}

/// Parses one coordinate field; anything unparseable becomes NaN.
fn parse_field(field: Option<&str>) -> f64 {
    field
        .and_then(|s| s.trim().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

fn decode_point(token: &str) -> Point {
    let mut fields = token.split(FIELD_SEPARATOR);
    let lat = parse_field(fields.next());
    let lon = parse_field(fields.next());
    Point::new(lat, lon)
}

/// Decodes a `lat,lon|lat,lon` string into a track.
///
/// An empty string yields an empty track. Tokens missing a comma or with
/// non-numeric fields produce NaN fields rather than an error.
pub fn decode_track(raw: &str) -> Track {
    if raw.is_empty() {
        return Track::default();
    }
    raw.split(POINT_SEPARATOR).map(decode_point).collect::<Vec<_>>().into()
}

/// Decodes each raw string, preserving order.
pub fn decode_track_set<S: AsRef<str>>(raw: &[S]) -> Vec<Track> {
    raw.iter().map(|r| decode_track(r.as_ref())).collect()
}

/// Encodes a track into the inline query form.
pub fn encode_track(track: &Track) -> String {
    let mut out = String::new();
    for (i, point) in track.points().iter().enumerate() {
        if i > 0 {
            out.push(POINT_SEPARATOR);
        }
        out.push_str(&point.to_string());
    }
    out
}

pub fn encode_track_set(tracks: &[Track]) -> Vec<String> {
    tracks.iter().map(encode_track).collect()
}
