//! Route model: coordinate codec, route set, and route colors.

pub mod codec;
pub mod color;
pub mod route_set;

pub use codec::{decode_track, decode_track_set, encode_track, encode_track_set, Point, Track};
pub use color::color_for;
pub use route_set::RouteSet;
