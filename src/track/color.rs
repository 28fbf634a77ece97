//! Content-derived route colors.
//!
//! The color of a fetched route depends only on its points, so reloading
//! the same route set paints every route the same way.

use super::codec::{encode_track, Track};
use eframe::egui::Color32;

/// Route palette, in lookup order.
pub const PALETTE: [Color32; 8] = [
    Color32::from_rgb(230, 25, 75),   // red
    Color32::from_rgb(60, 180, 75),   // green
    Color32::from_rgb(0, 130, 200),   // blue
    Color32::from_rgb(245, 130, 48),  // orange
    Color32::from_rgb(145, 30, 180),  // purple
    Color32::from_rgb(70, 240, 240),  // cyan
    Color32::from_rgb(240, 50, 230),  // magenta
    Color32::from_rgb(128, 128, 0),   // olive
];

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a over the canonical encoding of the track.
pub fn track_hash(track: &Track) -> u64 {
    encode_track(track)
        .bytes()
        .fold(FNV_OFFSET, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
        })
}

/// Palette color for a track. Collisions between different tracks are fine.
pub fn color_for(track: &Track) -> Color32 {
    let index = (track_hash(track) % PALETTE.len() as u64) as usize;
    PALETTE[index]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::codec::decode_track;

    #[test]
    fn test_color_is_content_derived() {
        let a = decode_track("1,2|3,4");
        let b = decode_track("1.0,2.0|3.0,4.0");
        assert_eq!(a, b);
        assert_eq!(color_for(&a), color_for(&b));
    }

    #[test]
    fn test_color_is_reproducible() {
        let track = decode_track("57.6872946,11.9974029|57.7,12.0");
        assert_eq!(track_hash(&track), track_hash(&track.clone()));
        let colors: Vec<Color32> = (0..20)
            .map(|i| color_for(&decode_track(&format!("{i},0|0,{i}"))))
            .collect();
        let again: Vec<Color32> = (0..20)
            .map(|i| color_for(&decode_track(&format!("{i},0|0,{i}"))))
            .collect();
        assert_eq!(colors, again);
        assert!(colors.iter().all(|c| PALETTE.contains(c)));
    }

    #[test]
    fn test_known_hash_of_empty_track() {
        assert_eq!(track_hash(&Track::default()), FNV_OFFSET);
    }

    #[test]
    fn test_palette_entries_are_distinct() {
        for (i, a) in PALETTE.iter().enumerate() {
            for b in &PALETTE[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
