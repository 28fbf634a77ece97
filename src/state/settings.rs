//! Viewer settings.
//!
//! Settings are persisted to localStorage in the browser so they survive
//! page reloads. Native builds read an optional JSON file named by
//! `TRACKVIEW_CONFIG`.

use crate::track::Point;
use crate::view::LocationRecenter;
use serde::{Deserialize, Serialize};

/// Endpoint, fallback view, and polling configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the remote track endpoint; `?id=<id>` is appended.
    pub track_endpoint: String,
    /// Map center when there is nothing else to look at.
    pub fallback_center: Point,
    /// Slippy-map zoom level.
    pub zoom: u8,
    /// Location polling interval in milliseconds.
    pub poll_interval_ms: u32,
    /// When location samples may move the map.
    pub location_recenter: LocationRecenter,
    /// Per-request geolocation timeout in milliseconds.
    pub geolocation_timeout_ms: u32,
    /// Fixed position reported natively, where there is no geolocation.
    pub fixed_location: Option<Point>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            track_endpoint: "/api/tracks".to_string(),
            // Gothenburg
            fallback_center: Point::new(57.6872946, 11.9974029),
            zoom: 15,
            poll_interval_ms: 5000,
            location_recenter: LocationRecenter::default(),
            geolocation_timeout_ms: 10_000,
            fixed_location: None,
        }
    }
}

impl Settings {
    /// localStorage key for persisting settings.
    const STORAGE_KEY: &'static str = "trackview_settings";

    /// Environment variable naming the native settings file.
    pub const CONFIG_ENV: &'static str = "TRACKVIEW_CONFIG";

    /// Parses settings JSON, falling back to defaults on error.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Settings>(json) {
            Ok(settings) => settings.sanitized(),
            Err(e) => {
                log::warn!("Failed to parse settings: {}", e);
                Self::default()
            }
        }
    }

    /// Replaces unusable values with defaults.
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !self.fallback_center.is_drawable() {
            log::warn!("Invalid fallback center {}, using default", self.fallback_center);
            self.fallback_center = defaults.fallback_center;
        }
        if self.poll_interval_ms == 0 {
            log::warn!("Poll interval of 0 ms is not allowed, using default");
            self.poll_interval_ms = defaults.poll_interval_ms;
        }
        if self.fixed_location.is_some_and(|p| !p.is_drawable()) {
            self.fixed_location = None;
        }
        self.zoom = self.zoom.min(22);
        self
    }

    /// Load settings from localStorage.
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = match web_sys::window().map(|w| w.local_storage()) {
            Some(Ok(Some(s))) => s,
            _ => return Self::default(),
        };

        match storage.get_item(Self::STORAGE_KEY) {
            Ok(Some(json)) => {
                log::info!("Loaded settings from localStorage");
                Self::from_json(&json)
            }
            _ => Self::default(),
        }
    }

    /// Load settings from the file named by `TRACKVIEW_CONFIG`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(Self::CONFIG_ENV) else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(json) => {
                log::info!("Loaded settings from {}", path);
                Self::from_json(&json)
            }
            Err(e) => {
                log::warn!("Failed to read settings file {}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Save settings to localStorage.
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = match web_sys::window().map(|w| w.local_storage()) {
            Some(Ok(Some(s))) => s,
            _ => return,
        };

        let json = match serde_json::to_string(self) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("Failed to serialize settings: {}", e);
                return;
            }
        };

        if let Err(e) = storage.set_item(Self::STORAGE_KEY, &json) {
            log::warn!("Failed to save settings: {:?}", e);
        } else {
            log::info!("Saved settings to localStorage");
        }
    }

    /// No-op for native builds.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(
            r#"{"track_endpoint":"https://example.com/t","location_recenter":"follow"}"#,
        );
        assert_eq!(settings.track_endpoint, "https://example.com/t");
        assert_eq!(settings.location_recenter, LocationRecenter::Follow);
        assert_eq!(settings.poll_interval_ms, 5000);
        assert_eq!(settings.zoom, 15);
    }

    #[test]
    fn test_malformed_json_gives_defaults() {
        assert_eq!(Settings::from_json("not json"), Settings::default());
    }

    #[test]
    fn test_invalid_values_replaced() {
        let settings = Settings::from_json(
            r#"{"poll_interval_ms":0,"zoom":40,"fallback_center":{"lat":120.0,"lon":0.0}}"#,
        );
        assert_eq!(settings.poll_interval_ms, 5000);
        assert_eq!(settings.zoom, 22);
        assert_eq!(settings.fallback_center, Settings::default().fallback_center);
    }

    #[test]
    fn test_round_trips_through_json() {
        let settings = Settings {
            fixed_location: Some(Point::new(1.0, 2.0)),
            location_recenter: LocationRecenter::Never,
            ..Settings::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(Settings::from_json(&json), settings);
    }
}
