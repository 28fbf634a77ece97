//! Live device location.
//!
//! - `sensor`: the one-shot location source (browser geolocation or a fixed position)
//! - `timer`: interval scheduling (`setInterval` or a frame-pumped clock)
//! - `poller`: fixed-interval polling with cancellation

mod poller;
mod sensor;
mod timer;

pub use poller::{ErrorCallback, LocationPoller, PollHandle, SampleCallback};
pub use sensor::{FixedLocationSensor, LocationSample, LocationSensor, SampleReply};
pub use timer::{FrameScheduler, IntervalId, IntervalScheduler};

#[cfg(target_arch = "wasm32")]
pub use sensor::BrowserGeolocation;
#[cfg(target_arch = "wasm32")]
pub use timer::BrowserInterval;
