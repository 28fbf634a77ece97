//! Device location sensor boundary.

use crate::error::SensorError;
use crate::track::Point;
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::rc::Rc;

/// One reading from the location sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationSample {
    pub lat: f64,
    pub lon: f64,
    pub observed_at: DateTime<Utc>,
}

impl LocationSample {
    pub fn new(lat: f64, lon: f64, observed_at: DateTime<Utc>) -> Self {
        Self {
            lat,
            lon,
            observed_at,
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.lat, self.lon)
    }
}

/// Completion callback for a single location request.
pub type SampleReply = Box<dyn FnOnce(Result<LocationSample, SensorError>)>;

/// Asynchronous one-shot location source.
///
/// Each call is independent. The reply may arrive at any later time, or
/// synchronously from within `request`.
pub trait LocationSensor {
    fn request(&self, reply: SampleReply);
}

/// Sensor for platforms without geolocation: a configured fixed position,
/// or `Unsupported` when none is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocationSensor {
    position: Option<Point>,
}

impl FixedLocationSensor {
    pub fn new(position: Option<Point>) -> Self {
        Self { position }
    }
}

impl LocationSensor for FixedLocationSensor {
    fn request(&self, reply: SampleReply) {
        match self.position {
            Some(p) => reply(Ok(LocationSample::new(p.lat, p.lon, Utc::now()))),
            None => reply(Err(SensorError::Unsupported)),
        }
    }
}

/// Reply slot shared by the callbacks of one request. Whichever fires first
/// takes the reply; the other finds it empty.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
type ReplySlot = Rc<RefCell<Option<SampleReply>>>;

/// Hands `result` to the slot's reply, at most once per slot.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn deliver(slot: &ReplySlot, result: Result<LocationSample, SensorError>) {
    let reply = slot.borrow_mut().take();
    if let Some(reply) = reply {
        reply(result);
    }
}

/// Requests still waiting on the platform, each with the callbacks that
/// must outlive the call that issued it.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
struct PendingRequests<K> {
    entries: RefCell<Vec<(ReplySlot, K)>>,
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
impl<K> PendingRequests<K> {
    fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
        }
    }

    fn push(&self, slot: ReplySlot, keep_alive: K) {
        self.entries.borrow_mut().push((slot, keep_alive));
    }

    /// Drops the callbacks of every request that has already replied.
    ///
    /// Never called from inside a callback, so nothing is freed while it runs.
    fn purge_finished(&self) {
        self.entries
            .borrow_mut()
            .retain(|(slot, _)| slot.borrow().is_some());
    }

    fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}

#[cfg(target_arch = "wasm32")]
type GeolocationCallbacks = (
    wasm_bindgen::closure::Closure<dyn FnMut(wasm_bindgen::JsValue)>,
    wasm_bindgen::closure::Closure<dyn FnMut(wasm_bindgen::JsValue)>,
);

/// `navigator.geolocation` sensor.
#[cfg(target_arch = "wasm32")]
pub struct BrowserGeolocation {
    timeout_ms: u32,
    pending: PendingRequests<GeolocationCallbacks>,
}

#[cfg(target_arch = "wasm32")]
impl BrowserGeolocation {
    pub fn new(timeout_ms: u32) -> Self {
        Self {
            timeout_ms,
            pending: PendingRequests::new(),
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl LocationSensor for BrowserGeolocation {
    fn request(&self, reply: SampleReply) {
        use wasm_bindgen::closure::Closure;
        use wasm_bindgen::{JsCast, JsValue};

        self.pending.purge_finished();

        let geolocation = match web_sys::window().map(|w| w.navigator().geolocation()) {
            Some(Ok(g)) => g,
            _ => {
                reply(Err(SensorError::Unsupported));
                return;
            }
        };

        // Exactly one of the two callbacks fires; both share the reply.
        let slot: ReplySlot = Rc::new(RefCell::new(Some(reply)));

        let success_slot = slot.clone();
        let on_success: Closure<dyn FnMut(JsValue)> = Closure::once(move |position: JsValue| {
            let position: web_sys::Position = position.unchecked_into();
            let coords = position.coords();
            let observed_at = DateTime::from_timestamp_millis(position.timestamp() as i64)
                .unwrap_or_else(Utc::now);
            deliver(
                &success_slot,
                Ok(LocationSample::new(
                    coords.latitude(),
                    coords.longitude(),
                    observed_at,
                )),
            );
        });

        let error_slot = slot.clone();
        let on_error: Closure<dyn FnMut(JsValue)> = Closure::once(move |error: JsValue| {
            let error: web_sys::PositionError = error.unchecked_into();
            deliver(
                &error_slot,
                Err(SensorError::from_code(error.code(), error.message())),
            );
        });

        let options = web_sys::PositionOptions::new();
        options.set_timeout(self.timeout_ms);
        options.set_enable_high_accuracy(true);

        match geolocation.get_current_position_with_error_callback_and_options(
            on_success.as_ref().unchecked_ref(),
            Some(on_error.as_ref().unchecked_ref()),
            &options,
        ) {
            Ok(()) => self.pending.push(slot, (on_success, on_error)),
            Err(e) => {
                let message = e
                    .dyn_ref::<js_sys::Error>()
                    .map(|err| String::from(err.message()))
                    .unwrap_or_else(|| format!("{:?}", e));
                log::error!("getCurrentPosition failed: {}", message);
                deliver(&slot, Err(SensorError::PositionUnavailable(message)));
            }
        }
    }
}
