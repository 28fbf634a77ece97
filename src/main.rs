#![warn(clippy::all)]

//! Track Viewer - a web-based route viewer with live location tracking.
//!
//! Routes come from the page URL: either inline in `q` or fetched from the
//! track endpoint by `id`. The user's position is polled on an interval and
//! drawn on top, and the map view follows whichever of the two applies.

mod error;
mod location;
mod source;
mod state;
mod track;
mod ui;
mod view;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use eframe::egui;
use error::SensorError;
use location::{
    ErrorCallback, IntervalScheduler, LocationPoller, LocationSample, LocationSensor, PollHandle,
    SampleCallback,
};
use source::{HttpTrackEndpoint, TrackSourceResolver};
use state::{AppState, Settings};

#[cfg(not(target_arch = "wasm32"))]
use location::{FixedLocationSensor, FrameScheduler};

#[cfg(target_arch = "wasm32")]
use location::{BrowserGeolocation, BrowserInterval};

// Native entry point
#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    env_logger::init();

    let native_options = eframe::NativeOptions::default();

    eframe::run_native(
        "Track Viewer",
        native_options,
        Box::new(|cc| Ok(Box::new(TrackViewApp::new(cc)))),
    )
}

// WASM entry point - main is not called on wasm32
#[cfg(target_arch = "wasm32")]
fn main() {}

/// Entry point for the WASM application.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub async fn start() {
    use eframe::wasm_bindgen::JsCast as _;

    // Redirect `log` messages to `console.log`:
    eframe::WebLogger::init(log::LevelFilter::Debug).ok();

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document to attach to");
            return;
        };

        let canvas = match document
            .get_element_by_id("app_canvas")
            .map(|e| e.dyn_into::<web_sys::HtmlCanvasElement>())
        {
            Some(Ok(canvas)) => canvas,
            _ => {
                log::error!("app_canvas missing or not a HtmlCanvasElement");
                return;
            }
        };

        let start_result = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| Ok(Box::new(TrackViewApp::new(cc)))),
            )
            .await;

        // Remove the loading text once the app has loaded:
        if let Some(loading_text) = document.get_element_by_id("loading_text") {
            match start_result {
                Ok(_) => {
                    loading_text.remove();
                }
                Err(e) => {
                    loading_text.set_inner_html(
                        "<p>The app has crashed. See the developer console for details.</p>",
                    );
                    log::error!("Failed to start eframe: {e:?}");
                }
            }
        }
    });
}

/// Location results delivered by the poller, drained once per frame.
type LocationInbox = Rc<RefCell<Vec<Result<LocationSample, SensorError>>>>;

/// Main application state and logic.
pub struct TrackViewApp {
    /// Application state containing all sub-states
    state: AppState,

    /// Resolves the route set from the page URL, once
    resolver: TrackSourceResolver,

    /// Simulated interval clock, pumped from `update`
    #[cfg(not(target_arch = "wasm32"))]
    frame_scheduler: Rc<FrameScheduler>,

    /// Monotonic start time the frame scheduler is measured from
    #[cfg(not(target_arch = "wasm32"))]
    started: web_time::Instant,

    /// Keeps the browser interval registry alive while polling runs
    #[cfg(target_arch = "wasm32")]
    _browser_interval: Rc<BrowserInterval>,

    /// Active location polling; cancelled on exit
    poll_handle: Option<PollHandle>,

    /// Poller output waiting to be applied to state
    location_inbox: LocationInbox,
}

impl TrackViewApp {
    /// Creates a new TrackViewApp instance.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = Settings::load();
        log::info!(
            "Track endpoint {}, polling every {} ms",
            settings.track_endpoint,
            settings.poll_interval_ms
        );

        let mut state = AppState::new(settings.clone());

        // Routes come from the page URL (q inline, or id fetched)
        let params = source::query::parse_from_url();
        let endpoint = HttpTrackEndpoint::new(settings.track_endpoint.clone());
        let mut resolver = TrackSourceResolver::new();
        if let Some(routes) = resolver.resolve(&params, &endpoint, Some(cc.egui_ctx.clone())) {
            state.set_routes(routes);
        }
        log::debug!("Route source: {:?}", resolver.source());

        #[cfg(not(target_arch = "wasm32"))]
        let frame_scheduler = Rc::new(FrameScheduler::new());
        #[cfg(not(target_arch = "wasm32"))]
        let (scheduler, sensor): (Rc<dyn IntervalScheduler>, Rc<dyn LocationSensor>) = (
            frame_scheduler.clone(),
            Rc::new(FixedLocationSensor::new(settings.fixed_location)),
        );

        #[cfg(target_arch = "wasm32")]
        let browser_interval = Rc::new(BrowserInterval::new());
        #[cfg(target_arch = "wasm32")]
        let (scheduler, sensor): (Rc<dyn IntervalScheduler>, Rc<dyn LocationSensor>) = (
            browser_interval.clone(),
            Rc::new(BrowserGeolocation::new(settings.geolocation_timeout_ms)),
        );

        let location_inbox: LocationInbox = Rc::new(RefCell::new(Vec::new()));
        let on_sample: SampleCallback = {
            let inbox = location_inbox.clone();
            let ctx = cc.egui_ctx.clone();
            Rc::new(move |sample| {
                inbox.borrow_mut().push(Ok(sample));
                ctx.request_repaint();
            })
        };
        let on_error: ErrorCallback = {
            let inbox = location_inbox.clone();
            let ctx = cc.egui_ctx.clone();
            Rc::new(move |error| {
                inbox.borrow_mut().push(Err(error));
                ctx.request_repaint();
            })
        };

        let poll_handle = LocationPoller::start(
            scheduler,
            sensor,
            Duration::from_millis(u64::from(settings.poll_interval_ms)),
            on_sample,
            on_error,
        );

        Self {
            state,
            resolver,
            #[cfg(not(target_arch = "wasm32"))]
            frame_scheduler,
            #[cfg(not(target_arch = "wasm32"))]
            started: web_time::Instant::now(),
            #[cfg(target_arch = "wasm32")]
            _browser_interval: browser_interval,
            poll_handle: Some(poll_handle),
            location_inbox,
        }
    }

    /// Fires interval ticks that are due and schedules the next repaint.
    #[cfg(not(target_arch = "wasm32"))]
    fn pump_scheduler(&mut self, ctx: &egui::Context) {
        self.frame_scheduler.advance_to(self.started.elapsed());
        if let Some(wait) = self.frame_scheduler.time_until_next() {
            ctx.request_repaint_after(wait);
        }
    }

    /// The browser fires intervals on its own.
    #[cfg(target_arch = "wasm32")]
    fn pump_scheduler(&mut self, _ctx: &egui::Context) {}

    /// Applies queued location results in arrival order.
    fn drain_location_inbox(&mut self) {
        let results: Vec<_> = self.location_inbox.borrow_mut().drain(..).collect();
        for result in results {
            match result {
                Ok(sample) => {
                    if let Some(center) = self.state.set_location(sample) {
                        log::debug!("Recentered on location {}", center);
                    }
                }
                Err(e) => {
                    log::warn!("Location unavailable: {}", e);
                    self.state.set_sensor_error(e);
                }
            }
        }
    }

    fn stop(&mut self) {
        if let Some(handle) = self.poll_handle.take() {
            handle.cancel();
        }
        self.state.view.teardown();
    }
}

impl eframe::App for TrackViewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.pump_scheduler(ctx);
        self.drain_location_inbox();

        // Check for a completed track fetch
        if let Some(routes) = self.resolver.try_recv() {
            if let Some(center) = self.state.set_routes(routes) {
                log::debug!("Recentered on route midpoint {}", center);
            }
        }

        // Render UI panels
        ui::render_top_bar(ctx, &mut self.state);
        ui::render_canvas(ctx, &mut self.state);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.stop();
    }
}
