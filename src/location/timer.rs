//! Interval scheduling for the location poller.
//!
//! In the browser, intervals are backed by `setInterval`. Natively (and in
//! tests) the `FrameScheduler` is pumped from the update loop with the
//! elapsed time, which makes it a deterministic simulated clock as well.

use std::cell::{Cell, RefCell};
use std::time::Duration;

/// Identifies a registered interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntervalId(pub i32);

/// A source of periodic callbacks.
///
/// Not `Send`: everything runs on the single UI thread.
pub trait IntervalScheduler {
    /// Calls `tick` every `period` until cleared. The first call happens one
    /// period after registration.
    fn set_interval(&self, period: Duration, tick: Box<dyn FnMut()>) -> Option<IntervalId>;

    /// Stops an interval. Unknown ids are ignored.
    fn clear_interval(&self, id: IntervalId);
}

struct ScheduledTick {
    id: IntervalId,
    period: Duration,
    next_due: Duration,
    /// Taken out while the callback runs so it may re-enter the scheduler.
    tick: Option<Box<dyn FnMut()>>,
}

/// Interval scheduler driven by explicit time updates.
#[derive(Default)]
pub struct FrameScheduler {
    now: Cell<Duration>,
    next_id: Cell<i32>,
    entries: RefCell<Vec<ScheduledTick>>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current scheduler time.
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Number of live intervals.
    pub fn active_intervals(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Time until the next interval fires, if any are registered.
    pub fn time_until_next(&self) -> Option<Duration> {
        let now = self.now.get();
        self.entries
            .borrow()
            .iter()
            .map(|e| e.next_due.saturating_sub(now))
            .min()
    }

    /// Advances the clock, firing every tick that falls due in order.
    ///
    /// Going backwards is ignored.
    pub fn advance_to(&self, now: Duration) {
        if now < self.now.get() {
            return;
        }
        self.now.set(now);

        loop {
            let due = {
                let mut entries = self.entries.borrow_mut();
                entries
                    .iter_mut()
                    .filter(|e| e.next_due <= now && e.tick.is_some())
                    .min_by_key(|e| e.next_due)
                    .map(|e| {
                        e.next_due += e.period;
                        (e.id, e.tick.take())
                    })
            };

            let Some((id, Some(mut tick))) = due else {
                break;
            };

            tick();

            // Put the callback back unless it cleared itself meanwhile.
            if let Some(entry) = self.entries.borrow_mut().iter_mut().find(|e| e.id == id) {
                entry.tick = Some(tick);
            }
        }
    }
}

impl IntervalScheduler for FrameScheduler {
    fn set_interval(&self, period: Duration, tick: Box<dyn FnMut()>) -> Option<IntervalId> {
        // A zero period would fire forever within one advance.
        let period = period.max(Duration::from_millis(1));
        let id = IntervalId(self.next_id.get());
        self.next_id.set(id.0.wrapping_add(1));
        self.entries.borrow_mut().push(ScheduledTick {
            id,
            period,
            next_due: self.now.get() + period,
            tick: Some(tick),
        });
        Some(id)
    }

    fn clear_interval(&self, id: IntervalId) {
        self.entries.borrow_mut().retain(|e| e.id != id);
    }
}

/// `setInterval`-backed scheduler for the browser.
#[cfg(target_arch = "wasm32")]
#[derive(Default)]
pub struct BrowserInterval {
    closures: RefCell<
        std::collections::HashMap<i32, wasm_bindgen::closure::Closure<dyn FnMut()>>,
    >,
}

#[cfg(target_arch = "wasm32")]
impl BrowserInterval {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(target_arch = "wasm32")]
impl IntervalScheduler for BrowserInterval {
    fn set_interval(&self, period: Duration, tick: Box<dyn FnMut()>) -> Option<IntervalId> {
        use wasm_bindgen::closure::Closure;
        use wasm_bindgen::JsCast;

        let window = web_sys::window()?;
        let closure = Closure::wrap(tick);
        let millis = i32::try_from(period.as_millis()).unwrap_or(i32::MAX);
        match window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            millis,
        ) {
            Ok(handle) => {
                // The closure must outlive the interval; dropped on clear.
                self.closures.borrow_mut().insert(handle, closure);
                Some(IntervalId(handle))
            }
            Err(e) => {
                log::error!("setInterval failed: {:?}", e);
                None
            }
        }
    }

    fn clear_interval(&self, id: IntervalId) {
        if let Some(window) = web_sys::window() {
            window.clear_interval_with_handle(id.0);
        }
        self.closures.borrow_mut().remove(&id.0);
    }
}
