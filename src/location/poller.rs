//! Periodic location polling.
//!
//! The poller asks the sensor once immediately and then once per interval.
//! Requests are fire-and-forget: a slow or failed request never delays the
//! next one, and errors never stop the loop. Cancelling (or dropping the
//! handle) guarantees that no callback runs afterwards, including replies
//! to requests that were already in flight.

use super::sensor::{LocationSample, LocationSensor};
use super::timer::{IntervalId, IntervalScheduler};
use crate::error::SensorError;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

pub type SampleCallback = Rc<dyn Fn(LocationSample)>;
pub type ErrorCallback = Rc<dyn Fn(SensorError)>;

/// Shared between the handle and every scheduled request.
struct PollerShared {
    sensor: Rc<dyn LocationSensor>,
    on_sample: SampleCallback,
    on_error: ErrorCallback,
    cancelled: Cell<bool>,
    requests_made: Cell<u64>,
}

impl PollerShared {
    fn request(self: &Rc<Self>) {
        if self.cancelled.get() {
            return;
        }
        self.requests_made.set(self.requests_made.get() + 1);
        let shared = self.clone();
        self.sensor.request(Box::new(move |result| {
            if shared.cancelled.get() {
                return;
            }
            match result {
                Ok(sample) => (shared.on_sample)(sample),
                Err(err) => (shared.on_error)(err),
            }
        }));
    }
}

/// Starts location polling.
pub struct LocationPoller;

impl LocationPoller {
    /// Requests one sample now, then one every `interval`, until the returned
    /// handle is cancelled or dropped.
    pub fn start(
        scheduler: Rc<dyn IntervalScheduler>,
        sensor: Rc<dyn LocationSensor>,
        interval: Duration,
        on_sample: SampleCallback,
        on_error: ErrorCallback,
    ) -> PollHandle {
        let shared = Rc::new(PollerShared {
            sensor,
            on_sample,
            on_error,
            cancelled: Cell::new(false),
            requests_made: Cell::new(0),
        });

        log::info!("Starting location polling every {:?}", interval);
        shared.request();

        let ticker = shared.clone();
        let interval_id = scheduler.set_interval(interval, Box::new(move || ticker.request()));
        if interval_id.is_none() {
            log::warn!("Could not schedule location polling; only one sample requested");
        }

        PollHandle {
            shared,
            scheduler,
            interval_id: Cell::new(interval_id),
        }
    }
}

/// Owns a running poll loop. Dropping it cancels the loop.
pub struct PollHandle {
    shared: Rc<PollerShared>,
    scheduler: Rc<dyn IntervalScheduler>,
    interval_id: Cell<Option<IntervalId>>,
}

impl PollHandle {
    /// Stops polling. Safe to call repeatedly.
    pub fn cancel(&self) {
        if self.shared.cancelled.replace(true) {
            return;
        }
        if let Some(id) = self.interval_id.take() {
            self.scheduler.clear_interval(id);
        }
        log::info!(
            "Location polling cancelled after {} request(s)",
            self.shared.requests_made.get()
        );
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.cancelled.get()
    }

    /// Requests issued so far, including the initial one.
    pub fn requests_made(&self) -> u64 {
        self.shared.requests_made.get()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::sensor::SampleReply;
    use crate::location::timer::FrameScheduler;
    use chrono::Utc;
    use std::cell::RefCell;

    /// Sensor that replies synchronously from a script, then repeats the last entry.
    struct ScriptedSensor {
        script: RefCell<Vec<Result<(f64, f64), SensorError>>>,
    }

    impl ScriptedSensor {
        fn new(script: Vec<Result<(f64, f64), SensorError>>) -> Self {
            Self {
                script: RefCell::new(script),
            }
        }
    }

    impl LocationSensor for ScriptedSensor {
        fn request(&self, reply: SampleReply) {
            let next = {
                let mut script = self.script.borrow_mut();
                if script.len() > 1 {
                    script.remove(0)
                } else {
                    script[0].clone()
                }
            };
            reply(next.map(|(lat, lon)| LocationSample::new(lat, lon, Utc::now())));
        }
    }

    /// Sensor that holds replies until the test releases them.
    #[derive(Default)]
    struct PendingSensor {
        pending: RefCell<Vec<SampleReply>>,
    }

    impl LocationSensor for PendingSensor {
        fn request(&self, reply: SampleReply) {
            self.pending.borrow_mut().push(reply);
        }
    }

    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<(Duration, Result<(f64, f64), SensorError>)>>,
    }

    fn callbacks(
        recorder: &Rc<Recorder>,
        scheduler: &Rc<FrameScheduler>,
    ) -> (SampleCallback, ErrorCallback) {
        let (r, s) = (recorder.clone(), scheduler.clone());
        let on_sample: SampleCallback = Rc::new(move |sample: LocationSample| {
            r.events
                .borrow_mut()
                .push((s.now(), Ok((sample.lat, sample.lon))));
        });
        let (r, s) = (recorder.clone(), scheduler.clone());
        let on_error: ErrorCallback = Rc::new(move |err: SensorError| {
            r.events.borrow_mut().push((s.now(), Err(err)));
        });
        (on_sample, on_error)
    }

    #[test]
    fn test_polls_immediately_then_every_interval_until_cancelled() {
        let scheduler = Rc::new(FrameScheduler::new());
        let recorder = Rc::new(Recorder::default());
        let (on_sample, on_error) = callbacks(&recorder, &scheduler);
        let sensor = Rc::new(ScriptedSensor::new(vec![Ok((1.0, 2.0))]));

        let handle = LocationPoller::start(
            scheduler.clone(),
            sensor,
            Duration::from_millis(5000),
            on_sample,
            on_error,
        );
        assert_eq!(recorder.events.borrow().len(), 1);
        assert_eq!(recorder.events.borrow()[0].0, Duration::ZERO);

        scheduler.advance_to(Duration::from_millis(5000));
        assert_eq!(recorder.events.borrow().len(), 2);
        assert_eq!(recorder.events.borrow()[1].0, Duration::from_millis(5000));

        scheduler.advance_to(Duration::from_millis(6000));
        handle.cancel();
        scheduler.advance_to(Duration::from_millis(10000));
        assert_eq!(recorder.events.borrow().len(), 2);
        assert_eq!(handle.requests_made(), 2);
        assert_eq!(scheduler.active_intervals(), 0);
    }

    #[test]
    fn test_errors_do_not_stop_polling() {
        let scheduler = Rc::new(FrameScheduler::new());
        let recorder = Rc::new(Recorder::default());
        let (on_sample, on_error) = callbacks(&recorder, &scheduler);
        let sensor = Rc::new(ScriptedSensor::new(vec![
            Err(SensorError::PermissionDenied("denied".into())),
            Err(SensorError::Timeout("slow".into())),
            Ok((57.0, 11.0)),
        ]));

        let _handle = LocationPoller::start(
            scheduler.clone(),
            sensor,
            Duration::from_millis(1000),
            on_sample,
            on_error,
        );
        scheduler.advance_to(Duration::from_millis(3000));

        let events = recorder.events.borrow();
        assert_eq!(events.len(), 4);
        assert!(events[0].1.is_err());
        assert!(events[1].1.is_err());
        assert_eq!(events[2].1, Ok((57.0, 11.0)));
        assert_eq!(events[3].1, Ok((57.0, 11.0)));
    }

    #[test]
    fn test_slow_requests_do_not_block_ticks() {
        let scheduler = Rc::new(FrameScheduler::new());
        let recorder = Rc::new(Recorder::default());
        let (on_sample, on_error) = callbacks(&recorder, &scheduler);
        let sensor = Rc::new(PendingSensor::default());

        let handle = LocationPoller::start(
            scheduler.clone(),
            sensor.clone(),
            Duration::from_millis(1000),
            on_sample,
            on_error,
        );
        scheduler.advance_to(Duration::from_millis(3000));

        // Nothing answered, yet every tick still issued its own request.
        assert_eq!(handle.requests_made(), 4);
        assert_eq!(sensor.pending.borrow().len(), 4);

        let first = sensor.pending.borrow_mut().remove(0);
        first(Ok(LocationSample::new(1.0, 1.0, Utc::now())));
        assert_eq!(recorder.events.borrow().len(), 1);
    }

    #[test]
    fn test_in_flight_reply_after_cancel_is_ignored() {
        let scheduler = Rc::new(FrameScheduler::new());
        let recorder = Rc::new(Recorder::default());
        let (on_sample, on_error) = callbacks(&recorder, &scheduler);
        let sensor = Rc::new(PendingSensor::default());

        let handle = LocationPoller::start(
            scheduler.clone(),
            sensor.clone(),
            Duration::from_millis(1000),
            on_sample,
            on_error,
        );
        handle.cancel();
        handle.cancel();
        assert!(handle.is_cancelled());

        let reply = sensor.pending.borrow_mut().remove(0);
        reply(Err(SensorError::Timeout("late".into())));
        assert!(recorder.events.borrow().is_empty());
    }

    #[test]
    fn test_drop_cancels() {
        let scheduler = Rc::new(FrameScheduler::new());
        let recorder = Rc::new(Recorder::default());
        let (on_sample, on_error) = callbacks(&recorder, &scheduler);
        let sensor = Rc::new(ScriptedSensor::new(vec![Ok((0.0, 0.0))]));

        let handle = LocationPoller::start(
            scheduler.clone(),
            sensor,
            Duration::from_millis(1000),
            on_sample,
            on_error,
        );
        drop(handle);
        scheduler.advance_to(Duration::from_millis(5000));
        assert_eq!(recorder.events.borrow().len(), 1);
        assert_eq!(scheduler.active_intervals(), 0);
    }
}
