use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Receives throttled progress notifications from a [`ProgressTracker`].
/// `on_progress` fires at most once per whole-percent step; `on_complete`
/// fires exactly once per finished run.
pub trait ProgressObserver {
    fn on_progress(&mut self, _percent: u8) {}
    fn on_complete(&mut self, _elapsed: Duration) {}
}

/// Accumulates resolved address counts for one visualization run.
///
/// Lifecycle: idle until `start`, running until the resolved count reaches
/// the total, then idle again. Completion is a transient state observed
/// through `on_complete`; once the observer returns, the tracker is ready
/// for the next run. `start` while running is rejected, which is what
/// limits the system to a single traversal at a time.
pub struct ProgressTracker {
    observer: Box<dyn ProgressObserver>,
    resolved: u64,
    total: u64,
    running: bool,
    started_at: Option<Instant>,
    notified_percent: u8,
}

impl ProgressTracker {
    pub fn new(observer: Box<dyn ProgressObserver>) -> Self {
        ProgressTracker {
            observer,
            resolved: 0,
            total: 0,
            running: false,
            started_at: None,
            notified_percent: 0,
        }
    }

    /// Begin a run over `total` addresses, resetting the resolved count and
    /// recording the start time. Returns `Error::RunInProgress` while a run
    /// is active.
    pub fn start(&mut self, total: u64) -> Result<()> {
        if self.running {
            return Err(Error::RunInProgress);
        }
        assert!(total > 0, "a run must cover at least one address");

        self.resolved = 0;
        self.total = total;
        self.running = true;
        self.started_at = now();
        self.notified_percent = 0;
        Ok(())
    }

    /// Record `count` more addresses as resolved.
    ///
    /// Panics if the sum would exceed the total: the traversal partitions
    /// the space exactly, so overshooting means a block was double-counted
    /// and the picture can no longer be trusted.
    pub fn advance(&mut self, count: u64) {
        assert!(self.running, "advance called outside of a run");
        let resolved = self.resolved + count;
        assert!(
            resolved <= self.total,
            "resolved {} of {} addresses: a block was counted twice",
            resolved,
            self.total
        );
        self.resolved = resolved;

        let percent = self.percent();
        if percent > self.notified_percent {
            self.notified_percent = percent;
            self.observer.on_progress(percent);
        }

        if self.resolved == self.total {
            self.running = false;
            let elapsed = self.started_at.map(|t| t.elapsed()).unwrap_or_default();
            self.observer.on_complete(elapsed);
        }
    }

    /// Drop back to idle without finishing. No completion event fires.
    pub fn abort(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn resolved(&self) -> u64 {
        self.resolved
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        (self.resolved * 100 / self.total) as u8
    }
}

// Wall-clock capture is unavailable on wasm32; elapsed time degrades to
// zero there instead of panicking in `Instant::now`.
#[cfg(not(target_arch = "wasm32"))]
fn now() -> Option<Instant> {
    Some(Instant::now())
}

#[cfg(target_arch = "wasm32")]
fn now() -> Option<Instant> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Debug, PartialEq, Eq)]
    enum Event {
        Progress(u8),
        Complete,
    }

    struct Recorder(Rc<RefCell<Vec<Event>>>);

    impl ProgressObserver for Recorder {
        fn on_progress(&mut self, percent: u8) {
            self.0.borrow_mut().push(Event::Progress(percent));
        }

        fn on_complete(&mut self, _elapsed: Duration) {
            self.0.borrow_mut().push(Event::Complete);
        }
    }

    fn tracker() -> (ProgressTracker, Rc<RefCell<Vec<Event>>>) {
        let events = Rc::new(RefCell::new(Vec::new()));
        (ProgressTracker::new(Box::new(Recorder(events.clone()))), events)
    }

    #[test]
    fn test_run_completes_and_returns_to_idle() {
        let (mut tracker, events) = tracker();
        tracker.start(100).unwrap();
        assert!(tracker.is_running());

        tracker.advance(40);
        tracker.advance(60);

        assert!(!tracker.is_running());
        assert_eq!(tracker.resolved(), 100);
        let events = events.borrow();
        assert_eq!(events[events.len() - 2], Event::Progress(100));
        assert_eq!(events[events.len() - 1], Event::Complete);
    }

    #[test]
    fn test_second_start_is_rejected_while_running() {
        let (mut tracker, _) = tracker();
        tracker.start(100).unwrap();
        assert!(matches!(tracker.start(100), Err(Error::RunInProgress)));

        // After completion the next run may start.
        tracker.advance(100);
        assert!(tracker.start(50).is_ok());
    }

    #[test]
    fn test_notifications_are_throttled_to_whole_percents() {
        let (mut tracker, events) = tracker();
        tracker.start(1000).unwrap();

        // Below one percent: silent.
        tracker.advance(5);
        assert!(events.borrow().is_empty());

        // Crossing one percent notifies once with the current value.
        tracker.advance(5);
        assert_eq!(*events.borrow(), vec![Event::Progress(1)]);

        // A large step emits a single notification, not one per percent.
        tracker.advance(490);
        assert_eq!(
            *events.borrow(),
            vec![Event::Progress(1), Event::Progress(50)]
        );
    }

    #[test]
    fn test_percents_are_monotonically_non_decreasing() {
        let (mut tracker, events) = tracker();
        tracker.start(64).unwrap();
        for _ in 0..64 {
            tracker.advance(1);
        }

        let mut last = 0u8;
        for event in events.borrow().iter() {
            if let Event::Progress(p) = event {
                assert!(*p >= last);
                last = *p;
            }
        }
        assert_eq!(last, 100);
    }

    #[test]
    #[should_panic(expected = "counted twice")]
    fn test_overshooting_the_total_panics() {
        let (mut tracker, _) = tracker();
        tracker.start(10).unwrap();
        tracker.advance(11);
    }

    #[test]
    #[should_panic(expected = "outside of a run")]
    fn test_advance_while_idle_panics() {
        let (mut tracker, _) = tracker();
        tracker.advance(1);
    }

    #[test]
    fn test_abort_fires_no_completion_event() {
        let (mut tracker, events) = tracker();
        tracker.start(100).unwrap();
        tracker.advance(50);
        tracker.abort();

        assert!(!tracker.is_running());
        assert!(!events.borrow().contains(&Event::Complete));
        assert!(tracker.start(100).is_ok());
    }
}
