#![forbid(unsafe_code)]

//! Refresh sources: the "next refresh opportunity" a driver waits on.
//!
//! A [`RefreshSource`] blocks the driver thread until the next frame and
//! reports the frame's timestamp as an offset from the animator's origin.
//! Waiting goes through a [`StopSignal`] so cancellation wakes the driver
//! immediately instead of after the next frame.
//!
//! # How it works
//!
//! 1. [`spawn`](crate::spawn) creates a stop signal/trigger pair.
//! 2. The driver thread calls [`RefreshSource::next_frame`] in a loop.
//! 3. [`TypewriterHandle::cancel`](crate::TypewriterHandle::cancel) fires the
//!    trigger; the pending wait returns `None` and the thread exits.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Default frame interval (~60 Hz).
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Produces refresh ticks for a driver.
pub trait RefreshSource: Send {
    /// Block until the next refresh opportunity.
    ///
    /// Returns the frame time (monotonic, relative to the source's origin), or
    /// `None` when `stop` fired or the source is exhausted.
    fn next_frame(&mut self, stop: &StopSignal) -> Option<Duration>;
}

/// Signal for stopping a driver.
///
/// Shared between the driver thread and its [`StopTrigger`]. Besides the
/// flag, the signal's lock serializes publication against cancellation:
/// work done in [`run_unless_stopped`](Self::run_unless_stopped) can never
/// interleave with [`StopTrigger::stop`].
#[derive(Clone)]
pub struct StopSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopSignal {
    /// Create a new stop signal pair (signal, trigger).
    pub(crate) fn new() -> (Self, StopTrigger) {
        let inner = Arc::new((Mutex::new(false), Condvar::new()));
        let signal = Self {
            inner: Arc::clone(&inner),
        };
        let trigger = StopTrigger { inner };
        (signal, trigger)
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Check if the stop signal has been triggered.
    pub fn is_stopped(&self) -> bool {
        *self.lock()
    }

    /// Run `f` while holding the stop lock, unless already stopped.
    ///
    /// Returns `None` without running `f` once stopped. A concurrent
    /// [`StopTrigger::stop`] waits for `f` to finish.
    pub fn run_unless_stopped<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        let stopped = self.lock();
        if *stopped {
            return None;
        }
        let result = f();
        drop(stopped);
        Some(result)
    }

    /// Wait for either the stop signal or a timeout.
    ///
    /// Returns `true` if stopped, `false` if timed out.
    /// Handles spurious wakeups by looping until condition met or timeout expired.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        let (_, cvar) = &*self.inner;
        let mut stopped = self.lock();
        if *stopped {
            return true;
        }

        let start = Instant::now();
        let mut remaining = duration;

        loop {
            let (guard, result) = cvar
                .wait_timeout(stopped, remaining)
                .unwrap_or_else(PoisonError::into_inner);
            stopped = guard;
            if *stopped {
                return true;
            }
            if result.timed_out() {
                return false;
            }
            let elapsed = start.elapsed();
            if elapsed >= duration {
                return false;
            }
            remaining = duration - elapsed;
        }
    }
}

/// Trigger to stop a driver from the owning handle.
pub(crate) struct StopTrigger {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopTrigger {
    /// Signal the driver to stop. Blocks while a publication is in flight.
    pub(crate) fn stop(&self) {
        let (lock, cvar) = &*self.inner;
        let mut stopped = lock.lock().unwrap_or_else(PoisonError::into_inner);
        *stopped = true;
        cvar.notify_all();
    }
}

/// Ticks at a fixed interval measured on the monotonic clock.
///
/// The origin is the first call to [`next_frame`](RefreshSource::next_frame),
/// so the first frame reports roughly one interval. Frame times come from
/// [`Instant`], not from counting ticks, so late wakeups do not accumulate.
#[derive(Debug, Clone)]
pub struct FixedRate {
    interval: Duration,
    origin: Option<Instant>,
}

impl FixedRate {
    /// Tick every `interval`. A zero interval is raised to one millisecond.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            origin: None,
        }
    }

    /// Tick `fps` times per second. Zero is treated as one.
    #[must_use]
    pub fn fps(fps: u32) -> Self {
        Self::new(Duration::from_secs(1) / fps.max(1))
    }

    /// The tick interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for FixedRate {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL)
    }
}

impl RefreshSource for FixedRate {
    fn next_frame(&mut self, stop: &StopSignal) -> Option<Duration> {
        let origin = *self.origin.get_or_insert_with(Instant::now);
        if stop.wait_timeout(self.interval) {
            return None;
        }
        Some(origin.elapsed())
    }
}

/// A scripted refresh source for testing.
///
/// Yields the queued frame times immediately, then reports exhaustion.
#[derive(Debug, Clone, Default)]
pub struct Scripted {
    frames: VecDeque<Duration>,
}

impl Scripted {
    /// Yield exactly these frame times, in order.
    #[must_use]
    pub fn new(frames: impl IntoIterator<Item = Duration>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    /// Yield frames every `step` from `step` up to and including `until`.
    ///
    /// A zero `step` yields nothing.
    #[must_use]
    pub fn every(step: Duration, until: Duration) -> Self {
        let mut frames = VecDeque::new();
        if !step.is_zero() {
            let mut now = step;
            while now <= until {
                frames.push_back(now);
                now += step;
            }
        }
        Self { frames }
    }

    /// Frames not yet yielded.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl RefreshSource for Scripted {
    fn next_frame(&mut self, stop: &StopSignal) -> Option<Duration> {
        if stop.is_stopped() {
            return None;
        }
        self.frames.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn stop_signal_starts_false() {
        let (signal, _trigger) = StopSignal::new();
        assert!(!signal.is_stopped());
    }

    #[test]
    fn stop_signal_becomes_true_after_trigger() {
        let (signal, trigger) = StopSignal::new();
        trigger.stop();
        assert!(signal.is_stopped());
    }

    #[test]
    fn stop_signal_wait_returns_true_when_stopped() {
        let (signal, trigger) = StopSignal::new();
        trigger.stop();
        assert!(signal.wait_timeout(Duration::from_millis(100)));
    }

    #[test]
    fn stop_signal_wait_returns_false_on_timeout() {
        let (signal, _trigger) = StopSignal::new();
        assert!(!signal.wait_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn stop_wakes_a_pending_wait() {
        let (signal, trigger) = StopSignal::new();
        let waiter = thread::spawn(move || signal.wait_timeout(Duration::from_secs(30)));
        thread::sleep(Duration::from_millis(20));
        trigger.stop();
        assert!(waiter.join().unwrap());
    }

    #[test]
    fn run_unless_stopped_skips_after_stop() {
        let (signal, trigger) = StopSignal::new();
        assert_eq!(signal.run_unless_stopped(|| 7), Some(7));
        trigger.stop();
        assert_eq!(signal.run_unless_stopped(|| 7), None);
    }

    #[test]
    fn fixed_rate_reports_monotonic_frames() {
        let (signal, _trigger) = StopSignal::new();
        let mut rate = FixedRate::new(Duration::from_millis(2));
        let a = rate.next_frame(&signal).unwrap();
        let b = rate.next_frame(&signal).unwrap();
        assert!(a >= Duration::from_millis(2));
        assert!(b > a);
    }

    #[test]
    fn fixed_rate_returns_none_when_stopped() {
        let (signal, trigger) = StopSignal::new();
        trigger.stop();
        let mut rate = FixedRate::default();
        assert_eq!(rate.next_frame(&signal), None);
    }

    #[test]
    fn fixed_rate_clamps_zero() {
        assert_eq!(FixedRate::new(Duration::ZERO).interval(), Duration::from_millis(1));
        assert_eq!(FixedRate::fps(0).interval(), Duration::from_secs(1));
        assert_eq!(FixedRate::fps(50).interval(), Duration::from_millis(20));
    }

    #[test]
    fn scripted_yields_frames_in_order() {
        let (signal, _trigger) = StopSignal::new();
        let mut script = Scripted::new([Duration::from_millis(5), Duration::from_millis(9)]);
        assert_eq!(script.next_frame(&signal), Some(Duration::from_millis(5)));
        assert_eq!(script.next_frame(&signal), Some(Duration::from_millis(9)));
        assert_eq!(script.next_frame(&signal), None);
    }

    #[test]
    fn scripted_every_is_inclusive() {
        let script = Scripted::every(Duration::from_millis(10), Duration::from_millis(50));
        assert_eq!(script.remaining(), 5);
        assert_eq!(Scripted::every(Duration::ZERO, Duration::from_secs(1)).remaining(), 0);
    }

    #[test]
    fn scripted_stops_on_signal() {
        let (signal, trigger) = StopSignal::new();
        let mut script = Scripted::every(Duration::from_millis(1), Duration::from_millis(10));
        trigger.stop();
        assert_eq!(script.next_frame(&signal), None);
    }
}
