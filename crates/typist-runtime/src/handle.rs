#![forbid(unsafe_code)]

//! Background driver thread and the handle that owns it.
//!
//! [`spawn`] is the observe contract of the animator: the returned
//! [`TypewriterHandle`] exposes the latest text and a stream of [`Update`]s
//! while a dedicated thread waits on a [`RefreshSource`] and ticks a
//! [`Driver`].
//!
//! # Cancellation
//!
//! Each tick's publication (text snapshot, channel send, completion hook)
//! runs under the stop signal's lock, and [`TypewriterHandle::cancel`] sets
//! the stop flag under the same lock. Once `cancel` returns, no further
//! update or notification is observable. The completion hook therefore must
//! not cancel its own handle.
//!
//! # Backpressure
//!
//! The update channel holds at most [`UPDATE_CAPACITY`] entries. While it is
//! full, new updates are dropped rather than queued; [`current_text`] and
//! [`is_complete`] always reflect the latest state, so a host that only
//! polls never accumulates anything.
//!
//! [`current_text`]: TypewriterHandle::current_text
//! [`is_complete`]: TypewriterHandle::is_complete

use std::io;
use std::sync::mpsc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use typist_core::{Step, TypewriterConfig};

use crate::driver::Driver;
use crate::refresh::{RefreshSource, StopSignal, StopTrigger};

/// A change published by a running animator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    /// The visible text changed.
    Text(String),
    /// A non-looping sequence finished. No further updates follow.
    CycleComplete,
}

/// Maximum number of undrained updates kept in the channel.
pub const UPDATE_CAPACITY: usize = 256;

type SharedText = Arc<Mutex<String>>;

/// State shared between a handle and its driver thread.
#[derive(Clone, Default)]
struct Shared {
    text: SharedText,
    complete: Arc<AtomicBool>,
}

fn lock_text(text: &SharedText) -> MutexGuard<'_, String> {
    text.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Start an animator for `config` on a background thread driven by `refresh`.
///
/// # Errors
///
/// Returns an error if the driver thread cannot be spawned.
pub fn spawn<R>(config: TypewriterConfig, refresh: R) -> io::Result<TypewriterHandle>
where
    R: RefreshSource + 'static,
{
    let (sender, receiver) = mpsc::sync_channel(UPDATE_CAPACITY);
    let shared = Shared::default();
    let running = start(config, refresh, sender.clone(), shared.clone())?;
    Ok(TypewriterHandle {
        shared,
        sender,
        receiver,
        running: Some(running),
    })
}

/// A running driver thread.
struct RunningDriver {
    trigger: StopTrigger,
    thread: Option<thread::JoinHandle<()>>,
}

impl RunningDriver {
    /// Stop the driver and join its thread.
    fn stop(mut self) {
        self.trigger.stop();
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }

    /// Wait for the driver to finish on its own.
    fn join(mut self) {
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }

    fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(thread::JoinHandle::is_finished)
    }
}

impl Drop for RunningDriver {
    fn drop(&mut self) {
        self.trigger.stop();
        // Don't join in drop to avoid blocking
    }
}

fn start<R>(
    config: TypewriterConfig,
    mut refresh: R,
    sender: mpsc::SyncSender<Update>,
    shared: Shared,
) -> io::Result<RunningDriver>
where
    R: RefreshSource + 'static,
{
    let (signal, trigger) = StopSignal::new();
    let thread = thread::Builder::new()
        .name("typist-driver".into())
        .spawn(move || {
            let mut driver = Driver::new(&config);
            tracing::debug!(phrases = config.texts.len(), "driver started");
            run(&mut driver, &mut refresh, &signal, &sender, &shared);
            tracing::debug!(
                ticks = driver.ticks(),
                stopped = signal.is_stopped(),
                "driver exited"
            );
        })?;
    Ok(RunningDriver {
        trigger,
        thread: Some(thread),
    })
}

fn run<R: RefreshSource>(
    driver: &mut Driver,
    refresh: &mut R,
    signal: &StopSignal,
    sender: &mpsc::SyncSender<Update>,
    shared: &Shared,
) {
    while driver.is_running() {
        let Some(now) = refresh.next_frame(signal) else {
            break;
        };
        let keep_going = signal.run_unless_stopped(|| {
            let step = driver.tick(now);
            if step.text_changed() {
                let text = driver.text().to_string();
                lock_text(&shared.text).clone_from(&text);
                if !publish(sender, Update::Text(text)) {
                    return false;
                }
            }
            if let Step::Completed { .. } = step {
                shared.complete.store(true, Ordering::Release);
                let _ = publish(sender, Update::CycleComplete);
            }
            driver.is_running()
        });
        if keep_going != Some(true) {
            break;
        }
    }
}

/// Offer `update` without blocking. Returns false once the receiver is gone.
fn publish(sender: &mpsc::SyncSender<Update>, update: Update) -> bool {
    match sender.try_send(update) {
        Ok(()) => true,
        Err(mpsc::TrySendError::Full(update)) => {
            tracing::trace!(?update, "update channel full, dropping");
            true
        }
        Err(mpsc::TrySendError::Disconnected(_)) => false,
    }
}

/// Owner of a running animator.
///
/// Dropping the handle stops the driver without waiting for its thread.
pub struct TypewriterHandle {
    shared: Shared,
    sender: mpsc::SyncSender<Update>,
    receiver: mpsc::Receiver<Update>,
    running: Option<RunningDriver>,
}

impl TypewriterHandle {
    /// The latest published text.
    #[must_use]
    pub fn current_text(&self) -> String {
        lock_text(&self.shared.text).clone()
    }

    /// Whether a non-looping sequence has finished.
    ///
    /// Set even when the [`Update::CycleComplete`] message was dropped on a
    /// full channel.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.shared.complete.load(Ordering::Acquire)
    }

    /// Receiver for published updates, in publication order.
    ///
    /// Bounded by [`UPDATE_CAPACITY`]; updates published while it is full
    /// are lost.
    #[must_use]
    pub fn updates(&self) -> &mpsc::Receiver<Update> {
        &self.receiver
    }

    /// Drain the updates published so far.
    pub fn drain_updates(&self) -> Vec<Update> {
        self.receiver.try_iter().collect()
    }

    /// Whether the driver thread has exited (completed, idle, exhausted, or cancelled).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.running.as_ref().is_none_or(RunningDriver::is_finished)
    }

    /// Stop the animator and join its thread.
    ///
    /// Once this returns, no further update is published. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(running) = self.running.take() {
            running.stop();
            tracing::debug!("typewriter handle cancelled");
        }
    }

    /// Block until the animator finishes on its own.
    ///
    /// Returns immediately if it already stopped. Never returns for a looping
    /// animator on an endless refresh source.
    pub fn wait(&mut self) {
        if let Some(running) = self.running.take() {
            running.join();
        }
    }

    /// Cancel the current animator and start a fresh one for `config`.
    ///
    /// Pending updates from the previous animator are discarded, the
    /// current text resets to empty and completion is cleared.
    ///
    /// # Errors
    ///
    /// Returns an error if the new driver thread cannot be spawned; the
    /// handle is then left cancelled.
    pub fn reconfigure<R>(&mut self, config: TypewriterConfig, refresh: R) -> io::Result<()>
    where
        R: RefreshSource + 'static,
    {
        self.cancel();
        let _ = self.drain_updates();
        lock_text(&self.shared.text).clear();
        self.shared.complete.store(false, Ordering::Release);
        tracing::debug!(phrases = config.texts.len(), "typewriter handle reconfigured");
        self.running = Some(start(
            config,
            refresh,
            self.sender.clone(),
            self.shared.clone(),
        )?);
        Ok(())
    }
}

impl std::fmt::Debug for TypewriterHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypewriterHandle")
            .field("current", &self.current_text())
            .field("complete", &self.is_complete())
            .field("finished", &self.is_finished())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refresh::Scripted;
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn texts(updates: &[Update]) -> Vec<&str> {
        updates
            .iter()
            .filter_map(|u| match u {
                Update::Text(t) => Some(t.as_str()),
                Update::CycleComplete => None,
            })
            .collect()
    }

    #[test]
    fn scripted_run_publishes_every_change() {
        let mut handle = spawn(
            TypewriterConfig::new(["Hi"]),
            Scripted::every(ms(10), ms(5_000)),
        )
        .unwrap();
        handle.wait();

        let updates = handle.drain_updates();
        assert_eq!(texts(&updates), ["H", "Hi", "H", ""]);
        assert_eq!(updates.last(), Some(&Update::CycleComplete));
        assert_eq!(handle.current_text(), "");
        assert!(handle.is_complete());
        assert!(handle.is_finished());
    }

    #[test]
    fn undrained_looping_hour_stays_bounded() {
        let config = TypewriterConfig::new(["ab", "c"]).looping(true);
        let frames = Scripted::every(ms(16), ms(3_600_000));
        let mut expected = Driver::new(&config);
        for t in (16..=3_600_000).step_by(16) {
            expected.tick(ms(t));
        }

        let mut handle = spawn(config, frames).unwrap();
        handle.wait();

        assert_eq!(handle.current_text(), expected.text());
        assert!(!handle.is_complete());
        assert_eq!(handle.drain_updates().len(), UPDATE_CAPACITY);
    }

    #[test]
    fn completion_survives_a_full_channel() {
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let config = TypewriterConfig::new(["a".repeat(300)])
            .write_speed(ms(1))
            .erase_speed(ms(1))
            .pause_before_delete(ms(10))
            .on_cycle_complete(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });

        let mut handle = spawn(config, Scripted::every(ms(1), ms(2_000))).unwrap();
        handle.wait();

        let updates = handle.drain_updates();
        assert_eq!(updates.len(), UPDATE_CAPACITY);
        assert!(!updates.contains(&Update::CycleComplete));
        assert!(handle.is_complete());
        assert_eq!(handle.current_text(), "");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn exhausted_script_stops_driver() {
        let mut handle = spawn(
            TypewriterConfig::new(["Hello"]).looping(true),
            Scripted::new([ms(100), ms(200)]),
        )
        .unwrap();
        handle.wait();
        assert_eq!(handle.current_text(), "He");
        assert!(handle.is_finished());
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut handle = spawn(TypewriterConfig::new(["a"]), Scripted::default()).unwrap();
        handle.cancel();
        handle.cancel();
        assert!(handle.is_finished());
    }

    #[test]
    fn reconfigure_discards_old_updates() {
        let mut handle = spawn(
            TypewriterConfig::new(["abc"]),
            Scripted::every(ms(100), ms(300)),
        )
        .unwrap();
        handle.wait();
        assert_eq!(handle.current_text(), "abc");

        handle
            .reconfigure(TypewriterConfig::new(["xy"]), Scripted::new([ms(100)]))
            .unwrap();
        handle.wait();
        assert_eq!(texts(&handle.drain_updates()), ["x"]);
        assert_eq!(handle.current_text(), "x");
        assert!(!handle.is_complete());
    }
}
