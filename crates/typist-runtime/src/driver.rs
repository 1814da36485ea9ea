#![forbid(unsafe_code)]

//! Cooperative driver: one [`Typewriter`] advanced once per refresh tick.
//!
//! Hosts that already own a frame loop call [`Driver::tick`] on every
//! refresh and redraw when it reports a text change. [`spawn`](crate::spawn)
//! wraps the same driver in a background thread.
//!
//! # Invariants
//!
//! 1. [`Driver::text`] is recomputed exactly when a tick changes it.
//! 2. The completion hook runs at most once per configuration, and never
//!    after [`Driver::cancel`].
//! 3. After cancel, every tick is [`Step::Idle`] and the text stays frozen.
//! 4. [`Driver::events`] holds only the most recent tick's events, so a host
//!    that ignores them does not accumulate anything.

use std::fmt;
use std::time::Duration;

use typist_core::{CycleHook, Step, Typewriter, TypewriterConfig, TypewriterEvent};

/// Drives a [`Typewriter`] from externally supplied refresh ticks.
pub struct Driver {
    typewriter: Typewriter,
    hook: Option<CycleHook>,
    text: String,
    events: Vec<TypewriterEvent>,
    cancelled: bool,
    ticks: u64,
}

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("text", &self.text)
            .field("events", &self.events)
            .field("cancelled", &self.cancelled)
            .field("ticks", &self.ticks)
            .field("state", self.typewriter.state())
            .finish()
    }
}

impl Driver {
    /// Start driving a fresh animator for `config`.
    #[must_use]
    pub fn new(config: &TypewriterConfig) -> Self {
        Self {
            typewriter: Typewriter::new(config),
            hook: config.on_cycle_complete.clone(),
            text: String::new(),
            events: Vec::new(),
            cancelled: false,
            ticks: 0,
        }
    }

    /// Process one refresh tick at time `now`.
    ///
    /// Runs the completion hook when this tick finishes a non-looping sequence.
    pub fn tick(&mut self, now: Duration) -> Step {
        self.events.clear();
        if self.cancelled {
            return Step::Idle;
        }
        self.ticks += 1;

        let step = self.typewriter.step(now);
        self.events.extend(self.typewriter.drain_events());
        if step.text_changed() {
            self.text.clear();
            self.text.push_str(self.typewriter.text());
        }
        if let Step::Completed { .. } = step {
            tracing::debug!(ticks = self.ticks, "typewriter cycle complete");
            if let Some(hook) = self.hook.take() {
                hook();
            }
        }
        step
    }

    /// The last published text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether further ticks can change anything.
    ///
    /// False after cancellation, after a non-looping sequence completes, and
    /// for an empty phrase list.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.cancelled && !self.typewriter.is_idle()
    }

    /// Whether [`cancel`](Self::cancel) was called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Number of ticks processed.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The driven animator.
    #[must_use]
    pub fn typewriter(&self) -> &Typewriter {
        &self.typewriter
    }

    /// Milestone events emitted by the most recent tick.
    ///
    /// Replaced on every tick; read them before ticking again.
    #[must_use]
    pub fn events(&self) -> &[TypewriterEvent] {
        &self.events
    }

    /// Stop advancing. Later ticks are no-ops and the hook is dropped.
    pub fn cancel(&mut self) {
        if !self.cancelled {
            tracing::debug!(ticks = self.ticks, "driver cancelled");
        }
        self.cancelled = true;
        self.hook = None;
    }

    /// Discard the current animator and start over with `config`.
    ///
    /// The text resets to empty; the caller should redraw.
    pub fn reconfigure(&mut self, config: &TypewriterConfig) {
        tracing::debug!(phrases = config.texts.len(), "driver reconfigured");
        *self = Self::new(config);
    }
}
