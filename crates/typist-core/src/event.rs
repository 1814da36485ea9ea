#![forbid(unsafe_code)]

//! Milestone events emitted by the [`Typewriter`](crate::Typewriter).
//!
//! Events are queued during [`step`](crate::Typewriter::step) and drained by
//! the caller with [`drain_events`](crate::Typewriter::drain_events). The
//! queue keeps the animator free of stored closures; the one hook the
//! configuration carries (`on_cycle_complete`) is invoked by the driver, not
//! by the animator.
//!
//! # Invariants
//!
//! 1. `PhraseTyped(i)` fires once each time phrase `i` becomes fully visible.
//! 2. `PhraseErased(i)` fires once each time phrase `i` is fully removed.
//! 3. `Wrapped` fires only when looping, after the last phrase is erased.
//! 4. `CycleComplete` fires at most once per animator lifetime, and never
//!    when looping.
//! 5. Draining clears the queue; events are not replayed.

/// An event emitted by a [`Typewriter`](crate::Typewriter) step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypewriterEvent {
    /// The phrase at this index is fully typed; the pause before deletion begins.
    PhraseTyped(usize),
    /// The phrase at this index has been fully erased.
    PhraseErased(usize),
    /// The sequence was exhausted and restarted from the first phrase.
    Wrapped,
    /// A non-looping sequence finished. Terminal.
    CycleComplete,
}

impl TypewriterEvent {
    /// Whether this event ends the animation.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::CycleComplete)
    }
}
