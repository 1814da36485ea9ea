#![forbid(unsafe_code)]

//! Typewriter timing state machine.
//!
//! A [`Typewriter`] reveals each configured phrase one grapheme at a time,
//! pauses, erases it again, pauses, and moves on to the next phrase. Time is
//! supplied by the caller as a monotonic offset from the animator's origin,
//! which keeps [`Typewriter::step`] deterministic and easy to drive from
//! tests, a frame loop, or a background thread.
//!
//! # Step semantics
//!
//! Each call to [`step`](Typewriter::step) does at most one of:
//!
//! - nothing, while a pause is active (`now < pause_until`, strict);
//! - nothing, while less than the mode's speed has elapsed since the last action;
//! - type one grapheme (entering `Deleting` with a pause when the phrase is full);
//! - erase one grapheme (moving to the next phrase with a pause when empty).
//!
//! # Invariants
//!
//! 1. `char_count <= grapheme_len(current phrase)` at all times.
//! 2. `Typing -> Deleting` only at `char_count == len`; `Deleting -> Typing` only at 0.
//! 3. `phrase_index` wraps to 0 only when looping.
//! 4. Once finished, every step is [`Step::Idle`] and the text is empty.

use std::time::Duration;

use unicode_segmentation::UnicodeSegmentation;

use crate::config::TypewriterConfig;
use crate::event::TypewriterEvent;

/// Whether characters are being revealed or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Revealing characters.
    #[default]
    Typing,
    /// Removing characters.
    Deleting,
}

/// Mutable timing state of a [`Typewriter`].
///
/// Timestamps are offsets from the animator's time origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnimatorState {
    /// Index of the phrase being typed or erased.
    pub phrase_index: usize,
    /// Number of visible graphemes of the current phrase.
    pub char_count: usize,
    /// Current mode.
    pub mode: Mode,
    /// No mutation happens while `now < pause_until`.
    pub pause_until: Option<Duration>,
    /// Time of the last acting step.
    pub last_action: Duration,
    /// Set once a non-looping sequence is exhausted.
    pub finished: bool,
}

/// Outcome of a single [`Typewriter::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Nothing to animate: the phrase list is empty or the sequence finished.
    Idle,
    /// A pause is active.
    Paused,
    /// The mode's speed has not elapsed since the last action.
    Waiting,
    /// The state advanced. `changed` is true when the visible text changed.
    Advanced { changed: bool },
    /// The last phrase of a non-looping sequence was erased. Terminal.
    Completed { changed: bool },
}

impl Step {
    /// Whether the visible text changed during this step.
    #[must_use]
    pub const fn text_changed(self) -> bool {
        matches!(
            self,
            Self::Advanced { changed: true } | Self::Completed { changed: true }
        )
    }

    /// Whether the state was mutated during this step.
    #[must_use]
    pub const fn acted(self) -> bool {
        matches!(self, Self::Advanced { .. } | Self::Completed { .. })
    }
}

#[derive(Debug, Clone, Copy)]
struct Timing {
    write_speed: Duration,
    erase_speed: Duration,
    pause_before_delete: Duration,
    pause_between_phrases: Duration,
}

/// Number of extended grapheme clusters in `text`.
#[must_use]
pub fn grapheme_len(text: &str) -> usize {
    text.graphemes(true).count()
}

/// The first `count` graphemes of `phrases[index]`.
///
/// Returns an empty string when `index` is out of range, and the whole phrase
/// when `count` exceeds its length.
#[must_use]
pub fn project<S: AsRef<str>>(phrases: &[S], index: usize, count: usize) -> &str {
    let Some(phrase) = phrases.get(index) else {
        return "";
    };
    let phrase = phrase.as_ref();
    match phrase.grapheme_indices(true).nth(count) {
        Some((end, _)) => &phrase[..end],
        None => phrase,
    }
}

/// Typewriter animator over a fixed list of phrases.
#[derive(Debug, Clone)]
pub struct Typewriter {
    phrases: Vec<String>,
    /// Grapheme length of each phrase, parallel to `phrases`.
    lengths: Vec<usize>,
    timing: Timing,
    looping: bool,
    state: AnimatorState,
    events: Vec<TypewriterEvent>,
}

impl Typewriter {
    /// Create an animator in its initial state: first phrase, nothing visible,
    /// typing, last action at the time origin.
    #[must_use]
    pub fn new(config: &TypewriterConfig) -> Self {
        let lengths = config.texts.iter().map(|t| grapheme_len(t)).collect();
        crate::debug!(
            phrases = config.texts.len(),
            looping = config.looping,
            "typewriter created"
        );
        Self {
            phrases: config.texts.clone(),
            lengths,
            timing: Timing {
                write_speed: config.write_speed,
                erase_speed: config.erase_speed,
                pause_before_delete: config.pause_before_delete,
                pause_between_phrases: config.pause_between_phrases,
            },
            looping: config.looping,
            state: AnimatorState::default(),
            events: Vec::new(),
        }
    }

    /// Replace the timing state, clamping it into range.
    ///
    /// `phrase_index` is clamped to the last phrase and `char_count` to that
    /// phrase's length. With no phrases both become 0.
    #[must_use]
    pub fn with_state(mut self, mut state: AnimatorState) -> Self {
        if self.phrases.is_empty() {
            state.phrase_index = 0;
            state.char_count = 0;
        } else {
            state.phrase_index = state.phrase_index.min(self.phrases.len() - 1);
            state.char_count = state.char_count.min(self.lengths[state.phrase_index]);
        }
        self.state = state;
        self
    }

    /// Advance the animation to time `now`.
    pub fn step(&mut self, now: Duration) -> Step {
        if self.state.finished || self.phrases.is_empty() {
            return Step::Idle;
        }

        if let Some(until) = self.state.pause_until {
            if now < until {
                return Step::Paused;
            }
            self.state.pause_until = None;
        }

        let required = match self.state.mode {
            Mode::Typing => self.timing.write_speed,
            Mode::Deleting => self.timing.erase_speed,
        };
        if now.saturating_sub(self.state.last_action) < required {
            return Step::Waiting;
        }

        let index = self.state.phrase_index;
        let len = self.lengths[index];
        let before = self.state.char_count;
        let mut completed = false;

        match self.state.mode {
            Mode::Typing => {
                self.state.char_count = (before + 1).min(len);
                if self.state.char_count == len {
                    self.state.mode = Mode::Deleting;
                    self.state.pause_until = Some(now.saturating_add(self.timing.pause_before_delete));
                    self.events.push(TypewriterEvent::PhraseTyped(index));
                    crate::debug!(phrase = index, "phrase typed");
                }
            }
            Mode::Deleting => {
                self.state.char_count = before.saturating_sub(1);
                if self.state.char_count == 0 {
                    self.events.push(TypewriterEvent::PhraseErased(index));
                    crate::debug!(phrase = index, "phrase erased");
                    completed = self.advance_phrase(now);
                }
            }
        }

        self.state.last_action = now;
        let changed = self.state.char_count != before;
        crate::trace!(
            phrase = self.state.phrase_index,
            chars = self.state.char_count,
            changed,
            "typewriter step"
        );

        if completed {
            Step::Completed { changed }
        } else {
            Step::Advanced { changed }
        }
    }

    /// Move past a fully erased phrase. Returns true when the sequence finished.
    fn advance_phrase(&mut self, now: Duration) -> bool {
        let next = self.state.phrase_index + 1;
        self.state.mode = Mode::Typing;

        if next < self.phrases.len() {
            self.state.phrase_index = next;
        } else if self.looping {
            self.state.phrase_index = 0;
            self.events.push(TypewriterEvent::Wrapped);
            crate::debug!("sequence wrapped");
        } else {
            self.state.finished = true;
            self.state.pause_until = None;
            self.events.push(TypewriterEvent::CycleComplete);
            crate::debug!(phrases = self.phrases.len(), "cycle complete");
            return true;
        }

        self.state.pause_until = Some(now.saturating_add(self.timing.pause_between_phrases));
        false
    }

    /// Currently visible text.
    #[must_use]
    pub fn text(&self) -> &str {
        project(&self.phrases, self.state.phrase_index, self.state.char_count)
    }

    /// Configured phrases.
    #[must_use]
    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// Snapshot of the timing state.
    #[must_use]
    pub fn state(&self) -> &AnimatorState {
        &self.state
    }

    /// Index of the current phrase.
    #[must_use]
    pub fn phrase_index(&self) -> usize {
        self.state.phrase_index
    }

    /// Number of visible graphemes.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.state.char_count
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    /// Whether a non-looping sequence has finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state.finished
    }

    /// Whether no further step can change anything.
    ///
    /// True once finished, and always true for an empty phrase list.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.state.finished || self.phrases.is_empty()
    }

    /// Whether a pause is active at `now`.
    #[must_use]
    pub fn is_paused(&self, now: Duration) -> bool {
        self.state.pause_until.is_some_and(|until| now < until)
    }

    /// Drain all pending events. Clears the event queue.
    pub fn drain_events(&mut self) -> Vec<TypewriterEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of pending events.
    #[must_use]
    pub fn pending_event_count(&self) -> usize {
        self.events.len()
    }

    /// Return to the initial state, re-arming completion.
    pub fn reset(&mut self) {
        self.state = AnimatorState::default();
        self.events.clear();
    }
}
