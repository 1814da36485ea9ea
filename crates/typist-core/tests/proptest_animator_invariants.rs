//! Property-based invariant tests for the typewriter animator.
//!
//! 1. `char_count` never exceeds the current phrase length.
//! 2. At most one grapheme changes per step.
//! 3. No mutation happens while a pause is active.
//! 4. Mode changes only at the phrase boundaries.
//! 5. Non-looping sequences complete exactly once and go quiet.
//! 6. Looping sequences never complete.
//! 7. Typing N graphemes takes N acting steps spaced at least `write_speed` apart.
//! 8. Erasing N graphemes takes N acting steps spaced at least `erase_speed`
//!    apart, the first no earlier than the pause and the erase speed allow.

use std::time::Duration;

use proptest::prelude::*;
use typist_core::{Mode, Step, Typewriter, TypewriterConfig, TypewriterEvent, grapheme_len};

// ── Helpers ─────────────────────────────────────────────────────────────

fn phrase_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[a-z ]{1,12}",
        Just("e\u{301}t\u{e9}".to_string()),
        Just("👋🏽 hi".to_string()),
    ]
}

fn config_strategy() -> impl Strategy<Value = TypewriterConfig> {
    (
        prop::collection::vec(phrase_strategy(), 0..5),
        0u64..200,
        0u64..200,
        0u64..1500,
        0u64..800,
        any::<bool>(),
    )
        .prop_map(|(texts, write, erase, before, between, looping)| {
            TypewriterConfig::new(texts)
                .write_speed(Duration::from_millis(write))
                .erase_speed(Duration::from_millis(erase))
                .pause_before_delete(Duration::from_millis(before))
                .pause_between_phrases(Duration::from_millis(between))
                .looping(looping)
        })
}

fn gaps_strategy() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(0u64..120, 1..600)
}

fn current_len(tw: &Typewriter) -> usize {
    tw.phrases()
        .get(tw.phrase_index())
        .map_or(0, |p| grapheme_len(p))
}

// ═════════════════════════════════════════════════════════════════════════
// 1-4. Per-step invariants
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn per_step_invariants(config in config_strategy(), gaps in gaps_strategy()) {
        let mut tw = Typewriter::new(&config);
        let mut now = Duration::ZERO;

        for gap in gaps {
            now += Duration::from_millis(gap);
            let before = *tw.state();
            let paused = tw.is_paused(now);
            let step = tw.step(now);
            let after = *tw.state();

            prop_assert!(
                after.char_count <= current_len(&tw),
                "char_count {} exceeds phrase length {}",
                after.char_count,
                current_len(&tw)
            );

            if paused {
                prop_assert_eq!(step, Step::Paused);
                prop_assert_eq!(before.char_count, after.char_count);
                prop_assert_eq!(before.phrase_index, after.phrase_index);
            }

            if after.phrase_index == before.phrase_index {
                prop_assert!(before.char_count.abs_diff(after.char_count) <= 1);
            } else {
                // Erasing the last grapheme and moving on happen in one step.
                prop_assert!(before.char_count <= 1);
                prop_assert_eq!(after.char_count, 0);
            }

            if before.mode == Mode::Typing && after.mode == Mode::Deleting {
                prop_assert_eq!(after.char_count, current_len(&tw));
            }
            if before.mode == Mode::Deleting && after.mode == Mode::Typing {
                prop_assert_eq!(after.char_count, 0);
            }

            prop_assert_eq!(step.text_changed(), before.char_count != after.char_count);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5-6. Completion
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn completion_fires_at_most_once(config in config_strategy(), gaps in gaps_strategy()) {
        let looping = config.looping;
        let empty = config.texts.is_empty();
        let mut tw = Typewriter::new(&config);
        let mut now = Duration::ZERO;
        let mut completions = 0;
        let mut changes_after_completion = 0;

        for gap in gaps {
            now += Duration::from_millis(gap);
            let step = tw.step(now);
            if completions > 0 && step.text_changed() {
                changes_after_completion += 1;
            }
            completions += tw
                .drain_events()
                .iter()
                .filter(|e| **e == TypewriterEvent::CycleComplete)
                .count();
        }

        prop_assert!(completions <= 1);
        prop_assert_eq!(changes_after_completion, 0);
        if looping || empty {
            prop_assert_eq!(completions, 0);
        }
        if completions == 1 {
            prop_assert!(tw.is_finished());
            prop_assert_eq!(tw.text(), "");
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Typing cadence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn typing_takes_n_spaced_steps(text in "[a-z]{1,20}", write in 1u64..150) {
        let config = TypewriterConfig::new([text.clone()])
            .write_speed(Duration::from_millis(write));
        let mut tw = Typewriter::new(&config);
        let mut acted_at = Vec::new();
        let mut now = Duration::ZERO;

        while tw.mode() == Mode::Typing {
            if tw.step(now).acted() {
                acted_at.push(now);
            }
            now += Duration::from_millis(1);
        }

        prop_assert_eq!(acted_at.len(), text.len());
        prop_assert!(acted_at[0] >= Duration::from_millis(write));
        for pair in acted_at.windows(2) {
            prop_assert!(pair[1] - pair[0] >= Duration::from_millis(write));
        }
        prop_assert_eq!(tw.text(), text.as_str());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 8. Erasing cadence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn erasing_takes_n_spaced_steps(
        text in "[a-z]{1,20}",
        erase in 1u64..150,
        pause in 0u64..300,
    ) {
        let config = TypewriterConfig::new([text.clone()])
            .write_speed(Duration::from_millis(1))
            .erase_speed(Duration::from_millis(erase))
            .pause_before_delete(Duration::from_millis(pause));
        let mut tw = Typewriter::new(&config);
        let mut typed_at = Duration::ZERO;
        let mut erased_at = Vec::new();
        let mut now = Duration::ZERO;

        while !tw.is_finished() {
            let deleting = tw.mode() == Mode::Deleting;
            if tw.step(now).acted() {
                if deleting {
                    erased_at.push(now);
                } else {
                    typed_at = now;
                }
            }
            now += Duration::from_millis(1);
        }

        prop_assert_eq!(erased_at.len(), text.len());
        let first_allowed = typed_at + Duration::from_millis(pause.max(erase));
        prop_assert!(erased_at[0] >= first_allowed);
        for pair in erased_at.windows(2) {
            prop_assert!(pair[1] - pair[0] >= Duration::from_millis(erase));
        }
        prop_assert_eq!(tw.text(), "");
    }
}
