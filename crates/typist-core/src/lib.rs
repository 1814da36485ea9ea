#![forbid(unsafe_code)]

//! Core: typewriter animator state machine, text projection, and configuration.
//!
//! The animator is time-agnostic: callers feed it monotonic timestamps
//! (offsets from the animator's time origin) and it advances by at most one
//! character per call. Scheduling lives in `typist-runtime`.

pub mod animator;
pub mod config;
pub mod event;
pub mod logging;

pub use animator::{AnimatorState, Mode, Step, Typewriter, grapheme_len, project};
pub use config::{ConfigError, ConfigParse, CycleHook, TypewriterConfig};
pub use event::TypewriterEvent;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, trace, warn};
