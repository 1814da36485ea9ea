#![forbid(unsafe_code)]

//! typist runtime
//!
//! Schedules a [`typist_core::Typewriter`] on refresh ticks.
//!
//! # Key Components
//!
//! - [`Driver`] - Cooperative driver for hosts that own a frame loop
//! - [`spawn`] - Runs a driver on a background thread
//! - [`TypewriterHandle`] - Observes and cancels a spawned animator
//! - [`RefreshSource`] - Trait for "next refresh opportunity" sources
//! - [`FixedRate`] - Built-in fixed-interval refresh source
//! - [`Scripted`] - Deterministic refresh source for tests
//!
//! # Example
//!
//! ```no_run
//! use typist_core::TypewriterConfig;
//! use typist_runtime::{FixedRate, Update, spawn};
//!
//! let config = TypewriterConfig::new(["Hello, world!", "Welcome to my site."]).looping(true);
//! let handle = spawn(config, FixedRate::default())?;
//! for update in handle.updates() {
//!     if let Update::Text(text) = update {
//!         println!("{text}");
//!     }
//! }
//! # Ok::<(), std::io::Error>(())
//! ```

pub mod driver;
pub mod handle;
pub mod refresh;

pub use driver::Driver;
pub use handle::{TypewriterHandle, UPDATE_CAPACITY, Update, spawn};
pub use refresh::{DEFAULT_FRAME_INTERVAL, FixedRate, RefreshSource, Scripted, StopSignal};
