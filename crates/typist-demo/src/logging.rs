#![forbid(unsafe_code)]

//! Log setup for the demo.
//!
//! The terminal is owned by the animation, so logs only go to a file given
//! with `--log-file`. Without one no subscriber is installed.

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Environment variable holding filter directives.
pub const LOG_ENV: &str = "TYPIST_LOG";

const DEFAULT_DIRECTIVES: &str = "info";

/// Filter from [`LOG_ENV`], falling back to `info` when unset or invalid.
#[must_use]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Install a global subscriber writing plain-text events to `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be created or a global subscriber is
/// already set.
pub fn init_file(path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_thread_names(true)
        .with_writer(Mutex::new(file));
    tracing_subscriber::registry()
        .with(layer)
        .with(env_filter())
        .try_init()
        .map_err(io::Error::other)
}
