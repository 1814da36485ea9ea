#![forbid(unsafe_code)]

//! Typewriter configuration.
//!
//! Built with [`TypewriterConfig::new`] and builder setters, or seeded from
//! environment variables with [`TypewriterConfig::from_env`]:
//!
//! - `TYPIST_WRITE_SPEED_MS` (u64)
//! - `TYPIST_ERASE_SPEED_MS` (u64)
//! - `TYPIST_PAUSE_BEFORE_DELETE_MS` (u64)
//! - `TYPIST_PAUSE_BETWEEN_PHRASES_MS` (u64)
//! - `TYPIST_LOOP` (bool)
//!
//! Invalid values are reported as [`ConfigError`]s and leave the default in place.

use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

const ENV_WRITE_SPEED: &str = "TYPIST_WRITE_SPEED_MS";
const ENV_ERASE_SPEED: &str = "TYPIST_ERASE_SPEED_MS";
const ENV_PAUSE_BEFORE_DELETE: &str = "TYPIST_PAUSE_BEFORE_DELETE_MS";
const ENV_PAUSE_BETWEEN_PHRASES: &str = "TYPIST_PAUSE_BETWEEN_PHRASES_MS";
const ENV_LOOP: &str = "TYPIST_LOOP";

/// Default delay between typed characters.
pub const DEFAULT_WRITE_SPEED: Duration = Duration::from_millis(100);
/// Default delay between erased characters.
pub const DEFAULT_ERASE_SPEED: Duration = Duration::from_millis(50);
/// Default pause after a phrase is fully typed.
pub const DEFAULT_PAUSE_BEFORE_DELETE: Duration = Duration::from_millis(1000);
/// Default pause after a phrase is fully erased.
pub const DEFAULT_PAUSE_BETWEEN_PHRASES: Duration = Duration::from_millis(500);

/// Zero-argument notification invoked when a non-looping sequence finishes.
pub type CycleHook = Arc<dyn Fn() + Send + Sync>;

/// Configuration for a [`Typewriter`](crate::Typewriter).
#[derive(Clone)]
pub struct TypewriterConfig {
    /// Phrases typed one after another.
    pub texts: Vec<String>,
    /// Delay per typed character.
    pub write_speed: Duration,
    /// Delay per erased character.
    pub erase_speed: Duration,
    /// Pause after a phrase is fully typed, before erasing starts.
    pub pause_before_delete: Duration,
    /// Pause after a phrase is fully erased, before the next one is typed.
    pub pause_between_phrases: Duration,
    /// Restart from the first phrase after the last one is erased.
    pub looping: bool,
    /// Invoked once when a non-looping sequence finishes.
    pub on_cycle_complete: Option<CycleHook>,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            texts: Vec::new(),
            write_speed: DEFAULT_WRITE_SPEED,
            erase_speed: DEFAULT_ERASE_SPEED,
            pause_before_delete: DEFAULT_PAUSE_BEFORE_DELETE,
            pause_between_phrases: DEFAULT_PAUSE_BETWEEN_PHRASES,
            looping: false,
            on_cycle_complete: None,
        }
    }
}

impl fmt::Debug for TypewriterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypewriterConfig")
            .field("texts", &self.texts)
            .field("write_speed", &self.write_speed)
            .field("erase_speed", &self.erase_speed)
            .field("pause_before_delete", &self.pause_before_delete)
            .field("pause_between_phrases", &self.pause_between_phrases)
            .field("looping", &self.looping)
            .field("on_cycle_complete", &self.on_cycle_complete.is_some())
            .finish()
    }
}

impl TypewriterConfig {
    /// Create a configuration for the given phrases with default timing.
    #[must_use]
    pub fn new<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            texts: texts.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Set the delay per typed character.
    #[must_use]
    pub fn write_speed(mut self, speed: Duration) -> Self {
        self.write_speed = speed;
        self
    }

    /// Set the delay per erased character.
    #[must_use]
    pub fn erase_speed(mut self, speed: Duration) -> Self {
        self.erase_speed = speed;
        self
    }

    /// Set the pause between finishing a phrase and erasing it.
    #[must_use]
    pub fn pause_before_delete(mut self, pause: Duration) -> Self {
        self.pause_before_delete = pause;
        self
    }

    /// Set the pause between erasing a phrase and typing the next.
    #[must_use]
    pub fn pause_between_phrases(mut self, pause: Duration) -> Self {
        self.pause_between_phrases = pause;
        self
    }

    /// Enable or disable looping.
    #[must_use]
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Set the completion hook.
    #[must_use]
    pub fn on_cycle_complete(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_cycle_complete = Some(Arc::new(hook));
        self
    }

    /// Create a configuration for `texts` with timing overrides read from the
    /// process environment. Parse failures are logged and dropped.
    #[must_use]
    pub fn from_env<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let parse = Self::from_env_with(texts, |key| env::var(key).ok());
        #[cfg(feature = "tracing")]
        for error in &parse.errors {
            crate::warn!(field = error.field, value = %error.value, "{}", error.message);
        }
        parse.config
    }

    /// Like [`from_env`](Self::from_env), reading variables through `get` and
    /// returning diagnostics instead of logging them.
    pub fn from_env_with<I, S, F>(texts: I, mut get: F) -> ConfigParse
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: FnMut(&str) -> Option<String>,
    {
        let mut config = Self::new(texts);
        let mut errors = Vec::new();

        let millis = [
            (ENV_WRITE_SPEED, "write_speed", &mut config.write_speed),
            (ENV_ERASE_SPEED, "erase_speed", &mut config.erase_speed),
            (
                ENV_PAUSE_BEFORE_DELETE,
                "pause_before_delete",
                &mut config.pause_before_delete,
            ),
            (
                ENV_PAUSE_BETWEEN_PHRASES,
                "pause_between_phrases",
                &mut config.pause_between_phrases,
            ),
        ];
        for (key, field, slot) in millis {
            if let Some(value) = get(key) {
                match parse_millis(&value) {
                    Some(parsed) => *slot = parsed,
                    None => errors.push(ConfigError::new(
                        field,
                        value,
                        "expected milliseconds as a non-negative integer",
                    )),
                }
            }
        }

        if let Some(value) = get(ENV_LOOP) {
            match parse_bool(&value) {
                Some(parsed) => config.looping = parsed,
                None => errors.push(ConfigError::new(
                    "looping",
                    value,
                    "expected bool (1/0/true/false)",
                )),
            }
        }

        ConfigParse { config, errors }
    }

    /// Report configurations that will never display anything.
    ///
    /// An empty phrase list is accepted by the animator (it stays idle); this
    /// lets hosts surface the mistake.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();
        if self.texts.is_empty() {
            errors.push(ConfigError::new(
                "texts",
                "[]",
                "expected at least one phrase",
            ));
        } else if self.texts.iter().all(String::is_empty) {
            errors.push(ConfigError::new(
                "texts",
                format!("{:?}", self.texts),
                "every phrase is empty",
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Configuration parse diagnostics.
#[derive(Debug, Clone)]
pub struct ConfigParse {
    pub config: TypewriterConfig,
    pub errors: Vec<ConfigError>,
}

/// Configuration error with field context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub field: &'static str,
    pub value: String,
    pub message: String,
}

impl ConfigError {
    fn new(field: &'static str, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} ({})", self.field, self.value, self.message)
    }
}

impl std::error::Error for ConfigError {}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[inline]
fn parse_millis(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_millis)
}
