#![forbid(unsafe_code)]

//! Command-line argument parsing for the typist demo.
//!
//! Parses args manually to keep the binary lean. Precedence, lowest first:
//! built-in defaults, `TYPIST_*` animator variables (see
//! [`TypewriterConfig::from_env`]), `TYPIST_DEMO_*` host variables, then flags.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use typist_core::{ConfigError, TypewriterConfig};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HELP_TEXT: &str = "\
typist demo: typewriter text effect in the terminal

USAGE:
    typist-demo [OPTIONS]

OPTIONS:
    --text=PHRASE              Phrase to type (repeatable; default: two greetings)
    --write-speed=MS           Delay per typed character (default: 100)
    --erase-speed=MS           Delay per erased character (default: 50)
    --pause-before-delete=MS   Pause after a phrase is typed (default: 1000)
    --pause-between=MS         Pause after a phrase is erased (default: 500)
    --loop / --no-loop         Restart after the last phrase (default: loop)
    --fps=N                    Refresh rate (default: 60)
    --inline                   Draw on the current line instead of the alternate screen
    --exit-after-ms=N          Quit after N milliseconds (0 = never)
    --log-file=PATH            Write logs to PATH (filter with TYPIST_LOG)
    --help, -h                 Show this help message
    --version, -V              Show version

KEYS:
    q / Esc / Ctrl+C           Quit

ENVIRONMENT VARIABLES:
    TYPIST_WRITE_SPEED_MS, TYPIST_ERASE_SPEED_MS, TYPIST_PAUSE_BEFORE_DELETE_MS,
    TYPIST_PAUSE_BETWEEN_PHRASES_MS, TYPIST_LOOP
                               Animator defaults, overridden by flags
    TYPIST_DEMO_FPS            Override --fps
    TYPIST_DEMO_INLINE         Override --inline (1/0)
    TYPIST_DEMO_EXIT_AFTER_MS  Auto-quit after N milliseconds (for testing)
    TYPIST_LOG                 Log filter directives (default: info)";

/// Phrases shown when no `--text` is given.
pub const DEFAULT_TEXTS: [&str; 2] = ["Hello, world!", "Welcome to my site."];

const ENV_LOOP: &str = "TYPIST_LOOP";
const ENV_DEMO_FPS: &str = "TYPIST_DEMO_FPS";
const ENV_DEMO_INLINE: &str = "TYPIST_DEMO_INLINE";
const ENV_DEMO_EXIT_AFTER_MS: &str = "TYPIST_DEMO_EXIT_AFTER_MS";

/// Parsed command-line options.
#[derive(Debug, Clone)]
pub struct Opts {
    /// Animator configuration.
    pub config: TypewriterConfig,
    /// Refresh rate in frames per second.
    pub fps: u32,
    /// Draw on the current line instead of the alternate screen.
    pub inline: bool,
    /// Auto-exit after this many milliseconds (0 = disabled).
    pub exit_after_ms: u64,
    /// Log destination; logging is off without one.
    pub log_file: Option<PathBuf>,
    /// Ignored `TYPIST_*` values, reported once logging is up.
    pub env_errors: Vec<ConfigError>,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            config: TypewriterConfig::new(DEFAULT_TEXTS).looping(true),
            fps: 60,
            inline: false,
            exit_after_ms: 0,
            log_file: None,
            env_errors: Vec::new(),
        }
    }
}

/// Result of argument parsing.
#[derive(Debug)]
pub enum Parsed {
    Run(Box<Opts>),
    Help,
    Version,
}

/// Invalid command-line argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    InvalidValue { flag: &'static str, value: String },
    Unknown(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { flag, value } => write!(f, "Invalid {flag} value: {value}"),
            Self::Unknown(arg) => write!(f, "Unknown argument: {arg}"),
        }
    }
}

impl std::error::Error for CliError {}

/// Flag values before they are layered over the environment.
#[derive(Debug, Default)]
struct Flags {
    texts: Vec<String>,
    write_speed: Option<u64>,
    erase_speed: Option<u64>,
    pause_before_delete: Option<u64>,
    pause_between: Option<u64>,
    looping: Option<bool>,
    fps: Option<u32>,
    inline: bool,
    exit_after_ms: Option<u64>,
    log_file: Option<PathBuf>,
}

fn value<T: std::str::FromStr>(flag: &'static str, raw: &str) -> Result<T, CliError> {
    raw.parse().map_err(|_| CliError::InvalidValue {
        flag,
        value: raw.to_string(),
    })
}

impl Opts {
    /// Parse the process arguments and environment.
    pub fn parse() -> Result<Parsed, CliError> {
        Self::parse_from(env::args().skip(1), |key| env::var(key).ok())
    }

    /// Parse `args` (without the program name), reading variables through `get`.
    pub fn parse_from<I, F>(args: I, mut get: F) -> Result<Parsed, CliError>
    where
        I: IntoIterator<Item = String>,
        F: FnMut(&str) -> Option<String>,
    {
        let mut flags = Flags::default();

        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Parsed::Help),
                "--version" | "-V" => return Ok(Parsed::Version),
                "--loop" => flags.looping = Some(true),
                "--no-loop" => flags.looping = Some(false),
                "--inline" => flags.inline = true,
                other => {
                    if let Some(val) = other.strip_prefix("--text=") {
                        flags.texts.push(val.to_string());
                    } else if let Some(val) = other.strip_prefix("--write-speed=") {
                        flags.write_speed = Some(value("--write-speed", val)?);
                    } else if let Some(val) = other.strip_prefix("--erase-speed=") {
                        flags.erase_speed = Some(value("--erase-speed", val)?);
                    } else if let Some(val) = other.strip_prefix("--pause-before-delete=") {
                        flags.pause_before_delete = Some(value("--pause-before-delete", val)?);
                    } else if let Some(val) = other.strip_prefix("--pause-between=") {
                        flags.pause_between = Some(value("--pause-between", val)?);
                    } else if let Some(val) = other.strip_prefix("--fps=") {
                        flags.fps = Some(value("--fps", val)?);
                    } else if let Some(val) = other.strip_prefix("--exit-after-ms=") {
                        flags.exit_after_ms = Some(value("--exit-after-ms", val)?);
                    } else if let Some(val) = other.strip_prefix("--log-file=") {
                        flags.log_file = Some(PathBuf::from(val));
                    } else {
                        return Err(CliError::Unknown(other.to_string()));
                    }
                }
            }
        }

        Ok(Parsed::Run(Box::new(Self::layer(flags, &mut get))))
    }

    fn layer<F>(flags: Flags, get: &mut F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        let texts = if flags.texts.is_empty() {
            DEFAULT_TEXTS.iter().map(|t| (*t).to_string()).collect()
        } else {
            flags.texts
        };
        let env_loop_set = get(ENV_LOOP).is_some();
        let parse = TypewriterConfig::from_env_with(texts, &mut *get);
        let mut config = parse.config;
        opts.env_errors = parse.errors;

        // The demo loops unless told otherwise.
        if !env_loop_set {
            config.looping = true;
        }

        if let Some(ms) = flags.write_speed {
            config.write_speed = Duration::from_millis(ms);
        }
        if let Some(ms) = flags.erase_speed {
            config.erase_speed = Duration::from_millis(ms);
        }
        if let Some(ms) = flags.pause_before_delete {
            config.pause_before_delete = Duration::from_millis(ms);
        }
        if let Some(ms) = flags.pause_between {
            config.pause_between_phrases = Duration::from_millis(ms);
        }
        if let Some(looping) = flags.looping {
            config.looping = looping;
        }
        opts.config = config;

        if let Some(n) = get(ENV_DEMO_FPS).and_then(|v| v.trim().parse().ok()) {
            opts.fps = n;
        }
        if let Some(v) = get(ENV_DEMO_INLINE) {
            opts.inline = matches!(v.trim(), "1" | "true");
        }
        if let Some(n) = get(ENV_DEMO_EXIT_AFTER_MS).and_then(|v| v.trim().parse().ok()) {
            opts.exit_after_ms = n;
        }

        if let Some(fps) = flags.fps {
            opts.fps = fps;
        }
        if flags.inline {
            opts.inline = true;
        }
        if let Some(ms) = flags.exit_after_ms {
            opts.exit_after_ms = ms;
        }
        opts.log_file = flags.log_file;
        opts.fps = opts.fps.max(1);
        opts
    }

    /// Time between refresh ticks.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.fps
    }
}
