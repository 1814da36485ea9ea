#![forbid(unsafe_code)]

//! Host loop: poll input at the frame interval and tick a [`Driver`].

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use typist_runtime::Driver;

use crate::cli::Opts;
use crate::render;
use crate::session::{SessionOptions, TerminalSession};

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// The user pressed a quit key.
    Quit,
    /// `--exit-after-ms` elapsed.
    Timeout,
    /// A non-looping sequence finished, or there was nothing to type.
    Finished,
}

/// Whether `key` asks the demo to quit.
#[must_use]
pub fn is_quit_key(key: &KeyEvent) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Run the demo until it quits, times out, or finishes.
///
/// # Errors
///
/// Returns an error if the terminal cannot be set up, polled, or drawn to.
pub fn run(opts: &Opts) -> io::Result<Exit> {
    let session = TerminalSession::new(SessionOptions {
        alternate_screen: !opts.inline,
    })?;
    let mut out = io::stdout();
    let mut driver = Driver::new(&opts.config);
    let frame = opts.frame_interval();
    let deadline = (opts.exit_after_ms > 0).then(|| Duration::from_millis(opts.exit_after_ms));
    let origin = Instant::now();

    let mut size = session.size()?;
    let draw = |out: &mut io::Stdout, text: &str, size: (u16, u16)| {
        if session.is_alternate_screen() {
            render::draw_centered(out, text, size)
        } else {
            render::draw_inline(out, text, size.0)
        }
    };
    draw(&mut out, driver.text(), size)?;

    let exit = loop {
        if event::poll(frame)? {
            match event::read()? {
                Event::Key(key) if is_quit_key(&key) => break Exit::Quit,
                Event::Resize(cols, rows) => {
                    size = (cols, rows);
                    draw(&mut out, driver.text(), size)?;
                }
                _ => {}
            }
        }

        let now = origin.elapsed();
        if deadline.is_some_and(|limit| now >= limit) {
            break Exit::Timeout;
        }
        if driver.tick(now).text_changed() {
            tracing::trace!(text = driver.text(), "redraw");
            draw(&mut out, driver.text(), size)?;
        }
        for event in driver.events() {
            tracing::debug!(?event, "typewriter event");
        }
        if !driver.is_running() {
            break Exit::Finished;
        }
    };

    tracing::info!(?exit, ticks = driver.ticks(), "demo loop exited");
    drop(session);
    if opts.inline {
        println!();
    }
    Ok(exit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn quit_keys() {
        assert!(is_quit_key(&key(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(is_quit_key(&key(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(is_quit_key(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)));
    }

    #[test]
    fn other_keys_do_not_quit() {
        assert!(!is_quit_key(&key(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(!is_quit_key(&key(KeyCode::Enter, KeyModifiers::NONE)));
        let mut release = key(KeyCode::Char('q'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert!(!is_quit_key(&release));
    }
}
