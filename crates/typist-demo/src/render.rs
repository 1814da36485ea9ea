#![forbid(unsafe_code)]

//! Drawing the animated text.

use std::io::{self, Write};

use crossterm::{cursor, queue, style, terminal};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Caret drawn after the text.
pub const CARET: char = '▌';

/// Longest prefix of `text` that fits in `cols` cells, leaving one for the caret.
///
/// Cuts only between grapheme clusters.
#[must_use]
pub fn fit(text: &str, cols: u16) -> &str {
    let budget = usize::from(cols.saturating_sub(1));
    let mut used = 0;
    for (idx, grapheme) in text.grapheme_indices(true) {
        used += grapheme.width();
        if used > budget {
            return &text[..idx];
        }
    }
    text
}

/// Top-left cell for `text` plus caret, centered in a `cols` x `rows` area.
#[must_use]
pub fn centered_origin(text: &str, cols: u16, rows: u16) -> (u16, u16) {
    let width = u16::try_from(text.width() + 1).unwrap_or(u16::MAX);
    (cols.saturating_sub(width) / 2, rows / 2)
}

/// Redraw the full screen with `text` centered.
pub fn draw_centered<W: Write>(out: &mut W, text: &str, (cols, rows): (u16, u16)) -> io::Result<()> {
    let text = fit(text, cols);
    let (x, y) = centered_origin(text, cols, rows);
    queue!(
        out,
        terminal::Clear(terminal::ClearType::All),
        cursor::MoveTo(x, y),
        style::Print(text),
        style::Print(CARET),
    )?;
    out.flush()
}

/// Redraw the current line with `text`.
pub fn draw_inline<W: Write>(out: &mut W, text: &str, cols: u16) -> io::Result<()> {
    queue!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(terminal::ClearType::CurrentLine),
        style::Print(fit(text, cols)),
        style::Print(CARET),
    )?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_keeps_short_text() {
        assert_eq!(fit("Hello", 80), "Hello");
        assert_eq!(fit("", 0), "");
    }

    #[test]
    fn fit_truncates_by_cell_width() {
        assert_eq!(fit("Hello", 4), "Hel");
        // Wide characters take two cells each.
        assert_eq!(fit("日本語", 6), "日本");
        assert_eq!(fit("日本語", 5), "日本");
        assert_eq!(fit("日本語", 4), "日");
    }

    fn ends_on_grapheme_boundary(text: &str, prefix: &str) -> bool {
        prefix.len() == text.len() || text.grapheme_indices(true).any(|(idx, _)| idx == prefix.len())
    }

    #[test]
    fn fit_never_splits_a_cluster() {
        let accented = "xe\u{301}y";
        assert_eq!(fit(accented, 3), "xe\u{301}");
        assert_eq!(fit(accented, 2), "x");

        let family = "\u{1f469}\u{200d}\u{1f469}z";
        for cols in 0..8 {
            let prefix = fit(family, cols);
            assert!(ends_on_grapheme_boundary(family, prefix), "cols={cols}: {prefix:?}");
            assert!(!prefix.ends_with('\u{200d}'));
        }
    }

    #[test]
    fn origin_is_centered() {
        assert_eq!(centered_origin("Hi", 11, 5), (4, 2));
        assert_eq!(centered_origin("", 10, 1), (4, 0));
        assert_eq!(centered_origin("toolong", 3, 2), (0, 1));
    }

    #[test]
    fn inline_draw_emits_text_and_caret() {
        let mut out = Vec::new();
        draw_inline(&mut out, "Hi", 80).unwrap();
        let written = String::from_utf8(out).unwrap();
        assert!(written.ends_with("Hi▌"));
    }

    #[test]
    fn centered_draw_moves_cursor() {
        let mut out = Vec::new();
        draw_centered(&mut out, "Hi", (11, 5)).unwrap();
        let written = String::from_utf8(out).unwrap();
        // MoveTo is 1-based on the wire.
        assert!(written.contains("\x1b[3;5H"));
        assert!(written.ends_with("Hi▌"));
    }
}
