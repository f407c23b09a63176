//! In-place progress display for long-running scans.

use colored::Colorize;
use std::io::{self, IsTerminal, Write};

/// Longest item label shown next to the counter.
const MAX_LABEL: usize = 48;

/// A progress line that updates in place on TTY terminals.
///
/// With a known total it shows `Title: 42% (21/50)`; without one it shows a
/// running count and the item being visited, `Title: 21 (/docs/a.txt)`.
/// On anything but a TTY it stays silent.
pub struct Progress {
    /// Title displayed before the counter
    title: String,
    /// Total number of items, if known up front
    total: Option<usize>,
    /// Items processed so far
    current: usize,
    /// Whether stderr is a TTY (enables inline updating)
    is_tty: bool,
    /// Whether anything has been drawn on the current line
    drawn: bool,
}

impl Progress {
    /// Creates a progress display over `total` items.
    #[must_use]
    pub fn new(title: &str, total: usize) -> Self {
        Self::with_total(title, Some(total))
    }

    /// Creates a running counter for an unknown number of items.
    #[must_use]
    pub fn counter(title: &str) -> Self {
        Self::with_total(title, None)
    }

    fn with_total(title: &str, total: Option<usize>) -> Self {
        Self {
            title: title.to_string(),
            total,
            current: 0,
            is_tty: io::stderr().is_terminal(),
            drawn: false,
        }
    }

    /// Items processed so far.
    #[must_use]
    pub const fn current(&self) -> usize {
        self.current
    }

    /// Counts one more item without redrawing.
    pub fn advance(&mut self) {
        self.current = self.clamp(self.current + 1);
    }

    /// Redraws the line with `label` as the current item.
    pub fn draw(&mut self, label: &str) {
        if !self.is_tty {
            return;
        }

        eprint!("\r\x1b[2K{}", self.render(label));
        let _ = io::stderr().flush();
        self.drawn = true;
    }

    /// Erases the progress line so other output can be printed.
    pub fn clear(&mut self) {
        if self.is_tty && self.drawn {
            eprint!("\r\x1b[2K");
            let _ = io::stderr().flush();
            self.drawn = false;
        }
    }

    /// Prints the final count with a "done" suffix.
    pub fn finish(mut self) {
        self.clear();
        if self.is_tty && self.current > 0 {
            eprintln!("{}: {}, done.", self.title.dimmed(), self.current);
        }
    }

    fn clamp(&self, value: usize) -> usize {
        self.total.map_or(value, |total| value.min(total))
    }

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn render(&self, label: &str) -> String {
        match self.total {
            Some(total) if total > 0 => {
                let percent = (self.current as f64 / total as f64) * 100.0;
                format!(
                    "{}: {}% ({}/{})",
                    self.title.dimmed(),
                    (percent as u8).to_string().dimmed(),
                    self.current,
                    total
                )
            }
            _ => format!(
                "{}: {} ({})",
                self.title.dimmed(),
                self.current,
                shorten(label).dimmed()
            ),
        }
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Keeps the tail of long labels, which carries the file name.
fn shorten(label: &str) -> String {
    let count = label.chars().count();
    if count <= MAX_LABEL {
        return label.to_string();
    }
    let tail: String = label.chars().skip(count - (MAX_LABEL - 3)).collect();
    format!("...{tail}")
}
