//! Terminal sink for reconciliation reports.

use super::{Progress, info, warning};
use crate::reconcile::ActionCallback;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Prints reconciliation messages and shows a running item counter.
///
/// Important messages become warnings, the rest informational lines.
/// Setting the shared `cancel` flag (e.g. from a Ctrl-C handler) makes the
/// next progress poll stop the running operation.
pub struct ConsoleCallback {
    progress: Progress,
    cancel: Arc<AtomicBool>,
    /// Ticks skipped between redraws
    skip: usize,
    /// Ticks since the last redraw
    counter: usize,
    /// Number of important messages seen
    problems: usize,
}

impl ConsoleCallback {
    /// A sink with a running counter for an unknown number of items.
    #[must_use]
    pub fn new(title: &str, cancel: Arc<AtomicBool>) -> Self {
        Self::with_progress(Progress::counter(title), cancel)
    }

    /// A sink showing a percentage over `total` items.
    #[must_use]
    pub fn with_total(title: &str, total: usize, cancel: Arc<AtomicBool>) -> Self {
        Self::with_progress(Progress::new(title, total), cancel)
    }

    fn with_progress(progress: Progress, cancel: Arc<AtomicBool>) -> Self {
        Self {
            progress,
            cancel,
            skip: 0,
            counter: 0,
            problems: 0,
        }
    }

    /// Number of important messages reported so far.
    #[must_use]
    pub const fn problems(&self) -> usize {
        self.problems
    }

    /// Whether a stop was requested through the shared flag.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Closes the progress line.
    pub fn finish(self) {
        self.progress.finish();
    }
}

impl ActionCallback for ConsoleCallback {
    fn progress(&mut self, label: &str) -> bool {
        if self.is_cancelled() {
            return false;
        }

        self.progress.advance();
        self.counter += 1;
        if self.counter > self.skip {
            self.progress.draw(label);
            self.counter = 0;
        }

        true
    }

    fn log_message(&mut self, message: &str, important: bool) {
        self.progress.clear();
        if important {
            self.problems += 1;
            warning(message);
        } else {
            info(message);
        }
    }

    fn set_progress_skip(&mut self, skip: usize) {
        self.skip = skip;
        self.counter = self.counter.min(skip);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_flag_stops_progress() {
        let cancel = Arc::new(AtomicBool::new(false));
        let mut sink = ConsoleCallback::new("Test", Arc::clone(&cancel));
        assert!(sink.progress("/a"));

        cancel.store(true, Ordering::Relaxed);
        assert!(!sink.progress("/b"));
        assert!(sink.is_cancelled());
    }

    #[test]
    fn test_counts_important_messages() {
        let mut sink = ConsoleCallback::new("Test", Arc::new(AtomicBool::new(false)));
        sink.log_message("fine", false);
        sink.log_message("Missing File: /x", true);
        assert_eq!(sink.problems(), 1);
    }

    #[test]
    fn test_progress_skip_limits_counter() {
        let mut sink = ConsoleCallback::new("Test", Arc::new(AtomicBool::new(false)));
        sink.set_progress_skip(3);
        for label in ["/a", "/b", "/c"] {
            assert!(sink.progress(label));
        }
        assert_eq!(sink.counter, 3);
        assert!(sink.progress("/d"));
        assert_eq!(sink.counter, 0);
        assert_eq!(sink.progress.current(), 4);

        sink.set_progress_skip(1);
        sink.progress("/e");
        sink.set_progress_skip(0);
        assert_eq!(sink.counter, 0);
    }
}
