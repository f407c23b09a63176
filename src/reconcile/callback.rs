//! Progress/log sink used by every reconciliation operation.

use std::fmt;

/// Why an operation stopped before visiting every item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Halt {
    /// The sink asked to stop
    Cancelled,
    /// A checksum algorithm name was not recognised
    UnknownAlgorithm(String),
}

impl fmt::Display for Halt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(f, "Operation cancelled"),
            Self::UnknownAlgorithm(name) => write!(f, "Unknown checksum type: {name}"),
        }
    }
}

impl std::error::Error for Halt {}

/// Result of a reconciliation operation. `Ok` means it ran to completion.
pub type Outcome = Result<(), Halt>;

/// Receiver of per-item progress and log messages.
pub trait ActionCallback {
    /// Called before each visited item; returning `false` stops the
    /// operation at this checkpoint.
    fn progress(&mut self, label: &str) -> bool;

    /// Records a message. `important` marks problems the user should see.
    fn log_message(&mut self, message: &str, important: bool);

    /// Redraw progress only every `skip` ticks.
    fn set_progress_skip(&mut self, _skip: usize) {}
}

/// Polls the sink and turns a stop request into [`Halt::Cancelled`].
pub(crate) fn checkpoint(callback: &mut dyn ActionCallback, label: &str) -> Outcome {
    if callback.progress(label) {
        Ok(())
    } else {
        Err(Halt::Cancelled)
    }
}

/// One recorded log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub message: String,
    pub important: bool,
}

/// Sink that keeps everything in memory.
///
/// Useful for tests and for callers that want to post-process the report.
#[derive(Debug, Default)]
pub struct RecordingCallback {
    entries: Vec<LogEntry>,
    labels: Vec<String>,
    stop_after: Option<usize>,
}

impl RecordingCallback {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that allows `ticks` progress calls and refuses every later one.
    #[must_use]
    pub fn stop_after(ticks: usize) -> Self {
        Self {
            stop_after: Some(ticks),
            ..Self::default()
        }
    }

    /// Every recorded entry in order.
    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Message texts in order.
    #[must_use]
    pub fn messages(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.message.as_str()).collect()
    }

    /// Texts of important messages only.
    #[must_use]
    pub fn important(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.important)
            .map(|e| e.message.as_str())
            .collect()
    }

    /// Labels passed to [`ActionCallback::progress`].
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Drops recorded entries and labels.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.labels.clear();
    }
}

impl ActionCallback for RecordingCallback {
    fn progress(&mut self, label: &str) -> bool {
        self.labels.push(label.to_string());
        self.stop_after.is_none_or(|limit| self.labels.len() <= limit)
    }

    fn log_message(&mut self, message: &str, important: bool) {
        self.entries.push(LogEntry {
            message: message.to_string(),
            important,
        });
    }
}
