//! Version strings and their ordering.
//!
//! A version string is split into maximal runs of ASCII digits or ASCII
//! letters. Every other character separates parts, and a switch between
//! digits and letters is a boundary on its own, so `1.0beta2` yields the
//! parts `1`, `0`, `beta`, `2`.
//!
//! Each part is ranked by [`part_value`]:
//!
//! - pre-release keywords (`alpha`, `beta`, `pre`, `rc`) rank below zero
//! - single letters and `final` rank between zero and one
//! - plain numbers rank above every keyword
//!
//! so that `1.0alpha < 1.0beta < 1.0 < 1.0a < 1.0final < 1.0.1`.

use std::cmp::Ordering;
use std::fmt;

/// Keywords marking a release that comes before the baseline.
const PRE_RELEASE: [&str; 4] = ["alpha", "beta", "pre", "rc"];

/// Keywords marking a release after the baseline but before the next number.
const POST_RELEASE: [&str; 27] = [
    "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o", "p", "q", "r", "s",
    "t", "u", "v", "w", "x", "y", "z", "final",
];

/// A parsed version string.
///
/// The original text is kept verbatim for display and persistence. A
/// version without any parts is considered unset, see [`Version::is_ok`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Version {
    /// Original text, empty when no part could be parsed
    text: String,
    /// Ranked parts in order of appearance
    parts: Vec<i64>,
}

/// Kind of the run currently being collected.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Run {
    None,
    Digits,
    Letters,
}

impl Version {
    /// Parses `text` into a new version.
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut version = Self::default();
        version.set(text);
        version
    }

    /// Replaces the version with the parsed form of `text`.
    ///
    /// The text is retained only if at least one part was produced,
    /// otherwise the version becomes unset.
    pub fn set(&mut self, text: &str) {
        self.parts.clear();

        let mut segment = String::new();
        let mut run = Run::None;

        for ch in text.chars() {
            let next = if ch.is_ascii_digit() {
                Run::Digits
            } else if ch.is_ascii_alphabetic() {
                Run::Letters
            } else {
                Run::None
            };

            if next != run && !segment.is_empty() {
                self.parts.push(part_value(&segment));
                segment.clear();
            }

            run = next;
            if run != Run::None {
                segment.push(ch);
            }
        }

        if !segment.is_empty() {
            self.parts.push(part_value(&segment));
        }

        if self.parts.is_empty() {
            self.text.clear();
        } else {
            self.text = text.to_string();
        }
    }

    /// The original text, or an empty string when unset.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Ranked parts of the version.
    #[must_use]
    pub fn parts(&self) -> &[i64] {
        &self.parts
    }

    /// Whether the version holds at least one part.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        !self.parts.is_empty()
    }

    /// Compares two versions part by part.
    ///
    /// The shorter sequence is padded with zeros, so `1.0` and `1.0.0`
    /// compare equal.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        let len = self.parts.len().max(other.parts.len());

        (0..len)
            .map(|pos| {
                let lhs = self.parts.get(pos).copied().unwrap_or(0);
                let rhs = other.parts.get(pos).copied().unwrap_or(0);
                lhs.cmp(&rhs)
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for Version {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Ranks a single version segment.
///
/// Keywords are matched case-insensitively. Numbers that do not fit an
/// `i64` saturate instead of wrapping.
#[must_use]
#[allow(clippy::cast_possible_wrap)] // keyword lists are tiny constants
pub fn part_value(segment: &str) -> i64 {
    let lower = segment.to_ascii_lowercase();

    if let Some(index) = PRE_RELEASE.iter().position(|kw| *kw == lower) {
        return index as i64 - PRE_RELEASE.len() as i64;
    }

    if let Some(index) = POST_RELEASE.iter().position(|kw| *kw == lower) {
        return index as i64 + 1;
    }

    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }

    let digits = segment.trim_start_matches('0');
    if digits.is_empty() {
        return 0;
    }

    digits
        .parse::<i64>()
        .unwrap_or(i64::MAX)
        .saturating_add(POST_RELEASE.len() as i64)
}
