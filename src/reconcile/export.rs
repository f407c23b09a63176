//! Plain-text reports of the catalogue.
//!
//! Two documents are produced for a subtree. The checksum manifest holds
//! one BSD-style tagged line per hashed file (`SHA256 (docs/a.txt) = ...`),
//! the form `cksum --tag` writes and `cksum --check` reads back from the
//! collection root. The info report lists every directory and file with
//! its size, checksum, packages, dependencies and description.

use super::callback::{ActionCallback, Halt, checkpoint};
use super::item_name;
use crate::tree::{Collection, NodeId};
use std::fmt::Write as _;
use tracing::{Level, debug, span};

/// Column at which descriptions are wrapped in the info report.
pub const WRAP_WIDTH: usize = 75;

/// Rendered export documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Export {
    /// Checksum manifest
    pub checksums: String,
    /// Human readable info report
    pub info: String,
    /// Files listed in the manifest
    pub hashed: usize,
    /// Files skipped for lack of a checksum
    pub unhashed: usize,
}

/// Renders the checksum manifest and info report for `dir`.
///
/// Files without a stored checksum are logged and left out of the
/// manifest; they still appear in the info report.
///
/// # Errors
///
/// Returns `Halt::Cancelled` when the callback requests a stop.
pub fn export(
    collection: &Collection,
    dir: NodeId,
    callback: &mut dyn ActionCallback,
) -> Result<Export, Halt> {
    let span = span!(Level::DEBUG, "export");
    let _guard = span.enter();

    let mut export = Export::default();

    for (index, id) in collection.subtree(dir).into_iter().enumerate() {
        let name = item_name(collection, id);
        checkpoint(callback, &name)?;

        if index > 0 {
            export.info.push('\n');
        }

        let Some(file) = collection.file(id) else {
            let _ = writeln!(export.info, "Directory: {name}");
            continue;
        };

        let _ = writeln!(export.info, "File: {name}");
        if file.has_size() {
            let _ = writeln!(export.info, "Size: {}", file.size());
        }
        if !file.checksum().is_empty() {
            let _ = writeln!(export.info, "Checksum: {}", file.checksum());
        }

        let packages = file.packages();
        if !packages.is_empty() {
            let list: Vec<String> = packages.iter().map(|p| p.display_string()).collect();
            let _ = writeln!(export.info, "Provides: {}", list.join(", "));
        }

        let dependencies = file.dependencies();
        if !dependencies.is_empty() {
            let list: Vec<String> = dependencies.iter().map(|d| d.display_string()).collect();
            let _ = writeln!(export.info, "Depends: {}", list.join(", "));
        }

        if !file.description().is_empty() {
            export.info.push_str("Description:\n");
            for line in wrap(file.description(), WRAP_WIDTH) {
                let _ = writeln!(export.info, "  {line}");
            }
        }

        match file.checksum().split_once(':') {
            Some((algorithm, digest)) if !digest.is_empty() => {
                let relative = name.trim_start_matches('/');
                let _ = writeln!(export.checksums, "{algorithm} ({relative}) = {digest}");
                export.hashed += 1;
            }
            _ => {
                callback.log_message(&format!("Missing Checksum: {name}"), false);
                export.unhashed += 1;
            }
        }
    }

    debug!(hashed = export.hashed, unhashed = export.unhashed, "export rendered");
    Ok(export)
}

/// Greedy word wrap; words longer than `width` get a line of their own.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
