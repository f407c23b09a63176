//! Reconciliation of the catalogued tree against the live filesystem.
//!
//! Every operation walks a subtree, polls the [`ActionCallback`] once per
//! visited item and reports findings through it. A stop request surfaces as
//! `Err(Halt::Cancelled)` and is propagated with `?` through every
//! recursive call. Changes already applied to earlier items are kept.
//!
//! Per-item I/O problems are logged as important messages and the
//! operation carries on with the next item.

pub mod callback;
pub mod checksums;
pub mod export;
pub mod rename;

pub use callback::{ActionCallback, Halt, LogEntry, Outcome, RecordingCallback};
pub use checksums::{
    calculate_checksums, calculate_checksums_in, verify_checksums, verify_checksums_in,
};
pub use export::{Export, export};
pub use rename::{
    AcceptAll, RenameCandidate, RenamePicker, find_rename_candidates, rename_missing_items,
};

use crate::tree::{Collection, NAME_SEPARATOR, NodeId, NodeKind};
use anyhow::{Context, Result};
use callback::checkpoint;
use glob::{MatchOptions, Pattern};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, span};
use walkdir::WalkDir;

/// Separator line written between the stages of [`verify_sanity`].
pub const SEPARATOR: &str = "-----------------------------------------------------------";

/// Name used in messages and progress labels; the root shows as `/`.
pub(crate) fn item_name(collection: &Collection, id: NodeId) -> String {
    let name = collection[id].full_name();
    if name.is_empty() {
        NAME_SEPARATOR.to_string()
    } else {
        name.to_string()
    }
}

/// Kind of a real directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryKind {
    File,
    Directory,
}

/// A real entry directly inside a directory.
#[derive(Debug, Clone)]
pub(crate) struct RealEntry {
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
}

/// Lists the immediate entries of `dir`, sorted by name.
///
/// Symlinks are never followed and are skipped along with anything else
/// that is neither a plain file nor a directory, and with names that are
/// not valid UTF-8.
pub(crate) fn list_entries(dir: &Path) -> std::result::Result<Vec<RealEntry>, walkdir::Error> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type();

        let kind = if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            if file_type.is_symlink() {
                debug!(path = %path.display(), "skipping symlink");
            }
            continue;
        };

        let Some(name) = entry.file_name().to_str() else {
            debug!(path = %path.display(), "skipping non UTF-8 entry");
            continue;
        };

        entries.push(RealEntry {
            name: name.to_string(),
            path: path.to_path_buf(),
            kind,
        });
    }

    Ok(entries)
}

/// Whether `path` is the collection file or its backup.
pub(crate) fn is_collection_file(collection: &Collection, path: &Path) -> bool {
    path == collection.filename() || path == collection.backup_filename()
}

/// Logs every node of the subtree (including `dir`) missing on disk.
pub fn find_missing_items(
    collection: &Collection,
    dir: NodeId,
    callback: &mut dyn ActionCallback,
) -> Outcome {
    let span = span!(Level::DEBUG, "find_missing_items");
    let _guard = span.enter();

    for id in collection.subtree(dir) {
        let name = item_name(collection, id);
        checkpoint(callback, &name)?;

        if !collection.exists(id) {
            let message = if collection[id].is_directory() {
                format!("Missing Directory: {name}")
            } else {
                format!("Missing File: {name}")
            };
            callback.log_message(&message, true);
        }
    }

    Ok(())
}

/// Logs files that are missing, have no recorded size, or whose recorded
/// size differs from the size on disk.
pub fn find_wrong_sizes(
    collection: &Collection,
    dir: NodeId,
    callback: &mut dyn ActionCallback,
) -> Outcome {
    let span = span!(Level::DEBUG, "find_wrong_sizes");
    let _guard = span.enter();

    for id in collection.files(dir, true) {
        let name = item_name(collection, id);
        checkpoint(callback, &name)?;

        let Some(file) = collection.file(id) else {
            continue;
        };

        let message = if !collection.exists(id) {
            format!("Missing File: {name}")
        } else if !file.has_size() {
            format!("No Size Information: {name}")
        } else if file.size() != collection.real_size(id) {
            format!("Mismatched Size: {name}")
        } else {
            continue;
        };

        callback.log_message(&message, true);
    }

    Ok(())
}

/// Logs every file whose metadata is flagged dirty.
pub fn find_dirty_files(
    collection: &Collection,
    dir: NodeId,
    callback: &mut dyn ActionCallback,
) -> Outcome {
    for id in collection.files(dir, true) {
        let name = item_name(collection, id);
        checkpoint(callback, &name)?;

        if collection.file(id).is_some_and(|f| f.is_dirty()) {
            callback.log_message(&format!("Dirty File: {name}"), true);
        }
    }

    Ok(())
}

/// Logs real files and directories not yet in the tree, attaching them
/// when `add` is set.
///
/// Only the immediate entries of each directory are compared; the scan
/// then continues in every directory child of the tree. A directory that
/// is missing on disk is reported and not descended into.
pub fn find_new_items(
    collection: &mut Collection,
    dir: NodeId,
    callback: &mut dyn ActionCallback,
    add: bool,
) -> Outcome {
    let span = span!(Level::DEBUG, "find_new_items", add);
    let _guard = span.enter();

    let dir_name = item_name(collection, dir);
    if !collection.exists(dir) {
        callback.log_message(&format!("Missing Directory: {dir_name}"), true);
        return Ok(());
    }

    let entries = match list_entries(collection[dir].full_path()) {
        Ok(entries) => entries,
        Err(err) => {
            debug!(error = %err, "listing failed");
            callback.log_message(&format!("Read Failed: {dir_name}"), true);
            return Ok(());
        }
    };

    for entry in entries {
        if is_collection_file(collection, &entry.path) {
            continue;
        }

        checkpoint(callback, &entry.path.display().to_string())?;

        let (known, label) = match entry.kind {
            EntryKind::File => (collection.has_file(dir, &entry.name), "New File"),
            EntryKind::Directory => {
                (collection.has_directory(dir, &entry.name), "New Directory")
            }
        };
        if known {
            continue;
        }

        let full_name = if dir == collection.root() {
            format!("{NAME_SEPARATOR}{}", entry.name)
        } else {
            format!("{dir_name}{NAME_SEPARATOR}{}", entry.name)
        };
        callback.log_message(&format!("{label}: {full_name}"), !add);

        if add {
            add_entry(collection, dir, &entry, callback);
        }
    }

    for sub in collection.directories(dir, false) {
        checkpoint(callback, &item_name(collection, sub))?;
        find_new_items(collection, sub, callback, add)?;
    }

    Ok(())
}

/// Creates and attaches the node for a newly discovered entry.
fn add_entry(
    collection: &mut Collection,
    dir: NodeId,
    entry: &RealEntry,
    callback: &mut dyn ActionCallback,
) {
    let kind = match entry.kind {
        EntryKind::File => NodeKind::File(crate::tree::FileData::default()),
        EntryKind::Directory => NodeKind::Directory(crate::tree::DirectoryData::default()),
    };
    let id = collection.alloc(&entry.name, kind);

    if let Err(err) = collection.add_child(dir, id) {
        callback.log_message(&format!("Add Failed: {}: {err}", entry.name), true);
        return;
    }

    if entry.kind == EntryKind::File {
        let size = collection.real_size(id);
        if let Err(err) = collection.set_size(id, size) {
            debug!(error = %err, "size update failed");
        }
    }
}

/// [`find_new_items`] with `add` set.
pub fn add_new_items(
    collection: &mut Collection,
    dir: NodeId,
    callback: &mut dyn ActionCallback,
) -> Outcome {
    find_new_items(collection, dir, callback, true)
}

/// Logs full names that occur more than once in the subtree, each only
/// the first time it repeats.
pub fn find_duplicate_items(
    collection: &Collection,
    dir: NodeId,
    callback: &mut dyn ActionCallback,
) -> Outcome {
    let mut once = HashSet::new();
    let mut twice = HashSet::new();

    for id in collection.subtree(dir) {
        let name = item_name(collection, id);
        checkpoint(callback, &name)?;

        if !once.insert(name.clone()) && twice.insert(name.clone()) {
            callback.log_message(&format!("Duplicate Item: {name}"), true);
        }
    }

    Ok(())
}

/// Removes every node missing on disk from the subtree.
pub fn remove_missing_items(
    collection: &mut Collection,
    dir: NodeId,
    callback: &mut dyn ActionCallback,
) -> Outcome {
    for id in collection.children(dir, false) {
        let name = item_name(collection, id);
        checkpoint(callback, &name)?;

        if !collection.exists(id) {
            match collection.delete(id) {
                Ok(()) => callback.log_message(&format!("Removed: {name}"), false),
                Err(err) => debug!(error = %err, item = %name, "delete refused"),
            }
        } else if collection[id].is_directory() {
            remove_missing_items(collection, id, callback)?;
        }
    }

    Ok(())
}

/// Logs each dependency in the subtree that no package anywhere in the
/// collection satisfies.
pub fn check_dependencies(
    collection: &Collection,
    dir: NodeId,
    callback: &mut dyn ActionCallback,
) -> Outcome {
    let span = span!(Level::DEBUG, "check_dependencies");
    let _guard = span.enter();

    let pool = collection.packages();
    debug!(packages = pool.len(), "collected package pool");

    for id in collection.files(dir, true) {
        let name = item_name(collection, id);
        checkpoint(callback, &name)?;

        let Some(file) = collection.file(id) else {
            continue;
        };

        for dependency in file.dependencies() {
            if !pool.iter().any(|(_, package)| dependency.check(package)) {
                callback.log_message(
                    &format!("Dependency Missing ({dependency}): {name}"),
                    true,
                );
            }
        }
    }

    Ok(())
}

/// Sets the per-file dirty flag of every listed file.
pub fn mark_dirty(
    collection: &mut Collection,
    files: &[NodeId],
    callback: &mut dyn ActionCallback,
    dirty: bool,
) -> Outcome {
    for &id in files {
        checkpoint(callback, &item_name(collection, id))?;
        if let Err(err) = collection.mark_file_dirty(id, dirty) {
            debug!(error = %err, "not a file");
        }
    }

    Ok(())
}

/// [`mark_dirty`] over every file below `dir`.
pub fn mark_dirty_in(
    collection: &mut Collection,
    dir: NodeId,
    callback: &mut dyn ActionCallback,
    dirty: bool,
) -> Outcome {
    let files = collection.files(dir, true);
    mark_dirty(collection, &files, callback, dirty)
}

/// Runs every read-only check in order, stopping at the first
/// cancellation: missing items, wrong sizes, dirty files, new items,
/// duplicates, dependencies.
pub fn verify_sanity(
    collection: &mut Collection,
    dir: NodeId,
    callback: &mut dyn ActionCallback,
) -> Outcome {
    let span = span!(Level::DEBUG, "verify_sanity");
    let _guard = span.enter();

    stage(callback, "Checking for missing items.");
    find_missing_items(collection, dir, callback)?;

    stage(callback, "Checking for wrong sizes.");
    find_wrong_sizes(collection, dir, callback)?;

    stage(callback, "Checking for dirty items.");
    find_dirty_files(collection, dir, callback)?;

    stage(callback, "Checking for new items.");
    find_new_items(collection, dir, callback, false)?;

    stage(callback, "Checking for duplicate items.");
    find_duplicate_items(collection, dir, callback)?;

    stage(callback, "Checking dependencies.");
    check_dependencies(collection, dir, callback)
}

fn stage(callback: &mut dyn ActionCallback, title: &str) {
    callback.log_message(title, false);
    callback.log_message(SEPARATOR, false);
}

/// Files of the subtree whose description contains any of `terms`
/// (all of them with `match_all`), ignoring case.
#[must_use]
pub fn find_by_description(
    collection: &Collection,
    dir: NodeId,
    terms: &[String],
    match_all: bool,
) -> Vec<NodeId> {
    let terms: Vec<String> = terms.iter().map(|t| t.to_lowercase()).collect();
    if terms.is_empty() {
        return Vec::new();
    }

    collection
        .files(dir, true)
        .into_iter()
        .filter(|id| {
            let Some(file) = collection.file(*id) else {
                return false;
            };
            let description = file.description().to_lowercase();
            let mut hits = terms.iter().map(|term| description.contains(term.as_str()));
            if match_all {
                hits.all(|hit| hit)
            } else {
                hits.any(|hit| hit)
            }
        })
        .collect()
}

/// Nodes of the subtree (including `dir`) whose full name matches the
/// glob `pattern`.
///
/// # Errors
///
/// Returns an error if `pattern` is not a valid glob.
pub fn find_by_path(
    collection: &Collection,
    dir: NodeId,
    pattern: &str,
    case_sensitive: bool,
) -> Result<Vec<NodeId>> {
    let pattern =
        Pattern::new(pattern).with_context(|| format!("Invalid path pattern: {pattern}"))?;
    let options = MatchOptions {
        case_sensitive,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };

    Ok(collection
        .subtree(dir)
        .into_iter()
        .filter(|id| pattern.matches_with(&item_name(collection, *id), options))
        .collect())
}
