//! Matching missing nodes to renamed entries on disk.
//!
//! For a node that no longer exists, the entries of the same kind in its
//! real parent directory are ranked by the length of the prefix they share
//! with the old name. Only the entries tied for the longest non-empty
//! shared prefix are proposed.

use super::callback::{ActionCallback, Outcome, checkpoint};
use super::{EntryKind, is_collection_file, item_name, list_entries};
use crate::tree::{Collection, NodeId};
use tracing::{Level, debug, span};

/// A proposed rename of a missing node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameCandidate {
    /// The missing node
    pub node: NodeId,
    /// Name of the real entry that may replace it
    pub new_name: String,
}

/// Chooses which proposed renames to apply.
pub trait RenamePicker {
    /// Returns the approved subset of `candidates`.
    fn pick(
        &mut self,
        collection: &Collection,
        candidates: &[RenameCandidate],
    ) -> Vec<RenameCandidate>;
}

/// Picker that approves every candidate.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl RenamePicker for AcceptAll {
    fn pick(&mut self, _: &Collection, candidates: &[RenameCandidate]) -> Vec<RenameCandidate> {
        candidates.to_vec()
    }
}

/// Number of leading characters `lhs` and `rhs` have in common.
#[must_use]
pub fn shared_prefix_len(lhs: &str, rhs: &str) -> usize {
    lhs.chars()
        .zip(rhs.chars())
        .take_while(|(a, b)| a == b)
        .count()
}

/// Collects rename candidates for every missing node below `dir`.
///
/// Nothing is renamed; the candidates are appended to `candidates` in
/// traversal order.
pub fn find_rename_candidates(
    collection: &Collection,
    dir: NodeId,
    callback: &mut dyn ActionCallback,
    candidates: &mut Vec<RenameCandidate>,
) -> Outcome {
    if !collection.exists(dir) {
        return Ok(());
    }

    for id in collection.children(dir, false) {
        checkpoint(callback, &item_name(collection, id))?;

        if collection.exists(id) {
            if collection[id].is_directory() {
                find_rename_candidates(collection, id, callback, candidates)?;
            }
            continue;
        }

        candidates.extend(best_matches(collection, dir, id));
    }

    Ok(())
}

/// Entries of `dir` on disk that best match the missing child `missing`.
fn best_matches(collection: &Collection, dir: NodeId, missing: NodeId) -> Vec<RenameCandidate> {
    let wanted = if collection[missing].is_directory() {
        EntryKind::Directory
    } else {
        EntryKind::File
    };
    let old_name = collection[missing].name();

    let entries = match list_entries(collection[dir].full_path()) {
        Ok(entries) => entries,
        Err(err) => {
            debug!(error = %err, "listing failed");
            return Vec::new();
        }
    };

    let mut best = 0;
    let mut matches = Vec::new();

    for entry in entries {
        if entry.kind != wanted || is_collection_file(collection, &entry.path) {
            continue;
        }

        let len = shared_prefix_len(old_name, &entry.name);
        if len == 0 || len < best {
            continue;
        }
        if len > best {
            best = len;
            matches.clear();
        }
        matches.push(RenameCandidate {
            node: missing,
            new_name: entry.name,
        });
    }

    matches
}

/// Finds rename candidates, lets `picker` approve them and applies the
/// approved renames.
///
/// Each applied rename is logged as `old >>> new`.
pub fn rename_missing_items(
    collection: &mut Collection,
    dir: NodeId,
    callback: &mut dyn ActionCallback,
    picker: &mut dyn RenamePicker,
) -> Outcome {
    let span = span!(Level::DEBUG, "rename_missing_items");
    let _guard = span.enter();

    let mut candidates = Vec::new();
    find_rename_candidates(collection, dir, callback, &mut candidates)?;
    if candidates.is_empty() {
        return Ok(());
    }

    for candidate in picker.pick(collection, &candidates) {
        let Some(node) = collection.get(candidate.node) else {
            continue;
        };
        let original = node.full_name().to_string();

        match collection.rename(candidate.node, &candidate.new_name) {
            Ok(()) => {
                callback.log_message(&format!("{original} >>> {}", candidate.new_name), false);
            }
            Err(err) => {
                debug!(error = %err, "rename refused");
                callback.log_message(
                    &format!("Rename Error: {}", item_name(collection, candidate.node)),
                    true,
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::RecordingCallback;
    use anyhow::{Context, Result};
    use std::fs;
    use tempfile::tempdir;

    struct RejectAll;

    impl RenamePicker for RejectAll {
        fn pick(&mut self, _: &Collection, _: &[RenameCandidate]) -> Vec<RenameCandidate> {
            Vec::new()
        }
    }

    #[test]
    fn test_shared_prefix_len() {
        assert_eq!(shared_prefix_len("report_v1.txt", "report_v2.txt"), 8);
        assert_eq!(shared_prefix_len("abc", "xyz"), 0);
        assert_eq!(shared_prefix_len("ab", "abc"), 2);
        assert_eq!(shared_prefix_len("äb", "äc"), 1);
    }

    #[test]
    fn test_candidates_keep_only_longest_ties() -> Result<()> {
        let dir = tempdir()?;
        for name in ["photo_01.jpg", "photo_02.jpg", "photo.png", "zzz.txt"] {
            fs::write(dir.path().join(name), "x")?;
        }
        fs::create_dir(dir.path().join("photo_0dir"))?;

        let mut coll = Collection::new(&dir.path().join("collection.toml"))?;
        let root = coll.root();
        let old = coll.new_file("photo_00.jpg")?;
        coll.add_child(root, old)?;

        let mut candidates = Vec::new();
        find_rename_candidates(&coll, root, &mut RecordingCallback::new(), &mut candidates)?;

        let names: Vec<&str> = candidates.iter().map(|c| c.new_name.as_str()).collect();
        assert_eq!(names, vec!["photo_01.jpg", "photo_02.jpg"]);
        assert!(candidates.iter().all(|c| c.node == old));
        Ok(())
    }

    #[test]
    fn test_no_candidates_without_shared_prefix() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("other.txt"), "x")?;

        let mut coll = Collection::new(&dir.path().join("collection.toml"))?;
        let root = coll.root();
        let old = coll.new_file("readme.md")?;
        coll.add_child(root, old)?;

        let mut candidates = Vec::new();
        find_rename_candidates(&coll, root, &mut RecordingCallback::new(), &mut candidates)?;
        assert!(candidates.is_empty());
        Ok(())
    }

    #[test]
    fn test_rename_missing_items_applies_approved() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir(dir.path().join("music"))?;
        fs::write(dir.path().join("music/song-final.ogg"), "x")?;

        let mut coll = Collection::new(&dir.path().join("collection.toml"))?;
        let root = coll.root();
        let music = coll.new_directory("music")?;
        coll.add_child(root, music)?;
        let song = coll.new_file("song.ogg")?;
        coll.add_child(music, song)?;
        coll.clear_dirty();

        let mut sink = RecordingCallback::new();
        rename_missing_items(&mut coll, root, &mut sink, &mut RejectAll)?;
        assert!(!coll.is_dirty());
        assert!(sink.messages().is_empty());

        rename_missing_items(&mut coll, root, &mut sink, &mut AcceptAll)?;
        assert!(coll.is_dirty());
        assert_eq!(
            sink.messages(),
            vec!["/music/song.ogg >>> song-final.ogg"]
        );
        let renamed = coll.find("/music/song-final.ogg").context("rename not applied")?;
        assert!(coll.exists(renamed));
        Ok(())
    }
}
