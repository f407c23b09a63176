//! Calculating and verifying stored file checksums.

use super::callback::{ActionCallback, Halt, Outcome, checkpoint};
use super::item_name;
use crate::checksum::{Algorithm, checksum_reader, same_checksum};
use crate::tree::{Collection, NodeId};
use std::fs::File;
use tracing::{Level, debug, span};

/// Streams the file behind `id` through a digest of `algorithm`.
///
/// Progress is polled before every chunk. Open and read failures are
/// logged and yield `Ok(None)`.
fn digest(
    collection: &Collection,
    id: NodeId,
    callback: &mut dyn ActionCallback,
    algorithm: Algorithm,
    buffer: &mut [u8],
) -> Result<Option<String>, Halt> {
    let name = item_name(collection, id);

    let file = match File::open(collection[id].full_path()) {
        Ok(file) => file,
        Err(err) => {
            debug!(error = %err, file = %name, "open failed");
            callback.log_message(&format!("Open Failed: {name}"), true);
            return Ok(None);
        }
    };

    match checksum_reader(file, algorithm, buffer, || checkpoint(callback, &name))? {
        Ok(checksum) => Ok(Some(checksum)),
        Err(err) => {
            debug!(error = %err, file = %name, "read failed");
            callback.log_message(&format!("Read Failed: {name}"), true);
            Ok(None)
        }
    }
}

fn resolve_algorithm(name: &str, callback: &mut dyn ActionCallback) -> Result<Algorithm, Halt> {
    Algorithm::from_checksum(name).ok_or_else(|| {
        let label = name.split_once(':').map_or(name, |(algo, _)| algo);
        callback.log_message(&format!("Unknown Checksum Type: {label}"), true);
        Halt::UnknownAlgorithm(label.to_string())
    })
}

/// Computes and stores checksums of `files` using `algorithm`.
///
/// A file is hashed when `all` is set, when it has no checksum yet, or
/// when its recorded size differs from the size on disk. Hashing also
/// records the real size. An unknown algorithm aborts before any file is
/// visited.
pub fn calculate_checksums(
    collection: &mut Collection,
    files: &[NodeId],
    callback: &mut dyn ActionCallback,
    algorithm: &str,
    all: bool,
    buffer_size: usize,
) -> Outcome {
    let span = span!(Level::DEBUG, "calculate_checksums", algorithm, all);
    let _guard = span.enter();

    let algorithm = resolve_algorithm(algorithm, callback)?;
    let mut buffer = vec![0u8; buffer_size.max(1)];

    for &id in files {
        let name = item_name(collection, id);
        checkpoint(callback, &name)?;

        let Some(file) = collection.file(id) else {
            continue;
        };

        if !collection.exists(id) {
            callback.log_message(&format!("Missing File: {name}"), true);
            continue;
        }

        let real_size = collection.real_size(id);
        if !all && !file.checksum().is_empty() && file.size() == real_size {
            continue;
        }

        let Some(checksum) = digest(collection, id, callback, algorithm, &mut buffer)? else {
            continue;
        };

        if let Err(err) = collection
            .set_checksum(id, &checksum)
            .and_then(|_| collection.set_size(id, real_size))
        {
            debug!(error = %err, "checksum update failed");
            continue;
        }

        callback.log_message(&format!("Checksum Calculated ({checksum}): {name}"), false);
    }

    Ok(())
}

/// [`calculate_checksums`] over every file below `dir`.
pub fn calculate_checksums_in(
    collection: &mut Collection,
    dir: NodeId,
    callback: &mut dyn ActionCallback,
    algorithm: &str,
    all: bool,
    buffer_size: usize,
) -> Outcome {
    let files = collection.files(dir, true);
    calculate_checksums(collection, &files, callback, algorithm, all, buffer_size)
}

/// Recomputes each stored checksum with the algorithm it names and logs
/// files whose contents no longer match.
///
/// A stored checksum naming an unknown algorithm aborts the operation.
pub fn verify_checksums(
    collection: &Collection,
    files: &[NodeId],
    callback: &mut dyn ActionCallback,
    buffer_size: usize,
) -> Outcome {
    let span = span!(Level::DEBUG, "verify_checksums");
    let _guard = span.enter();

    let mut buffer = vec![0u8; buffer_size.max(1)];

    for &id in files {
        let name = item_name(collection, id);
        checkpoint(callback, &name)?;

        let Some(file) = collection.file(id) else {
            continue;
        };

        if !collection.exists(id) {
            callback.log_message(&format!("Missing File: {name}"), true);
            continue;
        }

        let stored = file.checksum();
        if stored.is_empty() {
            callback.log_message(&format!("Missing Checksum: {name}"), true);
            continue;
        }

        let algorithm = resolve_algorithm(stored, callback)?;
        let Some(calculated) = digest(collection, id, callback, algorithm, &mut buffer)? else {
            continue;
        };

        if !same_checksum(stored, &calculated) {
            callback.log_message(&format!("Invalid Checksum: {name}"), true);
        }
    }

    Ok(())
}

/// [`verify_checksums`] over every file below `dir`.
pub fn verify_checksums_in(
    collection: &Collection,
    dir: NodeId,
    callback: &mut dyn ActionCallback,
    buffer_size: usize,
) -> Outcome {
    let files = collection.files(dir, true);
    verify_checksums(collection, &files, callback, buffer_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::DEFAULT_BUFFER_SIZE;
    use crate::reconcile::RecordingCallback;
    use crate::tree::FileData;
    use anyhow::{Context, Result};
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn fixture() -> Result<(TempDir, Collection, NodeId, NodeId)> {
        let dir = tempdir()?;
        fs::write(dir.path().join("abc.txt"), "abc")?;
        fs::write(dir.path().join("big.bin"), vec![1u8; 10_000])?;

        let mut coll = Collection::new(&dir.path().join("collection.toml"))?;
        let root = coll.root();
        let abc = coll.new_file("abc.txt")?;
        let big = coll.new_file("big.bin")?;
        coll.add_child(root, abc)?;
        coll.add_child(root, big)?;
        Ok((dir, coll, abc, big))
    }

    fn checksum_of(coll: &Collection, id: NodeId) -> Result<String> {
        coll.file(id)
            .map(|f| f.checksum().to_string())
            .context("not a file")
    }

    #[test]
    fn test_calculate_stores_checksum_and_size() -> Result<()> {
        let (_dir, mut coll, abc, _) = fixture()?;
        let root = coll.root();
        let mut sink = RecordingCallback::new();
        calculate_checksums_in(&mut coll, root, &mut sink, "md5", false, DEFAULT_BUFFER_SIZE)?;

        assert_eq!(checksum_of(&coll, abc)?, "MD5:900150983CD24FB0D6963F7D28E17F72");
        assert_eq!(coll.file(abc).map(FileData::size), Some(3));
        assert!(coll.file(abc).is_some_and(FileData::is_dirty));
        assert!(sink.important().is_empty());
        assert!(
            sink.messages()
                .contains(&"Checksum Calculated (MD5:900150983CD24FB0D6963F7D28E17F72): /abc.txt")
        );
        Ok(())
    }

    #[test]
    fn test_unknown_algorithm_aborts_before_any_file() -> Result<()> {
        let (_dir, mut coll, abc, _) = fixture()?;
        let root = coll.root();
        let mut sink = RecordingCallback::new();
        let outcome =
            calculate_checksums_in(&mut coll, root, &mut sink, "crc32", true, DEFAULT_BUFFER_SIZE);

        assert_eq!(outcome, Err(Halt::UnknownAlgorithm("crc32".into())));
        assert_eq!(sink.messages(), vec!["Unknown Checksum Type: crc32"]);
        assert!(sink.labels().is_empty());
        assert_eq!(checksum_of(&coll, abc)?, "");
        Ok(())
    }

    #[test]
    fn test_selective_recompute_keeps_existing_checksum() -> Result<()> {
        let (_dir, mut coll, abc, big) = fixture()?;
        coll.set_checksum(abc, "MD5:STALE")?;
        coll.set_size(abc, 3)?;

        let root = coll.root();
        let mut sink = RecordingCallback::new();
        calculate_checksums_in(&mut coll, root, &mut sink, "sha1", false, DEFAULT_BUFFER_SIZE)?;
        assert_eq!(checksum_of(&coll, abc)?, "MD5:STALE");
        assert!(checksum_of(&coll, big)?.starts_with("SHA1:"));

        coll.set_size(abc, 4)?;
        calculate_checksums_in(&mut coll, root, &mut sink, "sha1", false, DEFAULT_BUFFER_SIZE)?;
        assert!(checksum_of(&coll, abc)?.starts_with("SHA1:"));
        Ok(())
    }

    #[test]
    fn test_verify_after_calculate_reports_nothing() -> Result<()> {
        let (dir, mut coll, abc, _) = fixture()?;
        let root = coll.root();
        let mut sink = RecordingCallback::new();
        calculate_checksums_in(&mut coll, root, &mut sink, "sha256", true, 64)?;

        sink.clear();
        verify_checksums_in(&coll, root, &mut sink, 64)?;
        assert!(sink.important().is_empty());

        fs::write(dir.path().join("abc.txt"), "abd")?;
        verify_checksums_in(&coll, root, &mut sink, 64)?;
        assert_eq!(sink.important(), vec!["Invalid Checksum: /abc.txt"]);
        assert!(coll.file(abc).is_some());
        Ok(())
    }

    #[test]
    fn test_verify_skips_missing_and_unhashed() -> Result<()> {
        let (dir, coll, _, _) = fixture()?;
        fs::remove_file(dir.path().join("big.bin"))?;

        let mut sink = RecordingCallback::new();
        verify_checksums_in(&coll, coll.root(), &mut sink, DEFAULT_BUFFER_SIZE)?;
        assert_eq!(
            sink.important(),
            vec!["Missing Checksum: /abc.txt", "Missing File: /big.bin"]
        );
        Ok(())
    }

    #[test]
    fn test_verify_unknown_stored_algorithm_aborts() -> Result<()> {
        let (_dir, mut coll, abc, _) = fixture()?;
        coll.set_checksum(abc, "WHIRLPOOL:00")?;

        let mut sink = RecordingCallback::new();
        let outcome = verify_checksums(&coll, &[abc], &mut sink, DEFAULT_BUFFER_SIZE);
        assert_eq!(outcome, Err(Halt::UnknownAlgorithm("WHIRLPOOL".into())));
        Ok(())
    }

    #[test]
    fn test_cancellation_keeps_earlier_results() -> Result<()> {
        let (_dir, mut coll, abc, big) = fixture()?;
        let root = coll.root();
        // abc.txt: item tick, one chunk, end of file; the next item is refused.
        let mut sink = RecordingCallback::stop_after(3);
        let outcome =
            calculate_checksums_in(&mut coll, root, &mut sink, "md5", true, DEFAULT_BUFFER_SIZE);

        assert_eq!(outcome, Err(Halt::Cancelled));
        assert!(!checksum_of(&coll, abc)?.is_empty());
        assert!(checksum_of(&coll, big)?.is_empty());
        Ok(())
    }
}
