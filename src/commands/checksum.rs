use crate::CollectionContext;
use crate::reconcile::calculate_checksums;
use crate::tree::{Collection, NodeId};
use anyhow::Result;

/// Calculate checksums of new or changed files
///
/// `path` may name a single file or a directory. Without `algorithm` the
/// configured one is used.
///
/// # Errors
///
/// Returns an error if the collection cannot be loaded or saved, the
/// algorithm is unknown, or the run was cancelled (checksums calculated
/// before that are kept).
pub fn execute(
    ctx: &CollectionContext,
    path: Option<&str>,
    algorithm: Option<&str>,
    all: bool,
) -> Result<()> {
    let mut collection = ctx.open_collection()?;
    let id = ctx.resolve(&collection, path)?;
    let files = target_files(&collection, id);
    let algorithm = algorithm.unwrap_or(&ctx.config.checksum.algorithm);
    let buffer_size = ctx.config.checksum.buffer_size;

    let problems = super::run_operation(ctx, &mut collection, "Hashing", |coll, sink| {
        calculate_checksums(coll, &files, sink, algorithm, all, buffer_size)
    })?;

    if problems == 0 {
        super::print_success(&format!("{} file(s) up to date", files.len()));
    }
    Ok(())
}

/// The file itself, or every file below a directory.
pub(crate) fn target_files(collection: &Collection, id: NodeId) -> Vec<NodeId> {
    if collection.is_file(id) {
        vec![id]
    } else {
        collection.files(id, true)
    }
}
