use crate::CollectionContext;
use crate::reconcile::mark_dirty;
use anyhow::Result;

/// Set the dirty flag of a file or of every file below a directory
///
/// # Errors
///
/// Returns an error if the collection cannot be loaded or saved, or the
/// path is not catalogued.
pub fn execute(ctx: &CollectionContext, path: Option<&str>, dirty: bool) -> Result<()> {
    let mut collection = ctx.open_collection()?;
    let id = ctx.resolve(&collection, path)?;
    let files = super::checksum::target_files(&collection, id);

    super::run_counted(ctx, &mut collection, "Marking", files.len(), |coll, sink| {
        mark_dirty(coll, &files, sink, dirty)
    })?;

    let state = if dirty { "dirty" } else { "clean" };
    super::print_success(&format!("Marked {} file(s) {state}", files.len()));
    Ok(())
}
