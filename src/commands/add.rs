use crate::CollectionContext;
use crate::reconcile::add_new_items;
use anyhow::Result;

/// Add files and directories found on disk but not yet catalogued
///
/// # Errors
///
/// Returns an error if the collection cannot be loaded or saved, or the
/// scan was cancelled (items added before that are kept).
pub fn execute(ctx: &CollectionContext, path: Option<&str>) -> Result<()> {
    let mut collection = ctx.open_collection()?;
    let dir = ctx.resolve(&collection, path)?;
    let before = collection.subtree(dir).len();

    super::run_operation(ctx, &mut collection, "Scanning", |coll, sink| {
        add_new_items(coll, dir, sink)
    })?;

    let added = collection.subtree(dir).len() - before;
    if added == 0 {
        super::print_info("No new items");
    } else {
        super::print_success(&format!("Added {added} item(s)"));
    }
    Ok(())
}
