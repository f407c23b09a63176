use crate::CollectionContext;
use crate::output;
use anyhow::Result;

/// Remove an item and everything below it from the collection
///
/// The files on disk are left alone.
///
/// # Errors
///
/// Returns an error if the path is not catalogued or names the root.
pub fn execute(ctx: &CollectionContext, path: &str) -> Result<()> {
    let mut collection = ctx.open_collection()?;
    let id = ctx.resolve(&collection, Some(path))?;

    anyhow::ensure!(
        collection.can_delete(id),
        "Cannot remove the collection root"
    );

    let name = collection[id].full_name().to_string();
    let count = collection.subtree(id).len();
    collection.delete(id)?;
    ctx.save_if_dirty(&mut collection)?;

    if count > 1 {
        output::action("Removed", &format!("{name} ({count} items)"));
    } else {
        output::action("Removed", &name);
    }
    Ok(())
}
