use crate::CollectionContext;
use anyhow::Result;

/// Move an item into another catalogued directory
///
/// Only the collection changes; the files on disk are left alone.
///
/// # Errors
///
/// Returns an error if either path is not catalogued, the target is not a
/// directory, or the move would put a directory inside itself.
pub fn execute(ctx: &CollectionContext, source: &str, target: &str) -> Result<()> {
    let mut collection = ctx.open_collection()?;
    let id = ctx.resolve(&collection, Some(source))?;
    let dir = ctx.resolve(&collection, Some(target))?;

    anyhow::ensure!(
        collection.is_directory(dir),
        "Not a directory: {target}"
    );
    anyhow::ensure!(
        collection.can_move(id, dir),
        "Cannot move {} into {}",
        collection[id].full_name(),
        collection[dir].full_name()
    );

    let from = collection[id].full_name().to_string();
    let to = collection.full_name_under(id, Some(dir), None);
    collection.move_to(id, dir)?;
    ctx.save_if_dirty(&mut collection)?;

    super::print_success(&format!("Moved {from} -> {to}"));
    Ok(())
}
