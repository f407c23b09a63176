use crate::CollectionContext;
use crate::tree::is_valid_name;
use anyhow::Result;

/// Rename an item in the collection
///
/// # Errors
///
/// Returns an error if the path is not catalogued, names the root, or
/// `name` is not a valid single path segment.
pub fn execute(ctx: &CollectionContext, path: &str, name: &str) -> Result<()> {
    let mut collection = ctx.open_collection()?;
    let id = ctx.resolve(&collection, Some(path))?;

    anyhow::ensure!(is_valid_name(name), "Invalid name: {name:?}");
    anyhow::ensure!(
        collection.can_rename(id, name),
        "Cannot rename {}",
        collection[id].full_name()
    );

    let from = collection[id].full_name().to_string();
    let to = collection.full_name_under(id, None, Some(name));
    collection.rename(id, name)?;
    ctx.save_if_dirty(&mut collection)?;

    super::print_success(&format!("{from} >>> {to}"));
    Ok(())
}
