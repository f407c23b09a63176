use crate::CollectionContext;
use anyhow::Result;

/// Set (or clear, with empty `text`) the description of a file
///
/// # Errors
///
/// Returns an error if the collection cannot be loaded or saved, or the
/// path is not a catalogued file.
pub fn execute(ctx: &CollectionContext, path: &str, text: &str) -> Result<()> {
    let mut collection = ctx.open_collection()?;
    let id = ctx.resolve(&collection, Some(path))?;

    if !collection.set_description(id, text)? {
        super::print_info("Description unchanged");
        return Ok(());
    }

    ctx.save_if_dirty(&mut collection)?;
    super::print_success(&format!("Described {}", collection[id].full_name()));
    Ok(())
}
