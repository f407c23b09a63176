use crate::CollectionContext;
use crate::output;
use crate::tree::{Collection, NodeId};
use anyhow::Result;

/// List catalogued items below `path`
///
/// Directories are shown with a trailing `/`. With `long`, files also
/// show their size, checksum and description.
///
/// # Errors
///
/// Returns an error if the collection cannot be loaded or the path is
/// not catalogued.
pub fn execute(
    ctx: &CollectionContext,
    path: Option<&str>,
    recursive: bool,
    long: bool,
) -> Result<()> {
    let collection = ctx.open_collection()?;
    let id = ctx.resolve(&collection, path)?;

    let items = if collection.is_file(id) {
        vec![id]
    } else {
        collection.children(id, recursive)
    };

    if items.is_empty() {
        super::print_info("No items");
        return Ok(());
    }

    for item in items {
        let (name, detail) = describe_item(&collection, item, long);
        output::listing(&name, &detail);
    }
    Ok(())
}

/// Display name and detail column of one item.
pub(crate) fn describe_item(collection: &Collection, id: NodeId, long: bool) -> (String, String) {
    let node = &collection[id];
    let Some(file) = node.as_file() else {
        return (format!("{}/", node.full_name()), String::new());
    };

    if !long {
        return (node.full_name().to_string(), String::new());
    }

    let size = if file.has_size() {
        file.size().to_string()
    } else {
        "-".to_string()
    };
    let checksum = if file.checksum().is_empty() {
        "-"
    } else {
        file.checksum()
    };
    let mut detail = format!("{size}  {checksum}");
    if file.is_dirty() {
        detail.push_str("  [dirty]");
    }
    if !file.description().is_empty() {
        detail.push_str("  ");
        detail.push_str(file.description());
    }

    (node.full_name().to_string(), detail)
}
