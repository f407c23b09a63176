use crate::CollectionContext;
use crate::reconcile::remove_missing_items;
use anyhow::Result;

/// Remove catalogued items that no longer exist on disk
///
/// # Errors
///
/// Returns an error if the collection cannot be loaded or saved, or the
/// scan was cancelled.
pub fn execute(ctx: &CollectionContext, path: Option<&str>) -> Result<()> {
    let mut collection = ctx.open_collection()?;
    let dir = ctx.resolve(&collection, path)?;
    let before = collection.subtree(dir).len();

    super::run_operation(ctx, &mut collection, "Pruning", |coll, sink| {
        remove_missing_items(coll, dir, sink)
    })?;

    let removed = before - collection.subtree(dir).len();
    if removed == 0 {
        super::print_info("Nothing to remove");
    } else {
        super::print_success(&format!("Removed {removed} item(s)"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::setup;
    use std::fs;

    #[test]
    fn test_prune_drops_missing_subtree() -> Result<()> {
        let (_dir, ctx) = setup()?;
        crate::commands::add::execute(&ctx, None)?;

        let root = ctx.collection_path.parent().expect("has parent").to_path_buf();
        fs::remove_dir_all(root.join("docs"))?;
        execute(&ctx, None)?;

        let coll = ctx.open_collection()?;
        assert!(coll.find("/docs").is_none());
        assert!(coll.find("/docs/guide.md").is_none());
        assert!(coll.find("/notes.txt").is_some());
        Ok(())
    }
}
