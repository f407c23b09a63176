use crate::CollectionContext;
use crate::reconcile::verify_checksums;
use anyhow::Result;

/// Verify stored checksums against the file contents
///
/// # Errors
///
/// Returns an error if the collection cannot be loaded, a stored checksum
/// names an unknown algorithm, the run was cancelled, or any file failed
/// verification.
pub fn execute(ctx: &CollectionContext, path: Option<&str>) -> Result<()> {
    let mut collection = ctx.open_collection()?;
    let id = ctx.resolve(&collection, path)?;
    let files = super::checksum::target_files(&collection, id);
    let buffer_size = ctx.config.checksum.buffer_size;

    let problems = super::run_operation(ctx, &mut collection, "Verifying", |coll, sink| {
        verify_checksums(coll, &files, sink, buffer_size)
    })?;

    super::report_problems(problems, &format!("{} file(s) verified", files.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::setup;
    use std::fs;

    #[test]
    fn test_verify_detects_modified_file() -> Result<()> {
        let (_dir, ctx) = setup()?;
        crate::commands::add::execute(&ctx, None)?;

        // Nothing hashed yet
        assert!(execute(&ctx, None).is_err());

        crate::commands::checksum::execute(&ctx, None, None, false)?;
        execute(&ctx, None)?;

        let root = ctx.collection_path.parent().expect("has parent").to_path_buf();
        fs::write(root.join("notes.txt"), "remember the eggs")?;
        assert!(execute(&ctx, Some("/notes.txt")).is_err());
        execute(&ctx, Some("/docs"))?;
        Ok(())
    }
}
