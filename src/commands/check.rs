use crate::CollectionContext;
use crate::reconcile::verify_sanity;
use anyhow::Result;

/// Compare the collection with the filesystem without changing it
///
/// Runs every read-only check below `path` and fails when any of them
/// reported a problem.
///
/// # Errors
///
/// Returns an error if the collection cannot be loaded, the scan was
/// cancelled, or problems were found.
pub fn execute(ctx: &CollectionContext, path: Option<&str>) -> Result<()> {
    let mut collection = ctx.open_collection()?;
    let dir = ctx.resolve(&collection, path)?;

    let problems = super::run_operation(ctx, &mut collection, "Checking", |coll, sink| {
        verify_sanity(coll, dir, sink)
    })?;

    super::report_problems(problems, "Collection matches the filesystem")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::setup;

    #[test]
    fn test_check_reports_new_items() -> Result<()> {
        let (_dir, ctx) = setup()?;
        assert!(execute(&ctx, None).is_err());

        crate::commands::add::execute(&ctx, None)?;
        execute(&ctx, None)?;
        Ok(())
    }
}
