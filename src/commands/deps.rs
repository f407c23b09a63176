use crate::CollectionContext;
use crate::reconcile::check_dependencies;
use anyhow::Result;

/// Report dependencies no package in the collection satisfies
///
/// # Errors
///
/// Returns an error if the collection cannot be loaded, the run was
/// cancelled, or a dependency is unsatisfied.
pub fn execute(ctx: &CollectionContext, path: Option<&str>) -> Result<()> {
    let mut collection = ctx.open_collection()?;
    let dir = ctx.resolve(&collection, path)?;

    let problems = super::run_operation(ctx, &mut collection, "Resolving", |coll, sink| {
        check_dependencies(coll, dir, sink)
    })?;

    super::report_problems(problems, "All dependencies satisfied")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::setup;

    #[test]
    fn test_deps_follow_provided_packages() -> Result<()> {
        let (_dir, ctx) = setup()?;
        crate::commands::add::execute(&ctx, None)?;
        execute(&ctx, None)?;

        crate::commands::require::execute(&ctx, "/docs/guide.md", "notes", Some("2"), None, false)?;
        assert!(execute(&ctx, None).is_err());

        crate::commands::provide::execute(&ctx, "/notes.txt", "notes", Some("1.5"), false)?;
        assert!(execute(&ctx, None).is_err());

        crate::commands::provide::execute(&ctx, "/notes.txt", "notes", Some("2.1"), false)?;
        execute(&ctx, None)?;
        Ok(())
    }
}
