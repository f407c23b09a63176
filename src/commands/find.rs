use crate::CollectionContext;
use crate::output;
use crate::reconcile::{find_by_description, find_by_path};
use anyhow::Result;

/// What to look for.
pub enum Query<'a> {
    /// Description substrings, optionally all required
    Description { terms: &'a [String], match_all: bool },
    /// Glob over full names
    Path { pattern: &'a str, case_sensitive: bool },
}

/// Find items below `under` and print their full names
///
/// # Errors
///
/// Returns an error if the collection cannot be loaded, `under` is not
/// catalogued, or the glob is invalid.
pub fn execute(ctx: &CollectionContext, query: &Query<'_>, under: Option<&str>) -> Result<()> {
    let collection = ctx.open_collection()?;
    let dir = ctx.resolve(&collection, under)?;

    let hits = match query {
        Query::Description { terms, match_all } => {
            find_by_description(&collection, dir, terms, *match_all)
        }
        Query::Path {
            pattern,
            case_sensitive,
        } => find_by_path(&collection, dir, pattern, *case_sensitive)?,
    };

    if hits.is_empty() {
        super::print_info("No matches");
        return Ok(());
    }

    for id in hits {
        let detail = collection
            .file(id)
            .map(|f| f.description().to_string())
            .unwrap_or_default();
        output::listing(collection[id].full_name(), &detail);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::setup;

    #[test]
    fn test_find_queries() -> Result<()> {
        let (_dir, ctx) = setup()?;
        crate::commands::add::execute(&ctx, None)?;

        let terms = vec!["milk".to_string()];
        execute(&ctx, &Query::Description { terms: &terms, match_all: true }, None)?;
        execute(
            &ctx,
            &Query::Path { pattern: "/docs/*.MD", case_sensitive: false },
            Some("/docs"),
        )?;
        assert!(execute(
            &ctx,
            &Query::Path { pattern: "[", case_sensitive: true },
            None
        )
        .is_err());
        Ok(())
    }
}
