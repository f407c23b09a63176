use crate::CollectionContext;
use crate::package::Dependency;
use anyhow::{Context, Result};

/// Record (or with `remove`, drop) a dependency of a file
///
/// Requiring a package the file already requires updates the given
/// bounds and keeps the others.
///
/// # Errors
///
/// Returns an error if the collection cannot be loaded or saved, the
/// path is not a catalogued file, or a dependency to remove is not there.
pub fn execute(
    ctx: &CollectionContext,
    path: &str,
    name: &str,
    min: Option<&str>,
    max: Option<&str>,
    remove: bool,
) -> Result<()> {
    let mut collection = ctx.open_collection()?;
    let id = ctx.resolve(&collection, Some(path))?;
    let file = collection
        .file(id)
        .with_context(|| format!("Not a file: {path}"))?;
    anyhow::ensure!(!name.trim().is_empty(), "Package name cannot be empty");

    let existing = file.raw_dependencies().iter().position(|d| d.name() == name);

    if remove {
        let dependency = collection
            .remove_dependency(id, name)
            .with_context(|| format!("{path} does not require {name}"))?;
        ctx.save_if_dirty(&mut collection)?;
        super::print_success(&format!("Removed dependency {dependency}"));
        return Ok(());
    }

    let changed = match existing {
        Some(index) => collection.edit_dependency(id, index, |d| {
            let lower = min.is_some_and(|v| d.set_min_version(v));
            let upper = max.is_some_and(|v| d.set_max_version(v));
            lower || upper
        }),
        None => {
            collection.add_dependency(id, Dependency::new(name, min, max))?;
            true
        }
    };

    if !changed {
        super::print_info(&format!("Dependency {name} unchanged"));
        return Ok(());
    }

    ctx.save_if_dirty(&mut collection)?;
    let dependency = collection
        .file(id)
        .and_then(|f| f.dependencies().into_iter().find(|d| d.name() == name))
        .map_or_else(|| name.to_string(), Dependency::display_string);
    super::print_success(&format!("{} requires {dependency}", collection[id].full_name()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::setup;

    #[test]
    fn test_require_merges_bounds() -> Result<()> {
        let (_dir, ctx) = setup()?;
        crate::commands::add::execute(&ctx, None)?;

        execute(&ctx, "/docs/guide.md", "lists", Some("1.0"), None, false)?;
        execute(&ctx, "/docs/guide.md", "lists", None, Some("2.0"), false)?;

        let coll = ctx.open_collection()?;
        let guide = coll.find("/docs/guide.md").expect("catalogued");
        let deps: Vec<String> = coll
            .file(guide)
            .map(|f| f.dependencies().iter().map(|d| d.to_string()).collect())
            .unwrap_or_default();
        assert_eq!(deps, vec!["lists >= 1.0, <= 2.0"]);

        execute(&ctx, "/docs/guide.md", "lists", None, None, true)?;
        assert!(execute(&ctx, "/docs/guide.md", "lists", None, None, true).is_err());
        Ok(())
    }
}
