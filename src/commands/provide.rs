use crate::CollectionContext;
use crate::package::Package;
use anyhow::{Context, Result};

/// Record (or with `remove`, drop) a package provided by a file
///
/// Providing a package the file already provides updates its version.
///
/// # Errors
///
/// Returns an error if the collection cannot be loaded or saved, the
/// path is not a catalogued file, or a package to remove is not there.
pub fn execute(
    ctx: &CollectionContext,
    path: &str,
    name: &str,
    version: Option<&str>,
    remove: bool,
) -> Result<()> {
    let mut collection = ctx.open_collection()?;
    let id = ctx.resolve(&collection, Some(path))?;
    let file = collection
        .file(id)
        .with_context(|| format!("Not a file: {path}"))?;
    anyhow::ensure!(!name.trim().is_empty(), "Package name cannot be empty");

    let existing = file.raw_packages().iter().position(|p| p.name() == name);

    if remove {
        let package = collection
            .remove_package(id, name)
            .with_context(|| format!("{path} does not provide {name}"))?;
        ctx.save_if_dirty(&mut collection)?;
        super::print_success(&format!("Removed package {package}"));
        return Ok(());
    }

    let changed = match existing {
        Some(index) => match version {
            Some(version) => collection.edit_package(id, index, |p| p.set_version(version)),
            None => false,
        },
        None => {
            collection.add_package(id, Package::new(name, version))?;
            true
        }
    };

    if !changed {
        super::print_info(&format!("Package {name} unchanged"));
        return Ok(());
    }

    ctx.save_if_dirty(&mut collection)?;
    let package = collection
        .file(id)
        .and_then(|f| f.packages().into_iter().find(|p| p.name() == name))
        .map_or_else(|| name.to_string(), Package::display_string);
    super::print_success(&format!("{} provides {package}", collection[id].full_name()));
    Ok(())
}
