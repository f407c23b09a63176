use crate::CollectionContext;
use crate::tree::Collection;
use anyhow::{Context, Result};
use colored::Colorize;

/// Create an empty collection file
///
/// # Errors
///
/// Returns an error if:
/// - A collection file already exists and `force` is not set
/// - The directory for the collection does not exist
/// - The file cannot be written
pub fn execute(ctx: &CollectionContext, force: bool) -> Result<()> {
    let path = &ctx.collection_path;

    if path.exists() && !force {
        return Err(anyhow::anyhow!(
            "Collection already initialized at {} (use --force to overwrite)",
            path.display()
        ));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        anyhow::ensure!(
            parent.is_dir(),
            "Directory does not exist: {}",
            parent.display()
        );
    }

    let mut collection = Collection::new(path)?;
    collection
        .save(force && ctx.config.collection.backup)
        .context("Failed to write collection file")?;

    super::print_success(&format!(
        "Initialized empty collection at {}",
        collection.filename().display()
    ));
    println!("\n{}", "Quick start:".bold());
    println!("  fcoll add              # Catalogue everything below this directory");
    println!("  fcoll checksum         # Record checksums of new files");
    println!("  fcoll check            # Compare the catalogue with the disk");

    Ok(())
}
