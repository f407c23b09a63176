use crate::CollectionContext;
use crate::output;
use crate::reconcile::{Export, export};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// File name of the checksum manifest.
pub const CHECKSUMS_FILE: &str = "checksums.txt";

/// File name of the info report.
pub const INFO_FILE: &str = "info.txt";

/// Write the checksum manifest and info report for `path` into `output_dir`
///
/// # Errors
///
/// Returns an error if the collection cannot be loaded, the run was
/// cancelled, or the reports cannot be written.
pub fn execute(ctx: &CollectionContext, path: Option<&str>, output_dir: &Path) -> Result<()> {
    let mut collection = ctx.open_collection()?;
    let dir = ctx.resolve(&collection, path)?;

    let mut rendered = Export::default();
    super::run_operation(ctx, &mut collection, "Exporting", |coll, sink| {
        rendered = export(coll, dir, sink)?;
        Ok(())
    })?;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    for (name, content) in [(CHECKSUMS_FILE, &rendered.checksums), (INFO_FILE, &rendered.info)] {
        let target = output_dir.join(name);
        fs::write(&target, content)
            .with_context(|| format!("Failed to write {}", target.display()))?;
        output::verbose(&format!("Wrote {}", target.display()));
    }

    super::print_success(&format!(
        "Exported {} checksum(s) to {}",
        rendered.hashed,
        output_dir.join(CHECKSUMS_FILE).display()
    ));
    if rendered.unhashed > 0 {
        super::print_info(&format!(
            "{} file(s) have no checksum yet (run `fcoll checksum`)",
            rendered.unhashed
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::setup;

    #[test]
    fn test_export_writes_reports() -> Result<()> {
        let (dir, ctx) = setup()?;
        crate::commands::add::execute(&ctx, None)?;
        crate::commands::checksum::execute(&ctx, Some("/notes.txt"), Some("md5"), false)?;

        let out = dir.path().join("reports");
        execute(&ctx, None, &out)?;

        let checksums = fs::read_to_string(out.join(CHECKSUMS_FILE))?;
        assert_eq!(checksums.lines().count(), 1);
        assert!(checksums.starts_with("MD5 (notes.txt) = "));

        let info = fs::read_to_string(out.join(INFO_FILE))?;
        assert!(info.contains("File: /docs/guide.md\nSize: 8\n"));
        assert!(info.contains("File: /notes.txt\nSize: 17\nChecksum: MD5:"));
        Ok(())
    }

    #[test]
    fn test_export_unknown_path() -> Result<()> {
        let (dir, ctx) = setup()?;
        assert!(execute(&ctx, Some("/nope"), dir.path()).is_err());
        Ok(())
    }
}
