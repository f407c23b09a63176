use crate::CollectionContext;
use crate::output;
use anyhow::Result;
use colored::Colorize;

/// Execute config command to get/set configuration values
///
/// # Errors
///
/// Returns an error if:
/// - The key is unknown or the value is invalid
/// - Failed to save configuration
pub fn execute(
    ctx: &mut CollectionContext,
    key: Option<&str>,
    value: Option<&str>,
    list: bool,
) -> Result<()> {
    // If --list flag is set or no key is provided, show all configuration
    let Some(key) = key.filter(|_| !list) else {
        show_all_config(ctx);
        return Ok(());
    };

    if let Some(val) = value {
        ctx.config.set(key, val)?;
        ctx.config.save(&ctx.config_path)?;
        output::success(&format!("Set {key} = {}", ctx.config.get(key).unwrap_or_default()));
    } else if let Some(val) = ctx.config.get(key) {
        println!("{val}");
    } else {
        return Err(anyhow::anyhow!("Unknown configuration key: {key}"));
    }

    Ok(())
}

/// Show all configuration values
fn show_all_config(ctx: &CollectionContext) {
    println!("{}", "[checksum]".bold());
    println!("  algorithm = {}", ctx.config.checksum.algorithm);
    println!("  buffer_size = {}", ctx.config.checksum.buffer_size);

    println!("\n{}", "[collection]".bold());
    println!("  filename = {}", ctx.config.collection.filename);
    println!("  backup = {}", ctx.config.collection.backup);

    println!("\n{}", "[output]".bold());
    println!("  progress_skip = {}", ctx.config.output.progress_skip);
}
