use super::Config;
use crate::checksum;
use anyhow::{Context, Result};
use std::path::Path;

/// Smallest accepted streaming chunk.
pub const MIN_BUFFER_SIZE: usize = 4 * 1024;
/// Largest accepted streaming chunk.
pub const MAX_BUFFER_SIZE: usize = 64 * 1024 * 1024;

/// Reads and validates a configuration file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid TOML or fails
/// validation.
pub fn parse_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config_str(&content)
}

/// Parses and validates configuration text.
///
/// # Errors
///
/// Returns an error if `content` is not valid TOML or fails validation.
pub fn parse_config_str(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse TOML config")?;

    // Validate and return validation errors directly without wrapping
    validate_config(&config)?;
    Ok(config)
}

/// Rejects settings the program cannot work with.
///
/// # Errors
///
/// Returns an error describing the first invalid setting.
pub fn validate_config(config: &Config) -> Result<()> {
    if !checksum::exists(&config.checksum.algorithm) {
        anyhow::bail!(
            "Unknown checksum algorithm '{}' (expected one of {})",
            config.checksum.algorithm,
            checksum::algorithms().join(", ")
        );
    }

    validate_buffer_size(config.checksum.buffer_size)?;

    if config.collection.filename.trim().is_empty() {
        anyhow::bail!("Collection filename cannot be empty");
    }

    Ok(())
}

/// Checks a checksum buffer size against the accepted range.
///
/// # Errors
///
/// Returns an error if `size` is outside 4 KiB ..= 64 MiB.
pub fn validate_buffer_size(size: usize) -> Result<()> {
    if !(MIN_BUFFER_SIZE..=MAX_BUFFER_SIZE).contains(&size) {
        anyhow::bail!(
            "Checksum buffer size must be between {MIN_BUFFER_SIZE} and {MAX_BUFFER_SIZE} bytes"
        );
    }
    Ok(())
}
