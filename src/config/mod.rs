pub mod parser;
pub mod validator;

use crate::checksum::{self, DEFAULT_BUFFER_SIZE};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "FCOLL_CONFIG_PATH";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub checksum: ChecksumConfig,

    #[serde(default)]
    pub collection: CollectionConfig,

    /// Console output tuning
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecksumConfig {
    /// Algorithm used when calculating new checksums
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    /// Chunk size for streaming file contents into a digest
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// File name looked up when no collection is given on the command line
    #[serde(default = "default_filename")]
    pub filename: String,
    /// Keep a `.bak` copy of the previous file on save
    #[serde(default = "default_backup")]
    pub backup: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    /// Progress ticks skipped between redraws
    #[serde(default)]
    pub progress_skip: usize,
}

impl Default for ChecksumConfig {
    fn default() -> Self {
        Self {
            algorithm: default_algorithm(),
            buffer_size: default_buffer_size(),
        }
    }
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            filename: default_filename(),
            backup: default_backup(),
        }
    }
}

impl Config {
    /// Location of the configuration file.
    ///
    /// `FCOLL_CONFIG_PATH` wins; otherwise `~/.config/filecoll/config.toml`.
    #[must_use]
    pub fn default_path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return PathBuf::from(path);
        }

        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
        home.join(".config").join("filecoll").join("config.toml")
    }

    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot read or parse the configuration file
    /// - The configuration fails validation
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            // Create default config if it doesn't exist
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        parser::parse_config_file(path)
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot write to the file
    /// - TOML serialization fails
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create config file: {}", path.display()))?;
        file.write_all(toml_str.as_bytes())?;
        Ok(())
    }

    /// Get a configuration value by key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let (section, name) = key.split_once('.')?;

        match (section, name) {
            ("checksum", "algorithm") => Some(self.checksum.algorithm.clone()),
            ("checksum", "buffer_size") => Some(self.checksum.buffer_size.to_string()),
            ("collection", "filename") => Some(self.collection.filename.clone()),
            ("collection", "backup") => Some(self.collection.backup.to_string()),
            ("output", "progress_skip") => Some(self.output.progress_skip.to_string()),
            _ => None,
        }
    }

    /// Set a configuration value by key
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The key format is invalid (must be section.key)
    /// - The key is unknown
    /// - The value is invalid for the key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let Some((section, name)) = key.split_once('.') else {
            return Err(anyhow::anyhow!("Invalid configuration key: {key}"));
        };

        match (section, name) {
            ("checksum", "algorithm") => {
                if !checksum::exists(value) {
                    return Err(anyhow::anyhow!(
                        "Unknown checksum algorithm: {value} (expected one of {})",
                        checksum::algorithms().join(", ")
                    ));
                }
                self.checksum.algorithm = value.to_uppercase();
            }
            ("checksum", "buffer_size") => {
                let size: usize = value
                    .parse()
                    .with_context(|| format!("Invalid number: {value}"))?;
                parser::validate_buffer_size(size)?;
                self.checksum.buffer_size = size;
            }
            ("collection", "filename") => {
                if value.trim().is_empty() {
                    return Err(anyhow::anyhow!("Collection filename cannot be empty"));
                }
                self.collection.filename = value.to_string();
            }
            ("collection", "backup") => {
                self.collection.backup = value
                    .parse()
                    .with_context(|| format!("Invalid boolean: {value}"))?;
            }
            ("output", "progress_skip") => {
                self.output.progress_skip = value
                    .parse()
                    .with_context(|| format!("Invalid number: {value}"))?;
            }
            _ => return Err(anyhow::anyhow!("Unknown configuration key: {key}")),
        }
        Ok(())
    }
}

// Default functions for serde
fn default_algorithm() -> String {
    "SHA256".to_string()
}

const fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

fn default_filename() -> String {
    crate::DEFAULT_COLLECTION_FILE.to_string()
}

const fn default_backup() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    fn test_load_creates_default_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested/config.toml");

        let config = Config::load(&path)?;
        assert!(path.exists());
        assert_eq!(config.checksum.algorithm, "SHA256");
        assert_eq!(config.checksum.buffer_size, DEFAULT_BUFFER_SIZE);
        assert_eq!(config.collection.filename, "collection.toml");
        assert!(config.collection.backup);
        assert_eq!(config.output.progress_skip, 0);

        let reloaded = Config::load(&path)?;
        assert_eq!(reloaded.checksum.algorithm, config.checksum.algorithm);
        Ok(())
    }

    #[test]
    fn test_get_and_set() -> Result<()> {
        let mut config = Config::default();
        config.set("checksum.algorithm", "md5")?;
        assert_eq!(config.get("checksum.algorithm").as_deref(), Some("MD5"));

        config.set("output.progress_skip", "10")?;
        assert_eq!(config.get("output.progress_skip").as_deref(), Some("10"));

        config.set("collection.backup", "false")?;
        assert!(!config.collection.backup);

        assert!(config.set("checksum.algorithm", "crc32").is_err());
        assert!(config.set("checksum.buffer_size", "12").is_err());
        assert!(config.set("collection.filename", "  ").is_err());
        assert!(config.set("nope", "1").is_err());
        assert!(config.set("core.pager", "less").is_err());
        assert_eq!(config.get("core.pager"), None);
        Ok(())
    }

    #[test]
    #[serial]
    fn test_default_path_honours_env() {
        // SAFETY: serialised with every other test touching the environment
        unsafe { std::env::set_var(CONFIG_PATH_ENV, "/tmp/custom-fcoll.toml") };
        assert_eq!(
            Config::default_path(),
            PathBuf::from("/tmp/custom-fcoll.toml")
        );
        unsafe { std::env::remove_var(CONFIG_PATH_ENV) };
        assert!(Config::default_path().ends_with("filecoll/config.toml"));
    }
}
