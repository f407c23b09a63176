use anyhow::{Context, Result};
use colored::Colorize;
use std::collections::HashSet;
use std::path::Path;

/// Flags configuration keys the program does not recognise.
pub struct ConfigValidator {
    /// Every `section.key` the configuration understands
    known_fields: HashSet<&'static str>,
    /// Sections that may appear as tables
    known_sections: HashSet<&'static str>,
}

impl ConfigValidator {
    /// Create a new validator with known configuration fields
    #[must_use]
    pub fn new() -> Self {
        let known_fields = [
            "checksum.algorithm",
            "checksum.buffer_size",
            "collection.filename",
            "collection.backup",
            "output.progress_skip",
        ]
        .into_iter()
        .collect();

        let known_sections = ["checksum", "collection", "output"].into_iter().collect();

        Self {
            known_fields,
            known_sections,
        }
    }

    /// Lists unknown keys of a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn unknown_fields(&self, config_path: &Path) -> Result<Vec<String>> {
        if !config_path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
        let parsed: toml::Value = toml::from_str(&content)?;

        let mut unknown = Vec::new();
        if let toml::Value::Table(map) = &parsed {
            for (section, value) in map {
                if !self.known_sections.contains(section.as_str()) {
                    unknown.push(section.clone());
                    continue;
                }

                if let toml::Value::Table(entries) = value {
                    for key in entries.keys() {
                        let full_key = format!("{section}.{key}");
                        if !self.known_fields.contains(full_key.as_str()) {
                            unknown.push(full_key);
                        }
                    }
                } else {
                    unknown.push(section.clone());
                }
            }
        }

        Ok(unknown)
    }

    /// Prints a warning block for unknown keys, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub fn validate_config_file(&self, config_path: &Path) -> Result<()> {
        let unknown = self.unknown_fields(config_path)?;
        if unknown.is_empty() {
            return Ok(());
        }

        eprintln!("{}", "Configuration warnings:".yellow().bold());
        for field in unknown {
            eprintln!("  Unknown configuration field: {}", field.yellow());
        }
        eprintln!();

        Ok(())
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}
