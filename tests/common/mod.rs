#![allow(dead_code)]

use anyhow::Result;
use filecoll::CollectionContext;
use filecoll::tree::Collection;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Data directory with an initialised collection file and a private
/// configuration file, both inside one temporary directory.
pub struct TestCollection {
    pub temp_dir: TempDir,
    pub ctx: CollectionContext,
}

impl TestCollection {
    /// Create an empty data directory with an empty collection
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let data = temp_dir.path().join("data");
        fs::create_dir_all(&data)?;

        let ctx = CollectionContext::new_explicit(
            data.join("collection.toml"),
            temp_dir.path().join("config.toml"),
        )?;
        Collection::new(&ctx.collection_path)?.save(false)?;

        Ok(Self { temp_dir, ctx })
    }

    /// Root of the catalogued tree on disk
    pub fn root(&self) -> PathBuf {
        self.temp_dir.path().join("data")
    }

    /// Path of the configuration file used by this fixture
    pub fn config_path(&self) -> &Path {
        &self.ctx.config_path
    }

    /// Write a file below the data directory, creating parents
    pub fn write(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Load the collection as currently saved
    pub fn open(&self) -> Result<Collection> {
        self.ctx.open_collection()
    }
}
