#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
// Allow pedantic strict lints that create false positives in this codebase
#![allow(clippy::arithmetic_side_effects)] // Simple counters cannot overflow
#![allow(clippy::indexing_slicing)] // Node handles are checked by the arena

//! # filecoll - File Collection Manager
//!
//! `filecoll` keeps a catalogue of a directory tree in a single collection
//! file next to the data: per-file checksums, sizes, free-text
//! descriptions and the packages each file provides or requires. The
//! catalogue is reconciled against the live filesystem on demand.
//!
//! ## Architecture
//!
//! - [`version`]: version strings and their ordering
//! - [`package`]: provided packages and required dependencies
//! - [`checksum`]: streaming `ALGO:HEX` digests
//! - [`tree`]: the collection arena, structural edits and the file format
//! - [`reconcile`]: scans that compare the tree with the filesystem
//! - [`config`]: configuration parsing and validation
//! - [`output`]: terminal output, progress display and the console sink
//! - [`commands`]: the `fcoll` subcommands
//!
//! ## Example Usage
//!
//! ```no_run
//! use filecoll::reconcile::{self, RecordingCallback};
//! use filecoll::tree::Collection;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut collection = Collection::open(Path::new("collection.toml"))?;
//! let root = collection.root();
//!
//! let mut report = RecordingCallback::new();
//! reconcile::add_new_items(&mut collection, root, &mut report)?;
//! reconcile::calculate_checksums_in(&mut collection, root, &mut report, "SHA256", false, 1 << 20)?;
//!
//! if collection.is_dirty() {
//!     collection.save(true)?;
//! }
//! # Ok(())
//! # }
//! ```

/// Streaming checksum calculation.
pub mod checksum;

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Commands module containing all CLI command implementations.
pub mod commands;

/// Configuration parsing, validation, and management.
pub mod config;

/// Output formatting and progress display.
pub mod output;

/// Provided packages and required dependencies.
pub mod package;

/// Reconciliation of the tree against the filesystem.
pub mod reconcile;

/// The catalogued file tree and its persistence.
pub mod tree;

/// Version parsing and ordering.
pub mod version;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tree::{Collection, NAME_SEPARATOR, NodeId};

/// Current version of the fcoll binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Collection file name used when none is configured.
pub const DEFAULT_COLLECTION_FILE: &str = "collection.toml";

/// Environment variable holding the `tracing` filter for the binary.
pub const LOG_ENV: &str = "FCOLL_LOG";

/// Central context for all fcoll commands.
///
/// Holds the loaded configuration, the location of the collection file and
/// the cancellation flag shared with the Ctrl-C handler.
///
/// # Examples
///
/// ```no_run
/// use filecoll::CollectionContext;
///
/// # fn main() -> anyhow::Result<()> {
/// // Default configuration, collection file in the current directory
/// let ctx = CollectionContext::new(None)?;
///
/// // Explicit paths (for testing)
/// let ctx = CollectionContext::new_explicit(
///     "/tmp/data/collection.toml".into(),
///     "/tmp/fcoll-config.toml".into(),
/// )?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CollectionContext {
    /// Path to the collection file.
    pub collection_path: PathBuf,

    /// Path to the configuration file.
    pub config_path: PathBuf,

    /// Loaded configuration settings.
    pub config: config::Config,

    /// Whether to run in non-interactive mode (no prompts).
    /// Used primarily for testing to prevent stdin reads.
    pub non_interactive: bool,

    /// Set to stop the running operation at its next checkpoint.
    pub cancel: Arc<AtomicBool>,
}

impl CollectionContext {
    /// Creates a context from the default configuration file.
    ///
    /// Without an explicit `collection` the configured file name in the
    /// current directory is used.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be loaded or the
    /// current directory cannot be determined.
    pub fn new(collection: Option<PathBuf>) -> Result<Self> {
        let config_path = config::Config::default_path();
        let config = config::Config::load(&config_path)?;

        // Validate configuration and warn about issues
        let validator = config::validator::ConfigValidator::new();
        if let Err(e) = validator.validate_config_file(&config_path) {
            output::warning(&format!("Configuration validation failed: {e}"));
        }

        let collection_path = match collection {
            Some(path) => path,
            None => std::env::current_dir()
                .context("Could not determine current directory")?
                .join(&config.collection.filename),
        };

        Ok(Self {
            collection_path,
            config_path,
            config,
            non_interactive: false,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Creates a context with explicit paths and prompts disabled.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be loaded or created.
    pub fn new_explicit(collection_path: PathBuf, config_path: PathBuf) -> Result<Self> {
        let config = config::Config::load(&config_path)?;

        Ok(Self {
            collection_path,
            config_path,
            config,
            non_interactive: true,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Loads the collection file.
    ///
    /// # Errors
    /// Returns an error if the file does not exist or cannot be parsed.
    pub fn open_collection(&self) -> Result<Collection> {
        if !self.collection_path.exists() {
            return Err(anyhow::anyhow!(
                "No collection found at {}. Did you run 'fcoll init'?",
                self.collection_path.display()
            ));
        }
        Collection::open(&self.collection_path)
    }

    /// Saves `collection` if it has unsaved changes.
    ///
    /// Returns whether a save happened.
    ///
    /// # Errors
    /// Returns an error if writing the file fails.
    pub fn save_if_dirty(&self, collection: &mut Collection) -> Result<bool> {
        if !collection.is_dirty() {
            return Ok(false);
        }
        collection.save(self.config.collection.backup)?;
        Ok(true)
    }

    /// Resolves a command-line path to a node.
    ///
    /// The argument is taken as a filesystem path (relative to the current
    /// directory) when it lies inside the collection root, and as a logical
    /// `/a/b` name otherwise. No argument means the root.
    ///
    /// # Errors
    /// Returns an error if no such node exists.
    pub fn resolve(&self, collection: &Collection, path: Option<&str>) -> Result<NodeId> {
        let Some(path) = path else {
            return Ok(collection.root());
        };

        let name = logical_name(collection.root_path(), path)
            .unwrap_or_else(|| path.to_string());

        collection
            .find(&name)
            .with_context(|| format!("Not in the collection: {path}"))
    }
}

/// Logical name of `path` if it is a filesystem path below `root`.
fn logical_name(root: &Path, path: &str) -> Option<String> {
    let absolute = std::path::absolute(path).ok()?;
    let relative = absolute.strip_prefix(root).ok()?;

    let mut name = String::new();
    for component in relative.components() {
        match component {
            std::path::Component::Normal(part) => {
                name.push(NAME_SEPARATOR);
                name.push_str(part.to_str()?);
            }
            std::path::Component::CurDir => {}
            _ => return None,
        }
    }
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_logical_name() {
        let root = Path::new("/srv/data");
        assert_eq!(logical_name(root, "/srv/data/a/b.txt").as_deref(), Some("/a/b.txt"));
        assert_eq!(logical_name(root, "/srv/data").as_deref(), Some(""));
        assert_eq!(logical_name(root, "/elsewhere/a"), None);
    }

    #[test]
    fn test_context_resolves_paths() -> Result<()> {
        let dir = tempdir()?;
        let collection_path = dir.path().join("collection.toml");
        let ctx = CollectionContext::new_explicit(
            collection_path.clone(),
            dir.path().join("config.toml"),
        )?;

        assert!(ctx.open_collection().is_err());

        let mut coll = Collection::new(&collection_path)?;
        let root = coll.root();
        let docs = coll.new_directory("docs")?;
        coll.add_child(root, docs)?;
        assert!(ctx.save_if_dirty(&mut coll)?);
        assert!(!ctx.save_if_dirty(&mut coll)?);

        let coll = ctx.open_collection()?;
        let docs = coll.find("/docs");
        assert_eq!(ctx.resolve(&coll, None)?, coll.root());
        assert_eq!(Some(ctx.resolve(&coll, Some("/docs"))?), docs);
        let fs_path = dir.path().join("docs");
        assert_eq!(
            Some(ctx.resolve(&coll, fs_path.to_str())?),
            docs
        );
        assert!(ctx.resolve(&coll, Some("/nope")).is_err());
        Ok(())
    }
}
