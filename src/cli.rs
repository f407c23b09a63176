//! Command-line interface definitions for fcoll.
//!
//! This module contains all CLI argument parsing structures using clap's derive macros.
//! The CLI definitions are shared between the main binary and build tools (like xtask)
//! for man page generation.
//!
//! Note: Field-level documentation is provided via clap attributes,
//! so we allow missing_docs for this module to avoid redundant documentation.

#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use clap::{ArgGroup, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Main CLI structure for fcoll.
#[derive(Parser)]
#[command(
    name = "fcoll",
    version = crate::VERSION,
    about = "File collection manager",
    long_about = "Keeps checksums, sizes, descriptions and package metadata of a directory \
                  tree in a collection file and reconciles it with the filesystem"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Collection file (default: the configured name in the current directory)
    #[arg(short, long, global = true, env = "FCOLL_COLLECTION")]
    pub collection: Option<PathBuf>,
}

/// All available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Create an empty collection file
    Init {
        /// Overwrite an existing collection file
        #[arg(short, long)]
        force: bool,
    },

    /// Check the collection against the filesystem without changing it
    Check {
        /// Directory to check (default: the whole collection)
        path: Option<String>,
    },

    /// Add files and directories found on disk but not in the collection
    Add {
        /// Directory to scan (default: the whole collection)
        path: Option<String>,
    },

    /// Remove items that no longer exist on disk
    Prune {
        /// Directory to prune (default: the whole collection)
        path: Option<String>,
    },

    /// Match missing items to renamed entries on disk
    RenameMissing {
        /// Directory to scan (default: the whole collection)
        path: Option<String>,

        /// Apply every proposed rename without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Calculate checksums of new or changed files
    Checksum {
        /// File or directory (default: the whole collection)
        path: Option<String>,

        /// Digest algorithm (default: from configuration)
        #[arg(short, long)]
        algorithm: Option<String>,

        /// Recalculate every checksum, not only stale ones
        #[arg(long)]
        all: bool,
    },

    /// Verify stored checksums against file contents
    Verify {
        /// File or directory (default: the whole collection)
        path: Option<String>,
    },

    /// Report dependencies that no package in the collection satisfies
    Deps {
        /// Directory to check (default: the whole collection)
        path: Option<String>,
    },

    /// Write a checksum manifest and an info report
    Export {
        /// Directory to export (default: the whole collection)
        path: Option<String>,

        /// Directory the reports are written to
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        output: PathBuf,
    },

    /// Mark files clean or dirty
    #[command(group(ArgGroup::new("state").required(true).args(["clean", "dirty"])))]
    Mark {
        /// File or directory (default: the whole collection)
        path: Option<String>,

        /// Metadata is up to date
        #[arg(long)]
        clean: bool,

        /// Metadata may be stale
        #[arg(long)]
        dirty: bool,
    },

    /// List collection items
    Ls {
        /// Directory or file (default: the whole collection)
        path: Option<String>,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Show size, checksum and description
        #[arg(short, long)]
        long: bool,
    },

    /// Find items by description or path pattern
    #[command(group(ArgGroup::new("query").required(true).args(["desc", "glob"])))]
    Find {
        /// Text to look for in descriptions (repeatable)
        #[arg(short, long = "desc", value_name = "TEXT")]
        desc: Vec<String>,

        /// Require every description text to match
        #[arg(long, requires = "desc")]
        all: bool,

        /// Glob over full names, e.g. '/photos/**/*.jpg'
        #[arg(short = 'p', long = "path", value_name = "GLOB")]
        glob: Option<String>,

        /// Match path patterns without regard to case
        #[arg(short = 'i', long)]
        ignore_case: bool,

        /// Directory to search (default: the whole collection)
        #[arg(long, value_name = "DIR")]
        under: Option<String>,
    },

    /// Set the description of a file
    Describe {
        /// File to describe
        path: String,

        /// Description text (empty clears it)
        text: String,
    },

    /// Record that a file provides a package
    Provide {
        /// File providing the package
        path: String,

        /// Package name
        name: String,

        /// Package version
        version: Option<String>,

        /// Remove the package instead
        #[arg(short, long)]
        remove: bool,
    },

    /// Record that a file requires a package
    Require {
        /// File requiring the package
        path: String,

        /// Package name
        name: String,

        /// Lowest acceptable version
        #[arg(long)]
        min: Option<String>,

        /// Highest acceptable version
        #[arg(long)]
        max: Option<String>,

        /// Remove the dependency instead
        #[arg(short, long)]
        remove: bool,
    },

    /// Move an item into another directory of the collection
    Mv {
        /// Item to move
        source: String,

        /// Target directory
        target: String,
    },

    /// Remove an item (and everything below it) from the collection
    Rm {
        /// Item to remove
        path: String,
    },

    /// Rename an item in the collection
    Rename {
        /// Item to rename
        path: String,

        /// New name
        name: String,
    },

    /// Get and set configuration options
    Config {
        /// Configuration key (section.key)
        key: Option<String>,

        /// Configuration value to set
        value: Option<String>,

        /// List all configuration values
        #[arg(short, long)]
        list: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
