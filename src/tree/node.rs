//! Node payloads stored in the collection arena.

use crate::package::{Dependency, Package};
use std::path::{Path, PathBuf};

/// Recorded size of a file whose size has never been determined.
pub const UNSET_SIZE: u64 = u64::MAX;

/// Stable handle of a node inside its [`crate::tree::Collection`].
///
/// Handles stay valid until the node is deleted; they are never reused
/// while the node is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// A file or directory in the tree.
#[derive(Debug, Clone)]
pub struct Node {
    /// Path segment of this node
    pub(crate) name: String,
    /// Containing directory, `None` for the root and detached nodes
    pub(crate) parent: Option<NodeId>,
    /// Whether the parent chain reaches the collection root
    pub(crate) attached: bool,
    /// Cached logical path from the root, `/`-separated
    pub(crate) full_name: String,
    /// Cached absolute filesystem path
    pub(crate) full_path: PathBuf,
    /// File or directory payload
    pub(crate) kind: NodeKind,
}

/// Variant payload of a [`Node`].
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// A directory and its (unordered) children
    Directory(DirectoryData),
    /// A file and its metadata
    File(FileData),
}

/// Children of a directory, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct DirectoryData {
    pub(crate) children: Vec<NodeId>,
}

/// Metadata recorded for a file.
#[derive(Debug, Clone)]
pub struct FileData {
    pub(crate) size: u64,
    pub(crate) checksum: String,
    pub(crate) description: String,
    pub(crate) dirty: bool,
    pub(crate) packages: Vec<Package>,
    pub(crate) dependencies: Vec<Dependency>,
}

impl Default for FileData {
    fn default() -> Self {
        Self {
            size: UNSET_SIZE,
            checksum: String::new(),
            description: String::new(),
            dirty: true,
            packages: Vec::new(),
            dependencies: Vec::new(),
        }
    }
}

impl FileData {
    /// Recorded size, [`UNSET_SIZE`] when unknown.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Whether a size has been recorded.
    #[must_use]
    pub const fn has_size(&self) -> bool {
        self.size != UNSET_SIZE
    }

    /// Stored `ALGO:HEX` checksum, empty when unknown.
    #[must_use]
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    /// Free-text description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether the metadata of this file may be stale.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Provided packages, sorted by name.
    #[must_use]
    pub fn packages(&self) -> Vec<&Package> {
        let mut packages: Vec<&Package> = self.packages.iter().collect();
        packages.sort_by(|a, b| a.name().cmp(b.name()));
        packages
    }

    /// Required dependencies, sorted by name.
    #[must_use]
    pub fn dependencies(&self) -> Vec<&Dependency> {
        let mut dependencies: Vec<&Dependency> = self.dependencies.iter().collect();
        dependencies.sort_by(|a, b| a.name().cmp(b.name()));
        dependencies
    }

    /// Provided packages in attachment order.
    #[must_use]
    pub fn raw_packages(&self) -> &[Package] {
        &self.packages
    }

    /// Required dependencies in attachment order.
    #[must_use]
    pub fn raw_dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }
}

impl Node {
    pub(crate) fn new(name: &str, kind: NodeKind) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            attached: false,
            full_name: String::new(),
            full_path: PathBuf::new(),
            kind,
        }
    }

    /// Path segment of the node.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Containing directory.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Whether the node is reachable from the collection root.
    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.attached
    }

    /// Logical path from the collection root, e.g. `/docs/readme.txt`.
    ///
    /// Empty for the root and for detached nodes.
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Absolute filesystem path, empty for detached nodes.
    #[must_use]
    pub fn full_path(&self) -> &Path {
        &self.full_path
    }

    /// File or directory payload.
    #[must_use]
    pub const fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Whether this node is a directory.
    #[must_use]
    pub const fn is_directory(&self) -> bool {
        matches!(self.kind, NodeKind::Directory(_))
    }

    /// Whether this node is a file.
    #[must_use]
    pub const fn is_file(&self) -> bool {
        matches!(self.kind, NodeKind::File(_))
    }

    /// File metadata, if this node is a file.
    #[must_use]
    pub const fn as_file(&self) -> Option<&FileData> {
        match &self.kind {
            NodeKind::File(file) => Some(file),
            NodeKind::Directory(_) => None,
        }
    }

    pub(crate) fn as_file_mut(&mut self) -> Option<&mut FileData> {
        match &mut self.kind {
            NodeKind::File(file) => Some(file),
            NodeKind::Directory(_) => None,
        }
    }

    pub(crate) fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Directory(dir) => &dir.children,
            NodeKind::File(_) => &[],
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match &mut self.kind {
            NodeKind::Directory(dir) => Some(&mut dir.children),
            NodeKind::File(_) => None,
        }
    }
}
