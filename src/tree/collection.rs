//! The collection arena and its structural operations.
//!
//! Nodes live in an arena owned by [`Collection`] and refer to each other
//! through [`NodeId`] handles. Ownership flows strictly downwards: a
//! directory lists its children, a child only remembers its parent's id.
//! A node is *attached* while its parent chain reaches the root; only
//! attached nodes carry valid `full_name` / `full_path` caches.
//!
//! Every mutation of an attached node marks the collection dirty. The flag
//! is cleared only by a successful save or an explicit
//! [`Collection::clear_dirty`].

use super::node::{DirectoryData, FileData, Node, NodeId, NodeKind, UNSET_SIZE};
use crate::package::{Dependency, Package};
use anyhow::{Context, Result, bail, ensure};
use std::ffi::OsString;
use std::ops::Index;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Separator of logical full names.
pub const NAME_SEPARATOR: char = '/';

/// A catalogued tree of files and directories rooted next to its data file.
#[derive(Debug, Clone)]
pub struct Collection {
    /// Node arena; deleted slots become `None` and are never reused
    nodes: Vec<Option<Node>>,
    /// Root directory handle
    root: NodeId,
    /// Absolute path of the persisted collection file
    filename: PathBuf,
    /// Absolute path of the backup written before each save
    backup: PathBuf,
    /// Whether the tree differs from the last save
    dirty: bool,
}

impl Collection {
    /// Creates an empty collection persisted at `filename`.
    ///
    /// The tree root is the directory containing the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be made absolute.
    pub fn new(filename: &Path) -> Result<Self> {
        let filename = std::path::absolute(filename)
            .with_context(|| format!("Failed to resolve collection path {}", filename.display()))?;

        let mut backup: OsString = filename.as_os_str().to_owned();
        backup.push(".bak");

        let mut root = Node::new("", NodeKind::Directory(DirectoryData::default()));
        root.attached = true;
        root.full_path = filename
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Ok(Self {
            nodes: vec![Some(root)],
            root: NodeId(0),
            filename,
            backup: PathBuf::from(backup),
            dirty: false,
        })
    }

    /// Root directory of the tree.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Path of the persisted collection file.
    #[must_use]
    pub fn filename(&self) -> &Path {
        &self.filename
    }

    /// Path of the backup file (`<filename>.bak`).
    #[must_use]
    pub fn backup_filename(&self) -> &Path {
        &self.backup
    }

    /// Filesystem directory the tree root maps to.
    #[must_use]
    pub fn root_path(&self) -> &Path {
        self[self.root].full_path()
    }

    /// Whether the tree changed since it was loaded or last saved.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Marks the collection as modified.
    pub fn set_dirty(&mut self) {
        self.dirty = true;
    }

    /// Forgets pending modifications, e.g. after a successful save.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Looks up a node, `None` if the handle was deleted.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    /// File metadata of `id`, `None` for directories and deleted handles.
    #[must_use]
    pub fn file(&self, id: NodeId) -> Option<&FileData> {
        self.get(id).and_then(Node::as_file)
    }

    /// Whether `id` refers to a live directory.
    #[must_use]
    pub fn is_directory(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_directory)
    }

    /// Whether `id` refers to a live file.
    #[must_use]
    pub fn is_file(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_file)
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match self.nodes.get_mut(id.0).and_then(Option::as_mut) {
            Some(node) => node,
            None => panic!("stale node handle {id:?}"),
        }
    }

    /// Marks the collection dirty if `id` is part of the tree.
    fn touch(&mut self, id: NodeId) {
        if self.get(id).is_some_and(Node::is_attached) {
            self.dirty = true;
        }
    }

    // ------------------------------------------------------------------
    // Node creation
    // ------------------------------------------------------------------

    pub(crate) fn alloc(&mut self, name: &str, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(Node::new(name, kind)));
        id
    }

    /// Creates a detached, empty file node.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is not a valid path segment.
    pub fn new_file(&mut self, name: &str) -> Result<NodeId> {
        ensure!(is_valid_name(name), "Invalid file name: {name:?}");
        Ok(self.alloc(name, NodeKind::File(FileData::default())))
    }

    /// Creates a detached, empty directory node.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is not a valid path segment.
    pub fn new_directory(&mut self, name: &str) -> Result<NodeId> {
        ensure!(is_valid_name(name), "Invalid directory name: {name:?}");
        Ok(self.alloc(name, NodeKind::Directory(DirectoryData::default())))
    }

    // ------------------------------------------------------------------
    // Cache maintenance
    // ------------------------------------------------------------------

    /// Recomputes the cached full name and path of `id` and every
    /// descendant from their parents.
    ///
    /// Detached subtrees end up with empty caches.
    pub fn reset(&mut self, id: NodeId) {
        let mut stack = vec![id];

        while let Some(current) = stack.pop() {
            if current == self.root {
                stack.extend_from_slice(self[current].children());
                continue;
            }

            let (attached, full_name, full_path) = match self[current].parent {
                Some(parent) if self[parent].attached => {
                    let parent = &self[parent];
                    let name = &self[current].name;
                    (
                        true,
                        format!("{}{NAME_SEPARATOR}{name}", parent.full_name),
                        parent.full_path.join(name),
                    )
                }
                _ => (false, String::new(), PathBuf::new()),
            };

            let node = self.node_mut(current);
            node.attached = attached;
            node.full_name = full_name;
            node.full_path = full_path;

            stack.extend_from_slice(node.children());
        }
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    /// Whether `node` lies strictly below `ancestor`.
    #[must_use]
    pub fn is_descendant(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.get(node).and_then(Node::parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).and_then(Node::parent);
        }
        false
    }

    /// Attaches `child` under `dir`, detaching it from any previous parent.
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` is not a directory, `child` is the root,
    /// or the attachment would make a directory its own descendant.
    pub fn add_child(&mut self, dir: NodeId, child: NodeId) -> Result<()> {
        ensure!(self.is_directory(dir), "Target is not a directory");
        ensure!(self.get(child).is_some(), "Unknown node {child:?}");
        ensure!(child != self.root, "The collection root cannot be re-parented");
        ensure!(
            child != dir && !self.is_descendant(dir, child),
            "Cannot place {} inside itself",
            self[child].name
        );

        let previous = self[child].parent;
        if previous == Some(dir) {
            return Ok(());
        }

        if let Some(previous) = previous {
            self.remove_child(previous, child);
        }

        if let Some(children) = self.node_mut(dir).children_mut() {
            children.push(child);
        }
        self.node_mut(child).parent = Some(dir);
        self.reset(child);
        self.touch(dir);

        debug!(parent = ?dir, child = ?child, "attached node");
        Ok(())
    }

    /// Detaches `child` from `dir`, leaving it alive but unattached.
    ///
    /// Returns `false` if `child` is not a child of `dir`.
    pub fn remove_child(&mut self, dir: NodeId, child: NodeId) -> bool {
        if self.get(child).and_then(Node::parent) != Some(dir) {
            return false;
        }

        if let Some(children) = self.node_mut(dir).children_mut() {
            children.retain(|id| *id != child);
        }
        self.node_mut(child).parent = None;
        self.reset(child);
        self.touch(dir);

        debug!(parent = ?dir, child = ?child, "detached node");
        true
    }

    /// Whether `id` may be deleted. The root never can.
    #[must_use]
    pub fn can_delete(&self, id: NodeId) -> bool {
        id != self.root && self.get(id).is_some()
    }

    /// Deletes `id` together with its whole subtree.
    ///
    /// # Errors
    ///
    /// Returns an error if [`Collection::can_delete`] refuses.
    pub fn delete(&mut self, id: NodeId) -> Result<()> {
        ensure!(self.can_delete(id), "This item cannot be deleted");

        if let Some(parent) = self[id].parent {
            self.remove_child(parent, id);
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(current.0).and_then(Option::take) {
                stack.extend_from_slice(node.children());
            }
        }

        debug!(node = ?id, "deleted subtree");
        Ok(())
    }

    /// Whether `id` may be renamed to `name`.
    ///
    /// Rejects the root, empty names, `.`, `..`, names containing a path
    /// separator and renames to the current name.
    #[must_use]
    pub fn can_rename(&self, id: NodeId, name: &str) -> bool {
        if id == self.root || !is_valid_name(name) {
            return false;
        }
        self.get(id).is_some_and(|node| node.name != name)
    }

    /// Renames `id` and refreshes the caches of its subtree.
    ///
    /// # Errors
    ///
    /// Returns an error if [`Collection::can_rename`] refuses.
    pub fn rename(&mut self, id: NodeId, name: &str) -> Result<()> {
        if !self.can_rename(id, name) {
            bail!("Cannot rename to {name:?}");
        }

        self.node_mut(id).name = name.to_string();
        self.touch(id);
        self.reset(id);
        Ok(())
    }

    /// Whether `id` may be moved into directory `target`.
    ///
    /// Moving to the current parent is a no-op and refused, as is moving a
    /// directory into itself or any of its descendants.
    #[must_use]
    pub fn can_move(&self, id: NodeId, target: NodeId) -> bool {
        if id == self.root || !self.is_directory(target) {
            return false;
        }

        let Some(node) = self.get(id) else {
            return false;
        };

        if node.parent == Some(target) {
            return false;
        }

        if node.is_directory() && (target == id || self.is_descendant(target, id)) {
            return false;
        }

        true
    }

    /// Moves `id` into directory `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if [`Collection::can_move`] refuses.
    pub fn move_to(&mut self, id: NodeId, target: NodeId) -> Result<()> {
        ensure!(self.can_move(id, target), "Cannot move item to this location");
        self.add_child(target, id)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Children of `dir` sorted by name.
    ///
    /// When `recursive`, each directory is immediately followed by its own
    /// (sorted, recursive) children.
    #[must_use]
    pub fn children(&self, dir: NodeId, recursive: bool) -> Vec<NodeId> {
        let mut results = Vec::new();
        self.collect_children(dir, recursive, &mut results);
        results
    }

    fn collect_children(&self, dir: NodeId, recursive: bool, results: &mut Vec<NodeId>) {
        let Some(node) = self.get(dir) else {
            return;
        };

        let mut children = node.children().to_vec();
        children.sort_by(|a, b| self[*a].name.cmp(&self[*b].name));

        for child in children {
            results.push(child);
            if recursive && self[child].is_directory() {
                self.collect_children(child, recursive, results);
            }
        }
    }

    /// `dir` itself followed by all of its descendants.
    #[must_use]
    pub fn subtree(&self, dir: NodeId) -> Vec<NodeId> {
        let mut results = vec![dir];
        self.collect_children(dir, true, &mut results);
        results
    }

    /// Directory children of `dir`, in [`Collection::children`] order.
    #[must_use]
    pub fn directories(&self, dir: NodeId, recursive: bool) -> Vec<NodeId> {
        self.children(dir, recursive)
            .into_iter()
            .filter(|id| self[*id].is_directory())
            .collect()
    }

    /// File children of `dir`, in [`Collection::children`] order.
    #[must_use]
    pub fn files(&self, dir: NodeId, recursive: bool) -> Vec<NodeId> {
        self.children(dir, recursive)
            .into_iter()
            .filter(|id| self[*id].is_file())
            .collect()
    }

    /// Whether `dir` has a file child called `name`.
    #[must_use]
    pub fn has_file(&self, dir: NodeId, name: &str) -> bool {
        self.get(dir).is_some_and(|node| {
            node.children()
                .iter()
                .any(|id| self[*id].is_file() && self[*id].name == name)
        })
    }

    /// Whether `dir` has a directory child called `name`.
    #[must_use]
    pub fn has_directory(&self, dir: NodeId, name: &str) -> bool {
        self.get(dir).is_some_and(|node| {
            node.children()
                .iter()
                .any(|id| self[*id].is_directory() && self[*id].name == name)
        })
    }

    /// Whether `dir` has any file children.
    #[must_use]
    pub fn has_files(&self, dir: NodeId) -> bool {
        self.get(dir)
            .is_some_and(|node| node.children().iter().any(|id| self[*id].is_file()))
    }

    /// Whether `dir` has any directory children.
    #[must_use]
    pub fn has_directories(&self, dir: NodeId) -> bool {
        self.get(dir)
            .is_some_and(|node| node.children().iter().any(|id| self[*id].is_directory()))
    }

    /// Looks a node up by its logical full name (`/a/b`, leading slash
    /// optional). The empty name resolves to the root.
    #[must_use]
    pub fn find(&self, full_name: &str) -> Option<NodeId> {
        full_name
            .split(NAME_SEPARATOR)
            .filter(|segment| !segment.is_empty())
            .try_fold(self.root, |dir, segment| {
                self.children(dir, false)
                    .into_iter()
                    .find(|id| self[*id].name == segment)
            })
    }

    /// The full name `id` would have under `parent` (default: its current
    /// parent) and with `new_name` (default: its current name).
    ///
    /// Empty when there is no parent to resolve against.
    #[must_use]
    pub fn full_name_under(
        &self,
        id: NodeId,
        parent: Option<NodeId>,
        new_name: Option<&str>,
    ) -> String {
        let Some(node) = self.get(id) else {
            return String::new();
        };
        let Some(parent) = parent.or(node.parent).and_then(|p| self.get(p)) else {
            return String::new();
        };

        let name = new_name.unwrap_or(&node.name);
        format!("{}{NAME_SEPARATOR}{name}", parent.full_name)
    }

    /// Whether the node exists on disk as the right kind of entry.
    ///
    /// Detached nodes never exist.
    #[must_use]
    pub fn exists(&self, id: NodeId) -> bool {
        let Some(node) = self.get(id) else {
            return false;
        };
        if !node.attached {
            return false;
        }

        match node.kind {
            NodeKind::Directory(_) => node.full_path.is_dir(),
            NodeKind::File(_) => node.full_path.is_file(),
        }
    }

    /// Size of the file on disk, [`UNSET_SIZE`] if it cannot be read.
    #[must_use]
    pub fn real_size(&self, id: NodeId) -> u64 {
        if !self.is_file(id) || !self.exists(id) {
            return UNSET_SIZE;
        }
        std::fs::metadata(self[id].full_path()).map_or(UNSET_SIZE, |meta| meta.len())
    }

    /// Every package provided by any file in the collection.
    #[must_use]
    pub fn packages(&self) -> Vec<(NodeId, &Package)> {
        self.files(self.root, true)
            .into_iter()
            .flat_map(|id| {
                self.file(id)
                    .map(FileData::packages)
                    .unwrap_or_default()
                    .into_iter()
                    .map(move |package| (id, package))
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // File metadata
    // ------------------------------------------------------------------

    fn file_mut(&mut self, id: NodeId) -> Result<&mut FileData> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .and_then(Node::as_file_mut)
            .context("Item is not a file")
    }

    /// Stores a new checksum; a change also flags the file dirty.
    ///
    /// Returns whether the value changed.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not a file.
    pub fn set_checksum(&mut self, id: NodeId, checksum: &str) -> Result<bool> {
        let file = self.file_mut(id)?;
        if file.checksum == checksum {
            return Ok(false);
        }
        file.checksum = checksum.to_string();
        file.dirty = true;
        self.touch(id);
        Ok(true)
    }

    /// Stores a new recorded size. Returns whether the value changed.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not a file.
    pub fn set_size(&mut self, id: NodeId, size: u64) -> Result<bool> {
        let file = self.file_mut(id)?;
        if file.size == size {
            return Ok(false);
        }
        file.size = size;
        self.touch(id);
        Ok(true)
    }

    /// Stores a description, trimmed of surrounding whitespace.
    /// Returns whether the value changed.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not a file.
    pub fn set_description(&mut self, id: NodeId, description: &str) -> Result<bool> {
        let description = description.trim();
        let file = self.file_mut(id)?;
        if file.description == description {
            return Ok(false);
        }
        file.description = description.to_string();
        self.touch(id);
        Ok(true)
    }

    /// Sets the per-file dirty flag. Returns whether the value changed.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not a file.
    pub fn mark_file_dirty(&mut self, id: NodeId, dirty: bool) -> Result<bool> {
        let file = self.file_mut(id)?;
        if file.dirty == dirty {
            return Ok(false);
        }
        file.dirty = dirty;
        self.touch(id);
        Ok(true)
    }

    /// Attaches a package to file `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not a file.
    pub fn add_package(&mut self, id: NodeId, package: Package) -> Result<()> {
        self.file_mut(id)?.packages.push(package);
        self.touch(id);
        Ok(())
    }

    /// Detaches the first package called `name` from file `id`.
    pub fn remove_package(&mut self, id: NodeId, name: &str) -> Option<Package> {
        let file = self.file_mut(id).ok()?;
        let index = file.packages.iter().position(|p| p.name() == name)?;
        let package = file.packages.remove(index);
        self.touch(id);
        Some(package)
    }

    /// Edits the package at `index` (attachment order) of file `id`.
    ///
    /// `edit` returns whether it changed anything; the collection is only
    /// marked dirty in that case. Returns the result of `edit`, or `false`
    /// when there is no such package.
    pub fn edit_package(
        &mut self,
        id: NodeId,
        index: usize,
        edit: impl FnOnce(&mut Package) -> bool,
    ) -> bool {
        let Some(package) = self
            .file_mut(id)
            .ok()
            .and_then(|file| file.packages.get_mut(index))
        else {
            return false;
        };

        let changed = edit(package);
        if changed {
            self.touch(id);
        }
        changed
    }

    /// Attaches a dependency to file `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not a file.
    pub fn add_dependency(&mut self, id: NodeId, dependency: Dependency) -> Result<()> {
        self.file_mut(id)?.dependencies.push(dependency);
        self.touch(id);
        Ok(())
    }

    /// Detaches the first dependency called `name` from file `id`.
    pub fn remove_dependency(&mut self, id: NodeId, name: &str) -> Option<Dependency> {
        let file = self.file_mut(id).ok()?;
        let index = file.dependencies.iter().position(|d| d.name() == name)?;
        let dependency = file.dependencies.remove(index);
        self.touch(id);
        Some(dependency)
    }

    /// Edits the dependency at `index` (attachment order) of file `id`.
    ///
    /// Same contract as [`Collection::edit_package`].
    pub fn edit_dependency(
        &mut self,
        id: NodeId,
        index: usize,
        edit: impl FnOnce(&mut Dependency) -> bool,
    ) -> bool {
        let Some(dependency) = self
            .file_mut(id)
            .ok()
            .and_then(|file| file.dependencies.get_mut(index))
        else {
            return false;
        };

        let changed = edit(dependency);
        if changed {
            self.touch(id);
        }
        changed
    }
}

impl Index<NodeId> for Collection {
    type Output = Node;

    /// # Panics
    ///
    /// Panics if the node was deleted.
    fn index(&self, id: NodeId) -> &Node {
        match self.get(id) {
            Some(node) => node,
            None => panic!("stale node handle {id:?}"),
        }
    }
}

/// Whether `name` is usable as a single path segment.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}
