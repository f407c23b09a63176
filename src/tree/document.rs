//! On-disk collection document.
//!
//! A collection is stored as TOML: a format `version`, then a `contents`
//! table holding nested `dir` / `file` arrays of tables. Empty checksums,
//! unset sizes, empty descriptions and unset versions are omitted.

use super::collection::{Collection, is_valid_name};
use super::node::{DirectoryData, FileData, NodeId, NodeKind, UNSET_SIZE};
use crate::package::{Dependency, Package};
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Current document format version.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Document {
    #[serde(default = "default_format")]
    version: u32,
    contents: DirEntry,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct DirEntry {
    #[serde(default = "untitled", skip_serializing_if = "String::is_empty")]
    name: String,
    #[serde(default, rename = "dir", skip_serializing_if = "Vec::is_empty")]
    dirs: Vec<DirEntry>,
    #[serde(default, rename = "file", skip_serializing_if = "Vec::is_empty")]
    files: Vec<FileEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FileEntry {
    #[serde(default = "untitled")]
    name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    checksum: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
    #[serde(default = "default_dirty")]
    dirty: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    description: String,
    #[serde(default, rename = "package", skip_serializing_if = "Vec::is_empty")]
    packages: Vec<PackageEntry>,
    #[serde(default, rename = "dependency", skip_serializing_if = "Vec::is_empty")]
    dependencies: Vec<DependencyEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PackageEntry {
    #[serde(default = "untitled")]
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DependencyEntry {
    #[serde(default = "untitled")]
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    minversion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    maxversion: Option<String>,
}

const fn default_format() -> u32 {
    FORMAT_VERSION
}

fn untitled() -> String {
    "untitled".to_string()
}

const fn default_dirty() -> bool {
    true
}

/// `Some(text)` for a set version, `None` otherwise.
fn version_text(version: &crate::version::Version) -> Option<String> {
    version.is_ok().then(|| version.as_str().to_string())
}

impl Collection {
    /// Loads a collection from its document file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a collection
    /// document.
    pub fn open(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read collection file: {}", path.display()))?;

        let collection = Self::parse(path, &content)
            .with_context(|| format!("Failed to load collection: {}", path.display()))?;

        info!(path = %path.display(), "opened collection");
        Ok(collection)
    }

    /// Builds a collection bound to `path` from document text.
    ///
    /// # Errors
    ///
    /// Returns an error if `content` is not a valid collection document.
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let document: Document =
            toml::from_str(content).context("Not a collection document")?;

        ensure!(
            document.version <= FORMAT_VERSION,
            "Unsupported collection format version {}",
            document.version
        );

        let mut collection = Self::new(path)?;
        let root = collection.root();
        collection.load_directory(root, document.contents)?;
        collection.clear_dirty();
        Ok(collection)
    }

    fn load_directory(&mut self, dir: NodeId, entry: DirEntry) -> Result<()> {
        for sub in entry.dirs {
            self.check_loaded_name(dir, &sub.name)?;
            let id = self.alloc(&sub.name, NodeKind::Directory(DirectoryData::default()));
            self.add_child(dir, id)?;
            self.load_directory(id, sub)?;
        }

        for file in entry.files {
            self.check_loaded_name(dir, &file.name)?;
            let data = FileData {
                size: file.size.unwrap_or(UNSET_SIZE),
                checksum: file.checksum,
                description: file.description.trim().to_string(),
                dirty: file.dirty,
                packages: file
                    .packages
                    .iter()
                    .map(|p| Package::new(&p.name, p.version.as_deref()))
                    .collect(),
                dependencies: file
                    .dependencies
                    .iter()
                    .map(|d| {
                        Dependency::new(&d.name, d.minversion.as_deref(), d.maxversion.as_deref())
                    })
                    .collect(),
            };
            let id = self.alloc(&file.name, NodeKind::File(data));
            self.add_child(dir, id)?;
        }

        Ok(())
    }

    fn check_loaded_name(&self, dir: NodeId, name: &str) -> Result<()> {
        let parent = match self[dir].full_name() {
            "" => "/",
            full => full,
        };
        ensure!(is_valid_name(name), "Invalid item name {name:?} in {parent}");
        Ok(())
    }

    /// Renders the whole tree as document text.
    ///
    /// Children, packages and dependencies are written sorted by name.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_document_string(&self) -> Result<String> {
        let document = Document {
            version: FORMAT_VERSION,
            contents: self.directory_entry(self.root()),
        };
        toml::to_string_pretty(&document).context("Failed to serialize collection")
    }

    fn directory_entry(&self, dir: NodeId) -> DirEntry {
        let mut entry = DirEntry {
            name: if dir == self.root() {
                String::new()
            } else {
                self[dir].name().to_string()
            },
            ..DirEntry::default()
        };

        for child in self.children(dir, false) {
            let node = &self[child];
            match node.kind() {
                NodeKind::Directory(_) => entry.dirs.push(self.directory_entry(child)),
                NodeKind::File(file) => entry.files.push(FileEntry {
                    name: node.name().to_string(),
                    checksum: file.checksum().to_string(),
                    size: file.has_size().then_some(file.size()),
                    dirty: file.is_dirty(),
                    description: file.description().to_string(),
                    packages: file
                        .packages()
                        .into_iter()
                        .map(|p| PackageEntry {
                            name: p.name().to_string(),
                            version: version_text(p.version()),
                        })
                        .collect(),
                    dependencies: file
                        .dependencies()
                        .into_iter()
                        .map(|d| DependencyEntry {
                            name: d.name().to_string(),
                            minversion: version_text(d.min_version()),
                            maxversion: version_text(d.max_version()),
                        })
                        .collect(),
                }),
            }
        }

        entry
    }

    /// Writes the collection to its file.
    ///
    /// With `backup`, an existing file is first renamed to the backup name,
    /// replacing any previous backup. The dirty flag is cleared only when
    /// the write succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backup or the write fails.
    pub fn save(&mut self, backup: bool) -> Result<()> {
        let content = self.to_document_string()?;
        let filename = self.filename().to_path_buf();
        let backup_name = self.backup_filename().to_path_buf();

        if backup && filename.exists() {
            if backup_name.exists() {
                std::fs::remove_file(&backup_name).with_context(|| {
                    format!("Failed to remove old backup: {}", backup_name.display())
                })?;
            }
            std::fs::rename(&filename, &backup_name)
                .with_context(|| format!("Failed to create backup: {}", backup_name.display()))?;
            debug!(backup = %backup_name.display(), "backed up collection");
        }

        std::fs::write(&filename, content)
            .with_context(|| format!("Failed to write collection file: {}", filename.display()))?;

        self.clear_dirty();
        info!(path = %filename.display(), "saved collection");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::FileData;
    use rstest::rstest;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"
version = 1

[contents]
[[contents.dir]]
name = "docs"

[[contents.dir.file]]
name = "guide.txt"
checksum = "MD5:00FF"
size = 12
dirty = false
description = "  user guide  "

[[contents.dir.file.package]]
name = "guide"
version = "2.0"

[[contents.dir.file.dependency]]
name = "viewer"
minversion = "1.0"

[[contents.file]]
name = "top.bin"
"#;

    #[test]
    fn test_parse_sample_document() -> Result<()> {
        let coll = Collection::parse(Path::new("/data/c.toml"), SAMPLE)?;
        assert!(!coll.is_dirty());

        let guide = coll.find("/docs/guide.txt").context("guide missing")?;
        let data = coll.file(guide).context("not a file")?;
        assert_eq!(data.checksum(), "MD5:00FF");
        assert_eq!(data.size(), 12);
        assert!(!data.is_dirty());
        assert_eq!(data.description(), "user guide");
        assert_eq!(data.packages()[0].to_string(), "guide 2.0");
        assert_eq!(data.dependencies()[0].to_string(), "viewer >= 1.0");

        let top = coll.find("/top.bin").context("top missing")?;
        let data = coll.file(top).context("not a file")?;
        assert!(data.is_dirty(), "missing dirty flag defaults to true");
        assert!(!data.has_size());
        Ok(())
    }

    #[test]
    fn test_missing_names_default_to_untitled() -> Result<()> {
        let coll = Collection::parse(
            Path::new("/data/c.toml"),
            "[contents]\n[[contents.file]]\nsize = 1\n",
        )?;
        assert!(coll.find("/untitled").is_some());
        Ok(())
    }

    #[test]
    fn test_rejects_foreign_documents() {
        let path = Path::new("/data/c.toml");
        assert!(Collection::parse(path, "[core]\nrepo_path = \"x\"\n").is_err());
        assert!(Collection::parse(path, "not toml at all [").is_err());
        assert!(Collection::parse(path, "version = 99\n[contents]\n").is_err());
    }

    #[rstest]
    #[case::parent("[[contents.dir]]\nname = \"..\"\n")]
    #[case::current("[[contents.file]]\nname = \".\"\n")]
    #[case::nested_path("[[contents.file]]\nname = \"a/b\"\n")]
    #[case::empty("[[contents.dir]]\nname = \"docs\"\n[[contents.dir.file]]\nname = \"\"\n")]
    fn test_rejects_invalid_item_names(#[case] body: &str) {
        let document = format!("version = 1\n[contents]\n{body}");
        let err = Collection::parse(Path::new("/data/c.toml"), &document)
            .expect_err("invalid name accepted");
        assert!(err.to_string().contains("Invalid item name"), "{err}");
    }

    #[test]
    fn test_round_trip_preserves_metadata() -> Result<()> {
        let coll = Collection::parse(Path::new("/data/c.toml"), SAMPLE)?;
        let text = coll.to_document_string()?;
        let again = Collection::parse(Path::new("/data/c.toml"), &text)?;

        for name in ["/docs", "/docs/guide.txt", "/top.bin"] {
            let lhs = coll.find(name).context("missing in original")?;
            let rhs = again.find(name).context("missing after round trip")?;
            let (lhs, rhs) = (coll.file(lhs), again.file(rhs));
            assert_eq!(lhs.map(FileData::checksum), rhs.map(FileData::checksum));
            assert_eq!(lhs.map(FileData::size), rhs.map(FileData::size));
            assert_eq!(lhs.map(FileData::description), rhs.map(FileData::description));
            assert_eq!(lhs.map(FileData::packages), rhs.map(FileData::packages));
            assert_eq!(lhs.map(FileData::dependencies), rhs.map(FileData::dependencies));
        }
        assert_eq!(text, again.to_document_string()?);
        Ok(())
    }

    #[test]
    fn test_save_creates_backup() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("collection.toml");

        let mut coll = Collection::new(&path)?;
        let root = coll.root();
        let file = coll.new_file("a.txt")?;
        coll.add_child(root, file)?;
        coll.save(true)?;
        assert!(!coll.is_dirty());
        assert!(path.exists());
        assert!(!coll.backup_filename().exists());

        coll.set_description(file, "first")?;
        coll.save(true)?;
        assert!(coll.backup_filename().exists());

        coll.set_description(file, "second")?;
        coll.save(true)?;
        let backup = std::fs::read_to_string(coll.backup_filename())?;
        assert!(backup.contains("first"));

        let reopened = Collection::open(&path)?;
        let id = reopened.find("/a.txt").context("file missing")?;
        assert_eq!(reopened.file(id).map(FileData::description), Some("second"));
        Ok(())
    }

    #[test]
    fn test_save_without_backup() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("collection.toml");
        let mut coll = Collection::new(&path)?;
        coll.save(false)?;
        coll.set_dirty();
        coll.save(false)?;
        assert!(!coll.backup_filename().exists());
        Ok(())
    }
}
