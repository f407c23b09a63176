//! The catalogued file tree.
//!
//! - [`node`]: node payloads (files, directories, metadata)
//! - [`collection`]: the arena owning every node plus structural operations
//! - [`document`]: loading and saving the collection file

pub mod collection;
pub mod document;
pub mod node;

pub use collection::{Collection, NAME_SEPARATOR, is_valid_name};
pub use document::FORMAT_VERSION;
pub use node::{DirectoryData, FileData, Node, NodeId, NodeKind, UNSET_SIZE};
