//! Deterministic Directory Tree Capture
//!
//! Walks a directory recursively and produces a nested name -> entry mapping
//! with regular files marked as leaves. Entry order is ascending by name so
//! two walks of the same tree always produce identical output.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use serde::ser::{Serialize, SerializeMap, Serializer};
use tokio::fs;
use tracing::debug;

use crate::{Error, Result};

/// Serialized marker for regular files in the tree mapping
const FILE_MARKER: &str = "file";

/// One node of a captured directory tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileTreeNode {
    /// Regular file leaf
    File,
    /// Subdirectory with its children keyed by entry name
    Directory(BTreeMap<String, FileTreeNode>),
}

impl FileTreeNode {
    /// Whether this node is a file leaf
    pub fn is_file(&self) -> bool {
        matches!(self, FileTreeNode::File)
    }

    /// Look up a direct child by entry name
    pub fn child(&self, name: &str) -> Option<&FileTreeNode> {
        match self {
            FileTreeNode::File => None,
            FileTreeNode::Directory(children) => children.get(name),
        }
    }

    /// Number of file leaves in the subtree rooted at this node
    pub fn file_count(&self) -> usize {
        match self {
            FileTreeNode::File => 1,
            FileTreeNode::Directory(children) => {
                children.values().map(FileTreeNode::file_count).sum()
            }
        }
    }

    /// Pretty-printed JSON rendering of the nested mapping
    pub fn to_pretty_json(&self) -> String {
        // A string-keyed map cannot fail to serialize
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

impl Serialize for FileTreeNode {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            FileTreeNode::File => serializer.serialize_str(FILE_MARKER),
            FileTreeNode::Directory(children) => {
                let mut map = serializer.serialize_map(Some(children.len()))?;
                for (name, child) in children {
                    map.serialize_entry(name, child)?;
                }
                map.end()
            }
        }
    }
}

/// Capture the directory structure rooted at `root`.
///
/// Any failure (missing path, permission denied, unreadable entry) aborts the
/// whole walk; no partial tree is returned. Symlinks are resolved through
/// metadata, so a link to a directory is descended into.
pub async fn walk(root: &Path) -> Result<FileTreeNode> {
    let meta = fs::metadata(root).await?;
    if !meta.is_dir() {
        return Err(Error::NotADirectory(root.to_path_buf()));
    }
    debug!(root = %root.display(), "walking directory tree");
    walk_dir(root.to_path_buf()).await
}

// Boxed so the async recursion has a nameable future type.
fn walk_dir(dir: PathBuf) -> Pin<Box<dyn Future<Output = Result<FileTreeNode>> + Send>> {
    Box::pin(async move {
        let mut names = Vec::new();
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name());
        }
        // Sorted so traversal and failure order are stable across runs
        names.sort();

        let mut children = BTreeMap::new();
        for name in names {
            let path = dir.join(&name);
            let meta = fs::metadata(&path).await?;
            let node = if meta.is_dir() {
                walk_dir(path).await?
            } else {
                FileTreeNode::File
            };
            children.insert(name.to_string_lossy().into_owned(), node);
        }
        Ok(FileTreeNode::Directory(children))
    })
}
