//! Source File Discovery
//!
//! Finds the analyzable source files under a target directory, skipping
//! version-control internals, build artifacts, and dependency caches.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::Result;

/// Directory names excluded from discovery
pub fn default_exclusion_patterns() -> HashSet<&'static str> {
    let mut patterns = HashSet::new();

    // Version control
    patterns.insert(".git");
    patterns.insert(".svn");
    patterns.insert(".hg");

    // Build artifacts
    patterns.insert("build");
    patterns.insert("dist");
    patterns.insert("target");
    patterns.insert("__pycache__");

    // Virtual environments and dependency caches
    patterns.insert("venv");
    patterns.insert(".venv");
    patterns.insert("node_modules");

    // IDE state
    patterns.insert(".vscode");
    patterns.insert(".idea");

    patterns
}

/// File extensions treated as source code
fn source_extensions() -> HashSet<&'static str> {
    [
        "c", "h", "cc", "cpp", "hpp", "rs", "py", "js", "jsx", "ts", "tsx", "go", "java", "rb",
        "php", "sh",
    ]
    .into_iter()
    .collect()
}

/// List the source files under `root`, ascending by path, capped at `limit`.
///
/// The cap bounds how many model invocations a scan can issue; discovery
/// itself still visits the whole tree so the ordering is stable.
pub fn discover_source_files(root: &Path, limit: usize) -> Result<Vec<PathBuf>> {
    let excluded = default_exclusion_patterns();
    let extensions = source_extensions();

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            !(entry.file_type().is_dir() && excluded.contains(name.as_ref()))
        });

    for entry in walker {
        let entry = entry.map_err(|e| crate::Error::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_source = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.contains(ext));
        if is_source {
            files.push(entry.into_path());
        }
    }

    debug!(root = %root.display(), found = files.len(), "discovered source files");
    files.truncate(limit);
    Ok(files)
}
