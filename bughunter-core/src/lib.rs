//! BugHunter Core - Filesystem Primitives
//!
//! This crate provides the filesystem layer for automated security review:
//! - Deterministic recursive directory-tree capture
//! - Bounded byte-range file reads
//! - Source-file discovery with standard exclusion patterns
//!
//! Nothing in this crate talks to the inference backend; these primitives
//! never recover from failures locally, every error surfaces to the caller.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod chunk;
pub mod discover;
pub mod tree;

// Re-export commonly used items for convenience
pub use chunk::read_range;
pub use discover::{default_exclusion_patterns, discover_source_files};
pub use tree::{walk, FileTreeNode};

/// Result type used throughout BugHunter core
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for filesystem operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Walk root is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(std::path::PathBuf),

    /// Byte range outside file bounds or inverted
    #[error("Invalid byte range {start}..{end} for file of {len} bytes")]
    Range { start: u64, end: u64, len: u64 },
}
