//! Tree-related types and error definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::error::{ItemFailure, Operation};

/// Errors that can occur while sizing, generating or removing a tree
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("Size of tree ({0}) overflows u64")]
    SizeOverflow(TreeSpec),

    #[error("Failed to {operation} {path:?}: {source}")]
    Filesystem {
        operation: Operation,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Shape of a generated tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSpec {
    /// Nesting levels below the root
    pub depth: u32,
    /// Child directories per directory
    pub breadth: u32,
    /// Files written into every created directory
    pub files_per_dir: u32,
}

impl TreeSpec {
    pub const fn new(depth: u32, breadth: u32, files_per_dir: u32) -> Self {
        Self {
            depth,
            breadth,
            files_per_dir,
        }
    }
}

impl fmt::Display for TreeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "depth={} breadth={} files_per_dir={}",
            self.depth, self.breadth, self.files_per_dir
        )
    }
}

/// Planned size of a tree, derived from its [`TreeSpec`] and never measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SizeEstimate {
    pub total_dirs: u64,
    pub total_files: u64,
}

/// What a generation pass actually did
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationReport {
    pub dirs_created: u64,
    pub files_written: u64,
    pub bytes_written: u64,
    /// Recoverable failures that were logged and skipped
    pub failures: Vec<ItemFailure>,
}

impl GenerationReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
