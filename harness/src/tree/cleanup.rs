//! Best-effort removal of a test root

use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{ErrorPolicy, Operation};

use super::types::TreeError;

/// Result of a cleanup pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum CleanupOutcome {
    /// Nothing to remove
    AlreadyAbsent,
    Removed,
    /// Removal failed and the policy treated it as recoverable
    Failed(String),
}

/// Remove `root` and everything below it.
///
/// Removing an absent root succeeds, so calling this repeatedly is safe.
pub fn remove_tree(root: &Path, policy: &ErrorPolicy) -> Result<CleanupOutcome, TreeError> {
    if !root.exists() {
        debug!("Nothing to clean at {}", root.display());
        return Ok(CleanupOutcome::AlreadyAbsent);
    }

    match fs::remove_dir_all(root) {
        Ok(()) => {
            info!("Removed {}", root.display());
            Ok(CleanupOutcome::Removed)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(CleanupOutcome::AlreadyAbsent),
        Err(e) => {
            let failure = policy.recover(Operation::RemoveTree, root, e)?;
            Ok(CleanupOutcome::Failed(failure.message))
        }
    }
}
