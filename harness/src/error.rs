//! Error taxonomy for the harness
//!
//! Every fallible operation falls in one of two tiers:
//! - **Recoverable**: logged with context, recorded, execution continues
//! - **Fatal**: propagated to the caller, aborting the run
//!
//! [`ErrorPolicy`] is the single place deciding which tier an [`Operation`]
//! belongs to. Call sites hand their failures to the policy instead of
//! catching errors ad hoc.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, warn};

use crate::process::ProcessError;
use crate::tree::TreeError;

/// Operations the harness performs that can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Creating the test root directory
    CreateRoot,
    /// Creating a directory inside the generated tree
    CreateDirectory,
    /// Writing one generated file
    WriteFile,
    /// Removing the whole test root
    RemoveTree,
    /// Running the external build command
    Build,
    /// Spawning the server or client
    SpawnProcess,
    /// Waiting on or signalling a spawned process
    ControlProcess,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::CreateRoot => "create root",
            Operation::CreateDirectory => "create directory",
            Operation::WriteFile => "write file",
            Operation::RemoveTree => "remove tree",
            Operation::Build => "build",
            Operation::SpawnProcess => "spawn process",
            Operation::ControlProcess => "control process",
        };
        f.write_str(name)
    }
}

/// Error tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Recoverable,
    Fatal,
}

/// A recoverable failure that was logged and skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub operation: Operation,
    pub path: PathBuf,
    pub message: String,
}

/// Decides which operations are recoverable
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorPolicy {
    strict_fs: bool,
}

impl ErrorPolicy {
    /// Policy where every filesystem failure is fatal
    pub fn strict() -> Self {
        Self { strict_fs: true }
    }

    pub fn with_strict_fs(strict_fs: bool) -> Self {
        Self { strict_fs }
    }

    pub fn classify(&self, operation: Operation) -> Severity {
        match operation {
            Operation::CreateDirectory | Operation::WriteFile | Operation::RemoveTree
                if !self.strict_fs =>
            {
                Severity::Recoverable
            }
            Operation::CreateDirectory | Operation::WriteFile | Operation::RemoveTree => {
                Severity::Fatal
            }
            Operation::CreateRoot
            | Operation::Build
            | Operation::SpawnProcess
            | Operation::ControlProcess => Severity::Fatal,
        }
    }

    pub fn is_recoverable(&self, operation: Operation) -> bool {
        self.classify(operation) == Severity::Recoverable
    }

    /// Route a filesystem failure through the policy.
    ///
    /// Recoverable failures are logged and returned as an [`ItemFailure`] for
    /// the caller to record; fatal ones come back as `Err`.
    pub fn recover(
        &self,
        operation: Operation,
        path: &Path,
        source: std::io::Error,
    ) -> Result<ItemFailure, TreeError> {
        match self.classify(operation) {
            Severity::Recoverable => {
                error!("[ERROR] Failed to {} {}: {}", operation, path.display(), source);
                Ok(ItemFailure {
                    operation,
                    path: path.to_path_buf(),
                    message: source.to_string(),
                })
            }
            Severity::Fatal => Err(TreeError::Filesystem {
                operation,
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Route a build or process failure through the policy.
    ///
    /// These operations have no per-item fallback, so the failure is logged
    /// at its tier and handed back as the error that aborts the scenario.
    pub fn escalate(&self, operation: Operation, err: impl Into<HarnessError>) -> HarnessError {
        let err = err.into();
        match self.classify(operation) {
            Severity::Fatal => error!("[ERROR] Failed to {}: {}", operation, err),
            Severity::Recoverable => warn!("Failed to {}: {}", operation, err),
        }
        err
    }
}

/// Fatal errors that abort a harness run
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("Build command `{command}` failed: {reason}")]
    BuildFailed { command: String, reason: String },

    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("Run cancelled")]
    Cancelled,

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Failed to write report {path:?}: {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
