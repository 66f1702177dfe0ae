//! treeload library
//!
//! Generates synthetic directory trees and drives an external client/server
//! workload against them, one scenario at a time. Exported for the `treeload`
//! binary and integration tests.

pub mod config;
pub mod error;
pub mod process;
pub mod prompt;
pub mod scenario;
pub mod tree;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{ErrorPolicy, HarnessError, Operation, Severity};
pub use process::{CancelToken, LocalLauncher, ProcessHandle, ProcessLauncher, WaitOutcome};
pub use scenario::{Orchestrator, RunReport, ScenarioConfig, ScenarioRunner, default_scenarios};
pub use tree::{SizeEstimate, TreeGenerator, TreeSpec, WorkerScaling};
