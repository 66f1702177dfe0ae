//! External process module
//!
//! This module provides:
//! - `ProcessLauncher` / `ProcessHandle` traits for start, wait-with-timeout
//!   and terminate, so the orchestrator never touches OS processes directly
//! - `LocalLauncher` for spawning real processes with tokio
//! - `CancelToken` for aborting a wait from outside

mod cancel;
mod local;
mod service;
mod types;

pub use cancel::CancelToken;
pub use local::{LocalLauncher, LocalProcess};
pub use service::{ProcessHandle, ProcessLauncher};
pub use types::{CommandSpec, ProcessError, WaitOutcome};
