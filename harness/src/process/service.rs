//! Process capability traits

use async_trait::async_trait;
use std::time::Duration;

use super::cancel::CancelToken;
use super::types::{CommandSpec, ProcessError, WaitOutcome};

/// Starts processes.
///
/// Implementations can be real (see [`LocalLauncher`](super::LocalLauncher))
/// or fakes that record what would have been spawned.
pub trait ProcessLauncher: Send + Sync {
    fn spawn(&self, command: &CommandSpec) -> Result<Box<dyn ProcessHandle>, ProcessError>;
}

/// A running process owned by the caller
#[async_trait]
pub trait ProcessHandle: Send {
    /// OS process id, if the process is still known to the OS
    fn id(&self) -> Option<u32>;

    /// Wait for exit, giving up after `timeout` (if any) or on cancellation.
    /// The process keeps running when the wait gives up.
    async fn wait(
        &mut self,
        timeout: Option<Duration>,
        cancel: &CancelToken,
    ) -> Result<WaitOutcome, ProcessError>;

    /// Ask the process to stop, then kill it if it is still running after `grace`
    async fn terminate(&mut self, grace: Duration) -> Result<WaitOutcome, ProcessError>;

    /// Kill the process immediately and reap it
    async fn kill(&mut self) -> Result<WaitOutcome, ProcessError>;
}
