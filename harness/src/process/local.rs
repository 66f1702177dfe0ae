//! Local process launcher backed by tokio

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use super::cancel::CancelToken;
use super::service::{ProcessHandle, ProcessLauncher};
use super::types::{CommandSpec, ProcessError, WaitOutcome};

/// Spawns real OS processes, optionally from a fixed working directory
#[derive(Debug, Clone, Default)]
pub struct LocalLauncher {
    working_dir: Option<PathBuf>,
}

impl LocalLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

impl ProcessLauncher for LocalLauncher {
    fn spawn(&self, command: &CommandSpec) -> Result<Box<dyn ProcessHandle>, ProcessError> {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args).kill_on_drop(true);
        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }

        let child = cmd.spawn().map_err(|source| ProcessError::Spawn {
            command: command.to_string(),
            source,
        })?;
        info!("Started `{}` (pid {:?})", command, child.id());

        Ok(Box::new(LocalProcess {
            child,
            command: command.to_string(),
        }))
    }
}

/// A child process started by [`LocalLauncher`]
pub struct LocalProcess {
    child: Child,
    command: String,
}

impl LocalProcess {
    fn exited(status: ExitStatus) -> WaitOutcome {
        WaitOutcome::Exited {
            code: status.code(),
        }
    }

    fn wait_error(&self, source: std::io::Error) -> ProcessError {
        ProcessError::Wait {
            command: self.command.clone(),
            source,
        }
    }

    #[cfg(unix)]
    fn request_stop(&mut self) -> std::io::Result<()> {
        // Already reaped
        let Some(pid) = self.child.id() else {
            return Ok(());
        };
        let pid = libc::pid_t::try_from(pid)
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidInput, "pid out of range"))?;

        // SAFETY: `pid` is our own child and has not been reaped yet
        let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
        if rc == 0 {
            Ok(())
        } else {
            Err(std::io::Error::last_os_error())
        }
    }

    #[cfg(not(unix))]
    fn request_stop(&mut self) -> std::io::Result<()> {
        self.child.start_kill()
    }
}

#[async_trait]
impl ProcessHandle for LocalProcess {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    async fn wait(
        &mut self,
        timeout: Option<Duration>,
        cancel: &CancelToken,
    ) -> Result<WaitOutcome, ProcessError> {
        let deadline = async {
            match timeout {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending::<()>().await,
            }
        };

        let status = tokio::select! {
            status = self.child.wait() => status,
            _ = deadline => {
                warn!("`{}` still running after {:?}", self.command, timeout);
                return Ok(WaitOutcome::TimedOut);
            }
            _ = cancel.cancelled() => {
                warn!("Stopped waiting for `{}`: cancelled", self.command);
                return Ok(WaitOutcome::Cancelled);
            }
        };

        let status = status.map_err(|e| self.wait_error(e))?;
        debug!("`{}` exited with {}", self.command, status);
        Ok(Self::exited(status))
    }

    async fn terminate(&mut self, grace: Duration) -> Result<WaitOutcome, ProcessError> {
        if let Some(status) = self.child.try_wait().map_err(|e| self.wait_error(e))? {
            debug!("`{}` had already exited with {}", self.command, status);
            return Ok(Self::exited(status));
        }

        self.request_stop().map_err(|source| ProcessError::Signal {
            command: self.command.clone(),
            source,
        })?;

        match tokio::time::timeout(grace, self.child.wait()).await {
            Ok(status) => {
                let status = status.map_err(|e| self.wait_error(e))?;
                info!("`{}` stopped ({})", self.command, status);
                Ok(Self::exited(status))
            }
            Err(_) => {
                warn!(
                    "`{}` ignored the stop request for {:?}, killing it",
                    self.command, grace
                );
                self.kill().await
            }
        }
    }

    async fn kill(&mut self) -> Result<WaitOutcome, ProcessError> {
        self.child.kill().await.map_err(|source| ProcessError::Signal {
            command: self.command.clone(),
            source,
        })?;
        let status = self.child.wait().await.map_err(|e| self.wait_error(e))?;
        Ok(Self::exited(status))
    }
}
