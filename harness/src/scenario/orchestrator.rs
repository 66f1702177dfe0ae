//! Single-scenario orchestration
//!
//! Runs the steps of one scenario strictly in order:
//!
//! ```text
//! CLEAN_PRE → GENERATE → SIZE → BUILD → START_SERVER → COMPUTE_CUTOFF
//!           → RUN_CLIENT → STOP_SERVER → CLEAN_POST
//! ```
//!
//! The server runs in the background while the client runs in the
//! foreground. Once the server is up it is always stopped before the
//! scenario returns, even if a later step fails.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{ErrorPolicy, HarnessError, Operation};
use crate::process::{CancelToken, ProcessLauncher, WaitOutcome};
use crate::tree::{
    CleanupOutcome, GenerationReport, NameStyle, RandomNames, SizeEstimate, TreeGenerator,
    TreeSpec, remove_tree,
};

use super::cutoff::{Clock, SystemClock, cutoff_timestamp};
use super::types::{ScenarioConfig, ScenarioReport, Step, StepTiming};

/// Drives one scenario at a time against an external client/server pair
pub struct Orchestrator {
    config: Config,
    policy: ErrorPolicy,
    launcher: Arc<dyn ProcessLauncher>,
    clock: Arc<dyn Clock>,
    cancel: CancelToken,
}

impl Orchestrator {
    pub fn new(config: Config, launcher: Arc<dyn ProcessLauncher>) -> Self {
        let policy = config.error_policy();
        Self {
            config,
            policy,
            launcher,
            clock: Arc::new(SystemClock),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Run every step of `scenario` and report what happened.
    ///
    /// Only fatal errors are returned; recoverable ones are part of the report.
    pub async fn run_scenario(
        &self,
        scenario: &ScenarioConfig,
    ) -> Result<ScenarioReport, HarnessError> {
        let started = Instant::now();
        let name = scenario.name.as_str();
        let spec = scenario.spec;
        let mut steps = Vec::with_capacity(Step::ALL.len());

        let at = self.enter(Step::CleanPre, name);
        let clean_pre = self.clean().await?;
        steps.push(StepTiming::new(Step::CleanPre, at.elapsed()));

        let at = self.enter(Step::Generate, name);
        let generation = self.generate(spec).await?;
        steps.push(StepTiming::new(Step::Generate, at.elapsed()));

        let at = self.enter(Step::Size, name);
        let estimate = SizeEstimate::from_spec(&spec)?;
        let workers = self.config.scaling.workers_for(estimate.total_files);
        info!(
            "Total directories: {}, Total files: {}",
            estimate.total_dirs, estimate.total_files
        );
        info!("Using {} server worker(s) for {}", workers, name);
        steps.push(StepTiming::new(Step::Size, at.elapsed()));

        let at = self.enter(Step::Build, name);
        self.build().await?;
        steps.push(StepTiming::new(Step::Build, at.elapsed()));

        let at = self.enter(Step::StartServer, name);
        let server_command = self
            .config
            .process
            .server_command
            .clone()
            .arg(workers.to_string());
        let mut server = self
            .launcher
            .spawn(&server_command)
            .map_err(|e| self.policy.escalate(Operation::SpawnProcess, e))?;
        steps.push(StepTiming::new(Step::StartServer, at.elapsed()));

        let client = self.drive_client(name, &mut steps).await;

        let at = self.enter(Step::StopServer, name);
        let server_outcome = server
            .terminate(self.config.process.server_stop_grace)
            .await;
        steps.push(StepTiming::new(Step::StopServer, at.elapsed()));

        let (cutoff, client_outcome) = client?;
        let server_outcome =
            server_outcome.map_err(|e| self.policy.escalate(Operation::ControlProcess, e))?;

        let at = self.enter(Step::CleanPost, name);
        let clean_post = self.clean().await?;
        steps.push(StepTiming::new(Step::CleanPost, at.elapsed()));

        let report = ScenarioReport {
            name: scenario.name.clone(),
            spec,
            estimate,
            workers,
            cutoff,
            clean_pre,
            generation,
            client: client_outcome,
            server: server_outcome,
            clean_post,
            steps,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        info!("{} completed in {} ms", name, report.duration_ms);
        Ok(report)
    }

    /// COMPUTE_CUTOFF and RUN_CLIENT; the caller stops the server afterwards
    async fn drive_client(
        &self,
        name: &str,
        steps: &mut Vec<StepTiming>,
    ) -> Result<(String, WaitOutcome), HarnessError> {
        let at = self.enter(Step::ComputeCutoff, name);
        let cutoff = cutoff_timestamp(self.clock.now());
        info!("Client cutoff: {}", cutoff);
        steps.push(StepTiming::new(Step::ComputeCutoff, at.elapsed()));

        let at = self.enter(Step::RunClient, name);
        let command = self.config.process.client_command.clone().arg(cutoff.as_str());
        let mut client = self
            .launcher
            .spawn(&command)
            .map_err(|e| self.policy.escalate(Operation::SpawnProcess, e))?;
        let outcome = client
            .wait(self.config.process.client_timeout, &self.cancel)
            .await
            .map_err(|e| self.policy.escalate(Operation::ControlProcess, e))?;
        match outcome {
            WaitOutcome::Exited { code } => info!("Client exited (code {:?})", code),
            WaitOutcome::TimedOut | WaitOutcome::Cancelled => {
                warn!("Client did not finish ({:?}), killing it", outcome);
                client
                    .kill()
                    .await
                    .map_err(|e| self.policy.escalate(Operation::ControlProcess, e))?;
            }
        }
        steps.push(StepTiming::new(Step::RunClient, at.elapsed()));

        Ok((cutoff, outcome))
    }

    async fn build(&self) -> Result<(), HarnessError> {
        let command = &self.config.process.build_command;
        let build_failed = |reason: String| {
            self.policy.escalate(
                Operation::Build,
                HarnessError::BuildFailed {
                    command: command.to_string(),
                    reason,
                },
            )
        };

        info!("Compiling client and server...");
        let mut build = self
            .launcher
            .spawn(command)
            .map_err(|e| build_failed(e.to_string()))?;
        let outcome = build
            .wait(None, &self.cancel)
            .await
            .map_err(|e| build_failed(e.to_string()))?;

        match outcome {
            outcome if outcome.is_success() => Ok(()),
            WaitOutcome::Cancelled => {
                build
                    .kill()
                    .await
                    .map_err(|e| self.policy.escalate(Operation::ControlProcess, e))?;
                Err(HarnessError::Cancelled)
            }
            WaitOutcome::Exited { code } => Err(build_failed(format!("exit code {code:?}"))),
            WaitOutcome::TimedOut => Err(build_failed("timed out".to_string())),
        }
    }

    async fn generate(&self, spec: TreeSpec) -> Result<GenerationReport, HarnessError> {
        let root = self.config.root_dir.clone();
        let policy = self.policy;
        let seed = self.config.generation.name_seed;
        info!(
            "Creating directory structure under {} ({})",
            root.display(),
            spec
        );

        let report = tokio::task::spawn_blocking(move || {
            TreeGenerator::new(RandomNames::new(NameStyle::Indexed, seed), policy)
                .generate(&root, spec)
        })
        .await??;
        Ok(report)
    }

    async fn clean(&self) -> Result<CleanupOutcome, HarnessError> {
        let root: PathBuf = self.config.root_dir.clone();
        let policy = self.policy;
        let outcome = tokio::task::spawn_blocking(move || remove_tree(&root, &policy)).await??;
        info!("Cleanup completed ({:?})", outcome);
        Ok(outcome)
    }

    fn enter(&self, step: Step, scenario: &str) -> Instant {
        info!("[{}] {}", scenario, step);
        Instant::now()
    }
}
