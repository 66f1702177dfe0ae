//! Scenario types and run reports

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

use crate::error::HarnessError;
use crate::process::WaitOutcome;
use crate::tree::{CleanupOutcome, GenerationReport, SizeEstimate, TreeSpec};

/// A named point in the scenario sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioConfig {
    pub name: String,
    pub spec: TreeSpec,
}

impl ScenarioConfig {
    pub fn new(name: impl Into<String>, spec: TreeSpec) -> Self {
        Self {
            name: name.into(),
            spec,
        }
    }
}

/// Steps of one scenario, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Step {
    CleanPre,
    Generate,
    Size,
    Build,
    StartServer,
    ComputeCutoff,
    RunClient,
    StopServer,
    CleanPost,
}

impl Step {
    pub const ALL: [Step; 9] = [
        Step::CleanPre,
        Step::Generate,
        Step::Size,
        Step::Build,
        Step::StartServer,
        Step::ComputeCutoff,
        Step::RunClient,
        Step::StopServer,
        Step::CleanPost,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Step::CleanPre => "CLEAN_PRE",
            Step::Generate => "GENERATE",
            Step::Size => "SIZE",
            Step::Build => "BUILD",
            Step::StartServer => "START_SERVER",
            Step::ComputeCutoff => "COMPUTE_CUTOFF",
            Step::RunClient => "RUN_CLIENT",
            Step::StopServer => "STOP_SERVER",
            Step::CleanPost => "CLEAN_POST",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Wall time spent in one step
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StepTiming {
    pub step: Step,
    pub millis: u64,
}

impl StepTiming {
    pub fn new(step: Step, elapsed: Duration) -> Self {
        Self {
            step,
            millis: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Everything observed while running one scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub spec: TreeSpec,
    pub estimate: SizeEstimate,
    pub workers: u64,
    pub cutoff: String,
    pub clean_pre: CleanupOutcome,
    pub generation: GenerationReport,
    /// Recorded only; the harness does not judge client results
    pub client: WaitOutcome,
    pub server: WaitOutcome,
    pub clean_post: CleanupOutcome,
    pub steps: Vec<StepTiming>,
    pub duration_ms: u64,
}

impl ScenarioReport {
    /// Steps in the order they ran
    pub fn step_order(&self) -> Vec<Step> {
        self.steps.iter().map(|t| t.step).collect()
    }
}

/// Reports of every scenario in one run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub scenarios: Vec<ScenarioReport>,
}

impl RunReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at,
            scenarios: Vec::new(),
        }
    }

    /// Write the report as pretty-printed JSON
    pub fn write_json(&self, path: &Path) -> Result<(), HarnessError> {
        let report_error = |source| HarnessError::Report {
            path: path.to_path_buf(),
            source,
        };
        let json = serde_json::to_string_pretty(self).map_err(|e| report_error(e.into()))?;
        std::fs::write(path, json).map_err(report_error)
    }
}
