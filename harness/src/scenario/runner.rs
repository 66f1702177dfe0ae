//! Sequential scenario runner

use chrono::Utc;
use tracing::{error, info};

use crate::error::HarnessError;
use crate::tree::TreeSpec;

use super::orchestrator::Orchestrator;
use super::types::{RunReport, ScenarioConfig};

/// The fixed scenario sequence, smallest first
pub fn default_scenarios() -> Vec<ScenarioConfig> {
    vec![
        ScenarioConfig::new("Correctness Test", TreeSpec::new(1, 1, 20)),
        ScenarioConfig::new("Tiny Test", TreeSpec::new(2, 1, 100)),
        ScenarioConfig::new("Small Test", TreeSpec::new(2, 2, 5)),
        ScenarioConfig::new("Medium Test", TreeSpec::new(5, 3, 10)),
        ScenarioConfig::new("Medium Large Test", TreeSpec::new(6, 4, 15)),
    ]
}

/// Keep only the scenarios named in `names` (case-insensitive), preserving the
/// order of `all`. An empty `names` keeps everything.
pub fn select_scenarios(
    all: Vec<ScenarioConfig>,
    names: &[String],
) -> Result<Vec<ScenarioConfig>, HarnessError> {
    if names.is_empty() {
        return Ok(all);
    }
    if let Some(unknown) = names
        .iter()
        .find(|name| !all.iter().any(|s| s.name.eq_ignore_ascii_case(name)))
    {
        return Err(HarnessError::UnknownScenario(unknown.clone()));
    }

    Ok(all
        .into_iter()
        .filter(|s| names.iter().any(|name| s.name.eq_ignore_ascii_case(name)))
        .collect())
}

/// Runs scenarios one at a time.
///
/// A fatal error stops the run; later scenarios are not attempted.
pub struct ScenarioRunner {
    orchestrator: Orchestrator,
    scenarios: Vec<ScenarioConfig>,
}

impl ScenarioRunner {
    pub fn new(orchestrator: Orchestrator, scenarios: Vec<ScenarioConfig>) -> Self {
        Self {
            orchestrator,
            scenarios,
        }
    }

    pub async fn run(&self) -> Result<RunReport, HarnessError> {
        let mut run = RunReport::new(Utc::now());
        info!(
            "Starting run {} with {} scenario(s)",
            run.run_id,
            self.scenarios.len()
        );

        for scenario in &self.scenarios {
            if self.orchestrator.cancel_token().is_cancelled() {
                error!("[ERROR] Run cancelled before {}", scenario.name);
                return Err(HarnessError::Cancelled);
            }

            info!("Running {}: {}", scenario.name, scenario.spec);
            let report = self.orchestrator.run_scenario(scenario).await.inspect_err(|e| {
                error!("[ERROR] {} aborted the run: {}", scenario.name, e);
            })?;
            info!(
                "Test {} completed: {} files planned, {} written, {} worker(s), {} ms",
                report.name,
                report.estimate.total_files,
                report.generation.files_written,
                report.workers,
                report.duration_ms
            );
            run.scenarios.push(report);

            // A cancel that landed mid-scenario still ends the run as cancelled
            if self.orchestrator.cancel_token().is_cancelled() {
                error!("[ERROR] Run cancelled during {}", scenario.name);
                self.write_report(&run)?;
                return Err(HarnessError::Cancelled);
            }
        }

        self.write_report(&run)?;
        info!("All tests completed.");
        Ok(run)
    }

    fn write_report(&self, run: &RunReport) -> Result<(), HarnessError> {
        if let Some(ref path) = self.orchestrator.config().report_path {
            run.write_json(path)?;
            info!("Wrote run report to {}", path.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::test_utils::{FakeBehavior, FakeLauncher};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn config_in(temp: &TempDir) -> Config {
        let mut config = Config::default();
        config.root_dir = temp.path().join("directory_big");
        config
    }

    #[test]
    fn test_default_scenarios() {
        let scenarios = default_scenarios();
        let names: Vec<_> = scenarios.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Correctness Test",
                "Tiny Test",
                "Small Test",
                "Medium Test",
                "Medium Large Test"
            ]
        );
        assert_eq!(scenarios[0].spec, TreeSpec::new(1, 1, 20));
        assert_eq!(scenarios[4].spec, TreeSpec::new(6, 4, 15));
    }

    #[test]
    fn test_select_scenarios() {
        let selected = select_scenarios(
            default_scenarios(),
            &["small test".to_string(), "Correctness Test".to_string()],
        )
        .unwrap();
        let names: Vec<_> = selected.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Correctness Test", "Small Test"]);
    }

    #[test]
    fn test_select_unknown_scenario() {
        let result = select_scenarios(default_scenarios(), &["Huge Test".to_string()]);
        assert!(matches!(result, Err(HarnessError::UnknownScenario(name)) if name == "Huge Test"));
    }

    #[test]
    fn test_select_nothing_keeps_all() {
        assert_eq!(select_scenarios(default_scenarios(), &[]).unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_runs_scenarios_in_order() {
        let temp = TempDir::new().unwrap();
        let launcher = Arc::new(FakeLauncher::new());
        let orchestrator = Orchestrator::new(config_in(&temp), launcher.clone());
        let scenarios = vec![
            ScenarioConfig::new("first", TreeSpec::new(1, 1, 2)),
            ScenarioConfig::new("second", TreeSpec::new(1, 2, 300)),
        ];

        let run = ScenarioRunner::new(orchestrator, scenarios).run().await.unwrap();

        let names: Vec<_> = run.scenarios.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
        let servers: Vec<_> = launcher
            .spawned()
            .into_iter()
            .filter(|c| c.starts_with("./server"))
            .collect();
        assert_eq!(servers, vec!["./server 2", "./server 3"]);
    }

    #[tokio::test]
    async fn test_build_failure_aborts_remaining() {
        let temp = TempDir::new().unwrap();
        let launcher = Arc::new(FakeLauncher::new().with_behavior("make", FakeBehavior::Exit(1)));
        let orchestrator = Orchestrator::new(config_in(&temp), launcher.clone());
        let scenarios = vec![
            ScenarioConfig::new("first", TreeSpec::new(1, 1, 1)),
            ScenarioConfig::new("second", TreeSpec::new(1, 1, 1)),
        ];

        let result = ScenarioRunner::new(orchestrator, scenarios).run().await;

        assert!(matches!(result, Err(HarnessError::BuildFailed { .. })));
        // Only the first scenario's build ran
        assert_eq!(launcher.spawned(), vec!["make"]);
    }

    #[tokio::test]
    async fn test_cancelled_run_stops_before_next_scenario() {
        let temp = TempDir::new().unwrap();
        let launcher = Arc::new(FakeLauncher::new());
        let orchestrator = Orchestrator::new(config_in(&temp), launcher.clone());
        orchestrator.cancel_token().cancel();

        let scenarios = vec![ScenarioConfig::new("first", TreeSpec::new(1, 1, 1))];
        let result = ScenarioRunner::new(orchestrator, scenarios).run().await;

        assert!(matches!(result, Err(HarnessError::Cancelled)));
        assert!(launcher.spawned().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_during_last_scenario_fails_the_run() {
        let temp = TempDir::new().unwrap();
        let mut config = config_in(&temp);
        let report_path = temp.path().join("report.json");
        config.report_path = Some(report_path.clone());
        let launcher = Arc::new(FakeLauncher::new().with_behavior("./client", FakeBehavior::Hang));
        let orchestrator = Orchestrator::new(config, launcher.clone());

        let trigger = orchestrator.cancel_token().clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let scenarios = vec![ScenarioConfig::new("only", TreeSpec::new(1, 1, 1))];
        let result = ScenarioRunner::new(orchestrator, scenarios).run().await;

        assert!(matches!(result, Err(HarnessError::Cancelled)));
        // The server was still stopped and the partial report written
        assert_eq!(launcher.events().last().unwrap(), "terminate ./server 2");
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
        assert_eq!(json["scenarios"][0]["client"]["outcome"], "cancelled");
    }

    #[tokio::test]
    async fn test_writes_report() {
        let temp = TempDir::new().unwrap();
        let mut config = config_in(&temp);
        let report_path = temp.path().join("report.json");
        config.report_path = Some(report_path.clone());
        let orchestrator = Orchestrator::new(config, Arc::new(FakeLauncher::new()));

        let scenarios = vec![ScenarioConfig::new("Correctness Test", TreeSpec::new(1, 1, 20))];
        ScenarioRunner::new(orchestrator, scenarios).run().await.unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
        let scenario = &json["scenarios"][0];
        assert_eq!(scenario["name"], "Correctness Test");
        assert_eq!(scenario["estimate"]["total_files"], 20);
        assert_eq!(scenario["workers"], 2);
        assert_eq!(scenario["client"]["outcome"], "exited");
        assert_eq!(scenario["steps"][0]["step"], "CLEAN_PRE");
    }
}
