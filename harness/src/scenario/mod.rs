//! Scenario execution module
//!
//! This module provides:
//! - `ScenarioConfig` and the fixed default scenario list
//! - `Orchestrator`, which drives one scenario through its steps
//! - `ScenarioRunner`, which runs scenarios one after another
//! - `Clock` and `cutoff_timestamp` for the client's cutoff argument

mod cutoff;
mod orchestrator;
mod runner;
mod types;

pub use cutoff::{CUTOFF_LOOKBACK_SECS, Clock, FixedClock, SystemClock, cutoff_timestamp};
pub use orchestrator::Orchestrator;
pub use runner::{ScenarioRunner, default_scenarios, select_scenarios};
pub use types::{RunReport, ScenarioConfig, ScenarioReport, Step, StepTiming};
