//! Harness configuration
//!
//! Configuration is loaded from `TREELOAD_*` environment variables on top of
//! the defaults below. CLI flags override individual fields.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ErrorPolicy;
use crate::process::CommandSpec;
use crate::tree::WorkerScaling;

/// Main harness configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory every scenario generates into and cleans up
    pub root_dir: PathBuf,

    /// Process configuration
    pub process: ProcessConfig,

    /// Generation configuration
    pub generation: GenerationConfig,

    /// Server worker derivation
    pub scaling: WorkerScaling,

    /// Where to write the JSON run report (optional)
    pub report_path: Option<PathBuf>,
}

/// External process configuration
#[derive(Debug, Clone)]
pub struct ProcessConfig {
    /// Build command, run once per scenario
    pub build_command: CommandSpec,
    /// Server command; the worker count is appended as the last argument
    pub server_command: CommandSpec,
    /// Client command; the cutoff is appended as the last argument
    pub client_command: CommandSpec,
    /// Upper bound on the client run; `None` waits forever
    pub client_timeout: Option<Duration>,
    /// How long the server gets to exit after SIGTERM before it is killed
    pub server_stop_grace: Duration,
    /// Working directory for every spawned process (optional)
    pub working_dir: Option<PathBuf>,
}

/// Tree generation configuration
#[derive(Debug, Clone, Default)]
pub struct GenerationConfig {
    /// Seed for reproducible names; `None` draws from OS entropy
    pub name_seed: Option<u64>,
    /// Treat every filesystem failure as fatal
    pub strict_fs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("./directory_big"),
            process: ProcessConfig::default(),
            generation: GenerationConfig::default(),
            scaling: WorkerScaling::default(),
            report_path: None,
        }
    }
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            build_command: CommandSpec::new("make"),
            server_command: CommandSpec::new("./server"),
            client_command: CommandSpec::new("./client"),
            client_timeout: None,
            server_stop_grace: Duration::from_secs(10),
            working_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("TREELOAD_ROOT_DIR")
            && !dir.is_empty()
        {
            config.root_dir = PathBuf::from(dir);
        }
        if let Ok(path) = env::var("TREELOAD_REPORT_PATH")
            && !path.is_empty()
        {
            config.report_path = Some(PathBuf::from(path));
        }

        // Process config
        if let Ok(line) = env::var("TREELOAD_BUILD_CMD")
            && let Some(command) = CommandSpec::parse(&line)
        {
            config.process.build_command = command;
        }
        if let Ok(line) = env::var("TREELOAD_SERVER_CMD")
            && let Some(command) = CommandSpec::parse(&line)
        {
            config.process.server_command = command;
        }
        if let Ok(line) = env::var("TREELOAD_CLIENT_CMD")
            && let Some(command) = CommandSpec::parse(&line)
        {
            config.process.client_command = command;
        }
        if let Ok(val) = env::var("TREELOAD_CLIENT_TIMEOUT_SECS")
            && let Ok(secs) = val.parse::<u64>()
        {
            config.process.client_timeout = Some(Duration::from_secs(secs));
        }
        if let Ok(val) = env::var("TREELOAD_SERVER_STOP_GRACE_SECS")
            && let Ok(secs) = val.parse::<u64>()
        {
            config.process.server_stop_grace = Duration::from_secs(secs);
        }
        if let Ok(dir) = env::var("TREELOAD_WORKDIR")
            && !dir.is_empty()
        {
            config.process.working_dir = Some(PathBuf::from(dir));
        }

        // Scaling config
        if let Ok(val) = env::var("TREELOAD_FILES_PER_WORKER")
            && let Ok(v) = val.parse::<u64>()
            && v > 0
        {
            config.scaling.files_per_worker = v;
        }
        if let Ok(val) = env::var("TREELOAD_MIN_WORKERS")
            && let Ok(v) = val.parse::<u64>()
        {
            config.scaling.min_workers = v;
        }

        // Generation config
        if let Ok(val) = env::var("TREELOAD_NAME_SEED")
            && let Ok(seed) = val.parse()
        {
            config.generation.name_seed = Some(seed);
        }
        if let Ok(val) = env::var("TREELOAD_STRICT_FS") {
            config.generation.strict_fs = val.to_lowercase() == "true" || val == "1";
        }

        config
    }

    pub fn error_policy(&self) -> ErrorPolicy {
        ErrorPolicy::with_strict_fs(self.generation.strict_fs)
    }
}
