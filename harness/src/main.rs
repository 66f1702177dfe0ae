use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use treeload::config::Config;
use treeload::process::{CancelToken, LocalLauncher};
use treeload::prompt::read_tree_spec;
use treeload::scenario::{Orchestrator, ScenarioRunner, default_scenarios, select_scenarios};
use treeload::tree::{NameStyle, PANGRAM_SENTENCE, RandomNames, TreeGenerator};

#[derive(Parser)]
#[command(name = "treeload", version, about = "Synthetic tree generator and client/server scenario harness")]
struct Cli {
    /// Only log progress at info level and above
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the scenario sequence against the client/server pair
    Run {
        /// Run only the named scenario (repeatable)
        #[arg(long = "scenario")]
        scenarios: Vec<String>,
        /// Write a JSON run report to this path
        #[arg(long)]
        report: Option<PathBuf>,
        /// Test root directory
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Prompt for depth, breadth and files per directory, then generate a tree
    Generate {
        /// Directory to generate into
        #[arg(long)]
        root: Option<PathBuf>,
        /// Seed for reproducible names
        #[arg(long)]
        seed: Option<u64>,
    },
}

/// Resolves on Ctrl-C or SIGTERM
async fn wait_for_shutdown_signal() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => tokio::select! {
                _ = tokio::signal::ctrl_c() => "SIGINT",
                _ = sigterm.recv() => "SIGTERM",
            },
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
                "SIGINT"
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        "Ctrl-C"
    }
}

async fn run(
    mut config: Config,
    scenarios: Vec<String>,
    report: Option<PathBuf>,
    root: Option<PathBuf>,
) -> anyhow::Result<()> {
    if let Some(root) = root {
        config.root_dir = root;
    }
    if report.is_some() {
        config.report_path = report;
    }

    let selected = select_scenarios(default_scenarios(), &scenarios)?;

    let mut launcher = LocalLauncher::new();
    if let Some(ref dir) = config.process.working_dir {
        launcher = launcher.with_working_dir(dir);
    }

    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        let signal = wait_for_shutdown_signal().await;
        warn!("Received {}, cancelling after the current step", signal);
        trigger.cancel();
    });

    let orchestrator = Orchestrator::new(config, Arc::new(launcher)).with_cancel_token(cancel);
    let runner = ScenarioRunner::new(orchestrator, selected);
    let report = runner.run().await?;
    info!(
        "Run {} finished: {} scenario(s)",
        report.run_id,
        report.scenarios.len()
    );
    Ok(())
}

async fn generate(config: Config, root: Option<PathBuf>, seed: Option<u64>) -> anyhow::Result<()> {
    let root = root.unwrap_or(config.root_dir.clone());
    let seed = seed.or(config.generation.name_seed);
    let policy = config.error_policy();

    let spec = tokio::task::spawn_blocking(|| {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        read_tree_spec(&mut stdin.lock(), &mut stdout.lock())
    })
    .await?
    .context("Failed to read tree parameters")?;

    let generated_root = root.clone();
    let report = tokio::task::spawn_blocking(move || {
        TreeGenerator::new(RandomNames::new(NameStyle::Plain, seed), policy)
            .with_sentence(PANGRAM_SENTENCE)
            .generate(&generated_root, spec)
    })
    .await??;

    if !report.is_clean() {
        warn!("{} item(s) could not be created", report.failures.len());
    }
    info!("File generation completed in {}!", root.display());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.quiet { "treeload=info" } else { "treeload=debug" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = Config::from_env();
    info!(
        "Loaded configuration: root={:?}, build=`{}`, server=`{}`, client=`{}`",
        config.root_dir,
        config.process.build_command,
        config.process.server_command,
        config.process.client_command
    );

    match cli.command {
        Command::Run {
            scenarios,
            report,
            root,
        } => run(config, scenarios, report, root).await,
        Command::Generate { root, seed } => generate(config, root, seed).await,
    }
}
