//! Test Utilities Module
//!
//! Provides a fake process launcher and filesystem inspection helpers for
//! unit tests. This module is only compiled when running tests.

#![cfg(test)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use walkdir::WalkDir;

use crate::process::{
    CancelToken, CommandSpec, ProcessError, ProcessHandle, ProcessLauncher, WaitOutcome,
};

// ============================================================================
// Tree Inspection
// ============================================================================

/// Shape of a directory tree, gathered by exhaustive traversal
#[derive(Debug, Clone, Default)]
pub struct TreeShape {
    /// Directories directly under the root
    pub root_children: usize,
    /// Deepest directory nesting below the root
    pub max_depth: usize,
    /// Direct file count of every directory below the root
    pub file_counts: Vec<usize>,
    /// Every entry below the root, sorted
    pub paths: Vec<PathBuf>,
    files: Vec<PathBuf>,
}

impl TreeShape {
    /// Whether every file currently holds exactly `expected`
    pub fn contents_equal(&self, expected: &str) -> bool {
        self.files
            .iter()
            .all(|file| fs::read(file).map(|c| c == expected.as_bytes()).unwrap_or(false))
    }
}

/// Walk `root` and describe what is there. A missing root yields an empty shape.
pub fn inspect_tree(root: &Path) -> TreeShape {
    let mut shape = TreeShape::default();
    let mut counts: HashMap<PathBuf, usize> = HashMap::new();

    for entry in WalkDir::new(root).min_depth(1).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path().to_path_buf();
        shape.paths.push(path.clone());

        if entry.file_type().is_dir() {
            shape.max_depth = shape.max_depth.max(entry.depth());
            if entry.depth() == 1 {
                shape.root_children += 1;
            }
            counts.entry(path).or_default();
        } else {
            if entry.depth() > 1
                && let Some(parent) = path.parent()
            {
                *counts.entry(parent.to_path_buf()).or_default() += 1;
            }
            shape.files.push(path);
        }
    }

    shape.file_counts = counts.into_values().collect();
    shape.paths.sort();
    shape
}

// ============================================================================
// Fake Processes
// ============================================================================

/// How a fake process behaves
#[derive(Debug, Clone, Copy)]
pub enum FakeBehavior {
    /// Exit immediately with the code
    Exit(i32),
    /// Never exit on its own
    Hang,
    /// Fail to spawn
    SpawnError,
}

/// Launcher that records what it is asked to do instead of running anything
#[derive(Default)]
pub struct FakeLauncher {
    behaviors: HashMap<String, FakeBehavior>,
    events: Arc<Mutex<Vec<String>>>,
    probe_root: Option<PathBuf>,
    probed: Mutex<Option<TreeShape>>,
}

impl FakeLauncher {
    /// Program used as the client in the default config
    pub const CLIENT: &'static str = "./client";

    pub fn new() -> Self {
        Self::default()
    }

    /// Programs without an explicit behavior exit with code 0
    pub fn with_behavior(mut self, program: &str, behavior: FakeBehavior) -> Self {
        self.behaviors.insert(program.to_string(), behavior);
        self
    }

    /// Inspect `root` at the moment the client is spawned
    pub fn with_probe(mut self, root: PathBuf) -> Self {
        self.probe_root = Some(root);
        self
    }

    /// Every recorded call, e.g. `"spawn ./server 2"` or `"terminate ./server 2"`
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    /// Successfully spawned command lines, in order
    pub fn spawned(&self) -> Vec<String> {
        self.events()
            .iter()
            .filter_map(|e| e.strip_prefix("spawn ").map(str::to_string))
            .collect()
    }

    pub fn probed(&self) -> Option<TreeShape> {
        self.probed.lock().unwrap().clone()
    }
}

impl ProcessLauncher for FakeLauncher {
    fn spawn(&self, command: &CommandSpec) -> Result<Box<dyn ProcessHandle>, ProcessError> {
        let behavior = self
            .behaviors
            .get(&command.program)
            .copied()
            .unwrap_or(FakeBehavior::Exit(0));
        if let FakeBehavior::SpawnError = behavior {
            return Err(ProcessError::Spawn {
                command: command.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "fake spawn failure"),
            });
        }

        if command.program == Self::CLIENT
            && let Some(ref root) = self.probe_root
        {
            *self.probed.lock().unwrap() = Some(inspect_tree(root));
        }

        let label = command.to_string();
        self.events.lock().unwrap().push(format!("spawn {label}"));
        Ok(Box::new(FakeProcess {
            label,
            behavior,
            events: self.events.clone(),
        }))
    }
}

struct FakeProcess {
    label: String,
    behavior: FakeBehavior,
    events: Arc<Mutex<Vec<String>>>,
}

impl FakeProcess {
    fn record(&self, action: &str) {
        self.events
            .lock()
            .unwrap()
            .push(format!("{action} {}", self.label));
    }
}

#[async_trait]
impl ProcessHandle for FakeProcess {
    fn id(&self) -> Option<u32> {
        None
    }

    async fn wait(
        &mut self,
        timeout: Option<Duration>,
        cancel: &CancelToken,
    ) -> Result<WaitOutcome, ProcessError> {
        self.record("wait");
        match self.behavior {
            FakeBehavior::Exit(code) => Ok(WaitOutcome::Exited { code: Some(code) }),
            FakeBehavior::Hang | FakeBehavior::SpawnError => {
                let deadline = async {
                    match timeout {
                        Some(limit) => tokio::time::sleep(limit).await,
                        None => std::future::pending::<()>().await,
                    }
                };
                tokio::select! {
                    _ = deadline => Ok(WaitOutcome::TimedOut),
                    _ = cancel.cancelled() => Ok(WaitOutcome::Cancelled),
                }
            }
        }
    }

    async fn terminate(&mut self, _grace: Duration) -> Result<WaitOutcome, ProcessError> {
        self.record("terminate");
        Ok(WaitOutcome::Exited { code: None })
    }

    async fn kill(&mut self) -> Result<WaitOutcome, ProcessError> {
        self.record("kill");
        Ok(WaitOutcome::Exited { code: None })
    }
}
