//! Common Test Utilities for Integration Tests
//!
//! Builds a scratch workspace with shell-script stand-ins for the external
//! server and client, and helpers to inspect generated trees.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use treeload::Config;
use treeload::process::CommandSpec;
use walkdir::{DirEntry, WalkDir};

/// Scratch directory with a test root and fake server/client scripts
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn root(&self) -> PathBuf {
        self.path().join("directory_big")
    }

    /// File a fake process writes to
    pub fn output(&self, name: &str) -> PathBuf {
        self.path().join(name)
    }

    pub fn read_output(&self, name: &str) -> Option<String> {
        fs::read_to_string(self.output(name))
            .ok()
            .map(|s| s.trim().to_string())
    }

    /// Write a shell script and return the command that runs it through `sh`
    pub fn script(&self, name: &str, body: &str) -> CommandSpec {
        let path = self.path().join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("Failed to write script");
        CommandSpec::new("sh").arg(path.to_string_lossy())
    }

    /// Server that records its worker count, then idles until signalled
    pub fn recording_server(&self) -> CommandSpec {
        self.script(
            "server.sh",
            &format!(
                "echo \"$1\" > '{}'\nexec sleep 30",
                self.output("server_args").display()
            ),
        )
    }

    /// Client that records its cutoff and the tree it found
    pub fn recording_client(&self) -> CommandSpec {
        let root = self.root();
        self.script(
            "client.sh",
            &format!(
                "echo \"$1\" > '{args}'\n\
                 find '{root}' -type f | wc -l > '{files}'\n\
                 find '{root}' -mindepth 1 -type d | wc -l > '{dirs}'",
                args = self.output("client_args").display(),
                root = root.display(),
                files = self.output("client_files").display(),
                dirs = self.output("client_dirs").display(),
            ),
        )
    }

    /// Config pointing at this workspace, with `true` as the build step
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.root_dir = self.root();
        config.process.build_command = CommandSpec::new("true");
        config.process.server_command = self.recording_server();
        config.process.client_command = self.recording_client();
        config.process.server_stop_grace = Duration::from_secs(5);
        config.process.client_timeout = Some(Duration::from_secs(30));
        config
    }
}

/// Every entry under `root` (excluding root), parents before children
fn entries(root: &Path) -> Vec<DirEntry> {
    WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .collect()
}

/// Every directory under `root` (excluding root) with its direct file count
/// and its nesting depth
pub fn directories(root: &Path) -> Vec<(PathBuf, usize, usize)> {
    let all = entries(root);
    all.iter()
        .filter(|e| e.file_type().is_dir())
        .map(|dir| {
            let files = all
                .iter()
                .filter(|e| e.file_type().is_file() && e.path().parent() == Some(dir.path()))
                .count();
            (dir.path().to_path_buf(), files, dir.depth())
        })
        .collect()
}

/// All regular files under `root`
pub fn files(root: &Path) -> Vec<PathBuf> {
    entries(root)
        .into_iter()
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect()
}
