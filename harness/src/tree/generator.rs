//! Recursive tree generation
//!
//! Starting from a root, each call creates `breadth` child directories,
//! fills every one of them with `files_per_dir` files and recurses into it
//! with one level less. A call at depth zero creates nothing.

use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{ErrorPolicy, Operation};

use super::naming::NameStrategy;
use super::types::{GenerationReport, TreeError, TreeSpec};

/// Number of times the sentence is repeated in every file
pub const REPETITIONS: usize = 100;

/// Sentence written by the scenario harness
pub const HARNESS_SENTENCE: &str = "The quick brown fox, dressed in a top hat and monocle, jumps over the lazy dog who’s napping on a sunlit hammock while eating a giant slice of pepperoni pizza and dreaming of becoming the next big rock star.";

/// Sentence written by the interactive generator
pub const PANGRAM_SENTENCE: &str = "The quick brown fox jumps over the lazy dog.";

/// Body of every generated file: the sentence, newline terminated, repeated
/// [`REPETITIONS`] times
pub fn file_content(sentence: &str) -> String {
    format!("{sentence}\n").repeat(REPETITIONS)
}

/// Materializes a [`TreeSpec`] under a root directory
pub struct TreeGenerator<N> {
    names: N,
    content: String,
    policy: ErrorPolicy,
}

impl<N: NameStrategy> TreeGenerator<N> {
    /// Create a generator writing [`HARNESS_SENTENCE`] files
    pub fn new(names: N, policy: ErrorPolicy) -> Self {
        Self {
            names,
            content: file_content(HARNESS_SENTENCE),
            policy,
        }
    }

    pub fn with_sentence(mut self, sentence: &str) -> Self {
        self.content = file_content(sentence);
        self
    }

    /// Exact bytes written into every file
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Generate the tree, creating `root` first if needed.
    ///
    /// Per-item failures are handled by the [`ErrorPolicy`]: recoverable ones
    /// end up in the returned report, fatal ones abort generation.
    pub fn generate(&mut self, root: &Path, spec: TreeSpec) -> Result<GenerationReport, TreeError> {
        let mut report = GenerationReport::default();

        fs::create_dir_all(root).map_err(|source| TreeError::Filesystem {
            operation: Operation::CreateRoot,
            path: root.to_path_buf(),
            source,
        })?;

        self.populate(root, spec.depth, &spec, &mut report)?;

        info!(
            "Generated tree under {} ({}): {} directories, {} files, {} failures",
            root.display(),
            spec,
            report.dirs_created,
            report.files_written,
            report.failures.len()
        );
        Ok(report)
    }

    fn populate(
        &mut self,
        parent: &Path,
        depth: u32,
        spec: &TreeSpec,
        report: &mut GenerationReport,
    ) -> Result<(), TreeError> {
        if depth == 0 {
            return Ok(());
        }

        for i in 0..spec.breadth {
            let dir_path = parent.join(self.names.dir_name(i));
            if let Err(e) = fs::create_dir_all(&dir_path) {
                // Nothing can be written below a missing directory
                report
                    .failures
                    .push(self.policy.recover(Operation::CreateDirectory, &dir_path, e)?);
                continue;
            }
            report.dirs_created += 1;
            info!("Created directory: {}", dir_path.display());

            for j in 0..spec.files_per_dir {
                let file_path = dir_path.join(self.names.file_name(j));
                match fs::write(&file_path, self.content.as_bytes()) {
                    Ok(()) => {
                        report.files_written += 1;
                        report.bytes_written += self.content.len() as u64;
                        debug!("Created file: {}", file_path.display());
                    }
                    Err(e) => {
                        report
                            .failures
                            .push(self.policy.recover(Operation::WriteFile, &file_path, e)?);
                    }
                }
            }

            self.populate(&dir_path, depth - 1, spec, report)?;
        }

        Ok(())
    }
}
