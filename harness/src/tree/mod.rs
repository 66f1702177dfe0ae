//! Synthetic directory tree module
//!
//! This module provides:
//! - `TreeSpec` / `SizeEstimate` and the closed-form sizing math
//! - `WorkerScaling` for deriving server concurrency from tree size
//! - `NameStrategy` for injectable directory and file naming
//! - `TreeGenerator` for materializing a tree on disk
//! - `remove_tree` for best-effort cleanup of a test root

mod cleanup;
mod generator;
mod naming;
mod sizing;
mod types;

pub use cleanup::{CleanupOutcome, remove_tree};
pub use generator::{
    HARNESS_SENTENCE, PANGRAM_SENTENCE, REPETITIONS, TreeGenerator, file_content,
};
pub use naming::{NameStrategy, NameStyle, RandomNames, SUFFIX_LEN};
pub use sizing::WorkerScaling;
pub use types::{GenerationReport, SizeEstimate, TreeError, TreeSpec};
