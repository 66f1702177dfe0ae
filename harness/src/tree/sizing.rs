//! Closed-form sizing and worker derivation

use serde::Serialize;

use super::types::{SizeEstimate, TreeError, TreeSpec};

impl SizeEstimate {
    /// Compute the planned size of a tree.
    ///
    /// `total_dirs` is the geometric series `breadth^0 + ... + breadth^(depth-1)`
    /// (zero when depth is zero) and `total_files` is `total_dirs * files_per_dir`.
    pub fn from_spec(spec: &TreeSpec) -> Result<Self, TreeError> {
        let overflow = || TreeError::SizeOverflow(*spec);
        let breadth = u64::from(spec.breadth);
        let depth = u64::from(spec.depth);

        let total_dirs = match breadth {
            _ if depth == 0 => 0,
            // 0^0 = 1, every other term is zero
            0 => 1,
            1 => depth,
            b => {
                let power = b.checked_pow(spec.depth).ok_or_else(overflow)?;
                (power - 1) / (b - 1)
            }
        };
        let total_files = total_dirs
            .checked_mul(u64::from(spec.files_per_dir))
            .ok_or_else(overflow)?;

        Ok(Self {
            total_dirs,
            total_files,
        })
    }
}

/// Server concurrency heuristic: one worker per `files_per_worker` files,
/// never fewer than `min_workers`.
///
/// The default (100 files per worker, at least 2) is an unvalidated starting
/// point; it is not derived from the server's concurrency behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkerScaling {
    pub files_per_worker: u64,
    pub min_workers: u64,
}

impl Default for WorkerScaling {
    fn default() -> Self {
        Self {
            files_per_worker: 100,
            min_workers: 2,
        }
    }
}

impl WorkerScaling {
    pub fn workers_for(&self, total_files: u64) -> u64 {
        total_files
            .div_ceil(self.files_per_worker.max(1))
            .max(self.min_workers)
    }
}
