//! Branch sweep
//!
//! Checks out one branch, decrypts every candidate file in the working tree
//! and publishes the result when at least one file changed.
//!
//! Per branch: `Idle -> CheckedOut -> Swept -> {Published | NoChanges}`.
//! A checkout or publish failure is returned as an error and ends the run.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::sweep::decrypt::{DecryptOutcome, Decryptor};
use crate::sweep::discover::candidate_files;
use crate::sweep::vcs::VersionControl;

/// Message used for every decryption commit
pub const COMMIT_MESSAGE: &str = "Decrypt .st files to .lua";

/// How a branch sweep ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BranchState {
    /// Changes were committed and pushed
    Published,
    /// Nothing decrypted, nothing published
    NoChanges,
}

/// Per-branch result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchReport {
    pub branch: String,
    pub state: BranchState,
    /// Encrypted files that were replaced, relative to the repository root
    pub decrypted: Vec<PathBuf>,
    /// Encrypted files left in place, relative to the repository root
    pub failed: Vec<PathBuf>,
}

/// Sweeps branches of one working tree
pub struct BranchSweep<'a, V: ?Sized, D: ?Sized> {
    vcs: &'a V,
    decryptor: &'a D,
    root: PathBuf,
    commit_message: String,
}

impl<'a, V, D> BranchSweep<'a, V, D>
where
    V: VersionControl + ?Sized,
    D: Decryptor + ?Sized,
{
    pub fn new(vcs: &'a V, decryptor: &'a D, root: impl Into<PathBuf>) -> Self {
        Self {
            vcs,
            decryptor,
            root: root.into(),
            commit_message: COMMIT_MESSAGE.to_string(),
        }
    }

    pub fn with_commit_message(mut self, message: impl Into<String>) -> Self {
        self.commit_message = message.into();
        self
    }

    pub fn vcs(&self) -> &'a V {
        self.vcs
    }

    fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root).unwrap_or(path).to_path_buf()
    }

    /// Sweep a single branch
    ///
    /// Expects a clean working tree; every previous sweep either committed
    /// or changed nothing.
    pub fn run(&self, branch: &str) -> Result<BranchReport> {
        self.vcs.checkout(branch)?;
        info!("switched to branch {}", branch);

        // Collect first: decrypting renames files inside the tree being walked
        let candidates: Vec<PathBuf> = candidate_files(&self.root)
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!(branch, error = %e, "skipping unreadable entry");
                    None
                }
            })
            .collect();

        let mut changed = false;
        let mut decrypted = Vec::new();
        let mut failed = Vec::new();

        for path in candidates {
            match self.decryptor.decrypt(&path)? {
                DecryptOutcome::Decrypted { source, .. } => {
                    changed = true;
                    decrypted.push(self.relative(&source));
                }
                DecryptOutcome::Failed { source, reason } => {
                    debug!(path = %source.display(), %reason, "leaving encrypted file in place");
                    failed.push(self.relative(&source));
                }
            }
        }

        if !changed {
            info!(branch, "no valid .st files decrypted in this branch");
            return Ok(BranchReport {
                branch: branch.to_string(),
                state: BranchState::NoChanges,
                decrypted,
                failed,
            });
        }

        self.vcs.stage_all()?;
        self.vcs.commit(&self.commit_message)?;
        self.vcs.push(branch)?;
        info!(files = decrypted.len(), "changes pushed to {}", branch);

        Ok(BranchReport {
            branch: branch.to_string(),
            state: BranchState::Published,
            decrypted,
            failed,
        })
    }
}
