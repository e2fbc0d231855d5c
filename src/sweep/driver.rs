//! Branch enumeration and the top-level run loop
//!
//! Branches are swept one at a time in listing order. Checkout mutates the
//! single shared working tree, so there is no parallelism here.

use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::sweep::branch::{BranchReport, BranchState, BranchSweep};
use crate::sweep::decrypt::Decryptor;
use crate::sweep::vcs::VersionControl;

/// Branches that are never mutated
pub const PROTECTED_BRANCHES: [&str; 2] = ["main", "master"];

/// Outcome of a complete run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Swept branches, in the order they were processed
    pub branches: Vec<BranchReport>,
    /// Protected branches that were passed over
    pub skipped: Vec<String>,
}

impl RunSummary {
    /// Number of branches that received a commit
    pub fn published(&self) -> usize {
        self.branches
            .iter()
            .filter(|b| b.state == BranchState::Published)
            .count()
    }

    /// Total files decrypted across all branches
    pub fn decrypted_files(&self) -> usize {
        self.branches.iter().map(|b| b.decrypted.len()).sum()
    }

    /// Total files that failed to decrypt across all branches
    pub fn failed_files(&self) -> usize {
        self.branches.iter().map(|b| b.failed.len()).sum()
    }
}

/// Parse `git branch -r` output into branch names under `remote`
///
/// Symbolic refs (`origin/HEAD -> origin/main`) are dropped, as are
/// branches of other remotes. Order is preserved; repeats are removed.
pub fn parse_remote_branches(listing: &str, remote: &str) -> Vec<String> {
    let prefix = format!("{}/", remote);
    let mut branches: Vec<String> = Vec::new();

    for line in listing.lines() {
        let line = line.trim();
        if line.is_empty() || line.contains("->") {
            continue;
        }

        match line.strip_prefix(&prefix) {
            Some(name) if !name.is_empty() => {
                if !branches.iter().any(|b| b == name) {
                    branches.push(name.to_string());
                }
            }
            _ => debug!(reference = line, "ignoring branch of another remote"),
        }
    }

    branches
}

/// Drives the branch sweep over every eligible remote branch
pub struct Driver<'a, V: ?Sized, D: ?Sized> {
    sweep: BranchSweep<'a, V, D>,
    remote: String,
    protected: Vec<String>,
}

impl<'a, V, D> Driver<'a, V, D>
where
    V: VersionControl + ?Sized,
    D: Decryptor + ?Sized,
{
    pub fn new(sweep: BranchSweep<'a, V, D>, remote: impl Into<String>) -> Self {
        Self {
            sweep,
            remote: remote.into(),
            protected: PROTECTED_BRANCHES.iter().map(|b| b.to_string()).collect(),
        }
    }

    /// Protect additional branches on top of `main` and `master`
    pub fn with_protected<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for branch in extra {
            let branch = branch.into();
            if !self.protected.contains(&branch) {
                self.protected.push(branch);
            }
        }
        self
    }

    pub fn is_protected(&self, branch: &str) -> bool {
        self.protected.iter().any(|p| p == branch)
    }

    /// List, filter and sweep; stops at the first fatal error
    pub fn run(&self) -> Result<RunSummary> {
        let listing = self.sweep.vcs().list_remote_branches()?;
        let branches = parse_remote_branches(&listing, &self.remote);
        info!(count = branches.len(), remote = %self.remote, "found remote branches");

        let mut summary = RunSummary::default();
        for branch in branches {
            if self.is_protected(&branch) {
                info!("skipping branch {}", branch);
                summary.skipped.push(branch);
                continue;
            }

            let report = self.sweep.run(&branch)?;
            summary.branches.push(report);
        }

        Ok(summary)
    }
}
