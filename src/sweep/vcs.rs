//! Version-control capability set used by the sweep
//!
//! The driver and the branch sweep only ever talk to git through this trait,
//! so they can be exercised against mocks.

use crate::error::Result;

/// Operations the sweep needs from version control
///
/// Every method blocks until the underlying operation completes. Any error
/// is fatal for the run.
#[cfg_attr(test, mockall::automock)]
pub trait VersionControl {
    /// Raw remote branch listing, one reference per line
    /// (the format of `git branch -r`)
    fn list_remote_branches(&self) -> Result<String>;

    /// Switch the working tree to `branch`
    fn checkout(&self, branch: &str) -> Result<()>;

    /// Stage every working-tree change, including deletions
    fn stage_all(&self) -> Result<()>;

    /// Commit the staged changes
    fn commit(&self, message: &str) -> Result<()>;

    /// Publish the current branch to the remote `branch`
    fn push(&self, branch: &str) -> Result<()>;
}
