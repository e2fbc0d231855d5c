//! Custom error types for branch-decrypt
//!
//! Every variant here is fatal for the run. Per-file decryption failures are
//! not errors; they are reported as `DecryptOutcome::Failed`.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the branch-decrypt application
#[derive(Error, Debug)]
pub enum SweepError {
    /// Not running in a git repository
    #[error("'{0}' is not a git repository.\n\n  → Pass --repo with the path to a clone of the target repository.")]
    NotGitRepository(PathBuf),

    /// Required environment variables are missing or empty
    #[error("Missing required environment variables: {}\n\n  → Export them before running, e.g. export {}=...", .0.join(", "), .0[0])]
    MissingEnv(Vec<&'static str>),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid GitHub URL format
    #[error("Cannot parse GitHub URL: {0}\n\n  → Expected format: https://github.com/owner/repo or git@github.com:owner/repo")]
    InvalidGitHubUrl(String),

    /// The checked-out clone does not belong to the configured repository
    #[error("Remote 'origin' points at {found}, but REPO_OWNER/REPO_NAME is {expected}.\n\n  → Run from a clone of {expected}, or fix the environment.")]
    RepositoryMismatch { expected: String, found: String },

    /// Branch listing failed
    #[error("Cannot list remote branches: {0}\n\n  → Run 'git fetch' and check that the remote is reachable.")]
    BranchListing(String),

    /// Branch does not exist locally or on the remote
    #[error("Branch '{0}' not found.\n\n  → Run 'git fetch --prune' to refresh remote branches.")]
    BranchNotFound(String),

    /// Local changes would be overwritten by checkout
    #[error("Cannot switch to '{branch}': the working tree has uncommitted changes.\n\n  → Commit or stash them, then run again.")]
    DirtyWorkingTree { branch: String },

    /// Untracked files would be swept into the first decryption commit
    #[error("Untracked files in the working tree: {}\n\n  → Remove them, add them to .gitignore, or commit them before running.", .0.join(", "))]
    UntrackedFiles(Vec<String>),

    /// The decryption script lives inside the repository being swept
    #[error("Decryption script '{0}' is inside the repository.\n\n  → Move it outside the clone; checkouts would replace or delete it.")]
    ScriptInsideRepository(PathBuf),

    /// Checkout failed for another reason
    #[error("Checkout of '{branch}' failed: {stderr}")]
    Checkout { branch: String, stderr: String },

    /// Push rejected by the remote
    #[error("Push to '{branch}' was rejected by the remote.\n\n  → The branch moved upstream; pull and run again.")]
    PushRejected { branch: String },

    /// Remote refused the credentials
    #[error("Authentication failed while pushing '{branch}'.\n\n  → Check that GITHUB_TOKEN is valid and has push access.")]
    PushAuthentication { branch: String },

    /// Push failed for another reason
    #[error("Push of '{branch}' failed: {stderr}")]
    Push { branch: String, stderr: String },

    /// The decryption tool could not be started at all
    #[error("Cannot run decryption tool '{program}': {source}\n\n  → Make sure the interpreter is installed and on PATH.")]
    DecryptSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Moving the decrypted output into place failed after a successful decrypt
    #[error("Decrypted '{source_path}' but could not finalize '{target_path}': {reason}\n\n  → Inspect the working tree before running again.")]
    Finalize {
        source_path: PathBuf,
        target_path: PathBuf,
        reason: std::io::Error,
    },

    /// Git operation error
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    /// IO error
    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("Failed to serialize summary: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with custom message
    #[error("{0}")]
    Custom(String),
}

/// Result type alias using SweepError
pub type Result<T> = std::result::Result<T, SweepError>;
