//! CLI definitions using clap
//!
//! Identity and repository parameters come from the environment (see
//! [`crate::core::config`]); flags here only tune the run.

use std::path::PathBuf;

use clap::Parser;

use crate::sweep::branch::COMMIT_MESSAGE;
use crate::sweep::decrypt::{DEFAULT_INTERPRETER, DEFAULT_OUTPUT, DEFAULT_SCRIPT};

/// branch-decrypt - decrypt .st files on every remote branch
///
/// Checks out each remote branch except main/master, replaces every .st file
/// with the .lua produced by the decryption tool, and pushes the result.
///
/// Requires GITHUB_USERNAME, GITHUB_TOKEN, REPO_NAME and REPO_OWNER.
#[derive(Parser, Debug)]
#[command(name = "branch-decrypt", version, about, long_about)]
pub struct Cli {
    /// Path to the clone to operate on
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,

    /// Program used to run the decryption script
    #[arg(long, default_value = DEFAULT_INTERPRETER)]
    pub interpreter: String,

    /// Decryption script, resolved before any branch is checked out
    #[arg(long, default_value = DEFAULT_SCRIPT)]
    pub script: PathBuf,

    /// File the decryption tool writes into the repository root
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    pub output: String,

    /// Remote whose branches are swept
    #[arg(long, default_value = "origin")]
    pub remote: String,

    /// Additional branch to leave untouched (repeatable)
    #[arg(long = "skip", value_name = "BRANCH")]
    pub skip: Vec<String>,

    /// Commit message for decryption commits
    #[arg(long, default_value = COMMIT_MESSAGE)]
    pub message: String,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,
}
