//! Run handler
//!
//! Wires the git-backed version control and the external decryptor into
//! the driver and reports the result.

use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use crate::cli::commands::Cli;
use crate::core::config::Config;
use crate::core::git::GitRepository;
use crate::core::repository::RepositoryContext;
use crate::error::{Result, SweepError};
use crate::sweep::{BranchState, BranchSweep, Driver, ExternalDecryptor, RunSummary};

/// Handle a full run
pub fn handle_run(args: Cli) -> Result<()> {
    let config = Config::from_env()?;
    handle_run_with(args, &config)
}

/// Handle a run with an already-loaded configuration
pub fn handle_run_with(args: Cli, config: &Config) -> Result<()> {
    let script = resolve_script(&args.script)?;

    let git = GitRepository::discover(&args.repo)?;
    let root = git.root_dir().to_path_buf();
    let remote_url = git.remote_url(&args.remote)?;
    let repo_ctx = RepositoryContext::resolve(config, &args.remote, &remote_url)?;
    ensure_outside(&script, &root)?;

    // Every commit stages the whole tree, so it must start out clean
    if git.has_tracked_changes()? {
        return Err(SweepError::DirtyWorkingTree {
            branch: git.current_branch()?,
        });
    }
    let untracked = git.untracked_files()?;
    if !untracked.is_empty() {
        return Err(SweepError::UntrackedFiles(untracked));
    }

    let mut git = git
        .with_remote(repo_ctx.remote())
        .with_fallback_author(&config.username);
    if repo_ctx.needs_credentials() {
        let token = SecretString::from(config.token.expose_secret().to_string());
        git = git.with_credentials(&config.username, token);
    }
    let decryptor = ExternalDecryptor::new(&args.interpreter, vec![script.into_os_string()], &root)
        .with_output_name(&args.output);

    info!(
        repository = %repo_ctx.display_name(),
        root = %root.display(),
        "starting sweep"
    );

    let sweep = BranchSweep::new(&git, &decryptor, &root).with_commit_message(&args.message);
    let summary = Driver::new(sweep, repo_ctx.remote())
        .with_protected(args.skip)
        .run()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    Ok(())
}

/// Resolve the decryption script to an absolute path
///
/// Checkouts change the working tree, so a relative path could point at a
/// different file (or none) once the first branch is checked out.
fn resolve_script(script: &Path) -> Result<PathBuf> {
    script.canonicalize().map_err(|e| {
        SweepError::Config(format!(
            "decryption script '{}' not found: {}",
            script.display(),
            e
        ))
    })
}

/// Refuse a script that lives in the working tree
///
/// Checkouts and commits operate on the whole tree; a script inside it gets
/// committed or vanishes when a branch without it is checked out.
fn ensure_outside(script: &Path, root: &Path) -> Result<()> {
    let root = root.canonicalize()?;
    if script.starts_with(&root) {
        return Err(SweepError::ScriptInsideRepository(script.to_path_buf()));
    }
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!();
    for report in &summary.branches {
        let marker = match report.state {
            BranchState::Published => "✓",
            BranchState::NoChanges => "=",
        };
        print!("  {} {}", marker, report.branch);
        if !report.decrypted.is_empty() {
            print!("  {} decrypted", report.decrypted.len());
        }
        if !report.failed.is_empty() {
            print!("  {} failed", report.failed.len());
        }
        println!();
    }
    for branch in &summary.skipped {
        println!("  - {} (protected)", branch);
    }

    println!(
        "\n{} branch(es) swept, {} pushed, {} file(s) decrypted, {} failed.",
        summary.branches.len(),
        summary.published(),
        summary.decrypted_files(),
        summary.failed_files()
    );
}
