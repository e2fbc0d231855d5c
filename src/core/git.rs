//! Local git repository operations
//!
//! This module provides the git-backed implementation of
//! [`VersionControl`]:
//! - Repository discovery and validation
//! - Remote branch listing and checkout (system git)
//! - Staging and committing (git2)
//! - Pushing (system git, so SSH agents and credential helpers keep working)

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use git2::{Repository, Signature, StatusOptions};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::core::git_errors::{classify_checkout_error, classify_push_error, redact_credentials};
use crate::error::{Result, SweepError};
use crate::sweep::vcs::VersionControl;

/// Author name used when neither git config nor the caller supplies one
const DEFAULT_AUTHOR: &str = "branch-decrypt";

// Variables the push credential helper reads
const USERNAME_VAR: &str = "BRANCH_DECRYPT_USERNAME";
const TOKEN_VAR: &str = "BRANCH_DECRYPT_TOKEN";

/// Answers `get` from the environment, ignores `store`/`erase`
const CREDENTIAL_HELPER: &str = "credential.helper=!f() { test \"$1\" = get || return 0; \
     echo \"username=${BRANCH_DECRYPT_USERNAME}\"; echo \"password=${BRANCH_DECRYPT_TOKEN}\"; }; f";

/// Account used to authenticate HTTPS pushes
struct PushCredentials {
    username: String,
    token: SecretString,
}

/// Wrapper for local git repository operations
pub struct GitRepository {
    repo: Repository,
    root: PathBuf,
    remote: String,
    credentials: Option<PushCredentials>,
    fallback_author: String,
}

impl GitRepository {
    /// Discover a git repository from the given path
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let repo = Repository::discover(path)
            .map_err(|_| SweepError::NotGitRepository(path.to_path_buf()))?;
        let root = repo
            .workdir()
            .map(|p| p.to_path_buf())
            .ok_or_else(|| SweepError::NotGitRepository(path.to_path_buf()))?;

        Ok(Self {
            repo,
            root,
            remote: "origin".to_string(),
            credentials: None,
            fallback_author: DEFAULT_AUTHOR.to_string(),
        })
    }

    /// Set the remote that pushes go to
    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    /// Authenticate pushes with a username and token
    ///
    /// The token reaches git through the child environment and a one-shot
    /// credential helper, never through its arguments.
    pub fn with_credentials(mut self, username: impl Into<String>, token: SecretString) -> Self {
        self.credentials = Some(PushCredentials {
            username: username.into(),
            token,
        });
        self
    }

    /// Set the author name used when git has no `user.name` configured
    pub fn with_fallback_author(mut self, name: impl Into<String>) -> Self {
        self.fallback_author = name.into();
        self
    }

    /// Get the repository root directory
    pub fn root_dir(&self) -> &Path {
        &self.root
    }

    /// Get the remote URL for a given remote name
    pub fn remote_url(&self, remote_name: &str) -> Result<String> {
        let remote = self.repo.find_remote(remote_name)?;
        remote.url().map(|s| s.to_string()).ok_or_else(|| {
            SweepError::Config(format!("remote '{}' has no usable URL", remote_name))
        })
    }

    /// Get the current branch name
    pub fn current_branch(&self) -> Result<String> {
        let head = self.repo.head()?;
        if head.is_branch() {
            Ok(head.shorthand().unwrap_or("HEAD").to_string())
        } else {
            // Detached HEAD state
            Ok("HEAD".to_string())
        }
    }

    /// Whether tracked files have uncommitted changes
    pub fn has_tracked_changes(&self) -> Result<bool> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(false).include_ignored(false);
        let statuses = self.repo.statuses(Some(&mut opts))?;
        Ok(!statuses.is_empty())
    }

    /// Paths of untracked files (these get committed by `stage_all`)
    pub fn untracked_files(&self) -> Result<Vec<String>> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true).recurse_untracked_dirs(true);
        let statuses = self.repo.statuses(Some(&mut opts))?;

        Ok(statuses
            .iter()
            .filter(|entry| entry.status().contains(git2::Status::WT_NEW))
            .filter_map(|entry| entry.path().map(|p| p.to_string()))
            .collect())
    }

    /// System git in the repository root, never prompting on a terminal
    fn git_command(&self, args: &[&str]) -> Command {
        debug!(args = %redact_credentials(&args.join(" ")), "running git");
        let mut cmd = Command::new("git");
        cmd.current_dir(&self.root)
            .env("GIT_TERMINAL_PROMPT", "0")
            .args(args);
        cmd
    }

    /// Run system git in the repository root
    fn git(&self, args: &[&str]) -> Result<Output> {
        run(self.git_command(args), args[0])
    }

    /// `git push <remote> <branch>`, with credentials when configured
    fn push_command(&self, branch: &str) -> Command {
        let Some(credentials) = &self.credentials else {
            return self.git_command(&["push", self.remote.as_str(), branch]);
        };

        // An empty helper entry resets any helpers from user config
        let mut cmd = self.git_command(&[
            "-c",
            "credential.helper=",
            "-c",
            CREDENTIAL_HELPER,
            "push",
            self.remote.as_str(),
            branch,
        ]);
        cmd.env(USERNAME_VAR, &credentials.username)
            .env(TOKEN_VAR, credentials.token.expose_secret());
        cmd
    }

    fn signature(&self) -> Result<Signature<'static>> {
        match self.repo.signature() {
            Ok(sig) => Ok(sig.to_owned()),
            Err(_) => {
                let email = format!("{}@users.noreply.github.com", self.fallback_author);
                Ok(Signature::now(&self.fallback_author, &email)?)
            }
        }
    }
}

fn run(mut cmd: Command, subcommand: &str) -> Result<Output> {
    cmd.output()
        .map_err(|e| SweepError::Custom(format!("Failed to execute git {}: {}", subcommand, e)))
}

impl VersionControl for GitRepository {
    fn list_remote_branches(&self) -> Result<String> {
        let output = self.git(&["branch", "-r"])?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SweepError::BranchListing(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        let output = self.git(&["checkout", branch])?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_checkout_error(branch, &stderr));
        }

        Ok(())
    }

    fn stage_all(&self) -> Result<()> {
        let mut index = self.repo.index()?;
        // Checkout ran outside libgit2; pick up the index it wrote
        index.read(true)?;
        index.add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)?;
        // add_all does not record removals
        index.update_all(["*"].iter(), None)?;
        index.write()?;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<()> {
        let mut index = self.repo.index()?;
        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;

        let head = self.repo.head()?;
        let parent = head.peel_to_commit()?;
        let signature = self.signature()?;

        let commit_id = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &[&parent],
        )?;

        debug!(%commit_id, "created commit");
        Ok(())
    }

    fn push(&self, branch: &str) -> Result<()> {
        let output = run(self.push_command(branch), "push")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_push_error(branch, &stderr));
        }

        Ok(())
    }
}
