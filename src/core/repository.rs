//! Repository identity checks
//!
//! Parses the remote URL of the working clone to confirm it belongs to the
//! configured repository and to decide whether pushes need credentials.

use url::Url;

use crate::core::config::Config;
use crate::error::{Result, SweepError};

/// How the remote is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Https,
    Ssh,
}

/// A remote that lives on github.com
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubRemote {
    pub owner: String,
    pub name: String,
    pub transport: Transport,
}

impl GitHubRemote {
    /// Get the full repository name (owner/name)
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Whether this remote is the configured repository
    pub fn matches(&self, config: &Config) -> bool {
        self.owner.eq_ignore_ascii_case(&config.repo_owner)
            && self.name.eq_ignore_ascii_case(&config.repo_name)
    }
}

/// Resolved push destination for a run
#[derive(Debug, Clone)]
pub struct RepositoryContext {
    remote: String,
    github: Option<GitHubRemote>,
}

impl RepositoryContext {
    /// Check the remote URL against the configuration
    ///
    /// A GitHub URL for a different repository is fatal. A URL that is not
    /// on GitHub at all (a mirror, a local path) is accepted and pushed to by
    /// remote name without credentials.
    pub fn resolve(config: &Config, remote: &str, remote_url: &str) -> Result<Self> {
        let github = match parse_github_url(remote_url) {
            Ok(parsed) => {
                if !parsed.matches(config) {
                    return Err(SweepError::RepositoryMismatch {
                        expected: config.full_name(),
                        found: parsed.full_name(),
                    });
                }
                Some(parsed)
            }
            Err(_) => {
                tracing::warn!(remote, "remote is not a GitHub URL, skipping identity check");
                None
            }
        };

        Ok(Self {
            remote: remote.to_string(),
            github,
        })
    }

    /// Remote name branches are listed under and pushed to
    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// Whether pushes must carry the configured token
    ///
    /// SSH remotes authenticate through the agent; other hosts through
    /// whatever the user's git config provides.
    pub fn needs_credentials(&self) -> bool {
        matches!(&self.github, Some(remote) if remote.transport == Transport::Https)
    }

    /// Human-readable name of the push destination
    pub fn display_name(&self) -> String {
        match &self.github {
            Some(remote) => remote.full_name(),
            None => self.remote.clone(),
        }
    }
}

/// Parse a GitHub URL to extract owner and repository name
///
/// Supports both HTTPS and SSH URL formats:
/// - `https://github.com/owner/repo.git`
/// - `https://github.com/owner/repo`
/// - `git@github.com:owner/repo.git`
/// - `ssh://git@github.com/owner/repo.git`
pub fn parse_github_url(url: &str) -> Result<GitHubRemote> {
    if let Some(path) = url.strip_prefix("git@github.com:") {
        return parse_owner_repo_path(path.trim_end_matches(".git"), Transport::Ssh);
    }

    if let Some(path) = url.strip_prefix("ssh://git@github.com/") {
        return parse_owner_repo_path(path.trim_end_matches(".git"), Transport::Ssh);
    }

    if let Ok(parsed) = Url::parse(url) {
        if parsed.scheme() == "https" && parsed.host_str() == Some("github.com") {
            let path = parsed
                .path()
                .trim_start_matches('/')
                .trim_end_matches(".git");
            return parse_owner_repo_path(path, Transport::Https);
        }
    }

    Err(SweepError::InvalidGitHubUrl(url.to_string()))
}

/// Parse owner/repo from a path string
fn parse_owner_repo_path(path: &str, transport: Transport) -> Result<GitHubRemote> {
    let mut parts = path.split('/');
    match (parts.next(), parts.next()) {
        (Some(owner), Some(name)) if !owner.is_empty() && !name.is_empty() => Ok(GitHubRemote {
            owner: owner.to_string(),
            name: name.to_string(),
            transport,
        }),
        _ => Err(SweepError::InvalidGitHubUrl(path.to_string())),
    }
}
