//! Run configuration loaded from the environment
//!
//! The four identifiers are read once at start-up and passed down
//! explicitly. Nothing else in the crate reads the environment.

use std::fmt;

use secrecy::SecretString;

use crate::error::{Result, SweepError};

// Environment variable names
pub const USERNAME_ENV: &str = "GITHUB_USERNAME";
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const REPO_NAME_ENV: &str = "REPO_NAME";
pub const REPO_OWNER_ENV: &str = "REPO_OWNER";

/// Identity and repository parameters for a run
pub struct Config {
    /// GitHub account name
    pub username: String,
    /// Access token for HTTPS pushes; only ever handed to git via its environment
    pub token: SecretString,
    /// Repository name
    pub repo_name: String,
    /// Repository owner (user or organization)
    pub repo_owner: String,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration using a custom lookup
    ///
    /// Empty values count as missing. All missing names are reported
    /// together.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut read = |key: &'static str| match lookup(key) {
            Some(value) if !value.trim().is_empty() => value,
            _ => {
                missing.push(key);
                String::new()
            }
        };

        let username = read(USERNAME_ENV);
        let token = read(TOKEN_ENV);
        let repo_name = read(REPO_NAME_ENV);
        let repo_owner = read(REPO_OWNER_ENV);

        if !missing.is_empty() {
            return Err(SweepError::MissingEnv(missing));
        }

        Ok(Self {
            username,
            token: SecretString::from(token),
            repo_name,
            repo_owner,
        })
    }

    /// Get the full repository name (owner/name)
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.repo_owner, self.repo_name)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("username", &self.username)
            .field("token", &"[REDACTED]")
            .field("repo_name", &self.repo_name)
            .field("repo_owner", &self.repo_owner)
            .finish()
    }
}
