//! Core functionality for branch-decrypt
//!
//! This module contains the pieces that touch the outside world:
//! - Environment configuration
//! - Git repository operations
//! - Git failure classification
//! - Repository identity checks

pub mod config;
pub mod git;
pub mod git_errors;
pub mod repository;

pub use config::Config;
pub use git::GitRepository;
pub use repository::RepositoryContext;
