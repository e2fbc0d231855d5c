//! The branch-iteration-and-mutation pipeline
//!
//! - Candidate discovery and naming rules
//! - The decryption invoker
//! - Per-branch sweep and publish
//! - Branch enumeration and the run loop
//!
//! Git and the decryption tool are reached only through the
//! [`VersionControl`] and [`Decryptor`] traits.

pub mod branch;
pub mod decrypt;
pub mod discover;
pub mod driver;
pub mod vcs;

#[cfg(test)]
pub(crate) mod testing;

pub use branch::{BranchReport, BranchState, BranchSweep, COMMIT_MESSAGE};
pub use decrypt::{DecryptOutcome, Decryptor, ExternalDecryptor, FailureReason};
pub use discover::{candidate_files, decrypted_path};
pub use driver::{parse_remote_branches, Driver, RunSummary, PROTECTED_BRANCHES};
pub use vcs::VersionControl;
