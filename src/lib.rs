//! branch-decrypt - decrypt encrypted artifacts across every remote branch
//!
//! For each remote branch except the protected ones, this library checks the
//! branch out, replaces every `.st` file with the `.lua` produced by an
//! external decryption tool, and commits and pushes the result.

pub mod cli;
pub mod core;
pub mod error;
pub mod sweep;

pub use error::{Result, SweepError};
