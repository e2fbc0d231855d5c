//! CLI module for branch-decrypt
//!
//! Argument definitions and the run handler.

pub mod commands;
pub mod run;

pub use commands::Cli;
