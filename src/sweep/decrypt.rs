//! Decryption invoker
//!
//! Runs the external decryption tool on one encrypted file and moves its
//! fixed-name output next to the source. The tool always writes the same
//! output file in its working directory, so invocations must never overlap.

use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info, warn};

use crate::error::{Result, SweepError};
use crate::sweep::discover::decrypted_path;

/// Default interpreter for the decryption script
pub const DEFAULT_INTERPRETER: &str = "python3";

/// Default decryption script
pub const DEFAULT_SCRIPT: &str = "st_to_lua.py";

/// File the decryption tool writes its result to
pub const DEFAULT_OUTPUT: &str = "out.lua";

/// Why a single file could not be decrypted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The tool exited unsuccessfully
    ToolFailed { code: Option<i32>, stderr: String },
    /// The tool exited cleanly but wrote no output
    MissingOutput,
    /// The file name does not carry the encrypted marker
    NotEncrypted,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::ToolFailed {
                code: Some(code), ..
            } => write!(f, "tool exited with status {}", code),
            FailureReason::ToolFailed { code: None, .. } => write!(f, "tool killed by signal"),
            FailureReason::MissingOutput => write!(f, "tool produced no output"),
            FailureReason::NotEncrypted => write!(f, "not an encrypted file"),
        }
    }
}

/// Result of one decryption attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecryptOutcome {
    /// `source` was replaced by `target`
    Decrypted { source: PathBuf, target: PathBuf },
    /// Nothing on disk changed
    Failed { source: PathBuf, reason: FailureReason },
}

/// Turns one encrypted file into its decrypted sibling
///
/// Recoverable problems come back as [`DecryptOutcome::Failed`]. An `Err`
/// means the working tree may be inconsistent and the run must stop.
pub trait Decryptor {
    fn decrypt(&self, path: &Path) -> Result<DecryptOutcome>;
}

/// Decryptor backed by an external program
#[derive(Debug, Clone)]
pub struct ExternalDecryptor {
    program: OsString,
    leading_args: Vec<OsString>,
    work_dir: PathBuf,
    output_name: String,
}

impl ExternalDecryptor {
    /// Run `program [leading_args..] <path>` inside `work_dir`
    pub fn new(
        program: impl Into<OsString>,
        leading_args: Vec<OsString>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            program: program.into(),
            leading_args,
            work_dir: work_dir.into(),
            output_name: DEFAULT_OUTPUT.to_string(),
        }
    }

    /// Override the name of the file the tool writes
    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = name.into();
        self
    }

    /// Where the tool leaves its result
    pub fn output_path(&self) -> PathBuf {
        self.work_dir.join(&self.output_name)
    }

    fn program_display(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    fn finalize(&self, output: &Path, source: &Path, target: &Path) -> Result<()> {
        let fail = |reason: std::io::Error| SweepError::Finalize {
            source_path: source.to_path_buf(),
            target_path: target.to_path_buf(),
            reason,
        };

        if target.exists() {
            debug!(target = %target.display(), "overwriting existing decrypted file");
        }
        fs::rename(output, target).map_err(fail)?;
        fs::remove_file(source).map_err(fail)?;
        Ok(())
    }
}

impl Decryptor for ExternalDecryptor {
    fn decrypt(&self, path: &Path) -> Result<DecryptOutcome> {
        let Some(target) = decrypted_path(path) else {
            warn!(path = %path.display(), "refusing to decrypt file without .st extension");
            return Ok(DecryptOutcome::Failed {
                source: path.to_path_buf(),
                reason: FailureReason::NotEncrypted,
            });
        };

        let output_path = self.output_path();
        // A leftover artifact must not pass for this file's output
        if output_path.exists() {
            debug!(path = %output_path.display(), "removing stale decryption output");
            fs::remove_file(&output_path)?;
        }

        let output = Command::new(&self.program)
            .args(&self.leading_args)
            .arg(path)
            .current_dir(&self.work_dir)
            .output()
            .map_err(|source| SweepError::DecryptSpawn {
                program: self.program_display(),
                source,
            })?;

        if !output.status.success() {
            // A partial artifact would otherwise be staged with the next commit
            if output_path.exists() {
                debug!(path = %output_path.display(), "discarding output of failed decryption");
                fs::remove_file(&output_path)?;
            }

            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(
                status = ?output.status.code(),
                stderr = %stderr,
                "decryption failed for {}",
                path.display()
            );
            return Ok(DecryptOutcome::Failed {
                source: path.to_path_buf(),
                reason: FailureReason::ToolFailed {
                    code: output.status.code(),
                    stderr,
                },
            });
        }

        if !output_path.exists() {
            warn!(
                path = %path.display(),
                expected = %output_path.display(),
                "decryption tool exited cleanly but produced no output"
            );
            return Ok(DecryptOutcome::Failed {
                source: path.to_path_buf(),
                reason: FailureReason::MissingOutput,
            });
        }

        self.finalize(&output_path, path, &target)?;
        info!("decrypted {} -> {}", path.display(), target.display());

        Ok(DecryptOutcome::Decrypted {
            source: path.to_path_buf(),
            target,
        })
    }
}
