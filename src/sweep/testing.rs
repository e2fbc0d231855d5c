//! Test doubles shared by the sweep tests

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::sweep::decrypt::{DecryptOutcome, Decryptor, FailureReason};
use crate::sweep::discover::decrypted_path;

/// Decryptor that renames files in place and fails for chosen file names
#[derive(Default)]
pub struct FakeDecryptor {
    failing: Vec<String>,
    calls: RefCell<Vec<PathBuf>>,
}

impl FakeDecryptor {
    pub fn failing(names: &[&str]) -> Self {
        Self {
            failing: names.iter().map(|n| n.to_string()).collect(),
            calls: RefCell::default(),
        }
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.borrow().clone()
    }
}

impl Decryptor for FakeDecryptor {
    fn decrypt(&self, path: &Path) -> Result<DecryptOutcome> {
        self.calls.borrow_mut().push(path.to_path_buf());

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let target = match decrypted_path(path) {
            Some(target) if !self.failing.iter().any(|f| f == name) => target,
            _ => {
                return Ok(DecryptOutcome::Failed {
                    source: path.to_path_buf(),
                    reason: FailureReason::ToolFailed {
                        code: Some(1),
                        stderr: "corrupt header".to_string(),
                    },
                })
            }
        };

        fs::rename(path, &target)?;
        Ok(DecryptOutcome::Decrypted {
            source: path.to_path_buf(),
            target,
        })
    }
}
