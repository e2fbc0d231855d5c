//! Candidate discovery
//!
//! Pure mapping from a root directory to the encrypted files beneath it,
//! plus the `.st` -> `.lua` naming rule.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

/// Extension marking an encrypted artifact
pub const ENCRYPTED_EXTENSION: &str = ".st";

/// Extension of the decrypted counterpart
pub const DECRYPTED_EXTENSION: &str = ".lua";

/// Whether a file name carries the encrypted marker
pub fn is_encrypted_name(name: &str) -> bool {
    name.ends_with(ENCRYPTED_EXTENSION)
}

/// Sibling path with the encrypted marker swapped for the decrypted one
///
/// Returns `None` when `path` does not end in the encrypted marker.
pub fn decrypted_path(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    let stem = name.strip_suffix(ENCRYPTED_EXTENSION)?;
    Some(path.with_file_name(format!("{}{}", stem, DECRYPTED_EXTENSION)))
}

fn is_git_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name() == ".git"
}

/// Lazily walk `root` and yield every encrypted regular file
///
/// `.git` is never descended into. Entries come out in file-name order
/// within each directory. Unreadable entries are yielded as errors.
pub fn candidate_files(root: &Path) -> impl Iterator<Item = walkdir::Result<PathBuf>> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_git_dir(entry))
        .filter_map(|entry| match entry {
            Ok(entry) => {
                let selected = entry.file_type().is_file()
                    && entry.file_name().to_str().is_some_and(is_encrypted_name);
                selected.then(|| Ok(entry.into_path()))
            }
            Err(e) => Some(Err(e)),
        })
}
