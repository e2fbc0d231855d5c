//! End-to-end tests for the branch-decrypt binary.

use std::fs;
use std::path::Path;
use std::process::Command as StdCommand;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const ENV_VARS: [&str; 4] = ["GITHUB_USERNAME", "GITHUB_TOKEN", "REPO_NAME", "REPO_OWNER"];

fn bin() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("branch-decrypt").expect("failed to find binary");
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.env_remove("RUST_LOG");
    cmd
}

fn with_env(mut cmd: Command) -> Command {
    cmd.env("GITHUB_USERNAME", "octocat")
        .env("GITHUB_TOKEN", "ghp_test")
        .env("REPO_NAME", "scripts")
        .env("REPO_OWNER", "acme");
    cmd
}

fn git(dir: &Path, args: &[&str]) -> String {
    let output = StdCommand::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn git_available() -> bool {
    StdCommand::new("git").arg("--version").output().is_ok()
}

#[test]
fn test_help_mentions_environment() {
    bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("GITHUB_TOKEN"));
}

#[test]
fn test_missing_environment_aborts_first() {
    // Not a git repository either; the configuration error must win
    let dir = TempDir::new().unwrap();

    bin()
        .current_dir(dir.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Missing required environment variables"))
        .stderr(predicate::str::contains("REPO_OWNER"));
}

#[test]
fn test_single_missing_variable_aborts() {
    let dir = TempDir::new().unwrap();
    let mut cmd = with_env(bin());
    cmd.env_remove("REPO_NAME");

    cmd.current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("REPO_NAME"))
        .stderr(predicate::str::contains("GITHUB_USERNAME").not());
}

#[test]
fn test_missing_script_is_reported() {
    let dir = TempDir::new().unwrap();

    with_env(bin())
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("decryption script"));
}

#[test]
fn test_not_a_repository() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("tool.sh"), "exit 0\n").unwrap();

    with_env(bin())
        .current_dir(dir.path())
        .args(["--script", "tool.sh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a git repository"));
}

/// Bare remote with main, feature-a (one .st file) and feature-b (none)
fn seeded_remote(root: &Path) -> std::path::PathBuf {
    let remote = root.join("remote.git");
    fs::create_dir_all(&remote).unwrap();
    git(&remote, &["init", "--bare", "-q"]);
    git(&remote, &["symbolic-ref", "HEAD", "refs/heads/main"]);

    let seed = root.join("seed");
    fs::create_dir_all(&seed).unwrap();
    git(&seed, &["init", "-q"]);
    git(&seed, &["config", "user.name", "Seed"]);
    git(&seed, &["config", "user.email", "seed@example.com"]);
    git(&seed, &["checkout", "-q", "-b", "main"]);
    fs::write(seed.join("README.md"), "readme\n").unwrap();
    git(&seed, &["add", "."]);
    git(&seed, &["commit", "-q", "-m", "initial"]);

    git(&seed, &["checkout", "-q", "-b", "feature-a"]);
    fs::create_dir_all(seed.join("scripts")).unwrap();
    fs::write(seed.join("scripts/secret.st"), "cipher\n").unwrap();
    git(&seed, &["add", "."]);
    git(&seed, &["commit", "-q", "-m", "add secret"]);

    git(&seed, &["checkout", "-q", "main"]);
    git(&seed, &["checkout", "-q", "-b", "feature-b"]);
    fs::write(seed.join("notes.txt"), "notes\n").unwrap();
    git(&seed, &["add", "."]);
    git(&seed, &["commit", "-q", "-m", "add notes"]);

    let remote_str = remote.to_str().unwrap();
    git(&seed, &["remote", "add", "origin", remote_str]);
    git(&seed, &["push", "-q", "origin", "main", "feature-a", "feature-b"]);
    remote
}

/// Working clone of `remote` with a committer configured
fn clone_of(root: &Path, remote: &Path) -> std::path::PathBuf {
    let work = root.join("work");
    git(
        root,
        &["clone", "-q", remote.to_str().unwrap(), work.to_str().unwrap()],
    );
    git(&work, &["config", "user.name", "Sweeper"]);
    git(&work, &["config", "user.email", "sweeper@example.com"]);
    work
}

fn assert_remote_untouched(remote: &Path) {
    let subject = git(remote, &["log", "-1", "--format=%s", "feature-a"]);
    assert_eq!(subject.trim(), "add secret");
    let subject = git(remote, &["log", "-1", "--format=%s", "feature-b"]);
    assert_eq!(subject.trim(), "add notes");
}

#[cfg(unix)]
#[test]
fn test_script_inside_clone_is_refused() {
    if !git_available() {
        eprintln!("skipping: git not installed");
        return;
    }

    let tmp = TempDir::new().unwrap();
    let remote = seeded_remote(tmp.path());
    let work = clone_of(tmp.path(), &remote);
    fs::write(work.join("tool.sh"), "printf 'return 1\\n' > out.lua\n").unwrap();

    with_env(bin())
        .current_dir(&work)
        .args(["--interpreter", "sh", "--script", "tool.sh"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("inside the repository"));

    assert_remote_untouched(&remote);
    assert!(work.join("tool.sh").exists());
}

#[cfg(unix)]
#[test]
fn test_untracked_files_abort_before_checkout() {
    if !git_available() {
        eprintln!("skipping: git not installed");
        return;
    }

    let tmp = TempDir::new().unwrap();
    let remote = seeded_remote(tmp.path());
    let work = clone_of(tmp.path(), &remote);
    fs::write(work.join("scratch.txt"), "local notes\n").unwrap();
    let tool = tmp.path().join("tool.sh");
    fs::write(&tool, "printf 'return 1\\n' > out.lua\n").unwrap();

    with_env(bin())
        .args([
            "--repo",
            work.to_str().unwrap(),
            "--interpreter",
            "sh",
            "--script",
            tool.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Untracked files"))
        .stderr(predicate::str::contains("scratch.txt"));

    assert_remote_untouched(&remote);
    assert_eq!(git(&work, &["rev-parse", "--abbrev-ref", "HEAD"]).trim(), "main");
}

#[cfg(unix)]
#[test]
fn test_failed_tool_output_is_not_committed() {
    if !git_available() {
        eprintln!("skipping: git not installed");
        return;
    }

    let tmp = TempDir::new().unwrap();
    let remote = seeded_remote(tmp.path());
    let work = clone_of(tmp.path(), &remote);
    let tool = tmp.path().join("tool.sh");
    // Leaves a partial artifact behind, then fails
    fs::write(&tool, "printf 'half' > out.lua\nexit 1\n").unwrap();

    with_env(bin())
        .args([
            "--repo",
            work.to_str().unwrap(),
            "--interpreter",
            "sh",
            "--script",
            tool.to_str().unwrap(),
        ])
        .assert()
        .success();

    assert_remote_untouched(&remote);
    assert!(!work.join("out.lua").exists());
    assert!(git(&work, &["status", "--porcelain"]).trim().is_empty());
}

#[cfg(unix)]
#[test]
fn test_sweeps_and_pushes_feature_branches() {
    if !git_available() {
        eprintln!("skipping: git not installed");
        return;
    }

    let tmp = TempDir::new().unwrap();
    let remote = seeded_remote(tmp.path());
    let work = clone_of(tmp.path(), &remote);

    let tool = tmp.path().join("tool.sh");
    fs::write(&tool, "printf 'return 1\\n' > out.lua\n").unwrap();

    with_env(bin())
        .args([
            "--repo",
            work.to_str().unwrap(),
            "--interpreter",
            "sh",
            "--script",
            tool.to_str().unwrap(),
            "--json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"published\""))
        .stdout(predicate::str::contains("\"skipped\""));

    let files = git(&remote, &["ls-tree", "-r", "--name-only", "feature-a"]);
    assert!(files.contains("scripts/secret.lua"));
    assert!(!files.contains("scripts/secret.st"));

    let subject = git(&remote, &["log", "-1", "--format=%s", "feature-a"]);
    assert_eq!(subject.trim(), "Decrypt .st files to .lua");

    let subject = git(&remote, &["log", "-1", "--format=%s", "feature-b"]);
    assert_eq!(subject.trim(), "add notes");

    let subject = git(&remote, &["log", "-1", "--format=%s", "main"]);
    assert_eq!(subject.trim(), "initial");
}
