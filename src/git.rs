//! Local git operations: environment scrubbing and worktree provisioning.
//!
//! The hook process is spawned by git with `GIT_DIR` and friends pointing
//! at the receiving repository's internals. Those variables must not leak
//! into the `git worktree` subprocess, which would otherwise operate on the
//! wrong repository state.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use thiserror::Error;

use crate::types::Sha;

/// Variables the receiving git process sets to point at its own internals.
const SCRUBBED_VARS: &[&str] = &["GIT_DIR", "GIT_WORK_TREE", "GIT_QUARANTINE_PATH"];

/// Errors from git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Git command exited non-zero.
    #[error("git command failed: {command}\nstderr: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// The workspace directory could not be replaced or created.
    #[error("could not prepare workspace directory {path}: {source}")]
    WorkspaceDir { path: PathBuf, source: io::Error },

    /// IO error spawning git.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for git operations.
pub type GitResult<T> = Result<T, GitError>;

/// An isolated checkout of one revision, owned by a single deploy cycle.
///
/// The directory is keyed by revision under the worktree cache. It is not
/// cleaned up here; retention is left to the cache root's own lifecycle,
/// and a fresh provisioning call always evicts a stale directory first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    /// Directory containing the materialized file tree.
    pub path: PathBuf,
    /// The revision checked out into `path`.
    pub revision: Sha,
}

/// Removes the receiving repository's context variables from a subprocess
/// environment.
///
/// Scoped to the child command rather than the process-wide environment, so
/// nothing else in the hook observes the change.
pub(crate) fn scrub_hook_env(cmd: &mut Command) {
    for &var in SCRUBBED_VARS {
        tracing::debug!(env = var, "unsetting environment variable");
        cmd.env_remove(var);
    }
}

/// Create a git Command running in `workdir` with a scrubbed environment.
fn git_command(workdir: &Path) -> Command {
    let mut cmd = Command::new("git");
    cmd.current_dir(workdir);
    scrub_hook_env(&mut cmd);
    cmd
}

/// Run a git command in the given working directory.
///
/// Returns the command output on success, or a `GitError` on failure.
fn run_git(workdir: &Path, args: &[&str]) -> GitResult<Output> {
    let output = git_command(workdir).args(args).output()?;

    if output.status.success() {
        Ok(output)
    } else {
        Err(GitError::CommandFailed {
            command: format!("git {}", args.join(" ")),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Splits a subprocess's combined output into loggable lines.
///
/// stdout lines come first, then stderr; a trailing blank run is dropped.
pub(crate) fn output_lines(output: &Output) -> Vec<String> {
    let mut lines = Vec::new();
    for stream in [&output.stdout, &output.stderr] {
        let text = String::from_utf8_lossy(stream);
        lines.extend(text.trim_end().lines().map(str::to_string));
    }
    lines
}

/// Checks `revision` out into an exclusively-owned directory under
/// `cache_root`.
///
/// Any directory left at the target path by an earlier run is deleted
/// first, and the stale worktree registration that deletion leaves behind
/// is pruned, so provisioning the same revision twice yields only the
/// second checkout's tree. On a failed checkout the half-populated
/// directory stays in place.
pub fn provision(repo_dir: &Path, cache_root: &Path, revision: &Sha) -> GitResult<Workspace> {
    let path = cache_root.join(revision.as_str());
    tracing::debug!(path = %path.display(), "creating directory in worktree cache");

    match fs::remove_dir_all(&path) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => return Err(GitError::WorkspaceDir { path, source }),
    }
    fs::create_dir_all(&path).map_err(|source| GitError::WorkspaceDir {
        path: path.clone(),
        source,
    })?;

    run_git(repo_dir, &["worktree", "prune"])?;

    let output = git_command(repo_dir)
        .args(["worktree", "add"])
        .arg(&path)
        .arg(revision.as_str())
        .output()?;

    for line in output_lines(&output) {
        tracing::info!(git = "worktree-add", revision = %revision.short(), "{}", line);
    }
    if !output.status.success() {
        return Err(GitError::CommandFailed {
            command: format!("git worktree add {} {}", path.display(), revision),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(Workspace {
        path,
        revision: revision.clone(),
    })
}
