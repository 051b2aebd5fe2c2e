//! boss - a git push-receive hook that deploys a static site.
//!
//! The hook reads pushed ref updates from standard input, checks the
//! configured deploy branch out into an isolated worktree under a
//! revision-keyed cache, and runs Hugo against it. One process handles at
//! most one deploy cycle end-to-end; every fatal condition surfaces as an
//! error from [`run`] and terminates the process in `main`.

pub mod build;
pub mod config;
pub mod git;
pub mod receive;
pub mod types;

use std::io::BufRead;
use std::path::Path;

use thiserror::Error;

use config::Config;

/// Errors that abort a deploy cycle.
///
/// There is no recovery or retry anywhere in the pipeline; the single
/// top-level handler logs the error and exits non-zero.
#[derive(Debug, Error)]
pub enum HookError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Receive(#[from] receive::ReceiveError),

    #[error(transparent)]
    Git(#[from] git::GitError),

    #[error(transparent)]
    Build(#[from] build::BuildError),

    #[error("could not determine repository directory: {0}")]
    RepoDir(#[from] std::io::Error),
}

/// Runs one deploy cycle: select the pushed deploy-branch revision, check
/// it out into a fresh workspace, and build the site from it.
///
/// `repo_dir` is the repository the hook was invoked in; workspaces are
/// created from it under the configured worktree cache. When several
/// updates to the deploy ref appear in one input stream, the last one is
/// deployed.
pub fn run(config: &Config, repo_dir: &Path, input: impl BufRead) -> Result<(), HookError> {
    let revision = receive::select_deploy_target(input, &config.deploy_ref())?;
    let workspace = git::provision(repo_dir, Path::new(&config.worktree_cache), &revision)?;
    build::build_site(config, &workspace)?;
    Ok(())
}
