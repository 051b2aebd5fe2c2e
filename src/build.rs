//! Build driver for the Hugo site generator.
//!
//! Drives one generator run against a provisioned workspace. Everything
//! the generator prints is logged before the outcome is inspected, so
//! build diagnostics reach the push client even when the build fails.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use thiserror::Error;

use crate::config::Config;
use crate::git::{Workspace, output_lines};

/// The generator binary driven by the hook.
const GENERATOR: &str = "hugo";

/// Errors driving the generator.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The generator could not be spawned at all.
    #[error("could not run {command}: {source}")]
    Spawn { command: String, source: io::Error },

    /// The generator ran but exited non-zero.
    #[error("{command} failed with {status}")]
    Failed { command: String, status: ExitStatus },
}

/// One generator invocation as a plain value.
///
/// Keeping the argument construction a pure mapping over this struct makes
/// it testable without spawning anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInvocation {
    /// Site source: the provisioned workspace.
    pub source: PathBuf,
    /// Generator-private cache, one directory per workspace.
    pub cache_dir: PathBuf,
    /// Where the rendered site is written.
    pub destination: PathBuf,
    pub minify: bool,
    pub clean_destination_dir: bool,
    pub gc: bool,
}

impl BuildInvocation {
    /// Derives the invocation for a workspace.
    ///
    /// The generator cache lives under the configured build cache, keyed
    /// by the workspace's directory name so revisions do not share cache
    /// state with unrelated checkouts.
    pub fn for_workspace(config: &Config, workspace: &Workspace) -> Self {
        let cache_dir = Path::new(&config.build_cache).join(basename(&workspace.path));
        BuildInvocation {
            source: workspace.path.clone(),
            cache_dir,
            destination: PathBuf::from(&config.destination),
            minify: config.minify,
            clean_destination_dir: config.clean_destination_dir,
            gc: config.gc,
        }
    }

    /// Maps the invocation to the generator's argument list.
    ///
    /// The three option pairs are always present; the bare flags are each
    /// gated by their own setting, any subset may be active.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--source".into(),
            self.source.clone().into(),
            "--cacheDir".into(),
            self.cache_dir.clone().into(),
            "--destination".into(),
            self.destination.clone().into(),
        ];
        if self.minify {
            args.push("--minify".into());
        }
        if self.clean_destination_dir {
            args.push("--cleanDestinationDir".into());
        }
        if self.gc {
            args.push("--gc".into());
        }
        args
    }
}

/// Runs the generator against a provisioned workspace.
///
/// Side effect only: the rendered site lands in the configured
/// destination. Spawn failure or a non-zero exit is fatal; partially
/// written destination content is not rolled back.
pub fn build_site(config: &Config, workspace: &Workspace) -> Result<(), BuildError> {
    let invocation = BuildInvocation::for_workspace(config, workspace);
    run_generator(GENERATOR, &invocation)
}

fn run_generator(program: &str, invocation: &BuildInvocation) -> Result<(), BuildError> {
    let output = Command::new(program)
        .args(invocation.args())
        .output()
        .map_err(|source| BuildError::Spawn {
            command: program.to_string(),
            source,
        })?;

    let src = basename(&invocation.source);
    for line in output_lines(&output) {
        tracing::info!(
            cmd = program,
            src = %src.to_string_lossy(),
            dst = %invocation.destination.display(),
            "{}", line
        );
    }

    if !output.status.success() {
        return Err(BuildError::Failed {
            command: program.to_string(),
            status: output.status,
        });
    }
    Ok(())
}

/// Final path segment, or the path itself when there is none.
fn basename(path: &Path) -> &std::ffi::OsStr {
    path.file_name().unwrap_or(path.as_os_str())
}
