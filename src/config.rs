//! Hook configuration.
//!
//! Settings come from a `boss.toml` file, searched in `$HOME/.config` and
//! then the repository's `hooks/` directory, with per-key overrides from
//! `BOSS_*` environment variables. Path-valued options may contain `~` or
//! `$VAR` placeholders, expanded after overrides are applied.

use std::env;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

/// Prefix for environment overrides (`BOSS_BRANCH`, `BOSS_DESTINATION`, ...).
const ENV_PREFIX: &str = "BOSS_";

/// Errors loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No config file exists in any search location.
    #[error("no boss.toml found (searched {searched:?})")]
    NotFound { searched: Vec<PathBuf> },

    /// The config file exists but could not be read.
    #[error("could not read config file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config file is not valid TOML.
    #[error("could not parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Deploy settings for one hook invocation, read-only once loaded.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Branch whose pushed updates trigger a deploy.
    pub branch: String,

    /// Root directory for the generator's own module/asset cache.
    pub build_cache: String,

    /// Directory the rendered site is written to. Required in practice;
    /// an empty value is passed through and rejected by the generator.
    pub destination: String,

    /// Pass `--minify` to the generator.
    pub minify: bool,

    /// Pass `--cleanDestinationDir` to the generator.
    pub clean_destination_dir: bool,

    /// Pass `--gc` to the generator.
    pub gc: bool,

    /// Cache root holding one worktree per deployed revision.
    pub worktree_cache: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            branch: "master".to_string(),
            build_cache: "$HOME/.cache/hugo".to_string(),
            destination: String::new(),
            minify: true,
            clean_destination_dir: true,
            gc: true,
            worktree_cache: "$HOME/.cache/boss".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from the first `boss.toml` found in the search
    /// path, applies environment overrides, and expands path placeholders.
    ///
    /// A missing, unreadable, or unparseable file is fatal: the hook must
    /// not guess where to deploy.
    pub fn load() -> Result<Config, ConfigError> {
        let searched = search_paths();
        let Some(path) = searched.iter().find(|p| p.exists()).cloned() else {
            return Err(ConfigError::NotFound { searched });
        };

        let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Unreadable {
            path: path.clone(),
            source,
        })?;
        let mut config: Config = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;

        config.apply_overrides(|var| env::var(var).ok());
        config.expand_paths();

        tracing::info!(config = %path.display(), "using config");
        tracing::info!(
            destination = %config.destination,
            build_cache = %config.build_cache,
            "deploy targets"
        );
        Ok(config)
    }

    /// The full ref a push must update to trigger a deploy.
    ///
    /// The branch is configured as a bare name (`master`); a leading slash
    /// is tolerated and stripped.
    pub fn deploy_ref(&self) -> String {
        format!("refs/heads/{}", self.branch.trim_start_matches('/'))
    }

    /// Applies `BOSS_*` overrides from `lookup`.
    ///
    /// The lookup is a closure rather than `std::env::var` directly so
    /// tests can inject values without touching process state. Boolean
    /// overrides that fail to parse are ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| lookup(&format!("{ENV_PREFIX}{key}"));

        if let Some(branch) = var("BRANCH") {
            self.branch = branch;
        }
        if let Some(build_cache) = var("BUILD_CACHE") {
            self.build_cache = build_cache;
        }
        if let Some(destination) = var("DESTINATION") {
            self.destination = destination;
        }
        if let Some(worktree_cache) = var("WORKTREE_CACHE") {
            self.worktree_cache = worktree_cache;
        }
        if let Some(minify) = var("MINIFY").and_then(|v| v.parse().ok()) {
            self.minify = minify;
        }
        if let Some(clean) = var("CLEAN_DESTINATION_DIR").and_then(|v| v.parse().ok()) {
            self.clean_destination_dir = clean;
        }
        if let Some(gc) = var("GC").and_then(|v| v.parse().ok()) {
            self.gc = gc;
        }
    }

    /// Expands `~` and `$VAR` placeholders in the path-valued options.
    ///
    /// Unresolvable placeholders leave the raw value in place; the
    /// downstream tool then fails with the literal path in its diagnostic.
    fn expand_paths(&mut self) {
        for field in [
            &mut self.build_cache,
            &mut self.destination,
            &mut self.worktree_cache,
        ] {
            if let Ok(expanded) = shellexpand::full(field) {
                *field = expanded.into_owned();
            }
        }
    }
}

/// Config file search locations, most specific first.
fn search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(home) = env::var_os("HOME") {
        paths.push(PathBuf::from(home).join(".config").join("boss.toml"));
    }
    // Relative to the repository the hook runs in.
    paths.push(PathBuf::from("hooks").join("boss.toml"));
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.branch, "master");
        assert_eq!(config.build_cache, "$HOME/.cache/hugo");
        assert_eq!(config.destination, "");
        assert!(config.minify);
        assert!(config.clean_destination_dir);
        assert!(config.gc);
        assert_eq!(config.worktree_cache, "$HOME/.cache/boss");
    }

    #[test]
    fn parses_kebab_case_keys() {
        let config: Config = toml::from_str(
            r#"
            branch = "main"
            destination = "/var/www/site"
            build-cache = "/tmp/hugo-cache"
            clean-destination-dir = false
            "#,
        )
        .unwrap();

        assert_eq!(config.branch, "main");
        assert_eq!(config.destination, "/var/www/site");
        assert_eq!(config.build_cache, "/tmp/hugo-cache");
        assert!(!config.clean_destination_dir);
        // Unset keys keep their defaults.
        assert!(config.minify);
        assert!(config.gc);
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = Config::default();
        config.apply_overrides(|var| match var {
            "BOSS_BRANCH" => Some("release".to_string()),
            "BOSS_DESTINATION" => Some("/srv/www".to_string()),
            "BOSS_MINIFY" => Some("false".to_string()),
            _ => None,
        });

        assert_eq!(config.branch, "release");
        assert_eq!(config.destination, "/srv/www");
        assert!(!config.minify);
        assert!(config.gc);
    }

    #[test]
    fn unparseable_bool_override_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|var| match var {
            "BOSS_GC" => Some("yes please".to_string()),
            _ => None,
        });
        assert!(config.gc);
    }

    #[test]
    fn deploy_ref_inserts_separator() {
        let config = Config {
            branch: "master".to_string(),
            ..Config::default()
        };
        assert_eq!(config.deploy_ref(), "refs/heads/master");
    }

    #[test]
    fn deploy_ref_strips_leading_slash() {
        let config = Config {
            branch: "/master".to_string(),
            ..Config::default()
        };
        assert_eq!(config.deploy_ref(), "refs/heads/master");
    }

    #[test]
    fn expand_paths_resolves_home() {
        let Some(home) = env::var_os("HOME") else {
            return;
        };
        let mut config = Config::default();
        config.expand_paths();
        assert_eq!(
            config.worktree_cache,
            format!("{}/.cache/boss", home.to_string_lossy())
        );
    }
}
