//! Configuration resolution.
//!
//! Settings come from three places, highest precedence first: command-line
//! flags, the project's `scrub.toml`, and built-in defaults. Toggles are
//! additive: a flag can switch a behaviour on that the file leaves off, but
//! not the reverse.

use crate::RunOptions;
use clap::ValueEnum;
use scrub_core::Probe;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Name of the optional per-project configuration file.
pub const CONFIG_FILE: &str = "scrub.toml";

/// Default run log file name, relative to the project root.
pub const DEFAULT_LOG_FILE: &str = "scrub.log";

/// JavaScript package manager used for cache cleaning and reinstalling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    /// npm
    Npm,
    /// Yarn
    Yarn,
    /// pnpm
    Pnpm,
    /// Bun
    Bun,
}

impl PackageManager {
    /// Pick by lockfile presence; npm when there is none.
    pub fn detect(root: &Path, probe: &dyn Probe) -> Self {
        [Self::Bun, Self::Pnpm, Self::Yarn]
            .into_iter()
            .find(|pm| pm.lockfiles().iter().any(|f| probe.exists(&root.join(f))))
            .unwrap_or(Self::Npm)
    }

    /// Executable name.
    pub fn program(self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Yarn => "yarn",
            Self::Pnpm => "pnpm",
            Self::Bun => "bun",
        }
    }

    /// Lockfiles this manager writes.
    pub fn lockfiles(self) -> &'static [&'static str] {
        match self {
            Self::Npm => &["package-lock.json"],
            Self::Yarn => &["yarn.lock"],
            Self::Pnpm => &["pnpm-lock.yaml"],
            Self::Bun => &["bun.lockb", "bun.lock"],
        }
    }

    /// Arguments that clear the manager's global cache.
    pub fn cache_clean_args(self) -> &'static [&'static str] {
        match self {
            Self::Npm => &["cache", "clean", "--force"],
            Self::Yarn => &["cache", "clean"],
            Self::Pnpm => &["store", "prune"],
            Self::Bun => &["pm", "cache", "rm"],
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// Errors loading `scrub.toml`.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        /// Path of `scrub.toml`.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or has unknown keys.
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        /// Path of `scrub.toml`.
        path: PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },
}

/// Contents of `scrub.toml`.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Defaults applied when the corresponding flag is not given.
    #[serde(default)]
    pub defaults: Defaults,
}

/// The `[defaults]` table.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Defaults {
    /// Package manager, instead of lockfile detection.
    pub package_manager: Option<PackageManager>,
    /// Same as `--skip-install`.
    pub skip_install: bool,
    /// Same as `--skip-ios`.
    pub skip_ios: bool,
    /// Same as `--skip-android`.
    pub skip_android: bool,
    /// Same as `--clean-cache`.
    pub clean_cache: bool,
    /// Same as `--keep-lockfile`.
    pub keep_lockfile: bool,
    /// Same as `--no-watchman`.
    pub no_watchman: bool,
    /// Same as `--no-repair`.
    pub no_repair: bool,
    /// Same as `--strict`.
    pub strict: bool,
    /// Per-operation timeout in seconds.
    pub timeout: Option<u64>,
    /// Log file, relative to the project root unless absolute.
    pub log_file: Option<PathBuf>,
    /// Elevation prefix for ownership repair (default `["sudo"]`).
    pub elevation: Option<Vec<String>>,
}

impl FileConfig {
    /// Load `scrub.toml` from `root`, or defaults if there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
    }
}

/// Fully resolved configuration for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Canonical project root.
    pub root: PathBuf,
    /// Package manager used for cache cleaning and install.
    pub package_manager: PackageManager,
    /// Record invocations without performing them.
    pub dry_run: bool,
    /// Skip the confirmation prompt.
    pub assume_yes: bool,
    /// Do not reinstall dependencies or pods.
    pub skip_install: bool,
    /// Skip iOS cleanup and `pod install`.
    pub skip_ios: bool,
    /// Skip Android cleanup.
    pub skip_android: bool,
    /// Clear the package manager's global cache.
    pub clean_cache: bool,
    /// Keep the lockfile.
    pub keep_lockfile: bool,
    /// Reset watchman watches.
    pub watchman: bool,
    /// Attempt ownership repair on permission failures.
    pub repair: bool,
    /// Exit non-zero when any operation failed.
    pub strict: bool,
    /// Print JSON instead of terminal output.
    pub json: bool,
    /// Per-operation timeout.
    pub timeout: Option<Duration>,
    /// Absolute path of the run log.
    pub log_file: PathBuf,
    /// Prefix used to elevate the ownership repair.
    pub elevation: Vec<String>,
}

impl Settings {
    /// Merge flags over file defaults for the project at `root`.
    pub fn resolve(
        root: PathBuf,
        opts: &RunOptions,
        dry_run: bool,
        assume_yes: bool,
        file: FileConfig,
        probe: &dyn Probe,
    ) -> Self {
        let d = file.defaults;
        let package_manager = opts
            .package_manager
            .or(d.package_manager)
            .unwrap_or_else(|| PackageManager::detect(&root, probe));
        let log_file = opts
            .log_file
            .clone()
            .or(d.log_file)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));
        let log_file = if log_file.is_absolute() {
            log_file
        } else {
            root.join(log_file)
        };

        Self {
            root,
            package_manager,
            dry_run,
            assume_yes,
            skip_install: opts.skip_install || d.skip_install,
            skip_ios: opts.skip_ios || d.skip_ios,
            skip_android: opts.skip_android || d.skip_android,
            clean_cache: opts.clean_cache || d.clean_cache,
            keep_lockfile: opts.keep_lockfile || d.keep_lockfile,
            watchman: !(opts.no_watchman || d.no_watchman),
            repair: !(opts.no_repair || d.no_repair),
            strict: opts.strict || d.strict,
            json: opts.json,
            timeout: opts.timeout.or(d.timeout).map(Duration::from_secs),
            log_file,
            elevation: d.elevation.unwrap_or_else(|| vec!["sudo".to_string()]),
        }
    }
}
