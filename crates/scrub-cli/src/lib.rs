//! scrub - clean and reinstall mobile app build environments
//!
//! Removes stale build artifacts and dependency caches from a React Native
//! style project, then reinstalls dependencies. Every step is best-effort:
//! failures are reported and counted, permission failures get one ownership
//! repair and retry, and the run always continues.
//!
//! # Flow
//!
//! ```text
//! resolve settings ─▶ check package.json ─▶ plan ─▶ confirm ─▶ run ─▶ summary
//! ```
//!
//! The engine lives in `scrub-core`; this crate supplies the concrete
//! recipe, configuration, terminal output and the confirmation prompt.

pub mod cmd;
pub mod config;
pub mod confirm;
pub mod recipe;
pub mod ui;

pub use config::{PackageManager, Settings};

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line interface.
#[derive(Debug, Parser)]
#[command(name = "scrub")]
#[command(
    author,
    version,
    about = "scrub - clean and reinstall mobile app build environments"
)]
pub struct Cli {
    /// Show what would happen without making changes
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Skip confirmation prompt
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Project and run flags.
    #[command(flatten)]
    pub options: RunOptions,

    /// Subcommand; `run` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Flags shared by `run` and `plan`.
#[derive(Debug, Clone, Default, Args)]
pub struct RunOptions {
    /// Project root (must contain package.json)
    #[arg(long, global = true, default_value = ".")]
    pub project: PathBuf,

    /// Package manager (detected from the lockfile if omitted)
    #[arg(long, global = true, value_enum, env = "SCRUB_PACKAGE_MANAGER")]
    pub package_manager: Option<PackageManager>,

    /// Run log path (default: <project>/scrub.log)
    #[arg(long, global = true, env = "SCRUB_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Kill any single operation after this many seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Exit non-zero if any operation failed
    #[arg(long, global = true)]
    pub strict: bool,

    /// Print the plan or report as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Do not reinstall dependencies or pods
    #[arg(long, global = true)]
    pub skip_install: bool,

    /// Skip iOS cleanup and pod install
    #[arg(long, global = true)]
    pub skip_ios: bool,

    /// Skip Android cleanup
    #[arg(long, global = true)]
    pub skip_android: bool,

    /// Also clear the package manager's global cache
    #[arg(long, global = true)]
    pub clean_cache: bool,

    /// Keep the package manager lockfile
    #[arg(long, global = true)]
    pub keep_lockfile: bool,

    /// Do not reset watchman watches
    #[arg(long, global = true)]
    pub no_watchman: bool,

    /// Do not attempt ownership repair on permission errors
    #[arg(long, global = true)]
    pub no_repair: bool,
}

/// Subcommands. `run` is implied when none is given.
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Clean and reinstall (default)
    Run,
    /// Show the operations a run would perform, without running them
    Plan,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}
