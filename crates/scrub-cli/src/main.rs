//! scrub - clean and reinstall mobile app build environments

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::style::Stylize;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use scrub_cli::config::{FileConfig, Settings};
use scrub_cli::confirm::{AssumeYes, Confirm, StdinConfirm};
use scrub_cli::{Cli, Commands, cmd};
use scrub_core::{ExitDisposition, SystemProbe, ensure_project_root};

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Some(Commands::Completions { shell }) = &cli.command {
        cmd::completions::completions(*shell);
        return ExitCode::SUCCESS;
    }

    let code = match dispatch(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".bold().red());
            ExitDisposition::Fatal.code(false)
        }
    };
    ExitCode::from(code)
}

/// Resolve settings, run the command and map its disposition to an exit
/// code. Strictness comes from the resolved settings, so `scrub.toml` can
/// enable it.
fn dispatch(cli: Cli) -> Result<u8> {
    let root = ensure_project_root(&cli.options.project)?;
    let file = FileConfig::load(&root).context("Failed to load project configuration")?;
    let probe = SystemProbe;
    let settings = Settings::resolve(root, &cli.options, cli.dry_run, cli.yes, file, &probe);
    tracing::debug!(?settings, "resolved settings");

    let disposition = match cli.command.unwrap_or(Commands::Run) {
        Commands::Plan => cmd::plan::plan_only(&settings, &probe)?,
        Commands::Run => {
            let stdin = StdinConfirm::new().on_stderr(settings.json);
            let confirm: &dyn Confirm = if settings.assume_yes || settings.dry_run {
                &AssumeYes
            } else {
                &stdin
            };
            cmd::run::run(&settings, &probe, confirm)?
        }
        Commands::Completions { shell } => {
            cmd::completions::completions(shell);
            ExitDisposition::Success
        }
    };
    Ok(disposition.code(settings.strict))
}
