//! Completions command: print a completion script for `scrub`.

use clap::CommandFactory;
use clap_complete::generate;

/// Print the `scrub` completion script for `shell`, ready to be sourced or
/// saved into the shell's completion directory.
pub fn completions(shell: clap_complete::Shell) {
    let mut cmd = crate::Cli::command();
    generate(shell, &mut cmd, "scrub", &mut std::io::stdout());
}
