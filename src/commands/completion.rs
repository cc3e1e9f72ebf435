use crate::cli::Cli;
use clap::CommandFactory;
use clap_complete::{Generator, Shell, generate};
use std::io::{self, Write};

/// Print the completion script for `shell` to stdout
pub fn execute(shell: Shell) {
    write_completions(shell, &mut io::stdout());
}

/// Write the completion script for `generator` into `out`
pub fn write_completions<G: Generator>(generator: G, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(generator, &mut cmd, name, out);
}
