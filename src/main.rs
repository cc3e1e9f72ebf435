use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::process;
use treesnap::cli::{Cli, Commands, SnapshotArgs};
use treesnap::commands::reconstruct::ReconstructOptions;
use treesnap::commands::snapshot::SnapshotOptions;
use treesnap::errors::WorkflowError;
use treesnap::git::GitError;
use treesnap::output::{self, Verbosity};
use treesnap::{SnapshotContext, commands, logging};

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {}", "Error:".red().bold(), describe(&e));
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose);
    output::set_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose));

    match cli.command {
        None => snapshot(&cli.snapshot, cli.config)?,
        Some(Commands::Snapshot(args)) => snapshot(&args, cli.config)?,
        Some(Commands::Reconstruct { input, dir }) => {
            commands::reconstruct::execute(&ReconstructOptions { input, dir })?;
        }
        Some(Commands::Completion { shell }) => commands::completion::execute(shell),
    }

    Ok(())
}

fn snapshot(args: &SnapshotArgs, config: Option<PathBuf>) -> Result<()> {
    let ctx = SnapshotContext::load(args.dir.clone(), config)?;
    let options = SnapshotOptions::from_args(&ctx, args);
    commands::snapshot::execute(&ctx, &options)?;
    Ok(())
}

/// Git failures carry suggestions; everything else prints its context chain
fn describe(e: &anyhow::Error) -> String {
    let workflow_git = || match e.downcast_ref::<WorkflowError>() {
        Some(WorkflowError::Git(inner)) => Some(inner),
        _ => None,
    };
    e.downcast_ref::<GitError>()
        .or_else(workflow_git)
        .map_or_else(|| format!("{e:#}"), GitError::user_message)
}
