//! Command-line interface definitions for treesnap.
//!
//! The CLI definitions are shared between the main binary and build tools (like
//! xtask) for man page generation.
//!
//! Note: Field-level documentation is provided via clap attributes, so we allow
//! missing_docs for this module to avoid redundant documentation.

#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Main CLI structure for treesnap.
///
/// Running `treesnap` without a subcommand takes a snapshot, so the snapshot
/// flags are accepted at the top level as well.
#[derive(Parser, Debug)]
#[command(
    name = "treesnap",
    version = crate::VERSION,
    about = "Capture a source tree as a JSON manifest and rebuild it later",
    long_about = "Captures a project directory as a portable JSON manifest and reconstructs \
                  projects from such manifests. With --git the snapshot shows the tree as it \
                  would look after merging the current branch into trunk; the repository is \
                  always restored afterwards.",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    /// Subcommand to execute (defaults to `snapshot`)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Snapshot options when no subcommand is given
    #[command(flatten)]
    pub snapshot: SnapshotArgs,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file (default: $TREESNAP_CONFIG, then <dir>/.treesnap.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// All available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Capture a directory as a JSON manifest
    Snapshot(SnapshotArgs),

    /// Rebuild a project directory from a manifest
    #[command(visible_alias = "init")]
    Reconstruct {
        /// Manifest to read
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Directory to write the project into
        #[arg(short, long, default_value = ".", value_name = "DIR")]
        dir: PathBuf,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Options of the snapshot command.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotArgs {
    /// Project directory to capture
    #[arg(short, long, default_value = ".", value_name = "DIR")]
    pub dir: PathBuf,

    /// Manifest path [default: ./code.json, or snapshot.output from config]
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Project name [default: directory name]
    #[arg(short, long)]
    pub name: Option<String>,

    /// Version tag recorded in the manifest [default: 1.0.0]
    #[arg(long, value_name = "TAG")]
    pub version_tag: Option<String>,

    /// Capture the tree as merged into the trunk branch
    #[arg(short, long)]
    pub git: bool,

    /// Trunk branch for --git [default: git.trunk_branch from config, or master]
    #[arg(short, long, value_name = "BRANCH", requires = "git")]
    pub target: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_snapshot() {
        let cli = Cli::try_parse_from(["treesnap", "-d", "app", "-o", "out.json", "--git"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.snapshot.dir, PathBuf::from("app"));
        assert_eq!(cli.snapshot.output, Some(PathBuf::from("out.json")));
        assert!(cli.snapshot.git);
    }

    #[test]
    fn test_snapshot_subcommand() {
        let cli = Cli::try_parse_from([
            "treesnap",
            "snapshot",
            "--version-tag",
            "2.0.0",
            "--git",
            "--target",
            "main",
        ])
        .unwrap();
        let Some(Commands::Snapshot(args)) = cli.command else {
            panic!("expected snapshot");
        };
        assert_eq!(args.version_tag.as_deref(), Some("2.0.0"));
        assert_eq!(args.target.as_deref(), Some("main"));
    }

    #[test]
    fn test_init_alias() {
        let cli = Cli::try_parse_from(["treesnap", "init", "-i", "code.json", "-d", "out"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Reconstruct { ref input, ref dir })
                if input == &PathBuf::from("code.json") && dir == &PathBuf::from("out")
        ));
    }

    #[test]
    fn test_reconstruct_requires_input() {
        assert!(Cli::try_parse_from(["treesnap", "reconstruct"]).is_err());
    }

    #[test]
    fn test_target_requires_git() {
        assert!(Cli::try_parse_from(["treesnap", "--target", "main"]).is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["treesnap", "-q", "-v"]).is_err());
    }
}
