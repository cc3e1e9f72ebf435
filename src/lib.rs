#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![allow(clippy::arithmetic_side_effects)] // Byte and file counters cannot realistically overflow u64

//! # treesnap - Source Tree Snapshots
//!
//! treesnap captures a project directory as a portable JSON manifest and can
//! rebuild a directory tree from such a manifest. With `--git` it captures the
//! tree as it would look after merging the current branch into trunk, using a
//! short-lived speculative merge that is always unwound.
//!
//! ## Architecture
//!
//! - [`scanner`]: ignore rules, directory traversal, classification and
//!   project structure checks
//! - [`manifest`]: the manifest data model and its assembler
//! - [`git`]: the version-control port, read-only context capture and the
//!   speculative merge guard
//! - [`reconstruct`]: replays a manifest onto a target directory
//! - [`commands`]: the `snapshot` and `reconstruct` command implementations
//! - [`config`]: TOML configuration loading and validation
//! - [`output`] / [`logging`]: user-facing messages and tracing setup
//!
//! ## Example Usage
//!
//! ```no_run
//! use treesnap::SnapshotContext;
//! use treesnap::commands::snapshot::{self, SnapshotOptions};
//!
//! # fn main() -> anyhow::Result<()> {
//! let ctx = SnapshotContext::load(".".into(), None)?;
//! let options = SnapshotOptions::from_context(&ctx);
//! let manifest = snapshot::capture(&ctx, &options)?;
//! println!("{} files", manifest.stats.total_files);
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Command implementations (snapshot, reconstruct).
pub mod commands;

/// Configuration parsing, validation, and management.
pub mod config;

/// Typed error taxonomy for workflow and manifest failures.
pub mod errors;

/// Version-control port, context capture and speculative merges.
pub mod git;

/// Tracing subscriber initialisation for the binary.
pub mod logging;

/// Manifest data model and assembly.
pub mod manifest;

/// Styled, verbosity-aware user messages.
pub mod output;

/// Manifest replay onto a target directory.
pub mod reconstruct;

/// Ignore rules, traversal, classification and structure checks.
pub mod scanner;

/// Utility functions and helpers.
pub mod utils;

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Current version of the treesnap binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version of the manifest generator recorded in every manifest.
pub const GENERATOR_VERSION: &str = "1.0.1";

/// Value of the manifest `type` field.
pub const MANIFEST_TYPE: &str = "project:analysis";

/// Dependency manifest file name looked up at the tree root.
pub const DEPENDENCY_MANIFEST: &str = "package.json";

/// Source directory name looked up at the tree root.
pub const SOURCE_DIR: &str = "src";

/// Type-check configuration file looked up at the tree root.
pub const TYPE_CHECK_CONFIG: &str = "tsconfig.json";

/// Per-project configuration file name.
pub const CONFIG_FILE: &str = ".treesnap.toml";

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV: &str = "TREESNAP_CONFIG";

/// Central context for snapshot and reconstruct operations.
///
/// Holds the project directory being captured together with the loaded
/// configuration. The context is read-only once built.
///
/// # Examples
///
/// ```no_run
/// use treesnap::SnapshotContext;
///
/// # fn main() -> anyhow::Result<()> {
/// // Resolve configuration from the environment and the project directory
/// let ctx = SnapshotContext::load("/work/my-app".into(), None)?;
///
/// // Build a context with an explicit configuration (for tests)
/// let ctx = SnapshotContext::new_explicit(
///     "/tmp/project".into(),
///     treesnap::config::Config::default(),
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SnapshotContext {
    /// Absolute path of the project directory.
    pub project_dir: PathBuf,

    /// Configuration file the settings came from, if any.
    pub config_path: Option<PathBuf>,

    /// Loaded configuration settings.
    pub config: config::Config,
}

impl SnapshotContext {
    /// Creates a context for `project_dir`, resolving configuration in order:
    /// `explicit_config`, `$TREESNAP_CONFIG`, `<project_dir>/.treesnap.toml`,
    /// then built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the project directory cannot be resolved, or if a
    /// configuration file was named explicitly but cannot be read or parsed.
    pub fn load(project_dir: PathBuf, explicit_config: Option<PathBuf>) -> Result<Self> {
        let project_dir = std::path::absolute(&project_dir).with_context(|| {
            format!("Failed to resolve project directory: {}", project_dir.display())
        })?;

        let config_path = explicit_config
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
            .or_else(|| {
                let local = project_dir.join(CONFIG_FILE);
                local.exists().then_some(local)
            });

        let config = match &config_path {
            Some(path) => {
                let validator = config::validator::ConfigValidator::new();
                if let Err(e) = validator.validate_config_file(path) {
                    output::warning(&format!("Warning: Configuration validation failed: {e}"));
                }
                config::Config::load(path)?
            }
            None => config::Config::default(),
        };

        tracing::debug!(
            project_dir = %project_dir.display(),
            config = ?config_path,
            "snapshot context loaded"
        );

        Ok(Self {
            project_dir,
            config_path,
            config,
        })
    }

    /// Creates a context with an explicit configuration, bypassing lookup.
    #[must_use]
    pub const fn new_explicit(project_dir: PathBuf, config: config::Config) -> Self {
        Self {
            project_dir,
            config_path: None,
            config,
        }
    }

    /// Name used for the manifest when none is given: the project directory's
    /// final component.
    #[must_use]
    pub fn default_name(&self) -> String {
        self.project_dir
            .file_name()
            .map_or_else(|| "project".to_string(), |n| n.to_string_lossy().into_owned())
    }
}
