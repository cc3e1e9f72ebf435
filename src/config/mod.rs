/// TOML parsing and value validation.
pub mod parser;
/// Unknown key detection.
pub mod validator;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings read from `.treesnap.toml`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Traversal and filtering
    #[serde(default)]
    pub scan: ScanConfig,

    /// Git-aware capture
    #[serde(default)]
    pub git: GitConfig,

    /// Manifest defaults
    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

/// `[scan]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanConfig {
    /// Pattern file read from the tree root
    #[serde(default = "default_ignore_file")]
    pub ignore_file: String,
    /// Directory names pruned in addition to the built-in list
    #[serde(default)]
    pub exclude_dirs: Vec<String>,
    /// File names skipped in addition to the built-in list
    #[serde(default)]
    pub exclude_files: Vec<String>,
    /// Descend into symlinked directories and read symlinked files
    #[serde(default)]
    pub follow_symlinks: bool,
}

/// `[git]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GitConfig {
    /// Branch the current branch is speculatively merged into
    #[serde(default = "default_trunk_branch")]
    pub trunk_branch: String,
}

/// `[snapshot]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapshotConfig {
    /// Version tag written to the manifest `version` field
    #[serde(default = "default_version_tag")]
    pub version_tag: String,
    /// Manifest path, relative to the working directory
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ignore_file: default_ignore_file(),
            exclude_dirs: Vec::new(),
            exclude_files: Vec::new(),
            follow_symlinks: false,
        }
    }
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            trunk_branch: default_trunk_branch(),
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            version_tag: default_version_tag(),
            output: default_output(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    ///
    /// A missing file yields the defaults. The file is never created, since it
    /// usually lives inside the tree being captured.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The file contains invalid TOML
    /// - A value fails validation (see [`parser::validate_config`])
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file missing, using defaults");
            return Ok(Self::default());
        }

        parser::parse_config_file(path)
    }
}

// Default functions for serde
fn default_ignore_file() -> String {
    ".gitignore".to_string()
}

fn default_trunk_branch() -> String {
    "master".to_string()
}

fn default_version_tag() -> String {
    "1.0.0".to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from("./code.json")
}
