//! Snapshot manifest data model.
//!
//! The manifest is the JSON document written by `snapshot` and read back by
//! `reconstruct`. Field names are camelCase and appear in declaration order.
//! Readers also accept the key names used by earlier generator releases.

/// Builds a manifest from scan results
pub mod assembler;

use crate::scanner::classify::FileKind;
use crate::scanner::structure::Framework;
use crate::utils::paths::ensure_parent_dirs;
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

pub use assembler::{SnapshotInput, assemble};

/// Dependency name to version requirement
pub type DependencyMap = BTreeMap<String, String>;

/// One captured file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Relative, `/`-separated path
    pub path: String,
    /// Classification tag
    #[serde(rename = "type")]
    pub kind: FileKind,
    /// Size in bytes as reported by file metadata
    pub size: u64,
    /// Text content; invalid UTF-8 sequences are replaced
    pub content: String,
}

/// Commit at the tip of the source branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastCommit {
    /// Full commit hash
    pub hash: String,
    /// First line of the commit message
    pub subject: String,
    /// Author name
    pub author: String,
    /// Author date as printed by git
    pub date: String,
}

/// Position of the source branch relative to the target branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchStatus {
    /// Commits on the source branch that the target branch lacks
    pub ahead: u32,
    /// Commits on the target branch that the source branch lacks
    pub behind: u32,
    /// First 8 characters of the merge base commit
    #[serde(alias = "mergeBase")]
    pub merge_base_short_hash: String,
}

/// Version-control facts captured before the speculative merge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitContext {
    /// Branch that was checked out when the capture started
    pub source_branch: String,
    /// Trunk branch it was merged into
    pub target_branch: String,
    /// Ahead/behind counts and merge base
    pub branch_status: BranchStatus,
    /// Tip commit of the source branch
    pub last_commit: LastCommit,
}

/// Structure facts kept in the manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureSummary {
    /// Detected framework
    pub framework: Framework,
    /// `tsconfig.json` exists at the root
    #[serde(alias = "hasTypescript")]
    pub has_type_check_config: bool,
    /// `src/` exists at the root
    #[serde(alias = "hasSrcDir")]
    pub has_source_dir: bool,
}

/// Aggregates over the recorded files
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotStats {
    /// Number of file records
    pub total_files: usize,
    /// Record count per classification tag
    pub files_by_type: BTreeMap<FileKind, usize>,
    /// Sum of record sizes in bytes
    pub total_size: u64,
}

impl SnapshotStats {
    /// Compute the aggregates in one pass
    #[must_use]
    pub fn from_files(files: &[FileRecord]) -> Self {
        let mut stats = Self::default();
        for file in files {
            stats.total_files += 1;
            stats.total_size += file.size;
            *stats.files_by_type.entry(file.kind).or_insert(0) += 1;
        }
        stats
    }
}

/// The snapshot document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotManifest {
    /// Project name
    pub name: String,
    /// Always `project:analysis`
    #[serde(rename = "type")]
    pub manifest_type: String,
    /// User-supplied version tag
    pub version: String,
    /// Version of the generator that wrote the manifest
    pub generator_version: String,
    /// Assembly time
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    /// Absent unless the capture was git-aware and reading the git context succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<GitContext>,
    /// Structure facts
    pub structure: StructureSummary,
    /// Aggregates over `files`
    pub stats: SnapshotStats,
    /// Runtime dependencies from `package.json`
    #[serde(default)]
    pub dependencies: DependencyMap,
    /// Development dependencies from `package.json`
    #[serde(default)]
    pub dev_dependencies: DependencyMap,
    /// Captured files, sorted by path
    pub files: Vec<FileRecord>,
}

impl SnapshotManifest {
    /// Pretty-printed JSON with two-space indentation
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize manifest")
    }

    /// Parse a manifest produced by any generator release
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not a complete manifest
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse manifest")
    }

    /// Write the manifest to `path`, creating parent directories
    ///
    /// The document goes to a temporary file next to `path` first and is
    /// renamed into place, so a failed write never leaves a partial manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any filesystem operation fails
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = self.to_json_pretty()?;
        ensure_parent_dirs(path)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
        temp.write_all(json.as_bytes())
            .with_context(|| format!("Failed to write manifest: {}", path.display()))?;
        temp.persist(path)
            .with_context(|| format!("Failed to write manifest: {}", path.display()))?;

        tracing::debug!(path = %path.display(), bytes = json.len(), "manifest written");
        Ok(())
    }
}

/// ISO-8601 UTC timestamps with millisecond precision
mod iso_millis {
    use super::{DateTime, Deserialize, Deserializer, SecondsFormat, Serializer, Utc};

    /// Serialize as `2024-01-01T12:00:00.000Z`
    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    /// Accept any RFC 3339 timestamp
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
