use super::{DependencyMap, FileRecord, GitContext, SnapshotManifest, SnapshotStats, StructureSummary};
use crate::scanner::classify::FileKind;
use crate::{DEPENDENCY_MANIFEST, GENERATOR_VERSION, MANIFEST_TYPE};
use chrono::{DateTime, Utc};

/// Everything a manifest is built from
#[derive(Debug, Clone)]
pub struct SnapshotInput {
    /// Project name
    pub name: String,
    /// Value of the manifest `version` field
    pub version_tag: String,
    /// Structure facts
    pub structure: StructureSummary,
    /// Scanned files, sorted by path
    pub files: Vec<FileRecord>,
    /// Runtime dependencies
    pub dependencies: DependencyMap,
    /// Development dependencies
    pub dev_dependencies: DependencyMap,
    /// Git context, when the capture was git-aware
    pub git: Option<GitContext>,
}

/// Build a manifest stamped with the current time
///
/// The root `package.json` is left out of `files` because its dependency
/// sections are carried in the manifest itself; nested ones are kept. Stats
/// describe exactly the files that end up in the manifest.
#[must_use]
pub fn assemble(input: SnapshotInput) -> SnapshotManifest {
    assemble_at(input, Utc::now())
}

/// [`assemble`] with an explicit timestamp
#[must_use]
pub fn assemble_at(input: SnapshotInput, timestamp: DateTime<Utc>) -> SnapshotManifest {
    let files: Vec<FileRecord> = input
        .files
        .into_iter()
        .filter(|file| file.path != DEPENDENCY_MANIFEST)
        .collect();

    for file in files.iter().filter(|f| f.kind == FileKind::Unknown) {
        tracing::error!(path = %file.path, "file record without a classification");
    }

    let stats = SnapshotStats::from_files(&files);
    tracing::debug!(
        files = stats.total_files,
        bytes = stats.total_size,
        git = input.git.is_some(),
        "assembled manifest"
    );

    SnapshotManifest {
        name: input.name,
        manifest_type: MANIFEST_TYPE.to_string(),
        version: input.version_tag,
        generator_version: GENERATOR_VERSION.to_string(),
        timestamp,
        git: input.git,
        structure: input.structure,
        stats,
        dependencies: input.dependencies,
        dev_dependencies: input.dev_dependencies,
        files,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{BranchStatus, LastCommit};
    use crate::scanner::structure::Framework;
    use proptest::prelude::*;

    fn record(path: &str, kind: FileKind, size: u64) -> FileRecord {
        FileRecord {
            path: path.to_string(),
            kind,
            size,
            content: "x".repeat(usize::try_from(size).unwrap_or(0)),
        }
    }

    fn input(files: Vec<FileRecord>) -> SnapshotInput {
        SnapshotInput {
            name: "app".to_string(),
            version_tag: "2.1.0".to_string(),
            structure: StructureSummary {
                framework: Framework::Vue,
                has_type_check_config: true,
                has_source_dir: true,
            },
            files,
            dependencies: DependencyMap::from([("vue".to_string(), "^3.4.0".to_string())]),
            dev_dependencies: DependencyMap::new(),
            git: None,
        }
    }

    #[test]
    fn test_fixed_fields() {
        let manifest = assemble(input(Vec::new()));
        assert_eq!(manifest.manifest_type, "project:analysis");
        assert_eq!(manifest.generator_version, GENERATOR_VERSION);
        assert_eq!(manifest.version, "2.1.0");
        assert_eq!(manifest.name, "app");
        assert_eq!(manifest.dependencies["vue"], "^3.4.0");
        assert!(manifest.git.is_none());
    }

    #[test]
    fn test_root_dependency_manifest_is_excluded() {
        let manifest = assemble(input(vec![
            record("package.json", FileKind::Json, 40),
            record("packages/ui/package.json", FileKind::Json, 30),
            record("src/main.ts", FileKind::Typescript, 10),
        ]));

        let paths: Vec<_> = manifest.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["packages/ui/package.json", "src/main.ts"]);
        assert_eq!(manifest.stats.total_files, 2);
        assert_eq!(manifest.stats.total_size, 40);
        assert_eq!(manifest.stats.files_by_type[&FileKind::Json], 1);
    }

    #[test]
    fn test_git_context_is_embedded() {
        let mut with_git = input(Vec::new());
        with_git.git = Some(GitContext {
            source_branch: "feature".to_string(),
            target_branch: "master".to_string(),
            branch_status: BranchStatus {
                ahead: 1,
                behind: 0,
                merge_base_short_hash: "abcd1234".to_string(),
            },
            last_commit: LastCommit {
                hash: "abcd1234ffff".to_string(),
                subject: "Feature changes".to_string(),
                author: "Dev".to_string(),
                date: "today".to_string(),
            },
        });

        let manifest = assemble(with_git);
        assert_eq!(manifest.git.unwrap().branch_status.ahead, 1);
    }

    fn arb_kind() -> impl Strategy<Value = FileKind> {
        prop::sample::select(
            crate::scanner::classify::EXTENSION_KINDS
                .iter()
                .map(|(_, kind)| *kind)
                .collect::<Vec<_>>(),
        )
    }

    proptest! {
        #[test]
        fn prop_stats_partition_files(
            entries in prop::collection::vec(("[a-z]{1,8}", arb_kind(), 0u64..4096), 0..40)
        ) {
            let files: Vec<FileRecord> = entries
                .iter()
                .enumerate()
                .map(|(i, (name, kind, size))| FileRecord {
                    path: format!("dir{i}/{name}"),
                    kind: *kind,
                    size: *size,
                    content: String::new(),
                })
                .collect();

            let manifest = assemble(input(files));
            let stats = &manifest.stats;

            prop_assert_eq!(stats.total_files, manifest.files.len());
            prop_assert_eq!(stats.total_size, manifest.files.iter().map(|f| f.size).sum::<u64>());
            prop_assert_eq!(stats.files_by_type.values().sum::<usize>(), manifest.files.len());
            for (kind, count) in &stats.files_by_type {
                let actual = manifest.files.iter().filter(|f| f.kind == *kind).count();
                prop_assert_eq!(*count, actual);
            }
        }
    }
}
