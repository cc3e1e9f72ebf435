use crate::SnapshotContext;
use crate::cli::SnapshotArgs;
use crate::git::{GitContextProvider, Vcs};
use crate::manifest::{self, FileRecord, GitContext, SnapshotInput, SnapshotManifest};
use crate::output;
use crate::scanner::{self, IgnoreMatcher, ProjectStructure, ScanSummary};
use crate::utils::formatters::{format_branch_status, format_kind_counts, format_size};
use crate::utils::paths::make_absolute;
use anyhow::Result;
use std::path::PathBuf;

/// Resolved options for one snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotOptions {
    /// Manifest `name`
    pub name: String,
    /// Manifest `version`
    pub version_tag: String,
    /// Where [`execute`] writes the manifest
    pub output: PathBuf,
    /// Capture through a speculative merge into `target_branch`
    pub git_aware: bool,
    /// Trunk branch for git-aware captures
    pub target_branch: String,
}

impl SnapshotOptions {
    /// Defaults from configuration and the project directory name
    #[must_use]
    pub fn from_context(ctx: &SnapshotContext) -> Self {
        Self {
            name: ctx.default_name(),
            version_tag: ctx.config.snapshot.version_tag.clone(),
            output: ctx.config.snapshot.output.clone(),
            git_aware: false,
            target_branch: ctx.config.git.trunk_branch.clone(),
        }
    }

    /// Defaults overridden by command-line flags
    #[must_use]
    pub fn from_args(ctx: &SnapshotContext, args: &SnapshotArgs) -> Self {
        let defaults = Self::from_context(ctx);
        Self {
            name: args.name.clone().unwrap_or(defaults.name),
            version_tag: args.version_tag.clone().unwrap_or(defaults.version_tag),
            output: args.output.clone().unwrap_or(defaults.output),
            git_aware: args.git,
            target_branch: args.target.clone().unwrap_or(defaults.target_branch),
        }
    }
}

/// What the scanner saw in the tree
struct Observation {
    /// Root-level structure
    structure: ProjectStructure,
    /// Loaded files
    files: Vec<FileRecord>,
}

/// Capture the project as a manifest without writing it
///
/// With `git_aware` set, the git context is read first, then the tree is
/// scanned while the current branch is speculatively merged into the trunk
/// branch. The repository is restored before this function returns.
///
/// # Errors
///
/// Returns an error if scanning fails, or for a git-aware capture if the
/// merge cannot be set up (conflicts, detached HEAD, another snapshot in
/// progress) or the repository cannot be restored.
pub fn capture(ctx: &SnapshotContext, options: &SnapshotOptions) -> Result<SnapshotManifest> {
    if options.git_aware {
        let provider = GitContextProvider::open(&ctx.project_dir, &options.target_branch)?;
        return capture_with_git(ctx, options, &provider);
    }

    let observation = observe(ctx)?;
    Ok(build(options, observation, None))
}

/// [`capture`] through an explicit git provider
///
/// # Errors
///
/// See [`capture`].
pub fn capture_with_git<V: Vcs>(
    ctx: &SnapshotContext,
    options: &SnapshotOptions,
    provider: &GitContextProvider<V>,
) -> Result<SnapshotManifest> {
    // Read before the merge moves HEAD
    let git = provider.capture_context();

    output::info(&format!(
        "Merging into '{}' for the snapshot...",
        provider.target_branch()
    ));
    let observation = provider.run_speculative(|| observe(ctx))?;

    Ok(build(options, observation, git))
}

/// Capture the project and write the manifest to `options.output`
///
/// Nothing is written unless the whole capture, including the repository
/// restore, succeeded.
///
/// # Errors
///
/// Returns capture errors or a failure to write the manifest.
pub fn execute(ctx: &SnapshotContext, options: &SnapshotOptions) -> Result<SnapshotManifest> {
    let manifest = capture(ctx, options)?;

    let output_path = make_absolute(&options.output)?;
    manifest.write_to(&output_path)?;

    output::success(&format!(
        "Generated code analysis at: {}",
        output_path.display()
    ));
    print_summary(&manifest);
    Ok(manifest)
}

/// Scan the project tree as it currently is on disk
fn observe(ctx: &SnapshotContext) -> Result<Observation> {
    let root = &ctx.project_dir;
    let matcher = IgnoreMatcher::compile(root, &ctx.config.scan)?;
    let structure = scanner::analyze(root)?;
    let files = scanner::scan(root, &matcher, &ctx.config.scan)?;

    output::verbose(&format!(
        "Scanned {}: {}",
        root.display(),
        ScanSummary::from_records(&files)
    ));
    Ok(Observation { structure, files })
}

/// Assemble the manifest from an observation
fn build(
    options: &SnapshotOptions,
    observation: Observation,
    git: Option<GitContext>,
) -> SnapshotManifest {
    let Observation { structure, files } = observation;
    manifest::assemble(SnapshotInput {
        name: options.name.clone(),
        version_tag: options.version_tag.clone(),
        structure: structure.summary(),
        dependencies: structure.dependencies(),
        dev_dependencies: structure.dev_dependencies(),
        files,
        git,
    })
}

/// Print what the manifest contains
fn print_summary(manifest: &SnapshotManifest) {
    let stats = &manifest.stats;
    output::detail("Files", &stats.total_files.to_string());
    output::detail("Size", &format_size(stats.total_size));
    output::detail("Framework", manifest.structure.framework.as_str());
    if !stats.files_by_type.is_empty() {
        output::verbose(&format_kind_counts(&stats.files_by_type));
    }
    if let Some(git) = &manifest.git {
        output::detail(
            "Merged",
            &format!("{} into {}", git.source_branch, git.target_branch),
        );
        output::detail(
            "Status",
            &format_branch_status(git.branch_status.ahead, git.branch_status.behind),
        );
    }
}
