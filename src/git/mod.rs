//! Git integration for snapshots.
//!
//! [`GitContextProvider`] owns a [`Vcs`] handle and the trunk branch name. It
//! offers a read-only query ([`GitContextProvider::capture_context`]) and the
//! speculative merge ([`GitContextProvider::begin_speculative_merge`]), which is
//! the only code in the crate that checks out branches or touches the stash.

/// Read-only branch context capture.
pub mod context;
/// Classification of git command failures.
pub mod errors;
/// Per-repository workflow lock.
pub mod lock;
/// Speculative merge guard.
pub mod merge;
/// Version-control port and the `git` CLI adapter.
pub mod vcs;

pub use errors::GitError;
pub use lock::WorkflowLock;
pub use merge::{Checkpoint, MergeState, SpeculativeMerge, UnwindReport};
pub use vcs::{GitCli, Vcs};

use anyhow::Result;
use std::path::Path;

/// Git operations for one repository and one trunk branch
#[derive(Debug)]
pub struct GitContextProvider<V: Vcs = GitCli> {
    /// Repository handle
    vcs: V,
    /// Branch the current branch is merged into
    target_branch: String,
}

impl GitContextProvider<GitCli> {
    /// Provider for the repository containing `work_dir`, using the `git` binary
    ///
    /// # Errors
    ///
    /// Returns an error if the `git` binary cannot be found.
    pub fn open(work_dir: &Path, target_branch: impl Into<String>) -> Result<Self> {
        let vcs = GitCli::new(work_dir)?;
        Ok(Self::new(vcs, target_branch))
    }
}

impl<V: Vcs> GitContextProvider<V> {
    /// Provider over an existing repository handle
    pub fn new(vcs: V, target_branch: impl Into<String>) -> Self {
        Self {
            vcs,
            target_branch: target_branch.into(),
        }
    }

    /// The repository handle
    pub const fn vcs(&self) -> &V {
        &self.vcs
    }

    /// The trunk branch name
    pub fn target_branch(&self) -> &str {
        &self.target_branch
    }
}
