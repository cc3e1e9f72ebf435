//! Speculative merge of the current branch into trunk.
//!
//! [`SpeculativeMerge`] is an RAII guard. Creating it stashes local changes,
//! checks out the trunk branch and merges the original branch without
//! committing. Dropping it (or calling [`SpeculativeMerge::finish`]) runs the
//! single unwind routine:
//!
//! 1. `git reset --merge`, when a merge may be in progress
//! 2. check out the original branch
//! 3. pop the stash, if one was created
//!
//! Step 3 only runs after step 2 succeeded. If the original branch cannot be
//! restored the stash entry is left alone and the user is told how to recover.
//!
//! The guard holds the repository's [`WorkflowLock`] for its whole lifetime,
//! so overlapping snapshots against one repository fail with `Busy`.

use super::GitContextProvider;
use super::lock::WorkflowLock;
use super::vcs::{DETACHED_HEAD, STASH_MESSAGE, Vcs};
use crate::errors::WorkflowError;
use crate::output;
use anyhow::Result;

/// Progress of a speculative merge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeState {
    /// Original branch recorded, nothing changed yet
    BranchCaptured,
    /// Local changes stashed
    Stashed,
    /// Trunk checked out
    OnTrunk,
    /// Original branch merged into trunk without a commit
    MergeSucceeded,
    /// Merge failed, was aborted, and the original branch is checked out again
    MergeAbortedRestored,
    /// Unwind routine has run
    Unwound,
}

impl MergeState {
    /// Whether HEAD may be on trunk with merge state to discard
    const fn left_original_branch(self) -> bool {
        matches!(self, Self::OnTrunk | Self::MergeSucceeded)
    }
}

/// Repository state recorded before anything is changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    /// Branch checked out when the merge began
    pub original_branch: String,
    /// Whether a stash entry was created
    pub had_stash: bool,
}

/// Outcome of a successful unwind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnwindReport {
    /// `Some(true)` if stashed changes were restored, `Some(false)` if popping
    /// failed, `None` if nothing was stashed
    pub stash_restored: Option<bool>,
    /// Problems that did not prevent restoring the original branch
    pub warnings: Vec<String>,
}

/// RAII guard over a speculative merge; see the module docs
pub struct SpeculativeMerge<'a, V: Vcs> {
    /// Repository and trunk branch
    provider: &'a GitContextProvider<V>,
    /// `None` once the unwind routine has run
    checkpoint: Option<Checkpoint>,
    /// Current step
    state: MergeState,
    /// Released after the unwind in `Drop`
    _lock: WorkflowLock,
}

impl<V: Vcs> GitContextProvider<V> {
    /// Merge the current branch into trunk, leaving the result uncommitted
    ///
    /// On success the working tree holds the merged files until the returned
    /// guard is finished or dropped.
    ///
    /// # Errors
    ///
    /// - [`WorkflowError::Busy`] if another merge holds the repository lock
    /// - [`WorkflowError::DetachedHead`] if HEAD is not on a branch (nothing is
    ///   changed in that case)
    /// - [`WorkflowError::MergeConflict`] if the merge fails with conflicts; the
    ///   merge is aborted and the original branch and stash are restored first
    /// - [`WorkflowError::Git`] for any other git failure, after restoring
    pub fn begin_speculative_merge(&self) -> Result<SpeculativeMerge<'_, V>> {
        let vcs = self.vcs();
        let lock = WorkflowLock::acquire(&vcs.git_dir()?)?;

        let original_branch = vcs.current_branch().map_err(WorkflowError::from)?;
        if original_branch == DETACHED_HEAD {
            return Err(WorkflowError::DetachedHead.into());
        }
        let dirty = vcs.is_dirty().map_err(WorkflowError::from)?;

        let mut merge = SpeculativeMerge {
            provider: self,
            checkpoint: Some(Checkpoint {
                original_branch,
                had_stash: false,
            }),
            state: MergeState::BranchCaptured,
            _lock: lock,
        };

        // Any error below drops `merge`, which unwinds what was done so far
        merge.advance(dirty)?;
        Ok(merge)
    }

    /// Run `f` against the merged tree, then unwind
    ///
    /// The unwind runs whether `f` succeeds, fails or panics. If both `f` and
    /// the unwind fail, `f`'s error is returned and the unwind failure is
    /// printed.
    ///
    /// # Errors
    ///
    /// Returns errors from [`Self::begin_speculative_merge`], from `f`, or
    /// [`WorkflowError::RestoreFailed`] from the unwind.
    pub fn run_speculative<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let merge = self.begin_speculative_merge()?;
        let outcome = f();
        let unwound = merge.finish();

        match (outcome, unwound) {
            (Ok(value), Ok(_)) => Ok(value),
            (Err(e), Ok(_)) => Err(e),
            (Ok(_), Err(restore)) => Err(restore.into()),
            (Err(e), Err(restore)) => {
                output::error(&format!("Failed to restore repository: {restore}"));
                Err(e)
            }
        }
    }
}

impl<V: Vcs> SpeculativeMerge<'_, V> {
    /// Current step of the merge
    pub const fn state(&self) -> MergeState {
        self.state
    }

    /// The recorded checkpoint, until the unwind consumes it
    pub const fn checkpoint(&self) -> Option<&Checkpoint> {
        self.checkpoint.as_ref()
    }

    /// Restore the repository and report how it went
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::RestoreFailed`] if the original branch could
    /// not be checked out again.
    pub fn finish(mut self) -> Result<UnwindReport, WorkflowError> {
        self.unwind()
    }

    /// Stash, check out trunk and merge
    fn advance(&mut self, dirty: bool) -> Result<(), WorkflowError> {
        let provider = self.provider;
        let vcs = provider.vcs();
        let target = provider.target_branch();
        let original = self.original_branch();

        if dirty {
            let created = vcs.stash_save()?;
            if let Some(checkpoint) = &mut self.checkpoint {
                checkpoint.had_stash = created;
            }
            self.state = MergeState::Stashed;
            tracing::info!(created, "stashed local changes");
        }

        vcs.checkout(target)?;
        self.state = MergeState::OnTrunk;

        if let Err(merge_err) = vcs.merge_no_commit(&original) {
            tracing::info!(error = %merge_err, "speculative merge failed, aborting");
            if let Err(abort_err) = vcs.merge_abort() {
                tracing::debug!(error = %abort_err, "merge abort failed");
            }
            vcs.checkout(&original)
                .map_err(|source| WorkflowError::RestoreFailed {
                    branch: original.clone(),
                    source,
                })?;
            self.state = MergeState::MergeAbortedRestored;

            return Err(if merge_err.is_conflict() {
                WorkflowError::MergeConflict {
                    source_branch: original,
                    target_branch: target.to_string(),
                }
            } else {
                WorkflowError::Git(merge_err)
            });
        }

        self.state = MergeState::MergeSucceeded;
        tracing::info!(source = %original, target = %target, "speculative merge applied");
        Ok(())
    }

    /// Name of the branch to return to
    fn original_branch(&self) -> String {
        self.checkpoint
            .as_ref()
            .map(|c| c.original_branch.clone())
            .unwrap_or_default()
    }

    /// The unwind routine; a no-op after the first run
    fn unwind(&mut self) -> Result<UnwindReport, WorkflowError> {
        let Some(checkpoint) = self.checkpoint.take() else {
            return Ok(UnwindReport::default());
        };

        let provider = self.provider;
        let vcs = provider.vcs();
        let mut report = UnwindReport::default();

        if self.state.left_original_branch() {
            if let Err(e) = vcs.reset_merge() {
                tracing::warn!(error = %e, "reset --merge failed");
                report.warnings.push(format!("Failed to discard merge state: {e}"));
            }

            if let Err(source) = vcs.checkout(&checkpoint.original_branch) {
                self.state = MergeState::Unwound;
                if checkpoint.had_stash {
                    output::warning(&format!(
                        "Your local changes are kept in the stash ('{STASH_MESSAGE}'). \
                         Run `git checkout {}` and `git stash pop` to get them back.",
                        checkpoint.original_branch
                    ));
                }
                return Err(WorkflowError::RestoreFailed {
                    branch: checkpoint.original_branch,
                    source,
                });
            }
        }

        if checkpoint.had_stash {
            match vcs.stash_pop() {
                Ok(()) => report.stash_restored = Some(true),
                Err(e) => {
                    let message = format!(
                        "Failed to restore stashed changes: {e}. \
                         They remain in the stash; run `git stash pop` to apply them."
                    );
                    tracing::warn!(error = %e, "stash pop failed");
                    output::warning(&message);
                    report.warnings.push(message);
                    report.stash_restored = Some(false);
                }
            }
        }

        self.state = MergeState::Unwound;
        tracing::info!(branch = %checkpoint.original_branch, "repository restored");
        Ok(report)
    }
}

impl<V: Vcs> Drop for SpeculativeMerge<'_, V> {
    fn drop(&mut self) {
        if self.checkpoint.is_none() {
            return;
        }
        if self.state == MergeState::MergeSucceeded {
            output::warning("Snapshot interrupted, restoring repository...");
        }
        if let Err(e) = self.unwind() {
            output::error(&format!("Failed to restore repository: {e}"));
        }
    }
}
