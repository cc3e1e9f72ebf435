//! Typed failures that callers (and the binary) need to tell apart.
//!
//! Everything else travels as `anyhow::Error` with context; these types are
//! wrapped into it and recovered with `downcast_ref` where the distinction
//! matters (exit messages, tests).

use crate::git::errors::GitError;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of the git-aware snapshot workflow.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The speculative merge could not complete; the repository was restored.
    #[error(
        "Merge of '{source_branch}' into '{target_branch}' has conflicts. \
         Resolve conflicts first, then run the snapshot again"
    )]
    MergeConflict {
        /// Branch that was being merged.
        source_branch: String,
        /// Trunk branch it was merged into.
        target_branch: String,
    },

    /// Another git-aware snapshot holds the workflow lock for this repository.
    #[error(
        "Another snapshot is already running against this repository. \
         Wait for it to finish or remove the stale lock at: {}",
        .0.display()
    )]
    Busy(PathBuf),

    /// HEAD does not point at a branch, so there is nothing to return to.
    #[error("HEAD is detached; check out a branch before taking a git-aware snapshot")]
    DetachedHead,

    /// The original branch could not be restored after the speculative merge.
    #[error("Failed to restore branch '{branch}': {source}")]
    RestoreFailed {
        /// Branch that should have been checked out again.
        branch: String,
        /// Underlying git failure.
        #[source]
        source: GitError,
    },

    /// A git operation failed while setting up the speculative merge.
    #[error(transparent)]
    Git(#[from] GitError),
}

/// Failures reading or validating a manifest for reconstruction.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The input manifest file does not exist.
    #[error("Input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// The input is not valid JSON.
    #[error("Input is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The document does not have the shape of a manifest.
    #[error("Invalid manifest structure: {0}")]
    StructuralValidation(String),
}

impl ManifestError {
    /// Create a structural validation error.
    pub fn structural(message: impl Into<String>) -> Self {
        Self::StructuralValidation(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_message_asks_to_resolve() {
        let err = WorkflowError::MergeConflict {
            source_branch: "feature/x".to_string(),
            target_branch: "master".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("feature/x"));
        assert!(msg.contains("master"));
        assert!(msg.contains("Resolve conflicts first"));
    }

    #[test]
    fn test_errors_survive_anyhow_round_trip() {
        let err: anyhow::Error = ManifestError::structural("missing files").into();
        assert!(matches!(
            err.downcast_ref::<ManifestError>(),
            Some(ManifestError::StructuralValidation(_))
        ));
    }
}
