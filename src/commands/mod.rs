//! Command implementations.
//!
//! Each command takes already-parsed options, does its work through the
//! library modules and reports progress through [`crate::output`].

/// Shell completion generation.
pub mod completion;
/// Manifest replay into a directory.
pub mod reconstruct;
/// Manifest capture, optionally through a speculative merge.
pub mod snapshot;
