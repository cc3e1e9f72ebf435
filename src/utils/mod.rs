//! Utility functions and helpers.
//!
//! - [`formatters`]: sizes, hashes and counts for terminal output
//! - [`paths`]: relative path handling for manifests
//!
//! # Examples
//!
//! ```
//! use treesnap::utils::{format_size, paths::to_slash_path};
//! use std::path::Path;
//!
//! assert_eq!(format_size(1024 * 1024), "1.00 MB");
//! assert_eq!(to_slash_path(Path::new("src").join("app.js").as_path()), "src/app.js");
//! ```

/// Output formatting helpers
pub mod formatters;
/// Path manipulation for manifest records
pub mod paths;

pub use formatters::format_size;
