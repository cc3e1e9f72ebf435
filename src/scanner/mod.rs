/// Extension-based classification table.
pub mod classify;

/// Directory traversal and file loading.
pub mod files;

/// Built-in excludes and pattern-file matching.
pub mod ignore;

/// Root-level structure checks and framework detection.
pub mod structure;

pub use classify::FileKind;
pub use files::{ScanSummary, scan};
pub use self::ignore::IgnoreMatcher;
pub use structure::{Framework, ProjectStructure, analyze};
