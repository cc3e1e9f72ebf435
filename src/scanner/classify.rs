//! Extension-based file classification.
//!
//! The allow-list of scanned extensions and the classification table are the
//! same table, so every file the scanner accepts has a real tag.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Classification tag recorded for every scanned file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileKind {
    /// `.js`
    Javascript,
    /// `.jsx`
    React,
    /// `.ts`
    Typescript,
    /// `.tsx`
    ReactTypescript,
    /// `.vue`
    Vue,
    /// `.svelte`
    Svelte,
    /// `.css`, `.scss`, `.less`
    Stylesheet,
    /// `.json`
    Json,
    /// `.md`, `.mdx`
    Markdown,
    /// Sentinel for an extension missing from the table
    Unknown,
}

/// Scanned extensions and their tags, without the leading dot
pub const EXTENSION_KINDS: &[(&str, FileKind)] = &[
    ("js", FileKind::Javascript),
    ("jsx", FileKind::React),
    ("ts", FileKind::Typescript),
    ("tsx", FileKind::ReactTypescript),
    ("vue", FileKind::Vue),
    ("svelte", FileKind::Svelte),
    ("css", FileKind::Stylesheet),
    ("scss", FileKind::Stylesheet),
    ("less", FileKind::Stylesheet),
    ("json", FileKind::Json),
    ("md", FileKind::Markdown),
    ("mdx", FileKind::Markdown),
];

impl FileKind {
    /// Tag for an extension (without the dot); `None` if it is not scanned
    ///
    /// Matching is case-sensitive, like the extension check of the scanner.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        EXTENSION_KINDS
            .iter()
            .find(|(candidate, _)| *candidate == ext)
            .map(|(_, kind)| *kind)
    }

    /// Tag for a path, [`FileKind::Unknown`] when the extension is not in the table
    #[must_use]
    pub fn classify(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .unwrap_or(Self::Unknown)
    }

    /// The serialized tag
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Javascript => "javascript",
            Self::React => "react",
            Self::Typescript => "typescript",
            Self::ReactTypescript => "react-typescript",
            Self::Vue => "vue",
            Self::Svelte => "svelte",
            Self::Stylesheet => "stylesheet",
            Self::Json => "json",
            Self::Markdown => "markdown",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
