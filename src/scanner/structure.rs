use crate::manifest::{DependencyMap, StructureSummary};
use crate::{DEPENDENCY_MANIFEST, SOURCE_DIR, TYPE_CHECK_CONFIG};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Framework recognised from the dependency manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    /// Next.js (`next`)
    #[serde(alias = "nextjs")]
    Next,
    /// Vue (`vue`)
    Vue,
    /// Svelte (`svelte`)
    Svelte,
    /// React (`react`)
    React,
    /// Angular (`@angular/core`)
    Angular,
    /// None of the above
    #[default]
    Unknown,
}

/// Dependency names checked in order; the first one present wins
///
/// `next` comes before `react` because every Next.js project also depends on
/// React.
pub const FRAMEWORK_PRIORITY: &[(&str, Framework)] = &[
    ("next", Framework::Next),
    ("vue", Framework::Vue),
    ("svelte", Framework::Svelte),
    ("react", Framework::React),
    ("@angular/core", Framework::Angular),
];

impl Framework {
    /// Lowercase name as serialized
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Next => "next",
            Self::Vue => "vue",
            Self::Svelte => "svelte",
            Self::React => "react",
            Self::Angular => "angular",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The parts of `package.json` the snapshot keeps
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyManifest {
    /// `dependencies`; `null` and absent both read as empty
    #[serde(default)]
    dependencies: Option<DependencyMap>,
    /// `devDependencies`; `null` and absent both read as empty
    #[serde(default)]
    dev_dependencies: Option<DependencyMap>,
}

impl DependencyManifest {
    /// Build from explicit maps
    #[must_use]
    pub const fn new(dependencies: DependencyMap, dev_dependencies: DependencyMap) -> Self {
        Self {
            dependencies: Some(dependencies),
            dev_dependencies: Some(dev_dependencies),
        }
    }

    /// Parse `package.json` text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not JSON or a dependency section is not
    /// a map of strings.
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid dependency manifest")
    }

    /// Runtime dependencies
    #[must_use]
    pub fn dependencies(&self) -> DependencyMap {
        self.dependencies.clone().unwrap_or_default()
    }

    /// Development dependencies
    #[must_use]
    pub fn dev_dependencies(&self) -> DependencyMap {
        self.dev_dependencies.clone().unwrap_or_default()
    }

    /// Whether `name` is a runtime or development dependency
    #[must_use]
    pub fn has_dependency(&self, name: &str) -> bool {
        [&self.dependencies, &self.dev_dependencies]
            .into_iter()
            .flatten()
            .any(|map| map.contains_key(name))
    }
}

/// Root-level facts about a project tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectStructure {
    /// `package.json` exists at the root
    pub has_dependency_manifest: bool,
    /// Parsed `package.json`, if present
    pub dependency_manifest: Option<DependencyManifest>,
    /// `src/` exists and is a directory
    pub has_source_dir: bool,
    /// `tsconfig.json` exists at the root
    pub has_type_check_config: bool,
    /// Detected framework
    pub framework: Framework,
}

impl ProjectStructure {
    /// Runtime dependencies, empty without a dependency manifest
    #[must_use]
    pub fn dependencies(&self) -> DependencyMap {
        self.dependency_manifest
            .as_ref()
            .map(DependencyManifest::dependencies)
            .unwrap_or_default()
    }

    /// Development dependencies, empty without a dependency manifest
    #[must_use]
    pub fn dev_dependencies(&self) -> DependencyMap {
        self.dependency_manifest
            .as_ref()
            .map(DependencyManifest::dev_dependencies)
            .unwrap_or_default()
    }

    /// The subset recorded in the manifest
    #[must_use]
    pub const fn summary(&self) -> StructureSummary {
        StructureSummary {
            framework: self.framework,
            has_type_check_config: self.has_type_check_config,
            has_source_dir: self.has_source_dir,
        }
    }
}

/// First framework of [`FRAMEWORK_PRIORITY`] present in either dependency map
#[must_use]
pub fn detect_framework(manifest: &DependencyManifest) -> Framework {
    FRAMEWORK_PRIORITY
        .iter()
        .find(|(name, _)| manifest.has_dependency(name))
        .map_or(Framework::Unknown, |(_, framework)| *framework)
}

/// Inspect the root of the tree at `root`
///
/// # Errors
///
/// Returns an error if `package.json` exists but cannot be read or parsed.
pub fn analyze(root: &Path) -> Result<ProjectStructure> {
    let manifest_path = root.join(DEPENDENCY_MANIFEST);
    let has_dependency_manifest = manifest_path.is_file();

    let dependency_manifest = if has_dependency_manifest {
        let content = std::fs::read_to_string(&manifest_path)
            .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
        let parsed = DependencyManifest::parse(&content)
            .with_context(|| format!("Failed to parse {}", manifest_path.display()))?;
        Some(parsed)
    } else {
        None
    };

    let framework = dependency_manifest
        .as_ref()
        .map_or(Framework::Unknown, detect_framework);

    let structure = ProjectStructure {
        has_dependency_manifest,
        dependency_manifest,
        has_source_dir: root.join(SOURCE_DIR).is_dir(),
        has_type_check_config: root.join(TYPE_CHECK_CONFIG).exists(),
        framework,
    };

    tracing::debug!(
        framework = %structure.framework,
        src = structure.has_source_dir,
        tsconfig = structure.has_type_check_config,
        "analyzed project structure"
    );

    Ok(structure)
}
