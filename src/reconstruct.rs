//! Replays a manifest onto a directory.
//!
//! The whole document is validated before the first write, so a malformed
//! manifest never leaves a half-built tree behind. Writing then happens in a
//! fixed order: the target directory, a generated `package.json`, every file
//! record, `src/`, and finally a `tsconfig.json` scaffold when the project had
//! one and the manifest does not carry its own.

use crate::errors::ManifestError;
use crate::output;
use crate::scanner::structure::Framework;
use crate::utils::paths::{ensure_parent_dirs, is_contained_relative};
use crate::{DEPENDENCY_MANIFEST, SOURCE_DIR, TYPE_CHECK_CONFIG};
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Version written to the generated `package.json`
const GENERATED_PACKAGE_VERSION: &str = "1.0.0";

/// What a reconstruction produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconstructReport {
    /// Directory the project was written to
    pub target: PathBuf,
    /// Number of file records written
    pub files_written: usize,
    /// Framework recorded in the manifest
    pub framework: Framework,
    /// `stats.totalFiles` recorded in the manifest, if present
    pub recorded_total: Option<u64>,
    /// Whether the `tsconfig.json` scaffold was generated
    pub wrote_type_check_scaffold: bool,
}

/// Writes a manifest's files into a target directory
#[derive(Debug, Clone)]
pub struct ProjectReconstructor {
    /// Root of the reconstructed tree
    target: PathBuf,
}

/// Validated view of a manifest document
struct ReplayPlan<'a> {
    /// `(path, content)` of every file record
    files: Vec<(&'a str, &'a str)>,
    /// `dependencies`, empty when absent
    dependencies: Map<String, Value>,
    /// `devDependencies`, empty when absent
    dev_dependencies: Map<String, Value>,
    /// `structure.hasSourceDir`
    has_source_dir: bool,
    /// `structure.hasTypeCheckConfig`
    has_type_check_config: bool,
    /// `structure.framework`, unknown when absent or unrecognised
    framework: Framework,
    /// `stats.totalFiles`
    recorded_total: Option<u64>,
}

/// `package.json` written at the target root
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedPackage<'a> {
    name: &'a str,
    version: &'a str,
    dependencies: &'a Map<String, Value>,
    dev_dependencies: &'a Map<String, Value>,
}

/// `tsconfig.json` scaffold
#[derive(Serialize)]
struct TypeCheckScaffold {
    #[serde(rename = "compilerOptions")]
    compiler_options: CompilerOptions,
    include: [&'static str; 2],
    exclude: [&'static str; 1],
}

/// `compilerOptions` of the scaffold
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
struct CompilerOptions {
    target: &'static str,
    lib: [&'static str; 3],
    allow_js: bool,
    skip_lib_check: bool,
    strict: bool,
    force_consistent_casing_in_file_names: bool,
    no_emit: bool,
    es_module_interop: bool,
    module: &'static str,
    module_resolution: &'static str,
    resolve_json_module: bool,
    isolated_modules: bool,
    jsx: &'static str,
    incremental: bool,
}

impl Default for TypeCheckScaffold {
    fn default() -> Self {
        Self {
            compiler_options: CompilerOptions {
                target: "es5",
                lib: ["dom", "dom.iterable", "esnext"],
                allow_js: true,
                skip_lib_check: true,
                strict: true,
                force_consistent_casing_in_file_names: true,
                no_emit: true,
                es_module_interop: true,
                module: "esnext",
                module_resolution: "node",
                resolve_json_module: true,
                isolated_modules: true,
                jsx: "preserve",
                incremental: true,
            },
            include: ["**/*.ts", "**/*.tsx"],
            exclude: ["node_modules"],
        }
    }
}

impl<'a> ReplayPlan<'a> {
    /// Validate `manifest` and extract what replay needs
    fn from_value(manifest: &'a Value) -> Result<Self, ManifestError> {
        let root = manifest
            .as_object()
            .ok_or_else(|| ManifestError::structural("manifest must be a JSON object"))?;

        let records = root
            .get("files")
            .and_then(Value::as_array)
            .ok_or_else(|| ManifestError::structural("missing or invalid \"files\" array"))?;

        let mut files = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let path = record.get("path").and_then(Value::as_str).ok_or_else(|| {
                ManifestError::structural(format!("files[{index}]: missing string \"path\""))
            })?;
            let content = record.get("content").and_then(Value::as_str).ok_or_else(|| {
                ManifestError::structural(format!(
                    "files[{index}] ({path}): missing string \"content\""
                ))
            })?;
            if !is_contained_relative(Path::new(path)) {
                return Err(ManifestError::structural(format!(
                    "files[{index}]: path escapes the target directory: {path}"
                )));
            }
            files.push((path, content));
        }

        let structure = root.get("structure").and_then(Value::as_object);
        let flag = |key: &str, legacy: &str| {
            structure
                .and_then(|s| s.get(key).or_else(|| s.get(legacy)))
                .and_then(Value::as_bool)
                .unwrap_or(false)
        };
        let has_source_dir = flag("hasSourceDir", "hasSrcDir");
        check_layout(&files, has_source_dir)?;
        let framework = structure
            .and_then(|s| s.get("framework"))
            .and_then(|f| serde_json::from_value(f.clone()).ok())
            .unwrap_or_default();

        Ok(Self {
            files,
            dependencies: dependency_section(root, "dependencies")?,
            dev_dependencies: dependency_section(root, "devDependencies")?,
            has_source_dir,
            has_type_check_config: flag("hasTypeCheckConfig", "hasTypescript"),
            framework,
            recorded_total: root
                .get("stats")
                .and_then(|s| s.get("totalFiles"))
                .and_then(Value::as_u64),
        })
    }

    /// Whether a file record writes `relative`
    fn writes(&self, relative: &str) -> bool {
        self.files
            .iter()
            .any(|(path, _)| normalized(path) == Path::new(relative))
    }
}

/// `path` without `.` components
fn normalized(path: &str) -> PathBuf {
    Path::new(path)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Reject records that could not all be written into one tree
///
/// Two records may not name the same file, and no record may sit below
/// another record's path (or below `src/` when it is a file record while the
/// source directory is to be created).
fn check_layout(files: &[(&str, &str)], has_source_dir: bool) -> Result<(), ManifestError> {
    let mut paths = BTreeSet::new();
    for (path, _) in files {
        let normal = normalized(path);
        if normal.as_os_str().is_empty() {
            return Err(ManifestError::structural(format!(
                "record path does not name a file: {path}"
            )));
        }
        if !paths.insert(normal) {
            return Err(ManifestError::structural(format!(
                "duplicate record path: {path}"
            )));
        }
    }

    for path in &paths {
        if let Some(parent) = path.ancestors().skip(1).find(|a| paths.contains(*a)) {
            return Err(ManifestError::structural(format!(
                "{} is both a file and the parent of {}",
                parent.display(),
                path.display()
            )));
        }
    }

    if has_source_dir && paths.contains(Path::new(SOURCE_DIR)) {
        return Err(ManifestError::structural(format!(
            "record {SOURCE_DIR} clashes with the source directory"
        )));
    }
    Ok(())
}

/// An optional object-valued dependency section
fn dependency_section(
    root: &Map<String, Value>,
    key: &str,
) -> Result<Map<String, Value>, ManifestError> {
    match root.get(key) {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(_) => Err(ManifestError::structural(format!("\"{key}\" must be an object"))),
    }
}

impl ProjectReconstructor {
    /// Reconstructor writing into `target`
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// Validate `manifest` and write its project into the target directory
    ///
    /// Existing files at the same paths are overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::StructuralValidation`] (before writing
    /// anything) if the document is not a usable manifest, or an IO error with
    /// the failing path.
    pub fn reconstruct(&self, manifest: &Value) -> Result<ReconstructReport> {
        let plan = ReplayPlan::from_value(manifest)?;

        fs::create_dir_all(&self.target)
            .with_context(|| format!("Failed to create directory: {}", self.target.display()))?;

        // Resolves `.` and `..` so the package is named after the real directory
        let resolved = fs::canonicalize(&self.target)
            .with_context(|| format!("Failed to resolve directory: {}", self.target.display()))?;
        self.write_package(&plan, &resolved)?;

        for (relative, content) in &plan.files {
            let path = self.target.join(relative);
            ensure_parent_dirs(&path)?;
            fs::write(&path, content)
                .with_context(|| format!("Failed to write file: {}", path.display()))?;
            output::action("Created:", relative);
        }

        if plan.has_source_dir {
            let src = self.target.join(SOURCE_DIR);
            fs::create_dir_all(&src)
                .with_context(|| format!("Failed to create directory: {}", src.display()))?;
        }

        let wrote_type_check_scaffold =
            plan.has_type_check_config && !plan.writes(TYPE_CHECK_CONFIG);
        if wrote_type_check_scaffold {
            let path = self.target.join(TYPE_CHECK_CONFIG);
            let json = serde_json::to_string_pretty(&TypeCheckScaffold::default())?;
            fs::write(&path, json)
                .with_context(|| format!("Failed to write file: {}", path.display()))?;
        }

        tracing::debug!(
            target = %self.target.display(),
            files = plan.files.len(),
            "reconstruction complete"
        );

        Ok(ReconstructReport {
            target: self.target.clone(),
            files_written: plan.files.len(),
            framework: plan.framework,
            recorded_total: plan.recorded_total,
            wrote_type_check_scaffold,
        })
    }

    /// Write the generated `package.json`
    fn write_package(&self, plan: &ReplayPlan<'_>, resolved: &Path) -> Result<()> {
        let name = resolved
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let package = GeneratedPackage {
            name: &name,
            version: GENERATED_PACKAGE_VERSION,
            dependencies: &plan.dependencies,
            dev_dependencies: &plan.dev_dependencies,
        };

        let path = self.target.join(DEPENDENCY_MANIFEST);
        let json = serde_json::to_string_pretty(&package)?;
        fs::write(&path, json).with_context(|| format!("Failed to write file: {}", path.display()))
    }
}
