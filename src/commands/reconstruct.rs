use crate::errors::ManifestError;
use crate::output;
use crate::reconstruct::{ProjectReconstructor, ReconstructReport};
use crate::scanner::Framework;
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Options of the reconstruct command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconstructOptions {
    /// Manifest to read
    pub input: PathBuf,
    /// Directory to rebuild into
    pub dir: PathBuf,
}

/// Read and parse a manifest document
///
/// # Errors
///
/// Returns [`ManifestError::MissingInput`] if the file does not exist and
/// [`ManifestError::InvalidJson`] if it is not JSON.
pub fn load_manifest(path: &Path) -> Result<Value> {
    if !path.is_file() {
        return Err(ManifestError::MissingInput(path.to_path_buf()).into());
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
    let value = serde_json::from_str(&text).map_err(ManifestError::from)?;
    Ok(value)
}

/// Rebuild a project from a manifest file
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded, fails validation, or a
/// file cannot be written.
pub fn execute(options: &ReconstructOptions) -> Result<ReconstructReport> {
    let manifest = load_manifest(&options.input)?;

    output::info(&format!(
        "Reconstructing project in: {}",
        options.dir.display()
    ));
    let report = ProjectReconstructor::new(&options.dir).reconstruct(&manifest)?;

    output::success("Project reconstruction completed!");
    output::info(&format!("Framework: {}", report.framework));
    output::info(&format!("Total files created: {}", report.files_written));
    if let Some(recorded) = report.recorded_total
        && recorded != report.files_written as u64
    {
        output::warning(&format!(
            "Manifest records {recorded} files but {} were written",
            report.files_written
        ));
    }
    print_next_steps(&options.dir, report.framework);

    Ok(report)
}

/// Print what to do with the rebuilt tree
fn print_next_steps(dir: &Path, framework: Framework) {
    output::info("\nNext steps:");
    output::info(&format!("1. cd {}", dir.display()));
    output::info("2. npm install");
    if framework != Framework::Unknown {
        output::info(&format!("3. Follow {framework} setup instructions"));
    }
}
