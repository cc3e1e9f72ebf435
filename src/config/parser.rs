use super::Config;
use anyhow::{Context, Result};
use memmap2::MmapOptions;
use std::fs::File;
use std::path::Path;

/// Files at or above this size are memory-mapped instead of read
const MMAP_THRESHOLD: u64 = 4096;

/// Parse and validate a configuration file
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not UTF-8, is not valid
/// TOML, or holds invalid values.
pub fn parse_config_file(path: &Path) -> Result<Config> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Failed to stat config file: {}", path.display()))?;

    if metadata.len() < MMAP_THRESHOLD {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        parse_config_str(&content)
    } else {
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        // SAFETY: the map is read-only and dropped before this function returns
        let mmap = unsafe { MmapOptions::new().map(&file)? };

        let content = simdutf8::basic::from_utf8(&mmap)
            .map_err(|e| anyhow::anyhow!("Invalid UTF-8 in config file: {e}"))?;

        parse_config_str(content)
    }
}

/// Parse configuration from TOML text
///
/// # Errors
///
/// Returns an error on invalid TOML or invalid values.
pub fn parse_config_str(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).context("Failed to parse TOML config")?;

    validate_config(&config)?;
    Ok(config)
}

/// Check values that TOML typing alone cannot catch
///
/// # Errors
///
/// Returns an error describing the first invalid value.
pub fn validate_config(config: &Config) -> Result<()> {
    let trunk = &config.git.trunk_branch;
    if trunk.trim().is_empty() {
        anyhow::bail!("git.trunk_branch cannot be empty");
    }
    if trunk.chars().any(char::is_whitespace) {
        anyhow::bail!("git.trunk_branch cannot contain whitespace: '{trunk}'");
    }

    let ignore_file = &config.scan.ignore_file;
    if ignore_file.is_empty() || ignore_file.contains(['/', '\\']) {
        anyhow::bail!("scan.ignore_file must be a plain file name: '{ignore_file}'");
    }

    if config.snapshot.version_tag.trim().is_empty() {
        anyhow::bail!("snapshot.version_tag cannot be empty");
    }

    for name in config.scan.exclude_dirs.iter().chain(&config.scan.exclude_files) {
        if name.is_empty() || name.contains(['/', '\\']) {
            anyhow::bail!("Exclude entries must be plain names: '{name}'");
        }
    }

    Ok(())
}
