use anyhow::Result;
use colored::Colorize;
use std::collections::HashSet;
use std::path::Path;

/// Warns about configuration keys that have no effect
pub struct ConfigValidator {
    /// Keys recognized by treesnap
    known_fields: HashSet<&'static str>,
}

impl ConfigValidator {
    /// Create a new validator with known configuration fields
    #[must_use]
    pub fn new() -> Self {
        let known_fields = HashSet::from([
            "scan",
            "scan.ignore_file",
            "scan.exclude_dirs",
            "scan.exclude_files",
            "scan.follow_symlinks",
            "git",
            "git.trunk_branch",
            "snapshot",
            "snapshot.version_tag",
            "snapshot.output",
        ]);

        Self { known_fields }
    }

    /// Validate a configuration file and print warnings about its keys
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub fn validate_config_file(&self, config_path: &Path) -> Result<()> {
        if !config_path.exists() {
            return Ok(());
        }

        let content = std::fs::read_to_string(config_path)?;
        let warnings = self.collect_warnings(&content)?;

        if !warnings.is_empty() {
            eprintln!("{}", "Configuration warnings:".yellow().bold());
            for warning in warnings {
                eprintln!("  {warning}");
            }
            eprintln!();
        }

        Ok(())
    }

    /// Unknown keys found in `content`, as display lines
    ///
    /// # Errors
    ///
    /// Returns an error if `content` is not valid TOML
    pub fn collect_warnings(&self, content: &str) -> Result<Vec<String>> {
        let parsed: toml::Value = toml::from_str(content)?;

        let mut unknown_fields = Vec::new();
        self.check_table(&parsed, "", &mut unknown_fields);

        Ok(unknown_fields
            .iter()
            .map(|field| {
                format!(
                    "Unknown configuration field '{}': {}",
                    field.yellow(),
                    "it has no effect".dimmed()
                )
            })
            .collect())
    }

    /// Recursively checks a TOML table for unknown fields
    fn check_table(&self, table: &toml::Value, prefix: &str, unknown: &mut Vec<String>) {
        let toml::Value::Table(map) = table else {
            return;
        };

        for (key, value) in map {
            let full_key = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };

            if !self.known_fields.contains(full_key.as_str()) {
                unknown.push(full_key);
                continue;
            }

            if value.is_table() {
                self.check_table(value, &full_key, unknown);
            }
        }
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_keys_produce_no_warnings() -> Result<()> {
        let validator = ConfigValidator::new();
        let warnings = validator.collect_warnings(
            "[scan]\nignore_file = \".gitignore\"\n[git]\ntrunk_branch = \"main\"\n",
        )?;
        assert!(warnings.is_empty());
        Ok(())
    }

    #[test]
    fn test_unknown_keys_are_reported() -> Result<()> {
        let validator = ConfigValidator::new();
        let warnings =
            validator.collect_warnings("[scan]\nignore_fle = \"x\"\n[extra]\nkey = 1\n")?;
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().any(|w| w.contains("scan.ignore_fle")));
        assert!(warnings.iter().any(|w| w.contains("extra")));
        Ok(())
    }

    #[test]
    fn test_nested_unknown_key_is_reported_once() -> Result<()> {
        let validator = ConfigValidator::new();
        let warnings = validator.collect_warnings("[snapshot]\nname = \"app\"\n")?;
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("snapshot.name"));
        Ok(())
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let validator = ConfigValidator::new();
        assert!(validator.collect_warnings("[scan").is_err());
    }
}
