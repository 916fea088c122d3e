//! Render configuration: schema, YAML loading and validation.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

/// Default bound on block and inline nesting.
pub const DEFAULT_MAX_DEPTH: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    /// Reject unexpected and missing closers instead of the legacy
    /// permissive handling.
    pub strict: bool,

    /// Deepest nesting a render may reach before failing.
    pub max_depth: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            strict: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl RenderConfig {
    pub fn permissive() -> Self {
        Self {
            strict: false,
            ..Self::default()
        }
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw).context("Failed to parse render config YAML")
    }
}

/// Load the config from disk.
///
/// Returns `Ok(Default::default())` if the file doesn't exist. Validation
/// warnings are logged; validation errors fail the load.
pub fn load_config(path: &Path) -> Result<RenderConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Render config does not exist; using defaults");
        return Ok(RenderConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read render config: {}", path.display()))?;

    let config = RenderConfig::from_yaml_str(&raw)
        .with_context(|| format!("Invalid render config at: {}", path.display()))?;

    let report = validate(&config);
    for warning in &report.warnings {
        warn!(path = %warning.path, message = %warning.message, "Render config warning");
    }
    if let Some(error) = report.errors.first() {
        bail!(
            "Invalid render config at {}: {}: {}",
            path.display(),
            error.path,
            error.message
        );
    }

    info!(path = %path.display(), strict = config.strict, max_depth = config.max_depth, "Loaded render config");
    Ok(config)
}

#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigIssue>,
    pub warnings: Vec<ConfigIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: &str, message: impl Into<String>) {
        self.errors.push(ConfigIssue {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: &str, message: impl Into<String>) {
        self.warnings.push(ConfigIssue {
            path: path.into(),
            message: message.into(),
        });
    }
}

pub fn validate(config: &RenderConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    if config.max_depth == 0 {
        report.error(
            "maxDepth",
            "must be at least 1; every block or inline run would exceed the limit",
        );
    }

    if !config.strict {
        report.warn(
            "strict",
            "permissive mode renders unmatched closers as leaves and closes dangling blocks silently",
        );
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_strict() {
        let config = RenderConfig::default();
        assert!(config.strict);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert!(validate(&config).is_valid());
        assert!(validate(&config).warnings.is_empty());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = RenderConfig::from_yaml_str("maxDepth: 16\n").unwrap();
        assert_eq!(config.max_depth, 16);
        assert!(config.strict);
    }

    #[test]
    fn permissive_is_a_warning() {
        let report = validate(&RenderConfig::from_yaml_str("strict: false").unwrap());
        assert!(report.is_valid());
        assert_eq!(report.warnings[0].path, "strict");
    }

    #[test]
    fn zero_depth_is_error() {
        let report = validate(&RenderConfig {
            max_depth: 0,
            ..Default::default()
        });
        assert!(!report.is_valid());
        assert_eq!(report.errors[0].path, "maxDepth");
    }

    #[test]
    fn rejects_unknown_types() {
        assert!(RenderConfig::from_yaml_str("maxDepth: deep").is_err());
    }

    #[test]
    fn load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("render.yaml")).unwrap();
        assert_eq!(config, RenderConfig::default());
    }

    #[test]
    fn load_rejects_invalid_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "maxDepth: 0").unwrap();
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("maxDepth"), "{err}");
    }

    #[test]
    fn load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "strict: false\nmaxDepth: 8").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config, RenderConfig { strict: false, max_depth: 8 });
    }
}
