//! Configuration: CLI-level settings and per-project configuration
//!
//! `Settings` holds the effective scan settings, seeded from defaults and
//! `STACK_ANALYZER_*` environment variables; command-line flags override
//! both. `ProjectConfig` is the optional `.stack-analyzer.yml` at the scan
//! root. The core scanner never reads the environment itself.

use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

/// File name of the per-project configuration at the scan root.
pub const PROJECT_CONFIG_FILE: &str = ".stack-analyzer.yml";

/// Effective CLI settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Output file; `None` writes to stdout
    pub output_file: Option<PathBuf>,
    pub pretty_print: bool,
    pub exclude_dirs: Vec<String>,
    pub aggregate: Vec<String>,
    pub log_level: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_file: None,
            pretty_print: true,
            exclude_dirs: Vec::new(),
            aggregate: Vec::new(),
            log_level: None,
        }
    }
}

impl Settings {
    /// Defaults with environment-variable overrides applied.
    pub fn from_env() -> Self {
        let mut settings = Self::default();

        if let Ok(output) = env::var("STACK_ANALYZER_OUTPUT") {
            if !output.is_empty() {
                settings.output_file = Some(PathBuf::from(output));
            }
        }

        if let Ok(excludes) = env::var("STACK_ANALYZER_EXCLUDE_DIRS") {
            settings.exclude_dirs = split_list(&excludes);
        }

        if let Ok(aggregate) = env::var("STACK_ANALYZER_AGGREGATE") {
            settings.aggregate = split_list(&aggregate);
        }

        if let Ok(pretty) = env::var("STACK_ANALYZER_PRETTY") {
            settings.pretty_print = pretty.eq_ignore_ascii_case("true");
        }

        if let Ok(level) = env::var("STACK_ANALYZER_LOG_LEVEL") {
            if !level.is_empty() {
                settings.log_level = Some(level);
            }
        }

        settings
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// A tech entry forced into the root payload by project configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfiguredTech {
    pub tech: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Contents of `.stack-analyzer.yml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Attached verbatim to the root metadata
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
    /// Merged with CLI exclusions
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Forced additions to the root `techs[]`
    #[serde(default)]
    pub techs: Vec<ConfiguredTech>,
}

impl ProjectConfig {
    /// Loads the project configuration from the scan root. A missing file
    /// yields the default; a malformed one is a fatal configuration error.
    pub fn load(scan_root: &Path) -> Result<Self, ConfigError> {
        let path = scan_root.join(PROJECT_CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => return Ok(Self::default()),
        };

        serde_yaml::from_str(&content).map_err(|e| ConfigError::ProjectConfig {
            path,
            reason: e.to_string(),
        })
    }
}
