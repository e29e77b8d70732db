//! Scan metadata attached to the root payload by the CLI

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

/// Output format specification version.
pub const SPEC_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize)]
pub struct ScanMetadata {
    pub timestamp: String,
    pub scan_path: String,
    #[serde(rename = "specVersion")]
    pub spec_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tech_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub techs_count: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub excluded_dirs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git: Option<GitInfo>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GitInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    pub is_dirty: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
}

impl ScanMetadata {
    pub fn new(scan_path: &Path, excluded_dirs: Vec<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            scan_path: scan_path.display().to_string(),
            spec_version: SPEC_VERSION.to_string(),
            duration_ms: None,
            file_count: None,
            component_count: None,
            language_count: None,
            tech_count: None,
            techs_count: None,
            excluded_dirs,
            git: GitInfo::gather(scan_path),
            properties: BTreeMap::new(),
        }
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_ms = Some(duration.as_millis() as u64);
    }

    pub fn set_counts(
        &mut self,
        file_count: u64,
        component_count: u64,
        language_count: u64,
        tech_count: u64,
        techs_count: u64,
    ) {
        self.file_count = Some(file_count);
        self.component_count = Some(component_count);
        self.language_count = Some(language_count);
        self.tech_count = Some(tech_count);
        self.techs_count = Some(techs_count);
    }

    pub fn set_properties(&mut self, properties: BTreeMap<String, serde_json::Value>) {
        self.properties = properties;
    }
}

impl GitInfo {
    /// Collects repository information via the `git` CLI; `None` when the
    /// path is not inside a repository or git is unavailable.
    pub fn gather(path: &Path) -> Option<Self> {
        run_git(path, &["rev-parse", "--git-dir"])?;

        let commit = run_git(path, &["rev-parse", "HEAD"]).map(|c| c.chars().take(7).collect());
        let branch = run_git(path, &["rev-parse", "--abbrev-ref", "HEAD"]);
        let is_dirty = run_git(path, &["status", "--porcelain"])
            .map(|s| !s.is_empty())
            .unwrap_or(false);
        let remote_url = run_git(path, &["config", "--get", "remote.origin.url"]);

        Some(Self {
            branch,
            commit,
            is_dirty,
            remote_url,
        })
    }
}

fn run_git(dir: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).current_dir(dir).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
