//! Dockerfile parsing

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Structured information extracted from a Dockerfile, attached to the
/// payload under `properties["docker"]`.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DockerfileInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub base_images: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exposed_ports: Vec<u16>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub multi_stage: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stages: Vec<String>,
}

fn from_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^FROM\s+(\S+)(?:\s+AS\s+(\S+))?").expect("valid regex"))
}

fn expose_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^EXPOSE\s+(.+)").expect("valid regex"))
}

fn port_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("valid regex"))
}

/// Extracts base images, exposed ports, and stage names. Instructions are
/// case-insensitive; comments and blank lines are ignored. Returns `None`
/// when nothing useful was found.
pub fn parse_dockerfile(content: &str) -> Option<DockerfileInfo> {
    let mut info = DockerfileInfo::default();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(caps) = from_regex().captures(line) {
            info.base_images.push(caps[1].to_string());
            if let Some(stage) = caps.get(2) {
                info.stages.push(stage.as_str().to_string());
                info.multi_stage = true;
            }
        }

        if let Some(caps) = expose_regex().captures(line) {
            for port in port_regex().find_iter(&caps[1]) {
                if let Ok(port) = port.as_str().parse::<u16>() {
                    info.exposed_ports.push(port);
                }
            }
        }
    }

    if info.base_images.is_empty() && info.exposed_ports.is_empty() {
        return None;
    }

    Some(info)
}
