//! docker-compose parsing
//!
//! Indentation-driven line scan over the top-level `services:` mapping.
//! This is deliberately not a full YAML parser; anchors, aliases, and flow
//! style parse incompletely.

use regex::Regex;
use std::sync::OnceLock;

/// A service entry from a compose file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComposeService {
    pub name: String,
    pub image: String,
    pub container_name: String,
}

impl ComposeService {
    /// Display name: `container_name` is preferred when present.
    pub fn display_name(&self) -> &str {
        if self.container_name.is_empty() {
            &self.name
        } else {
            &self.container_name
        }
    }
}

fn service_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\s*)([\w-]+):").expect("valid regex"))
}

fn image_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\s*)image:\s*(.+)").expect("valid regex"))
}

fn container_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\s*)container_name:\s*(.+)").expect("valid regex"))
}

struct ComposeScan {
    services: Vec<ComposeService>,
    in_services: bool,
    services_indent: usize,
    current: ComposeService,
    current_indent: usize,
}

impl ComposeScan {
    fn push_current(&mut self) {
        if !self.current.name.is_empty() {
            self.services.push(std::mem::take(&mut self.current));
        }
    }

    fn scan_line(&mut self, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return;
        }

        if trimmed == "services:" {
            self.in_services = true;
            self.services_indent = line.len() - trimmed.len();
            return;
        }

        if self.in_services && self.leaves_services(line, trimmed) {
            self.push_current();
            self.in_services = false;
            return;
        }

        if !self.in_services {
            return;
        }

        if let Some(caps) = service_regex().captures(line) {
            let indent = caps[1].len();
            if indent == self.services_indent + 2 {
                self.push_current();
                self.current = ComposeService {
                    name: caps[2].to_string(),
                    ..Default::default()
                };
                self.current_indent = indent;
                return;
            }
        }

        self.scan_property(line);
    }

    fn leaves_services(&self, line: &str, trimmed: &str) -> bool {
        if !trimmed.contains(':') {
            return false;
        }
        let indent = line.len() - trimmed.len();
        indent <= self.services_indent && trimmed != "services:"
    }

    fn scan_property(&mut self, line: &str) {
        if self.current.name.is_empty() {
            return;
        }

        if let Some(caps) = image_regex().captures(line) {
            if caps[1].len() > self.current_indent {
                self.current.image = trim_quotes(caps[2].trim()).to_string();
            }
        } else if let Some(caps) = container_name_regex().captures(line) {
            if caps[1].len() > self.current_indent {
                self.current.container_name = trim_quotes(caps[2].trim()).to_string();
            }
        }
    }
}

fn trim_quotes(s: &str) -> &str {
    s.trim_matches('"').trim_matches('\'')
}

/// Extracts services from compose file content.
pub fn parse_compose(content: &str) -> Vec<ComposeService> {
    let mut scan = ComposeScan {
        services: Vec::new(),
        in_services: false,
        services_indent: 0,
        current: ComposeService::default(),
        current_indent: 0,
    };

    for line in content.lines() {
        scan.scan_line(line);
    }
    scan.push_current();

    scan.services
}

/// Splits an image reference into `(name, version)`; no tag means
/// `latest`.
pub fn split_image(image: &str) -> (String, String) {
    match image.split_once(':') {
        Some((name, tag)) => (name.to_string(), tag.to_string()),
        None => (image.to_string(), "latest".to_string()),
    }
}
