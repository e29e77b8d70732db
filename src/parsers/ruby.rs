//! Gemfile / gemspec parsing

use crate::payload::Dependency;
use regex::Regex;
use std::sync::OnceLock;

fn gem_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^\s*(?:gem|spec\.add_(?:runtime_|development_)?dependency)\s+['"]([\w-]+)['"](?:\s*,\s*['"]([^'"]+)['"])?"#)
            .expect("valid regex")
    })
}

/// Line-based extraction of gem declarations from a `Gemfile` or
/// `*.gemspec` body. The version field keeps the literal specifier
/// (`~> 7.1`) or `latest` when absent.
pub fn parse_gemfile(content: &str) -> Vec<Dependency> {
    let mut dependencies = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some(caps) = gem_regex().captures(line) else {
            continue;
        };

        let name = caps[1].to_string();
        let version = caps
            .get(2)
            .map(|v| v.as_str().to_string())
            .unwrap_or_else(|| "latest".to_string());

        let dep = Dependency::new("ruby", name, version);
        if !dependencies.contains(&dep) {
            dependencies.push(dep);
        }
    }

    dependencies
}
