//! Gradle build script parsing
//!
//! Line-based extraction of configuration-typed dependency declarations.
//! The grammar is intentionally the same breadth as the line heuristics it
//! replaces: parenthesized or bare forms, single or double quotes.

use crate::payload::Dependency;
use regex::Regex;
use std::sync::OnceLock;

fn dependency_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?:implementation|compile|api|compileOnly|runtimeOnly|annotationProcessor|testImplementation|testRuntimeOnly)\s*\(?\s*['"]([^:'"]+):([^:'"]+)(?::([^'"]+))?['"]\s*\)?"#,
        )
        .expect("valid regex")
    })
}

fn project_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?:rootProject|project)\.name\s*=\s*['"]([^'"]+)['"]"#).expect("valid regex")
    })
}

/// Extracts `group:artifact[:version]` declarations from a
/// `build.gradle`/`build.gradle.kts` body; missing versions become
/// `latest`.
pub fn parse_gradle_dependencies(content: &str) -> Vec<Dependency> {
    let mut dependencies = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty()
            || line.starts_with("//")
            || line.starts_with("/*")
            || line.starts_with('*')
        {
            continue;
        }

        let Some(caps) = dependency_regex().captures(line) else {
            continue;
        };

        let group = &caps[1];
        let artifact = &caps[2];
        let version = caps
            .get(3)
            .map(|v| v.as_str().to_string())
            .unwrap_or_else(|| "latest".to_string());

        dependencies.push(Dependency::new(
            "gradle",
            format!("{}:{}", group, artifact),
            version,
        ));
    }

    dependencies
}

/// Looks for `rootProject.name` / `project.name` assignments.
pub fn parse_gradle_project_name(content: &str) -> Option<String> {
    for line in content.lines() {
        if let Some(caps) = project_name_regex().captures(line.trim()) {
            return Some(caps[1].to_string());
        }
    }
    None
}
