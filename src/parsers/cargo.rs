//! Cargo.toml parsing

use crate::payload::Dependency;
use toml::Value;

#[derive(Debug, Clone, Default)]
pub struct CargoManifest {
    pub name: Option<String>,
    pub license: Option<String>,
    pub dependencies: Vec<Dependency>,
    /// True when a `[package]` section is present (workspace-only
    /// manifests have none)
    pub has_package: bool,
}

const DEPENDENCY_TABLES: &[&[&str]] = &[
    &["dependencies"],
    &["dev-dependencies"],
    &["build-dependencies"],
    &["workspace", "dependencies"],
];

/// Parses a `Cargo.toml` body. Object-form dependencies encode their
/// path/git origin into the version field (`path:…`, `git:…#ref`).
pub fn parse_cargo_toml(content: &str) -> CargoManifest {
    let Ok(doc) = content.parse::<Value>() else {
        return CargoManifest::default();
    };

    let mut manifest = CargoManifest::default();

    if let Some(package) = doc.get("package") {
        manifest.has_package = true;
        manifest.name = package
            .get("name")
            .and_then(|v| v.as_str())
            .map(String::from);
        manifest.license = package
            .get("license")
            .and_then(|v| v.as_str())
            .map(String::from);
    }

    for table_path in DEPENDENCY_TABLES {
        let mut node = Some(&doc);
        for segment in *table_path {
            node = node.and_then(|n| n.get(segment));
        }
        let Some(table) = node.and_then(|n| n.as_table()) else {
            continue;
        };

        for (name, value) in table {
            let dep = Dependency::new("cargo", name.clone(), dependency_version(value));
            if !manifest.dependencies.contains(&dep) {
                manifest.dependencies.push(dep);
            }
        }
    }

    manifest
}

fn dependency_version(value: &Value) -> String {
    match value {
        Value::String(version) => version.clone(),
        Value::Table(spec) => {
            let version = spec.get("version").and_then(|v| v.as_str());

            if let Some(path) = spec.get("path").and_then(|v| v.as_str()) {
                return match version {
                    Some(v) => format!("path:{}:{}", path, v),
                    None => format!("path:{}", path),
                };
            }

            if let Some(git) = spec.get("git").and_then(|v| v.as_str()) {
                let reference = spec
                    .get("branch")
                    .or_else(|| spec.get("rev"))
                    .and_then(|v| v.as_str())
                    .unwrap_or("latest");
                return format!("git:{}#{}", git, reference);
            }

            version.map(String::from).unwrap_or_else(|| "latest".to_string())
        }
        _ => "latest".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_package_and_deps() {
        let content = r#"
[package]
name = "svc"
license = "MIT"

[dependencies]
serde = "1.0"
tokio = { version = "1.37", features = ["full"] }

[dev-dependencies]
tempfile = "3.10"
"#;
        let manifest = parse_cargo_toml(content);
        assert!(manifest.has_package);
        assert_eq!(manifest.name.as_deref(), Some("svc"));
        assert_eq!(manifest.license.as_deref(), Some("MIT"));
        assert_eq!(manifest.dependencies.len(), 3);
        assert!(manifest
            .dependencies
            .contains(&Dependency::new("cargo", "tokio", "1.37")));
    }

    #[test]
    fn test_path_and_git_origins() {
        let content = r#"
[dependencies]
local = { path = "../local", version = "0.1" }
pathonly = { path = "../other" }
pinned = { git = "https://github.com/x/y", rev = "abc123" }
branched = { git = "https://github.com/x/z", branch = "main" }
floating = { git = "https://github.com/x/w" }
"#;
        let manifest = parse_cargo_toml(content);
        let version_of = |name: &str| {
            manifest
                .dependencies
                .iter()
                .find(|d| d.name == name)
                .unwrap()
                .version
                .clone()
        };

        assert_eq!(version_of("local"), "path:../local:0.1");
        assert_eq!(version_of("pathonly"), "path:../other");
        assert_eq!(version_of("pinned"), "git:https://github.com/x/y#abc123");
        assert_eq!(version_of("branched"), "git:https://github.com/x/z#main");
        assert_eq!(version_of("floating"), "git:https://github.com/x/w#latest");
    }

    #[test]
    fn test_workspace_dependencies() {
        let content = r#"
[workspace]
members = ["a", "b"]

[workspace.dependencies]
anyhow = "1.0"
"#;
        let manifest = parse_cargo_toml(content);
        assert!(!manifest.has_package);
        assert_eq!(manifest.dependencies.len(), 1);
    }

    #[test]
    fn test_invalid_toml_is_empty() {
        let manifest = parse_cargo_toml("[package\nbroken");
        assert!(!manifest.has_package);
        assert!(manifest.dependencies.is_empty());
    }
}
