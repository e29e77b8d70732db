//! pyproject.toml parsing

use crate::payload::Dependency;
use regex::Regex;
use std::sync::OnceLock;
use toml::Value;

#[derive(Debug, Clone, Default)]
pub struct PyProject {
    pub name: Option<String>,
    pub license: Option<String>,
    pub dependencies: Vec<Dependency>,
}

fn spec_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // name, optional extras, optional comparator + version
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z0-9._-]+)(?:\[[^\]]*\])?\s*(?:[><=!~]+\s*([0-9][^,;\s]*))?")
            .expect("valid regex")
    })
}

/// Parses a `pyproject.toml` body: `[project]` name and license plus
/// dependency specs from `project.dependencies` and
/// `[tool.poetry.dependencies]`.
pub fn parse_pyproject(content: &str) -> PyProject {
    let Ok(doc) = content.parse::<Value>() else {
        return PyProject::default();
    };

    let mut project = PyProject::default();

    if let Some(table) = doc.get("project") {
        project.name = table
            .get("name")
            .and_then(|v| v.as_str())
            .map(String::from);
        project.license = extract_license(table.get("license"));

        if let Some(deps) = table.get("dependencies").and_then(|v| v.as_array()) {
            for entry in deps.iter().filter_map(|v| v.as_str()) {
                if let Some(dep) = parse_requirement(entry) {
                    project.dependencies.push(dep);
                }
            }
        }
    }

    if let Some(poetry_deps) = doc
        .get("tool")
        .and_then(|t| t.get("poetry"))
        .and_then(|p| p.get("dependencies"))
        .and_then(|d| d.as_table())
    {
        for (name, version) in poetry_deps {
            if name == "python" {
                continue;
            }
            let version = match version {
                Value::String(s) => s.trim_start_matches(['^', '~', '>', '=', '<']).to_string(),
                Value::Table(t) => t
                    .get("version")
                    .and_then(|v| v.as_str())
                    .map(|s| s.trim_start_matches(['^', '~', '>', '=', '<']).to_string())
                    .unwrap_or_else(|| "latest".to_string()),
                _ => "latest".to_string(),
            };
            let dep = Dependency::new("python", name.clone(), version);
            if !project.dependencies.contains(&dep) {
                project.dependencies.push(dep);
            }
        }

        if project.name.is_none() {
            project.name = doc
                .get("tool")
                .and_then(|t| t.get("poetry"))
                .and_then(|p| p.get("name"))
                .and_then(|v| v.as_str())
                .map(String::from);
        }
    }

    project
}

/// Accepts bare names and `name>=x.y` style specs.
fn parse_requirement(entry: &str) -> Option<Dependency> {
    let entry = entry.trim();
    if entry.is_empty() || entry.starts_with('#') {
        return None;
    }

    let caps = spec_regex().captures(entry)?;
    let name = caps.get(1)?.as_str();
    let version = caps
        .get(2)
        .map(|v| v.as_str().to_string())
        .unwrap_or_else(|| "latest".to_string());

    Some(Dependency::new("python", name, version))
}

fn extract_license(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Table(t) => t.get("text").and_then(|v| v.as_str()).map(String::from),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pep621_project() {
        let content = r#"
[project]
name = "api"
license = "MIT"
dependencies = [
    "fastapi>=0.110.0",
    "uvicorn[standard]>=0.29.0",
    "psycopg2",
]
"#;
        let project = parse_pyproject(content);
        assert_eq!(project.name.as_deref(), Some("api"));
        assert_eq!(project.license.as_deref(), Some("MIT"));
        assert_eq!(project.dependencies.len(), 3);
        assert_eq!(project.dependencies[0].name, "fastapi");
        assert_eq!(project.dependencies[0].version, "0.110.0");
        assert_eq!(project.dependencies[1].name, "uvicorn");
        assert_eq!(project.dependencies[2].version, "latest");
    }

    #[test]
    fn test_parse_poetry_table() {
        let content = r#"
[tool.poetry]
name = "worker"

[tool.poetry.dependencies]
python = "^3.11"
django = "^5.0"
redis = { version = "^5.0", extras = ["hiredis"] }
"#;
        let project = parse_pyproject(content);
        assert_eq!(project.name.as_deref(), Some("worker"));
        assert_eq!(project.dependencies.len(), 2);
        assert!(project
            .dependencies
            .iter()
            .any(|d| d.name == "django" && d.version == "5.0"));
        assert!(project
            .dependencies
            .iter()
            .any(|d| d.name == "redis" && d.version == "5.0"));
    }

    #[test]
    fn test_license_table_form() {
        let content = "[project]\nname = \"x\"\nlicense = { text = \"Apache-2.0\" }\n";
        let project = parse_pyproject(content);
        assert_eq!(project.license.as_deref(), Some("Apache-2.0"));
    }

    #[test]
    fn test_invalid_toml_is_empty() {
        let project = parse_pyproject("[[[ nope");
        assert!(project.name.is_none());
    }
}
