//! deno.json / deno.jsonc and import map parsing

use crate::payload::Dependency;
use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct DenoConfig {
    pub name: Option<String>,
    pub dependencies: Vec<Dependency>,
}

/// Parses a `deno.json`/`deno.jsonc` body (line comments are stripped
/// first) and extracts dependencies from the `imports` map. Specifiers of
/// the form `npm:pkg@version` and `jsr:@scope/pkg@version` are
/// normalized; plain URL imports are skipped.
pub fn parse_deno_config(content: &str) -> DenoConfig {
    let stripped = strip_line_comments(content);
    let Ok(doc) = serde_json::from_str::<Value>(&stripped) else {
        return DenoConfig::default();
    };

    let mut config = DenoConfig {
        name: doc["name"].as_str().map(String::from),
        ..Default::default()
    };

    if let Some(imports) = doc["imports"].as_object() {
        for specifier in imports.values().filter_map(|v| v.as_str()) {
            if let Some(dep) = parse_specifier(specifier) {
                if !config.dependencies.contains(&dep) {
                    config.dependencies.push(dep);
                }
            }
        }
    }

    config
}

fn parse_specifier(specifier: &str) -> Option<Dependency> {
    let rest = specifier
        .strip_prefix("npm:")
        .or_else(|| specifier.strip_prefix("jsr:"))?;

    // the version separator is the last '@' that is not the scope marker
    let split_at = rest.rfind('@').filter(|&idx| idx > 0);
    let (name, version) = match split_at {
        Some(idx) => (
            &rest[..idx],
            rest[idx + 1..].trim_start_matches(['^', '~']).to_string(),
        ),
        None => (rest, "latest".to_string()),
    };

    Some(Dependency::new("deno", name, version))
}

/// Removes `//` line comments so jsonc bodies parse as JSON. String
/// contents containing `//` (URLs) are preserved.
fn strip_line_comments(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for line in content.lines() {
        let mut in_string = false;
        let mut prev = '\0';
        let mut cut = line.len();
        for (idx, c) in line.char_indices() {
            match c {
                '"' if prev != '\\' => in_string = !in_string,
                '/' if !in_string && prev == '/' => {
                    cut = idx - 1;
                    break;
                }
                _ => {}
            }
            prev = c;
        }
        out.push_str(&line[..cut]);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_imports() {
        let content = r#"{
  "name": "@acme/tool",
  "imports": {
    "express": "npm:express@^4.18.0",
    "@std/http": "jsr:@std/http@^1.0.0",
    "url-import": "https://deno.land/x/thing/mod.ts"
  }
}"#;
        let config = parse_deno_config(content);
        assert_eq!(config.name.as_deref(), Some("@acme/tool"));
        assert_eq!(config.dependencies.len(), 2);
        assert!(config
            .dependencies
            .contains(&Dependency::new("deno", "express", "4.18.0")));
        assert!(config
            .dependencies
            .contains(&Dependency::new("deno", "@std/http", "1.0.0")));
    }

    #[test]
    fn test_jsonc_comments() {
        let content = "{\n  // tooling config\n  \"imports\": {\n    \"x\": \"npm:x@1.0\" // pinned\n  }\n}";
        let config = parse_deno_config(content);
        assert_eq!(config.dependencies.len(), 1);
    }

    #[test]
    fn test_urls_in_strings_survive_comment_stripping() {
        let content = r#"{"imports": {"m": "https://deno.land/x/m/mod.ts"}}"#;
        let config = parse_deno_config(content);
        assert!(config.dependencies.is_empty()); // url imports skipped, but parse succeeded
        assert!(config.name.is_none());
    }

    #[test]
    fn test_unversioned_specifier() {
        let config = parse_deno_config(r#"{"imports": {"oak": "jsr:@oak/oak"}}"#);
        assert_eq!(config.dependencies[0].version, "latest");
    }
}
