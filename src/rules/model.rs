//! Typed rule model
//!
//! Rules are loaded once from the embedded YAML corpus and are immutable
//! afterwards. Pattern strings come in two forms: `/…/` compiles as a raw
//! regex, anything else matches as an exact literal.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single technology detection rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    /// Unique technology slug, e.g. `postgresql`
    pub tech: String,
    /// Display name, e.g. `PostgreSQL`
    pub name: String,
    /// Category, e.g. `db`, `framework`, `hosting`
    #[serde(rename = "type")]
    pub rule_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Free-form structured metadata, surfaced verbatim in output
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, serde_json::Value>,
    /// Overrides the type-level component decision when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_component: Option<bool>,
    /// Overrides the primary-tech decision when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_primary_tech: Option<bool>,
    /// Environment variable prefixes matched against `.env*` keys
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dotenv: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<DependencyPattern>,
    /// Exact names, `/`-bearing path suffixes, or regex-bearing patterns
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Content>,
}

impl Rule {
    pub fn has_content_rules(&self) -> bool {
        !self.content.is_empty()
    }
}

/// Dependency pattern carried by a rule: `(dep_type, name_pattern, example)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyPattern {
    #[serde(rename = "type")]
    pub dep_type: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

/// Content predicate: one of regex-on-body or a structured-path lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Content {
    /// Regex matched against the raw file body
    Regex {
        pattern: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        extensions: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        files: Vec<String>,
    },
    /// Dotted path into a JSON document; matches on existence or value
    JsonPath {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
        files: Vec<String>,
    },
    /// Dotted path into a YAML document
    YamlPath {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
        files: Vec<String>,
    },
    /// Slash-separated element path into an XML document
    XmlPath {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
        files: Vec<String>,
    },
}

impl Content {
    /// Files this predicate is scoped to, if any.
    pub fn files(&self) -> &[String] {
        match self {
            Content::Regex { files, .. }
            | Content::JsonPath { files, .. }
            | Content::YamlPath { files, .. }
            | Content::XmlPath { files, .. } => files,
        }
    }

    /// Extensions this predicate is scoped to (regex predicates only).
    pub fn extensions(&self) -> &[String] {
        match self {
            Content::Regex { extensions, .. } => extensions,
            _ => &[],
        }
    }

    /// True when the predicate names no file or extension scope of its own
    /// and therefore needs the rule's top-level extensions.
    pub fn needs_rule_scope(&self) -> bool {
        self.files().is_empty() && self.extensions().is_empty()
    }
}

/// Per-type component classification from `_types.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDefinition {
    pub is_component: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The full `type → definition` map. Types not present default to
/// non-component.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypesConfig {
    pub types: BTreeMap<String, TypeDefinition>,
}

impl TypesConfig {
    pub fn is_component(&self, rule_type: &str) -> Option<bool> {
        self.types.get(rule_type).map(|t| t.is_component)
    }
}

/// Compiles a rule pattern. `/…/` is taken as a raw regex; anything else is
/// anchored as an exact literal after metacharacter escaping.
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    if pattern.len() > 2 && pattern.starts_with('/') && pattern.ends_with('/') {
        Regex::new(&pattern[1..pattern.len() - 1])
    } else {
        Regex::new(&format!("^{}$", regex::escape(pattern)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_literal_pattern() {
        let re = compile_pattern("pg").unwrap();
        assert!(re.is_match("pg"));
        assert!(!re.is_match("pg-promise"));
        assert!(!re.is_match("apg"));
    }

    #[test]
    fn test_compile_literal_escapes_metacharacters() {
        let re = compile_pattern("socket.io").unwrap();
        assert!(re.is_match("socket.io"));
        assert!(!re.is_match("socketxio"));
    }

    #[test]
    fn test_compile_regex_pattern() {
        let re = compile_pattern("/^@aws-sdk\\//").unwrap();
        assert!(re.is_match("@aws-sdk/client-s3"));
        assert!(!re.is_match("aws-sdk"));
    }

    #[test]
    fn test_rule_deserializes_from_yaml() {
        let yaml = r#"
tech: postgresql
name: PostgreSQL
type: db
dependencies:
  - type: npm
    name: pg
    example: 8.8.0
  - type: docker
    name: /^postgres$/
dotenv:
  - POSTGRES_
"#;
        let rule: Rule = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rule.tech, "postgresql");
        assert_eq!(rule.rule_type, "db");
        assert_eq!(rule.dependencies.len(), 2);
        assert_eq!(rule.dotenv, vec!["POSTGRES_"]);
        assert!(rule.is_component.is_none());
    }

    #[test]
    fn test_content_tagged_variants() {
        let yaml = r#"
- type: regex
  pattern: '#include <afx'
  extensions: ['.cpp', '.h', '.hpp']
- type: json-path
  path: $schema
  value: https://ui.shadcn.com/schema.json
  files: [components.json]
"#;
        let content: Vec<Content> = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(content[0], Content::Regex { .. }));
        assert!(matches!(content[1], Content::JsonPath { .. }));
        assert!(!content[0].needs_rule_scope());
    }

    #[test]
    fn test_unknown_content_type_fails() {
        let yaml = r#"
- type: binary-sniff
  pattern: abc
"#;
        let parsed: Result<Vec<Content>, _> = serde_yaml::from_str(yaml);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_types_config_lookup() {
        let yaml = r#"
types:
  db:
    is_component: true
    description: Databases
  framework:
    is_component: false
"#;
        let config: TypesConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.is_component("db"), Some(true));
        assert_eq!(config.is_component("framework"), Some(false));
        assert_eq!(config.is_component("unheard_of"), None);
    }
}
