//! Embedded corpus loading and validation
//!
//! The corpus is a set of YAML documents compiled into the binary. Loading
//! happens once at startup; any malformed document is fatal before the
//! scan produces side effects.

use super::model::{compile_pattern, Content, Rule, TypesConfig};
use crate::error::ConfigError;
use std::collections::BTreeMap;
use tracing::debug;

const CORPUS: &[(&str, &str)] = &[
    ("languages.yaml", include_str!("corpus/languages.yaml")),
    ("databases.yaml", include_str!("corpus/databases.yaml")),
    ("frameworks.yaml", include_str!("corpus/frameworks.yaml")),
    ("tooling.yaml", include_str!("corpus/tooling.yaml")),
    ("hosting.yaml", include_str!("corpus/hosting.yaml")),
    ("saas.yaml", include_str!("corpus/saas.yaml")),
];

const TYPES_DOC: &str = include_str!("corpus/_types.yaml");

/// The loaded, validated rule corpus with a tech → first-carrier index.
pub struct RuleSet {
    rules: Vec<Rule>,
    by_tech: BTreeMap<String, usize>,
}

impl RuleSet {
    /// Builds a rule set from already-parsed rules, running the same
    /// validation as the embedded corpus.
    pub fn from_rules(rules: Vec<Rule>) -> Result<Self, ConfigError> {
        for rule in &rules {
            validate_rule("<inline>", rule)?;
        }
        check_carrier_agreement(&rules)?;

        let mut by_tech = BTreeMap::new();
        for (idx, rule) in rules.iter().enumerate() {
            by_tech.entry(rule.tech.clone()).or_insert(idx);
        }

        Ok(Self { rules, by_tech })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// First carrier of a tech slug. Carriers of the same slug agree on
    /// name and type, so the first one is authoritative for both.
    pub fn find(&self, tech: &str) -> Option<&Rule> {
        self.by_tech.get(tech).map(|&idx| &self.rules[idx])
    }

    /// All carriers of a tech slug.
    pub fn carriers<'a>(&'a self, tech: &'a str) -> impl Iterator<Item = &'a Rule> {
        self.rules.iter().filter(move |r| r.tech == tech)
    }

    /// True when any carrier of this tech declares content predicates.
    pub fn has_content_rules(&self, tech: &str) -> bool {
        self.carriers(tech).any(|r| r.has_content_rules())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Loads and validates the full embedded corpus.
pub fn load_rules() -> Result<RuleSet, ConfigError> {
    let mut rules = Vec::new();

    for (file, body) in CORPUS {
        let parsed: Vec<Rule> =
            serde_yaml::from_str(body).map_err(|e| ConfigError::RuleLoad {
                file: file.to_string(),
                reason: e.to_string(),
            })?;

        for rule in &parsed {
            validate_rule(file, rule)?;
        }
        rules.extend(parsed);
    }

    check_carrier_agreement(&rules)?;

    let mut by_tech = BTreeMap::new();
    for (idx, rule) in rules.iter().enumerate() {
        by_tech.entry(rule.tech.clone()).or_insert(idx);
    }

    debug!(rules = rules.len(), techs = by_tech.len(), "rule corpus loaded");

    Ok(RuleSet { rules, by_tech })
}

/// Loads the `type → {is_component, description}` configuration.
pub fn load_types_config() -> Result<TypesConfig, ConfigError> {
    serde_yaml::from_str(TYPES_DOC).map_err(|e| ConfigError::TypeConfig(e.to_string()))
}

fn validate_rule(file: &str, rule: &Rule) -> Result<(), ConfigError> {
    if rule.tech.is_empty() {
        return Err(ConfigError::RuleLoad {
            file: file.to_string(),
            reason: "rule with empty tech slug".to_string(),
        });
    }

    if rule.rule_type.is_empty()
        || !rule
            .rule_type
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ConfigError::RuleLoad {
            file: file.to_string(),
            reason: format!("rule '{}' has invalid type '{}'", rule.tech, rule.rule_type),
        });
    }

    for dep in &rule.dependencies {
        compile_pattern(&dep.name).map_err(|e| ConfigError::Regex {
            tech: rule.tech.clone(),
            pattern: dep.name.clone(),
            reason: e.to_string(),
        })?;
    }

    for content in &rule.content {
        if content.needs_rule_scope() && rule.extensions.is_empty() {
            return Err(ConfigError::RuleLoad {
                file: file.to_string(),
                reason: format!(
                    "rule '{}' has a content predicate with neither its own scope nor rule extensions",
                    rule.tech
                ),
            });
        }

        match content {
            Content::Regex { pattern, .. } => {
                regex::Regex::new(pattern).map_err(|e| ConfigError::Regex {
                    tech: rule.tech.clone(),
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })?;
            }
            Content::JsonPath { value, .. }
            | Content::YamlPath { value, .. }
            | Content::XmlPath { value, .. } => {
                if let Some(value) = value {
                    compile_pattern(value).map_err(|e| ConfigError::Regex {
                        tech: rule.tech.clone(),
                        pattern: value.clone(),
                        reason: e.to_string(),
                    })?;
                }
            }
        }
    }

    Ok(())
}

/// Duplicate tech slugs are allowed (category splitting), but every carrier
/// must agree on display name and type.
fn check_carrier_agreement(rules: &[Rule]) -> Result<(), ConfigError> {
    let mut seen: BTreeMap<&str, (&str, &str)> = BTreeMap::new();

    for rule in rules {
        match seen.get(rule.tech.as_str()) {
            Some((name, rule_type)) => {
                if *name != rule.name {
                    return Err(ConfigError::RuleConflict {
                        tech: rule.tech.clone(),
                        reason: format!("name '{}' vs '{}'", name, rule.name),
                    });
                }
                if *rule_type != rule.rule_type {
                    return Err(ConfigError::RuleConflict {
                        tech: rule.tech.clone(),
                        reason: format!("type '{}' vs '{}'", rule_type, rule.rule_type),
                    });
                }
            }
            None => {
                seen.insert(&rule.tech, (&rule.name, &rule.rule_type));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_corpus_loads() {
        let rules = load_rules().unwrap();
        assert!(rules.len() > 50);
        assert!(rules.find("postgresql").is_some());
        assert!(rules.find("nodejs").is_some());
        assert!(rules.find("no-such-tech").is_none());
    }

    #[test]
    fn test_types_config_loads() {
        let types = load_types_config().unwrap();
        assert_eq!(types.is_component("db"), Some(true));
        assert_eq!(types.is_component("language"), Some(false));
    }

    #[test]
    fn test_corpus_types_are_known() {
        let rules = load_rules().unwrap();
        let types = load_types_config().unwrap();
        for rule in rules.iter() {
            assert!(
                types.is_component(&rule.rule_type).is_some(),
                "rule '{}' uses undeclared type '{}'",
                rule.tech,
                rule.rule_type
            );
        }
    }

    #[test]
    fn test_validate_rejects_empty_tech() {
        let rule: Rule = serde_yaml::from_str("{tech: '', name: X, type: db}").unwrap();
        assert!(validate_rule("x.yaml", &rule).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_type() {
        let rule: Rule = serde_yaml::from_str("{tech: x, name: X, type: 'not a type'}").unwrap();
        assert!(validate_rule("x.yaml", &rule).is_err());
    }

    #[test]
    fn test_validate_rejects_unscoped_content() {
        let yaml = r#"
tech: x
name: X
type: db
content:
  - type: regex
    pattern: abc
"#;
        let rule: Rule = serde_yaml::from_str(yaml).unwrap();
        assert!(validate_rule("x.yaml", &rule).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_regex() {
        let yaml = r#"
tech: x
name: X
type: db
dependencies:
  - type: npm
    name: '/([unclosed/'
"#;
        let rule: Rule = serde_yaml::from_str(yaml).unwrap();
        assert!(validate_rule("x.yaml", &rule).is_err());
    }

    #[test]
    fn test_carrier_conflict_detected() {
        let a: Rule = serde_yaml::from_str("{tech: x, name: X, type: db}").unwrap();
        let b: Rule = serde_yaml::from_str("{tech: x, name: Y, type: db}").unwrap();
        assert!(check_carrier_agreement(&[a, b]).is_err());
    }

    #[test]
    fn test_carrier_split_allowed_when_agreeing() {
        let a: Rule = serde_yaml::from_str("{tech: x, name: X, type: db}").unwrap();
        let b: Rule = serde_yaml::from_str("{tech: x, name: X, type: db}").unwrap();
        assert!(check_carrier_agreement(&[a, b]).is_ok());
    }
}
