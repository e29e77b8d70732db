//! Component and primary-tech classification
//!
//! Decides, for a detected rule, whether the detection creates a component
//! in the tree and whether the tech is promoted to primary. Precedence is
//! rule override, then type configuration, then false. There is no
//! hard-coded type list here; everything is table-driven.

use crate::rules::{Rule, TypesConfig};

pub struct Classifier {
    types: TypesConfig,
}

impl Classifier {
    pub fn new(types: TypesConfig) -> Self {
        Self { types }
    }

    pub fn types(&self) -> &TypesConfig {
        &self.types
    }

    /// Does a detection of this rule create a component?
    pub fn creates_component(&self, rule: &Rule) -> bool {
        if let Some(explicit) = rule.is_component {
            return explicit;
        }
        self.types.is_component(&rule.rule_type).unwrap_or(false)
    }

    /// Is this rule's tech promoted into the enclosing `tech[]`?
    pub fn is_primary_tech(&self, rule: &Rule) -> bool {
        if let Some(explicit) = rule.is_primary_tech {
            return explicit;
        }
        self.creates_component(rule)
    }

    /// Edges are drawn to every implicit component except hosting and
    /// cloud targets.
    pub fn creates_edge(&self, rule: &Rule) -> bool {
        rule.rule_type != "hosting" && rule.rule_type != "cloud"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Rule;

    fn types() -> TypesConfig {
        serde_yaml::from_str(
            r#"
types:
  db:
    is_component: true
  framework:
    is_component: false
  hosting:
    is_component: true
  cloud:
    is_component: true
"#,
        )
        .unwrap()
    }

    fn rule(yaml: &str) -> Rule {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_type_config_drives_default() {
        let c = Classifier::new(types());
        assert!(c.creates_component(&rule("{tech: postgresql, name: PostgreSQL, type: db}")));
        assert!(!c.creates_component(&rule("{tech: express, name: Express, type: framework}")));
    }

    #[test]
    fn test_unknown_type_defaults_to_non_component() {
        let c = Classifier::new(types());
        assert!(!c.creates_component(&rule("{tech: x, name: X, type: exotic}")));
    }

    #[test]
    fn test_rule_override_beats_type_config() {
        let c = Classifier::new(types());
        assert!(!c.creates_component(&rule(
            "{tech: x, name: X, type: db, is_component: false}"
        )));
        assert!(c.creates_component(&rule(
            "{tech: x, name: X, type: framework, is_component: true}"
        )));
    }

    #[test]
    fn test_primary_follows_component_by_default() {
        let c = Classifier::new(types());
        assert!(c.is_primary_tech(&rule("{tech: x, name: X, type: db}")));
        assert!(!c.is_primary_tech(&rule("{tech: x, name: X, type: framework}")));
    }

    #[test]
    fn test_primary_override() {
        let c = Classifier::new(types());
        // component, but explicitly not primary
        assert!(!c.is_primary_tech(&rule(
            "{tech: x, name: X, type: db, is_primary_tech: false}"
        )));
        // not a component, but explicitly primary
        assert!(c.is_primary_tech(&rule(
            "{tech: x, name: X, type: framework, is_primary_tech: true}"
        )));
    }

    #[test]
    fn test_edges_skip_hosting_and_cloud() {
        let c = Classifier::new(types());
        assert!(c.creates_edge(&rule("{tech: x, name: X, type: db}")));
        assert!(!c.creates_edge(&rule("{tech: x, name: X, type: hosting}")));
        assert!(!c.creates_edge(&rule("{tech: x, name: X, type: cloud}")));
    }
}
