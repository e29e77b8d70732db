//! Roll-up of the payload tree into flat projections

use crate::payload::{Dependency, Payload};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

pub const VALID_FIELDS: &[&str] = &[
    "tech",
    "techs",
    "languages",
    "licenses",
    "dependencies",
    "all",
];

/// Flattened projection of a scan result.
#[derive(Debug, Default, Serialize)]
pub struct AggregateOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tech: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub techs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<BTreeMap<String, u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub licenses: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<Dependency>>,
}

pub struct Aggregator {
    fields: BTreeSet<String>,
}

impl Aggregator {
    /// Builds an aggregator for the requested fields; `all` expands to the
    /// full set. Unknown fields are rejected.
    pub fn new(fields: &[String]) -> Result<Self, String> {
        let mut selected = BTreeSet::new();

        for field in fields {
            if !VALID_FIELDS.contains(&field.as_str()) {
                return Err(format!(
                    "invalid aggregate field: {}. Valid fields: {}",
                    field,
                    VALID_FIELDS.join(", ")
                ));
            }
            if field == "all" {
                for valid in VALID_FIELDS.iter().filter(|f| **f != "all") {
                    selected.insert(valid.to_string());
                }
            } else {
                selected.insert(field.clone());
            }
        }

        Ok(Self { fields: selected })
    }

    pub fn aggregate(&self, payload: &Payload) -> AggregateOutput {
        let mut output = AggregateOutput::default();

        if self.fields.contains("tech") {
            let mut set = BTreeSet::new();
            collect(payload, &mut |p| {
                set.extend(p.tech.iter().filter(|t| !t.is_empty()).cloned())
            });
            output.tech = Some(set.into_iter().collect());
        }

        if self.fields.contains("techs") {
            let mut set = BTreeSet::new();
            collect(payload, &mut |p| set.extend(p.techs.iter().cloned()));
            output.techs = Some(set.into_iter().collect());
        }

        if self.fields.contains("languages") {
            let mut languages: BTreeMap<String, u64> = BTreeMap::new();
            collect(payload, &mut |p| {
                for (lang, count) in &p.languages {
                    *languages.entry(lang.clone()).or_insert(0) += count;
                }
            });
            output.languages = Some(languages);
        }

        if self.fields.contains("licenses") {
            let mut set = BTreeSet::new();
            collect(payload, &mut |p| set.extend(p.licenses.iter().cloned()));
            output.licenses = Some(set.into_iter().collect());
        }

        if self.fields.contains("dependencies") {
            let mut unique: BTreeMap<(String, String, String), Dependency> = BTreeMap::new();
            collect(payload, &mut |p| {
                for dep in &p.dependencies {
                    unique
                        .entry((dep.dep_type.clone(), dep.name.clone(), dep.version.clone()))
                        .or_insert_with(|| dep.clone());
                }
            });
            output.dependencies = Some(unique.into_values().collect());
        }

        output
    }
}

fn collect(payload: &Payload, visit: &mut impl FnMut(&Payload)) {
    visit(payload);
    for child in &payload.childs {
        collect(child, visit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> Payload {
        let mut root = Payload::with_path("main", "/");
        root.add_language_count("YAML", 2);
        root.add_license("MIT");

        let mut svc = Payload::with_path("svc", "/svc/package.json");
        svc.add_primary_tech("nodejs");
        svc.add_tech("express", "matched dependency: express");
        svc.add_language_count("JavaScript", 5);
        svc.add_dependency(Dependency::new("npm", "express", "^4.18.0"));

        let mut db = Payload::with_path("PostgreSQL", "/svc/package.json");
        db.add_primary_tech("postgresql");
        db.add_dependency(Dependency::new("npm", "pg", "^8.8.0"));
        svc.add_child(db);

        root.add_child(svc);
        root
    }

    #[test]
    fn test_aggregate_all_fields() {
        let agg = Aggregator::new(&["all".to_string()]).unwrap();
        let output = agg.aggregate(&sample_tree());

        assert_eq!(
            output.tech,
            Some(vec!["nodejs".to_string(), "postgresql".to_string()])
        );
        let techs = output.techs.unwrap();
        assert!(techs.contains(&"express".to_string()));
        assert_eq!(output.languages.unwrap()["JavaScript"], 5);
        assert_eq!(output.licenses, Some(vec!["MIT".to_string()]));
        assert_eq!(output.dependencies.unwrap().len(), 2);
    }

    #[test]
    fn test_aggregate_selected_fields_only() {
        let agg = Aggregator::new(&["languages".to_string()]).unwrap();
        let output = agg.aggregate(&sample_tree());

        assert!(output.tech.is_none());
        assert!(output.languages.is_some());
    }

    #[test]
    fn test_invalid_field_rejected() {
        assert!(Aggregator::new(&["bogus".to_string()]).is_err());
    }

    #[test]
    fn test_dependencies_unique_and_sorted() {
        let mut root = sample_tree();
        // same dependency appearing on the root must not duplicate
        root.add_dependency(Dependency::new("npm", "express", "^4.18.0"));

        let agg = Aggregator::new(&["dependencies".to_string()]).unwrap();
        let deps = agg.aggregate(&root).dependencies.unwrap();

        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].name, "express");
        assert_eq!(deps[1].name, "pg");
    }

    #[test]
    fn test_aggregation_is_stable() {
        let tree = sample_tree();
        let agg = Aggregator::new(&["all".to_string()]).unwrap();

        let first = serde_json::to_value(agg.aggregate(&tree)).unwrap();
        let second = serde_json::to_value(agg.aggregate(&tree)).unwrap();
        assert_eq!(first, second);
    }
}
