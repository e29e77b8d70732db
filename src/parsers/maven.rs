//! Maven POM parsing

use crate::payload::Dependency;
use roxmltree::Document;
use std::collections::BTreeMap;

/// Extracted `pom.xml` data.
#[derive(Debug, Clone, Default)]
pub struct PomProject {
    /// `groupId:artifactId` when both present, else the artifactId
    pub name: Option<String>,
    pub dependencies: Vec<Dependency>,
}

/// Parses a `pom.xml` body. Dependency versions are resolved one level
/// through `<properties>`; a `${…}` referencing another `${…}` stays
/// literal.
pub fn parse_pom(content: &str) -> PomProject {
    let Ok(doc) = Document::parse(content) else {
        return PomProject::default();
    };
    let root = doc.root_element();

    let mut group_id = None;
    let mut artifact_id = None;
    let mut properties: BTreeMap<String, String> = BTreeMap::new();

    for child in root.children().filter(|c| c.is_element()) {
        if child.has_tag_name("groupId") {
            group_id = child.text().map(|s| s.trim().to_string());
        } else if child.has_tag_name("artifactId") {
            artifact_id = child.text().map(|s| s.trim().to_string());
        } else if child.has_tag_name("properties") {
            for prop in child.children().filter(|c| c.is_element()) {
                if let Some(value) = prop.text() {
                    properties.insert(prop.tag_name().name().to_string(), value.trim().to_string());
                }
            }
        }
    }

    let name = match (&group_id, &artifact_id) {
        (Some(g), Some(a)) => Some(format!("{}:{}", g, a)),
        (None, Some(a)) => Some(a.clone()),
        _ => None,
    };

    let mut dependencies = Vec::new();
    for node in root.descendants() {
        if !node.has_tag_name("dependency") {
            continue;
        }

        let field = |tag: &str| {
            node.children()
                .find(|c| c.has_tag_name(tag))
                .and_then(|c| c.text())
                .map(|s| s.trim().to_string())
        };

        let (Some(group), Some(artifact)) = (field("groupId"), field("artifactId")) else {
            continue;
        };

        let version = match field("version") {
            Some(v) => resolve_property(&v, &properties),
            None => "latest".to_string(),
        };

        dependencies.push(Dependency::new(
            "maven",
            format!("{}:{}", group, artifact),
            version,
        ));
    }

    PomProject { name, dependencies }
}

/// One-level `${…}` lookup; unresolved references are left literal.
fn resolve_property(value: &str, properties: &BTreeMap<String, String>) -> String {
    if let Some(key) = value
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
    {
        if let Some(resolved) = properties.get(key) {
            return resolved.clone();
        }
    }
    value.to_string()
}
