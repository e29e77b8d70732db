//! composer.json parsing

use crate::payload::Dependency;
use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct ComposerPackage {
    pub name: Option<String>,
    pub license: Option<String>,
    pub dependencies: Vec<Dependency>,
}

/// Parses a `composer.json` body: name, license, `require` and
/// `require-dev`. The `php` platform requirement is skipped.
pub fn parse_composer_json(content: &str) -> ComposerPackage {
    let Ok(doc) = serde_json::from_str::<Value>(content) else {
        return ComposerPackage::default();
    };

    let license = match &doc["license"] {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.first().and_then(|v| v.as_str()).map(String::from),
        _ => None,
    };

    let mut package = ComposerPackage {
        name: doc["name"].as_str().map(String::from),
        license,
        ..Default::default()
    };

    for group in ["require", "require-dev"] {
        if let Some(map) = doc[group].as_object() {
            for (name, version) in map {
                if name == "php" || name.starts_with("ext-") {
                    continue;
                }
                let version = version.as_str().unwrap_or("latest");
                let dep = Dependency::new("composer", name.clone(), version);
                if !package.dependencies.contains(&dep) {
                    package.dependencies.push(dep);
                }
            }
        }
    }

    package
}
