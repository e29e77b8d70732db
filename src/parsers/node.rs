//! package.json parsing

use crate::payload::Dependency;
use serde_json::Value;

const RECOGNIZED_SCRIPTS: &[&str] = &["build", "start", "dev", "test", "lint", "format"];

#[derive(Debug, Clone, Default)]
pub struct NodePackage {
    pub name: Option<String>,
    pub license: Option<String>,
    pub dependencies: Vec<Dependency>,
    pub scripts: Vec<String>,
}

/// Parses a `package.json` body. Dependencies come from `dependencies`,
/// `devDependencies`, and `peerDependencies`, in that order.
pub fn parse_package_json(content: &str) -> NodePackage {
    let Ok(doc) = serde_json::from_str::<Value>(content) else {
        return NodePackage::default();
    };

    let mut package = NodePackage {
        name: doc["name"].as_str().map(String::from),
        license: doc["license"].as_str().map(String::from),
        ..Default::default()
    };

    for group in ["dependencies", "devDependencies", "peerDependencies"] {
        if let Some(map) = doc[group].as_object() {
            for (name, version) in map {
                let version = version.as_str().unwrap_or("latest");
                let dep = Dependency::new("npm", name.clone(), version);
                if !package.dependencies.contains(&dep) {
                    package.dependencies.push(dep);
                }
            }
        }
    }

    if let Some(scripts) = doc["scripts"].as_object() {
        for script in RECOGNIZED_SCRIPTS {
            if scripts.contains_key(*script) {
                package.scripts.push(script.to_string());
            }
        }
    }

    package
}
