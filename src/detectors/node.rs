//! Node.js component detection (package.json)

use super::{ComponentDetector, Detection, DetectorContext};
use crate::parsers::parse_package_json;
use crate::payload::Payload;

pub struct NodeDetector;

impl ComponentDetector for NodeDetector {
    fn name(&self) -> &'static str {
        "nodejs"
    }

    fn detect(&self, ctx: &DetectorContext) -> Vec<Detection> {
        let Some(file) = ctx.files.iter().find(|f| f.name == "package.json") else {
            return Vec::new();
        };
        let Some(content) = ctx.read(&file.name) else {
            return Vec::new();
        };

        let package = parse_package_json(&content);
        let name = package.name.unwrap_or_else(|| ctx.directory_name());

        let mut payload = Payload::with_path(name, ctx.relative_path(&file.name));
        payload.add_primary_tech("nodejs");
        payload.add_reason("matched file: package.json");

        if let Some(license) = &package.license {
            payload.add_license(license);
        }

        let names: Vec<String> = package.dependencies.iter().map(|d| d.name.clone()).collect();
        for (tech, reasons) in ctx.resolver.match_dependencies(&names, "npm") {
            if tech == "nodejs" {
                continue;
            }
            for reason in reasons {
                payload.add_tech(&tech, &reason);
            }
        }

        for dep in package.dependencies {
            payload.add_dependency(dep);
        }

        vec![Detection::Named(payload)]
    }
}
