//! PHP component detection (composer.json)

use super::{ComponentDetector, Detection, DetectorContext};
use crate::parsers::parse_composer_json;
use crate::payload::Payload;

pub struct PhpDetector;

impl ComponentDetector for PhpDetector {
    fn name(&self) -> &'static str {
        "php"
    }

    fn detect(&self, ctx: &DetectorContext) -> Vec<Detection> {
        let Some(file) = ctx.files.iter().find(|f| f.name == "composer.json") else {
            return Vec::new();
        };
        let Some(content) = ctx.read(&file.name) else {
            return Vec::new();
        };

        let package = parse_composer_json(&content);
        let name = package.name.unwrap_or_else(|| ctx.directory_name());

        let mut payload = Payload::with_path(name, ctx.relative_path(&file.name));
        payload.add_primary_tech("php");
        payload.add_reason("matched file: composer.json");

        if let Some(license) = &package.license {
            payload.add_license(license);
        }

        let names: Vec<String> = package.dependencies.iter().map(|d| d.name.clone()).collect();
        for (tech, reasons) in ctx.resolver.match_dependencies(&names, "composer") {
            if tech == "php" {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deps::DependencyResolver;
    use crate::fs::{FileSystem, MockFileSystem};
    use crate::rules::load_rules;
    use std::path::Path;

    #[test]
    fn test_detects_composer_project() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "composer.json",
            r#"{"name": "acme/shop", "require": {"laravel/framework": "^11.0"}}"#,
        );

        let rules = load_rules().unwrap();
        let resolver = DependencyResolver::from_rules(&rules);
        let files = fs.read_dir(Path::new("/mock")).unwrap();
        let ctx = DetectorContext {
            files: &files,
            current_path: Path::new("/mock"),
            base_path: Path::new("/mock"),
            fs: &fs,
            resolver: &resolver,
            rules: &rules,
        };

        let detections = PhpDetector.detect(&ctx);
        let Detection::Named(payload) = &detections[0] else {
            panic!("expected named payload");
        };

        assert_eq!(payload.name, "acme/shop");
        assert_eq!(payload.tech, vec!["php"]);
        assert!(payload.techs.contains(&"laravel".to_string()));
    }
}
