//! Go component detection (go.mod)

use super::{ComponentDetector, Detection, DetectorContext};
use crate::parsers::parse_go_mod;
use crate::payload::Payload;

pub struct GoDetector;

impl ComponentDetector for GoDetector {
    fn name(&self) -> &'static str {
        "golang"
    }

    fn detect(&self, ctx: &DetectorContext) -> Vec<Detection> {
        let Some(file) = ctx.files.iter().find(|f| f.name == "go.mod") else {
            return Vec::new();
        };
        let Some(content) = ctx.read(&file.name) else {
            return Vec::new();
        };

        let module = parse_go_mod(&content);
        let name = module
            .module
            .as_deref()
            .and_then(|m| m.rsplit('/').next())
            .map(String::from)
            .unwrap_or_else(|| ctx.directory_name());

        let mut payload = Payload::with_path(name, ctx.relative_path(&file.name));
        payload.add_primary_tech("golang");
        payload.add_reason("matched file: go.mod");

        let names: Vec<String> = module.dependencies.iter().map(|d| d.name.clone()).collect();
        for (tech, reasons) in ctx.resolver.match_dependencies(&names, "golang") {
            if tech == "golang" {
                continue;
            }
            for reason in reasons {
                payload.add_tech(&tech, &reason);
            }
        }

        for dep in module.dependencies {
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
    fn test_detects_go_module() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "go.mod",
            "module github.com/acme/gateway\n\ngo 1.22\n\nrequire github.com/gin-gonic/gin v1.9.1\n",
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

        let detections = GoDetector.detect(&ctx);
        let Detection::Named(payload) = &detections[0] else {
            panic!("expected named payload");
        };

        assert_eq!(payload.name, "gateway");
        assert_eq!(payload.tech, vec!["golang"]);
        assert!(payload.techs.contains(&"gin".to_string()));
    }
}
