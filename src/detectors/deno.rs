//! Deno component detection (deno.json / deno.jsonc)

use super::{ComponentDetector, Detection, DetectorContext};
use crate::parsers::parse_deno_config;
use crate::payload::Payload;

pub struct DenoDetector;

impl ComponentDetector for DenoDetector {
    fn name(&self) -> &'static str {
        "deno"
    }

    fn detect(&self, ctx: &DetectorContext) -> Vec<Detection> {
        let Some(file) = ctx
            .files
            .iter()
            .find(|f| f.name == "deno.json" || f.name == "deno.jsonc")
        else {
            return Vec::new();
        };
        let Some(content) = ctx.read(&file.name) else {
            return Vec::new();
        };

        let config = parse_deno_config(&content);
        let name = config.name.unwrap_or_else(|| ctx.directory_name());

        let mut payload = Payload::with_path(name, ctx.relative_path(&file.name));
        payload.add_primary_tech("deno");
        payload.add_reason(&format!("matched file: {}", file.name));

        let names: Vec<String> = config.dependencies.iter().map(|d| d.name.clone()).collect();
        for (tech, reasons) in ctx.resolver.match_dependencies(&names, "deno") {
            if tech == "deno" {
                continue;
            }
            for reason in reasons {
                payload.add_tech(&tech, &reason);
            }
        }

        for dep in config.dependencies {
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
    fn test_detects_deno_config() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "deno.jsonc",
            r#"{"name": "@acme/tool", "imports": {"hono": "jsr:@hono/hono@^4.0.0"}}"#,
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

        let detections = DenoDetector.detect(&ctx);
        let Detection::Named(payload) = &detections[0] else {
            panic!("expected named payload");
        };

        assert_eq!(payload.name, "@acme/tool");
        assert_eq!(payload.tech, vec!["deno"]);
        assert_eq!(payload.dependencies.len(), 1);
    }
}
