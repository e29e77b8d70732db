//! Terraform detection (.terraform.lock.hcl and .tf files)

use super::{ComponentDetector, Detection, DetectorContext};
use crate::parsers::{parse_terraform_lock, parse_terraform_resources, MAX_TF_FILE_SIZE};
use crate::payload::{Dependency, Payload};

pub struct TerraformDetector;

impl ComponentDetector for TerraformDetector {
    fn name(&self) -> &'static str {
        "terraform"
    }

    fn detect(&self, ctx: &DetectorContext) -> Vec<Detection> {
        let mut detections = Vec::new();

        if ctx.files.iter().any(|f| f.name == ".terraform.lock.hcl") {
            if let Some(detection) = self.detect_lockfile(ctx) {
                detections.push(detection);
            }
        }

        for file in ctx
            .files
            .iter()
            .filter(|f| f.is_file() && f.name.ends_with(".tf"))
        {
            // oversized generated files contribute nothing
            if file.size > MAX_TF_FILE_SIZE {
                continue;
            }
            if let Some(detection) = self.detect_resources(ctx, &file.name) {
                detections.push(detection);
            }
        }

        detections
    }
}

impl TerraformDetector {
    fn detect_lockfile(&self, ctx: &DetectorContext) -> Option<Detection> {
        let content = ctx.read(".terraform.lock.hcl")?;
        let providers = parse_terraform_lock(&content);
        if providers.is_empty() {
            return None;
        }

        let rel_path = ctx.relative_path(".terraform.lock.hcl");
        let mut payload = Payload::with_path("terraform-providers", rel_path.clone());

        for provider in providers {
            payload.add_dependency(Dependency::new(
                "terraform",
                provider.name.clone(),
                provider.version.clone(),
            ));

            let matched = ctx
                .resolver
                .match_dependencies(&[provider.name.clone()], "terraform");
            for (tech, reasons) in matched {
                let mut child = Payload::with_path(provider.name.clone(), rel_path.clone());
                child.add_primary_tech(&tech);
                child.add_dependency(Dependency::new(
                    "terraform",
                    provider.name.clone(),
                    provider.version.clone(),
                ));
                for reason in reasons {
                    child.add_tech(&tech, &reason);
                }
                payload.add_child(child);
            }
        }

        Some(Detection::Virtual(payload))
    }

    fn detect_resources(&self, ctx: &DetectorContext, file_name: &str) -> Option<Detection> {
        let content = ctx.read(file_name)?;
        let resources = parse_terraform_resources(&content);
        if resources.is_empty() {
            return None;
        }

        let rel_path = ctx.relative_path(file_name);
        let mut payload = Payload::with_path("terraform-resources", rel_path.clone());

        payload.add_property(
            "terraform",
            serde_json::json!({ "file": rel_path, "resources": resources }),
        );

        for resource in &resources {
            let matched = ctx
                .resolver
                .match_dependencies(&[resource.clone()], "terraform.resource");

            for (tech, reasons) in matched {
                let mut child = Payload::with_path(resource.clone(), rel_path.clone());
                child.add_primary_tech(&tech);
                child.add_dependency(Dependency::new(
                    "terraform.resource",
                    resource.clone(),
                    "unknown",
                ));
                for reason in reasons {
                    child.add_tech(&tech, &reason);
                }
                payload.add_child(child);
            }
        }

        Some(Detection::Virtual(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deps::DependencyResolver;
    use crate::fs::{FileSystem, MockFileSystem};
    use crate::rules::load_rules;
    use std::path::Path;

    fn run(fs: &MockFileSystem) -> Vec<Detection> {
        let rules = load_rules().unwrap();
        let resolver = DependencyResolver::from_rules(&rules);
        let files = fs.read_dir(Path::new("/mock")).unwrap();
        let ctx = DetectorContext {
            files: &files,
            current_path: Path::new("/mock"),
            base_path: Path::new("/mock"),
            fs,
            resolver: &resolver,
            rules: &rules,
        };
        TerraformDetector.detect(&ctx)
    }

    #[test]
    fn test_lockfile_providers() {
        let fs = MockFileSystem::new();
        fs.add_file(
            ".terraform.lock.hcl",
            "provider \"registry.terraform.io/hashicorp/aws\" {\n  version = \"5.46.0\"\n}\n",
        );

        let detections = run(&fs);
        assert_eq!(detections.len(), 1);
        let Detection::Virtual(payload) = &detections[0] else {
            panic!("expected virtual payload");
        };

        assert!(payload.dependencies.contains(&Dependency::new(
            "terraform",
            "registry.terraform.io/hashicorp/aws",
            "5.46.0"
        )));
        assert_eq!(payload.childs.len(), 1);
        assert_eq!(payload.childs[0].tech, vec!["aws"]);
    }

    #[test]
    fn test_tf_resources() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "main.tf",
            "resource \"aws_s3_bucket\" \"logs\" {\n  bucket = \"logs\"\n}\n",
        );

        let detections = run(&fs);
        let Detection::Virtual(payload) = &detections[0] else {
            panic!("expected virtual payload");
        };

        assert_eq!(payload.childs.len(), 1);
        assert_eq!(payload.childs[0].name, "aws_s3_bucket");
        assert_eq!(payload.childs[0].tech, vec!["aws"]);
        let props = &payload.properties["terraform"][0];
        assert_eq!(props["resources"][0], "aws_s3_bucket");
    }

    #[test]
    fn test_unmatched_resources_produce_no_children() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "main.tf",
            "resource \"custom_internal_thing\" \"x\" {\n}\n",
        );

        let detections = run(&fs);
        let Detection::Virtual(payload) = &detections[0] else {
            panic!("expected virtual payload");
        };
        assert!(payload.childs.is_empty());
        // the resource list is still recorded as a property
        assert!(payload.properties.contains_key("terraform"));
    }
}
