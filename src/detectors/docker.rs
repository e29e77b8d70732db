//! Docker detection (docker-compose files and Dockerfiles)

use super::{ComponentDetector, Detection, DetectorContext};
use crate::parsers::{parse_compose, parse_dockerfile, split_image};
use crate::payload::{Dependency, Payload};
use regex::Regex;
use std::sync::OnceLock;

pub struct DockerDetector;

fn compose_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^docker-compose(.*)?\.ya?ml$").expect("valid regex"))
}

fn dockerfile_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(Dockerfile(\..+)?|Containerfile)$").expect("valid regex"))
}

impl ComponentDetector for DockerDetector {
    fn name(&self) -> &'static str {
        "docker"
    }

    fn detect(&self, ctx: &DetectorContext) -> Vec<Detection> {
        let mut detections = Vec::new();

        for file in ctx.files.iter().filter(|f| compose_regex().is_match(&f.name)) {
            if let Some(detection) = self.detect_compose(ctx, &file.name) {
                detections.push(detection);
            }
        }

        for file in ctx
            .files
            .iter()
            .filter(|f| f.is_file() && dockerfile_regex().is_match(&f.name))
        {
            if let Some(detection) = self.detect_dockerfile(ctx, &file.name) {
                detections.push(detection);
            }
        }

        detections
    }
}

impl DockerDetector {
    /// Compose services become child components of a virtual fragment,
    /// one per service with a usable image reference.
    fn detect_compose(&self, ctx: &DetectorContext, file_name: &str) -> Option<Detection> {
        let content = ctx.read(file_name)?;
        let services = parse_compose(&content);
        if services.is_empty() {
            return None;
        }

        let rel_path = ctx.relative_path(file_name);
        let mut payload = Payload::with_path("compose", rel_path.clone());

        for service in services {
            // values like $IMAGE cannot be resolved without the environment
            if service.image.is_empty() || service.image.starts_with('$') {
                continue;
            }

            let (image_name, image_version) = split_image(&service.image);
            if image_name.is_empty() {
                continue;
            }

            let matched = ctx
                .resolver
                .match_dependencies(&[image_name.clone()], "docker");
            let (tech, reasons) = match matched.into_iter().next() {
                Some((tech, reasons)) => (tech, reasons),
                None => (
                    "docker".to_string(),
                    vec![format!("matched dependency: {}", image_name)],
                ),
            };

            let mut child = Payload::with_path(service.display_name(), rel_path.clone());
            child.add_primary_tech(&tech);
            child.add_dependency(Dependency::new("docker", image_name, image_version));
            for reason in reasons {
                child.add_tech(&tech, &reason);
                payload.add_reason(&reason);
            }

            payload.add_child(child);
        }

        Some(Detection::Virtual(payload))
    }

    /// Dockerfile base images are recorded as docker dependencies and
    /// structured properties; matched base images surface as techs on the
    /// context.
    fn detect_dockerfile(&self, ctx: &DetectorContext, file_name: &str) -> Option<Detection> {
        let content = ctx.read(file_name)?;
        let mut info = parse_dockerfile(&content)?;
        info.file = Some(ctx.relative_path(file_name));

        let rel_path = ctx.relative_path(file_name);
        let mut payload = Payload::with_path("dockerfile", rel_path);
        payload.add_tech("docker", &format!("matched file: {}", file_name));

        for image in &info.base_images {
            let (image_name, image_version) = split_image(image);
            payload.add_dependency(Dependency::new("docker", image_name.clone(), image_version));

            for (tech, reasons) in ctx
                .resolver
                .match_dependencies(&[image_name], "docker")
            {
                for reason in reasons {
                    payload.add_tech(&tech, &reason);
                }
            }
        }

        if let Ok(value) = serde_json::to_value(&info) {
            payload.add_property("docker", value);
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
        DockerDetector.detect(&ctx)
    }

    #[test]
    fn test_compose_service_becomes_child() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "docker-compose.yml",
            "services:\n  db:\n    image: postgres:15\n",
        );

        let detections = run(&fs);
        assert_eq!(detections.len(), 1);
        let Detection::Virtual(payload) = &detections[0] else {
            panic!("expected virtual payload");
        };

        assert_eq!(payload.childs.len(), 1);
        let child = &payload.childs[0];
        assert_eq!(child.name, "db");
        assert_eq!(child.tech, vec!["postgresql"]);
        assert!(child
            .dependencies
            .contains(&Dependency::new("docker", "postgres", "15")));
        assert!(child
            .reason
            .contains(&"matched dependency: postgres".to_string()));
    }

    #[test]
    fn test_env_var_images_skipped() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "docker-compose.yml",
            "services:\n  app:\n    image: $APP_IMAGE\n",
        );

        let detections = run(&fs);
        let Detection::Virtual(payload) = &detections[0] else {
            panic!("expected virtual payload");
        };
        assert!(payload.childs.is_empty());
    }

    #[test]
    fn test_unmatched_image_falls_back_to_docker_tech() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "docker-compose.yml",
            "services:\n  app:\n    image: acme/internal-tool:1.0\n",
        );

        let detections = run(&fs);
        let Detection::Virtual(payload) = &detections[0] else {
            panic!("expected virtual payload");
        };
        assert_eq!(payload.childs[0].tech, vec!["docker"]);
    }

    #[test]
    fn test_dockerfile_properties_and_deps() {
        let fs = MockFileSystem::new();
        fs.add_file("Dockerfile", "FROM node:20 AS build\nFROM nginx:1.25\nEXPOSE 80\n");

        let detections = run(&fs);
        assert_eq!(detections.len(), 1);
        let Detection::Virtual(payload) = &detections[0] else {
            panic!("expected virtual payload");
        };

        assert!(payload.techs.contains(&"docker".to_string()));
        assert!(payload.techs.contains(&"nodejs".to_string()));
        assert!(payload.techs.contains(&"nginx".to_string()));
        assert!(payload
            .dependencies
            .contains(&Dependency::new("docker", "node", "20")));

        let props = payload.properties.get("docker").unwrap();
        assert_eq!(props.len(), 1);
        assert_eq!(props[0]["multi_stage"], true);
        assert_eq!(props[0]["exposed_ports"][0], 80);
    }
}
