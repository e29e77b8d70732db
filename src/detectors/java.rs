//! Java/Kotlin component detection (pom.xml, build.gradle)

use super::{ComponentDetector, Detection, DetectorContext};
use crate::parsers::{parse_gradle_dependencies, parse_gradle_project_name, parse_pom};
use crate::payload::Payload;
use regex::Regex;
use std::sync::OnceLock;

pub struct JavaDetector;

fn gradle_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^build\.gradle(\.kts)?$").expect("valid regex"))
}

impl ComponentDetector for JavaDetector {
    fn name(&self) -> &'static str {
        "java"
    }

    fn detect(&self, ctx: &DetectorContext) -> Vec<Detection> {
        let pom_file = ctx.files.iter().find(|f| f.name == "pom.xml");
        let gradle_file = ctx.files.iter().find(|f| gradle_regex().is_match(&f.name));

        let mut payload = match pom_file {
            Some(file) => {
                let Some(content) = ctx.read(&file.name) else {
                    return Vec::new();
                };
                let mut payload = self.from_pom(ctx, &file.name, &content);

                // a Maven project may carry a Gradle build as well
                if let Some(gradle) = gradle_file {
                    payload.add_path(ctx.relative_path(&gradle.name));
                    payload.add_tech("gradle", &format!("matched file: {}", gradle.name));
                }
                payload
            }
            None => match gradle_file {
                Some(file) => {
                    let Some(content) = ctx.read(&file.name) else {
                        return Vec::new();
                    };
                    self.from_gradle(ctx, &file.name, &content)
                }
                None => return Vec::new(),
            },
        };

        payload.add_primary_tech("java");
        vec![Detection::Named(payload)]
    }
}

impl JavaDetector {
    fn from_pom(&self, ctx: &DetectorContext, file_name: &str, content: &str) -> Payload {
        let pom = parse_pom(content);
        let name = pom.name.unwrap_or_else(|| ctx.directory_name());

        let mut payload = Payload::with_path(name, ctx.relative_path(file_name));
        payload.add_tech("maven", "matched file: pom.xml");

        let names: Vec<String> = pom.dependencies.iter().map(|d| d.name.clone()).collect();
        for (tech, reasons) in ctx.resolver.match_dependencies(&names, "maven") {
            if tech == "java" {
                continue;
            }
            for reason in reasons {
                payload.add_tech(&tech, &reason);
            }
        }

        for dep in pom.dependencies {
            payload.add_dependency(dep);
        }

        payload
    }

    fn from_gradle(&self, ctx: &DetectorContext, file_name: &str, content: &str) -> Payload {
        let name = parse_gradle_project_name(content)
            .or_else(|| {
                ctx.read("settings.gradle")
                    .or_else(|| ctx.read("settings.gradle.kts"))
                    .and_then(|settings| parse_gradle_project_name(&settings))
            })
            .unwrap_or_else(|| ctx.directory_name());

        let mut payload = Payload::with_path(name, ctx.relative_path(file_name));
        payload.add_tech("gradle", &format!("matched file: {}", file_name));

        let dependencies = parse_gradle_dependencies(content);
        let names: Vec<String> = dependencies.iter().map(|d| d.name.clone()).collect();
        for (tech, reasons) in ctx.resolver.match_dependencies(&names, "gradle") {
            if tech == "java" {
                continue;
            }
            for reason in reasons {
                payload.add_tech(&tech, &reason);
            }
        }

        for dep in dependencies {
            payload.add_dependency(dep);
        }

        payload
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
        JavaDetector.detect(&ctx)
    }

    #[test]
    fn test_detects_maven_project() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "pom.xml",
            r#"<project>
  <groupId>com.x</groupId>
  <artifactId>svc</artifactId>
  <dependencies>
    <dependency>
      <groupId>org.springframework</groupId>
      <artifactId>spring-core</artifactId>
      <version>6.1.0</version>
    </dependency>
  </dependencies>
</project>"#,
        );

        let detections = run(&fs);
        let Detection::Named(payload) = &detections[0] else {
            panic!("expected named payload");
        };

        assert_eq!(payload.name, "com.x:svc");
        assert_eq!(payload.tech, vec!["java"]);
        assert!(payload.techs.contains(&"maven".to_string()));
        assert!(payload.techs.contains(&"spring".to_string()));
    }

    #[test]
    fn test_detects_gradle_project() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "build.gradle.kts",
            "dependencies {\n    implementation(\"io.quarkus:quarkus-core:3.9.0\")\n}\n",
        );
        fs.add_file("settings.gradle", "rootProject.name = 'billing'\n");

        let detections = run(&fs);
        let Detection::Named(payload) = &detections[0] else {
            panic!("expected named payload");
        };

        assert_eq!(payload.name, "billing");
        assert!(payload.techs.contains(&"gradle".to_string()));
        assert!(payload.techs.contains(&"quarkus".to_string()));
    }

    #[test]
    fn test_maven_and_gradle_together() {
        let fs = MockFileSystem::new();
        fs.add_file("pom.xml", "<project><artifactId>dual</artifactId></project>");
        fs.add_file("build.gradle", "dependencies {}\n");

        let detections = run(&fs);
        assert_eq!(detections.len(), 1);
        let Detection::Named(payload) = &detections[0] else {
            panic!("expected named payload");
        };
        assert!(payload.techs.contains(&"gradle".to_string()));
        assert!(payload.path.contains(&"/build.gradle".to_string()));
    }
}
