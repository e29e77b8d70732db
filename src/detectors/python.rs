//! Python component detection (pyproject.toml)

use super::{ComponentDetector, Detection, DetectorContext};
use crate::parsers::parse_pyproject;
use crate::payload::Payload;

pub struct PythonDetector;

impl ComponentDetector for PythonDetector {
    fn name(&self) -> &'static str {
        "python"
    }

    fn detect(&self, ctx: &DetectorContext) -> Vec<Detection> {
        let Some(file) = ctx.files.iter().find(|f| f.name == "pyproject.toml") else {
            return Vec::new();
        };
        let Some(content) = ctx.read(&file.name) else {
            return Vec::new();
        };

        let project = parse_pyproject(&content);
        let name = project.name.unwrap_or_else(|| ctx.directory_name());

        let mut payload = Payload::with_path(name, ctx.relative_path(&file.name));
        payload.add_primary_tech("python");
        payload.add_reason("matched file: pyproject.toml");

        if let Some(license) = &project.license {
            payload.add_license(license);
        }

        let names: Vec<String> = project.dependencies.iter().map(|d| d.name.clone()).collect();
        for (tech, reasons) in ctx.resolver.match_dependencies(&names, "python") {
            if tech == "python" {
                continue;
            }
            for reason in reasons {
                payload.add_tech(&tech, &reason);
            }
        }

        for dep in project.dependencies {
            payload.add_dependency(dep);
        }

        vec![Detection::Named(payload)]
    }
}
