//! Rust component detection (Cargo.toml)

use super::{ComponentDetector, Detection, DetectorContext};
use crate::parsers::parse_cargo_toml;
use crate::payload::Payload;

pub struct RustDetector;

impl ComponentDetector for RustDetector {
    fn name(&self) -> &'static str {
        "rust"
    }

    fn detect(&self, ctx: &DetectorContext) -> Vec<Detection> {
        let Some(file) = ctx.files.iter().find(|f| f.name == "Cargo.toml") else {
            return Vec::new();
        };
        let Some(content) = ctx.read(&file.name) else {
            return Vec::new();
        };

        let manifest = parse_cargo_toml(&content);

        let mut payload = if manifest.has_package {
            let name = manifest.name.clone().unwrap_or_else(|| ctx.directory_name());
            let mut payload = Payload::with_path(name, ctx.relative_path(&file.name));
            payload.add_primary_tech("rust");
            payload
        } else {
            // workspace-only manifest: contribute techs and deps to the
            // surrounding context instead of a component of its own
            let mut payload = Payload::with_path("workspace", ctx.relative_path(&file.name));
            payload.add_tech("rust", "matched file: Cargo.toml");
            payload
        };
        payload.add_reason("matched file: Cargo.toml");

        if let Some(license) = &manifest.license {
            payload.add_license(license);
        }

        let names: Vec<String> = manifest.dependencies.iter().map(|d| d.name.clone()).collect();
        for (tech, reasons) in ctx.resolver.match_dependencies(&names, "cargo") {
            if tech == "rust" {
                continue;
            }
            for reason in reasons {
                payload.add_tech(&tech, &reason);
            }
        }

        for dep in manifest.dependencies {
            payload.add_dependency(dep);
        }

        if manifest.has_package {
            vec![Detection::Named(payload)]
        } else {
            vec![Detection::Virtual(payload)]
        }
    }
}
