//! Ruby component detection (Gemfile, *.gemspec)

use super::{ComponentDetector, Detection, DetectorContext};
use crate::parsers::parse_gemfile;
use crate::payload::Payload;

pub struct RubyDetector;

impl ComponentDetector for RubyDetector {
    fn name(&self) -> &'static str {
        "ruby"
    }

    fn detect(&self, ctx: &DetectorContext) -> Vec<Detection> {
        let manifest = ctx
            .files
            .iter()
            .find(|f| f.name == "Gemfile")
            .or_else(|| ctx.files.iter().find(|f| f.name.ends_with(".gemspec")));

        let Some(file) = manifest else {
            return Vec::new();
        };
        let Some(content) = ctx.read(&file.name) else {
            return Vec::new();
        };

        let name = file
            .name
            .strip_suffix(".gemspec")
            .map(String::from)
            .unwrap_or_else(|| ctx.directory_name());

        let mut payload = Payload::with_path(name, ctx.relative_path(&file.name));
        payload.add_primary_tech("ruby");
        payload.add_reason(&format!("matched file: {}", file.name));

        let dependencies = parse_gemfile(&content);
        let names: Vec<String> = dependencies.iter().map(|d| d.name.clone()).collect();
        for (tech, reasons) in ctx.resolver.match_dependencies(&names, "ruby") {
            if tech == "ruby" {
                continue;
            }
            for reason in reasons {
                payload.add_tech(&tech, &reason);
            }
        }

        for dep in dependencies {
            payload.add_dependency(dep);
        }

        vec![Detection::Named(payload)]
    }
}
