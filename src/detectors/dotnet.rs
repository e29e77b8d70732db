//! .NET component detection (.csproj / .vbproj / .fsproj)

use super::{ComponentDetector, Detection, DetectorContext};
use crate::parsers::parse_dotnet_project;
use crate::payload::{Dependency, Payload};

pub struct DotNetDetector;

fn language_tech(file_name: &str) -> &'static str {
    if file_name.ends_with(".vbproj") {
        "vbnet"
    } else if file_name.ends_with(".fsproj") {
        "fsharp"
    } else {
        "dotnet"
    }
}

impl ComponentDetector for DotNetDetector {
    fn name(&self) -> &'static str {
        "dotnet"
    }

    fn detect(&self, ctx: &DetectorContext) -> Vec<Detection> {
        let mut detections = Vec::new();

        for file in ctx.files.iter().filter(|f| {
            f.name.ends_with(".csproj")
                || f.name.ends_with(".vbproj")
                || f.name.ends_with(".fsproj")
        }) {
            let Some(content) = ctx.read(&file.name) else {
                continue;
            };

            let stem = file.name.rsplit_once('.').map(|(s, _)| s).unwrap_or(&file.name);
            let project = parse_dotnet_project(&content, stem);
            let tech = language_tech(&file.name);

            let mut payload = Payload::with_path(project.name, ctx.relative_path(&file.name));
            payload.add_primary_tech(tech);
            match &project.target_framework {
                Some(framework) => {
                    payload.add_tech(tech, &format!("framework: {}", framework));
                }
                None => {
                    payload.add_tech(tech, &format!("matched file: {}", file.name));
                }
            }

            let names: Vec<String> = project.packages.iter().map(|(n, _)| n.clone()).collect();
            for (matched, reasons) in ctx.resolver.match_dependencies(&names, "nuget") {
                if matched == tech {
                    continue;
                }
                for reason in reasons {
                    payload.add_tech(&matched, &reason);
                }
            }

            for (name, version) in project.packages {
                payload.add_dependency(Dependency::new("nuget", name, version));
            }

            detections.push(Detection::Named(payload));
        }

        detections
    }
}
