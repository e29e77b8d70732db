//! GitHub Actions workflow detection
//!
//! Fires only inside a `.github/workflows` directory. Every `uses:`
//! reference becomes a `githubAction` dependency; matched actions surface
//! as techs.

use super::{ComponentDetector, Detection, DetectorContext};
use crate::payload::{Dependency, Payload};
use regex::Regex;
use std::sync::OnceLock;

pub struct GithubActionsDetector;

fn uses_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?m)^\s*-?\s*uses:\s*['"]?([^\s'"]+)['"]?"#).expect("valid regex")
    })
}

impl ComponentDetector for GithubActionsDetector {
    fn name(&self) -> &'static str {
        "githubActions"
    }

    fn detect(&self, ctx: &DetectorContext) -> Vec<Detection> {
        let current = ctx.current_path.to_string_lossy().replace('\\', "/");
        if !current.ends_with(".github/workflows") {
            return Vec::new();
        }

        let workflow_files: Vec<_> = ctx
            .files
            .iter()
            .filter(|f| f.is_file() && (f.name.ends_with(".yml") || f.name.ends_with(".yaml")))
            .collect();
        if workflow_files.is_empty() {
            return Vec::new();
        }

        let mut payload = Payload::with_path(
            "workflows",
            super::relative_dir_path(ctx.base_path, ctx.current_path),
        );

        for file in workflow_files {
            let Some(content) = ctx.read(&file.name) else {
                continue;
            };

            payload.add_tech("githubActions", &format!("matched file: {}", file.name));
            payload.add_path(ctx.relative_path(&file.name));

            for caps in uses_regex().captures_iter(&content) {
                let reference = &caps[1];
                // `./local/action` references carry no version information
                if reference.starts_with("./") {
                    continue;
                }

                let (action, version) = match reference.split_once('@') {
                    Some((action, version)) => (action.to_string(), version.to_string()),
                    None => (reference.to_string(), "latest".to_string()),
                };

                for (tech, reasons) in ctx
                    .resolver
                    .match_dependencies(&[action.clone()], "githubAction")
                {
                    for reason in reasons {
                        payload.add_tech(&tech, &reason);
                    }
                }

                payload.add_dependency(Dependency::new("githubAction", action, version));
            }
        }

        vec![Detection::Virtual(payload)]
    }
}
