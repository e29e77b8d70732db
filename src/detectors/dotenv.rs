//! Dotenv-based detection
//!
//! Scans `.env*` file keys against the `dotenv` prefixes declared by
//! rules. A prefix hit anywhere in any dotenv file of the directory yields
//! the tech with a fixed reason shape.

use super::{ComponentDetector, Detection, DetectorContext};
use crate::parsers::parse_env_keys;
use crate::payload::Payload;

pub struct DotenvDetector;

fn is_dotenv_file(name: &str) -> bool {
    name == ".env" || name.starts_with(".env.")
}

impl ComponentDetector for DotenvDetector {
    fn name(&self) -> &'static str {
        "dotenv"
    }

    fn detect(&self, ctx: &DetectorContext) -> Vec<Detection> {
        let mut keys: Vec<String> = Vec::new();
        let mut paths: Vec<String> = Vec::new();

        for file in ctx
            .files
            .iter()
            .filter(|f| f.is_file() && is_dotenv_file(&f.name))
        {
            let Some(content) = ctx.read(&file.name) else {
                continue;
            };
            keys.extend(parse_env_keys(&content));
            paths.push(ctx.relative_path(&file.name));
        }

        if keys.is_empty() {
            return Vec::new();
        }

        let mut payload: Option<Payload> = None;

        for rule in ctx.rules.iter().filter(|r| !r.dotenv.is_empty()) {
            for prefix in &rule.dotenv {
                if keys.iter().any(|key| key.starts_with(prefix.as_str())) {
                    let target = payload.get_or_insert_with(|| {
                        let mut p = Payload::with_path("dotenv", paths[0].clone());
                        for path in &paths[1..] {
                            p.add_path(path.clone());
                        }
                        p
                    });
                    target.add_tech(
                        &rule.tech,
                        &format!("matched env var prefix: {}", prefix),
                    );
                    break;
                }
            }
        }

        payload.map(Detection::Virtual).into_iter().collect()
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
        DotenvDetector.detect(&ctx)
    }

    #[test]
    fn test_prefix_match() {
        let fs = MockFileSystem::new();
        fs.add_file(".env", "POSTGRES_HOST=localhost\nSTRIPE_SECRET_KEY=sk_test\n");

        let detections = run(&fs);
        assert_eq!(detections.len(), 1);
        let Detection::Virtual(payload) = &detections[0] else {
            panic!("expected virtual payload");
        };

        assert!(payload.techs.contains(&"postgresql".to_string()));
        assert!(payload.techs.contains(&"stripe".to_string()));
        assert!(payload
            .reason
            .contains(&"matched env var prefix: POSTGRES_".to_string()));
        assert!(payload
            .reason
            .contains(&"matched env var prefix: STRIPE_".to_string()));
    }

    #[test]
    fn test_env_variants_scanned() {
        let fs = MockFileSystem::new();
        fs.add_file(".env.production", "AWS_REGION=eu-central-1\n");

        let detections = run(&fs);
        let Detection::Virtual(payload) = &detections[0] else {
            panic!("expected virtual payload");
        };
        assert!(payload.techs.contains(&"aws".to_string()));
    }

    #[test]
    fn test_no_match_no_detection() {
        let fs = MockFileSystem::new();
        fs.add_file(".env", "SOME_UNRELATED_KEY=1\n");
        assert!(run(&fs).is_empty());
    }
}
