//! JSON-schema detection
//!
//! Owns every `json-path` content predicate that addresses `$schema` with
//! a value matcher: the named file is parsed as JSON and its `$schema`
//! field compared against the rule's expected URL.

use super::{ComponentDetector, Detection, DetectorContext};
use crate::payload::Payload;
use crate::rules::{compile_pattern, Content};

pub struct JsonSchemaDetector;

/// True for predicates this detector owns (and the generic content index
/// therefore skips).
pub fn is_json_schema_predicate(path: &str, value: &Option<String>) -> bool {
    path == "$schema" && value.is_some()
}

impl ComponentDetector for JsonSchemaDetector {
    fn name(&self) -> &'static str {
        "json-schema"
    }

    fn detect(&self, ctx: &DetectorContext) -> Vec<Detection> {
        let mut detections = Vec::new();

        for rule in ctx.rules.iter() {
            for content in &rule.content {
                let Content::JsonPath { path, value, files } = content else {
                    continue;
                };
                if !is_json_schema_predicate(path, value) {
                    continue;
                }
                let expected = value.as_deref().expect("predicate carries a value");
                let Ok(matcher) = compile_pattern(expected) else {
                    continue;
                };

                for file_name in files {
                    let Some(file) = ctx.files.iter().find(|f| &f.name == file_name) else {
                        continue;
                    };
                    let Some(body) = ctx.read(&file.name) else {
                        continue;
                    };
                    let Ok(doc) = serde_json::from_str::<serde_json::Value>(&body) else {
                        continue;
                    };
                    let Some(schema) = doc.get("$schema").and_then(|v| v.as_str()) else {
                        continue;
                    };

                    if matcher.is_match(schema) {
                        let mut payload =
                            Payload::with_path("schema", ctx.relative_path(&file.name));
                        payload.add_tech(
                            &rule.tech,
                            &format!("matched JSON schema: {}", expected),
                        );
                        detections.push(Detection::Virtual(payload));
                    }
                }
            }
        }

        detections
    }
}
