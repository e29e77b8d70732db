//! Content matchers: regex-on-body and structured-path predicates
//!
//! Regex predicates are keyed by extension (inheriting the rule's
//! extensions when the predicate declares none) or by filename. Structured
//! predicates address JSON/YAML documents via dotted paths and XML via
//! slash-separated element paths. A `json-path` predicate on `$schema`
//! carrying a value matcher belongs to the JSON-schema detector and is not
//! indexed here.

use crate::rules::{compile_pattern, Content, RuleSet};
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

struct BodyMatcher {
    tech: String,
    pattern: Regex,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum DocKind {
    Json,
    Yaml,
    Xml,
}

struct PathMatcher {
    tech: String,
    kind: DocKind,
    path: String,
    value: Option<Regex>,
}

/// Compiled content predicate indices.
pub struct ContentMatchers {
    by_extension: HashMap<String, Vec<BodyMatcher>>,
    by_filename: HashMap<String, Vec<BodyMatcher>>,
    paths_by_filename: HashMap<String, Vec<PathMatcher>>,
}

impl ContentMatchers {
    pub fn from_rules(rules: &RuleSet) -> Self {
        let mut by_extension: HashMap<String, Vec<BodyMatcher>> = HashMap::new();
        let mut by_filename: HashMap<String, Vec<BodyMatcher>> = HashMap::new();
        let mut paths_by_filename: HashMap<String, Vec<PathMatcher>> = HashMap::new();

        for rule in rules.iter() {
            for content in &rule.content {
                match content {
                    Content::Regex {
                        pattern,
                        extensions,
                        files,
                    } => {
                        let compiled = match Regex::new(pattern) {
                            Ok(re) => re,
                            Err(e) => {
                                warn!(tech = %rule.tech, pattern = %pattern, error = %e,
                                      "skipping uncompilable content pattern");
                                continue;
                            }
                        };

                        if !files.is_empty() {
                            for file in files {
                                by_filename.entry(file.clone()).or_default().push(
                                    BodyMatcher {
                                        tech: rule.tech.clone(),
                                        pattern: compiled.clone(),
                                    },
                                );
                            }
                            continue;
                        }

                        let scope = if extensions.is_empty() {
                            &rule.extensions
                        } else {
                            extensions
                        };
                        for ext in scope {
                            by_extension.entry(ext.clone()).or_default().push(
                                BodyMatcher {
                                    tech: rule.tech.clone(),
                                    pattern: compiled.clone(),
                                },
                            );
                        }
                    }
                    Content::JsonPath { path, value, files } => {
                        if crate::detectors::is_json_schema_predicate(path, value) {
                            continue;
                        }
                        Self::index_path(
                            &mut paths_by_filename,
                            &rule.tech,
                            DocKind::Json,
                            path,
                            value.as_deref(),
                            files,
                        );
                    }
                    Content::YamlPath { path, value, files } => {
                        Self::index_path(
                            &mut paths_by_filename,
                            &rule.tech,
                            DocKind::Yaml,
                            path,
                            value.as_deref(),
                            files,
                        );
                    }
                    Content::XmlPath { path, value, files } => {
                        Self::index_path(
                            &mut paths_by_filename,
                            &rule.tech,
                            DocKind::Xml,
                            path,
                            value.as_deref(),
                            files,
                        );
                    }
                }
            }
        }

        Self {
            by_extension,
            by_filename,
            paths_by_filename,
        }
    }

    fn index_path(
        index: &mut HashMap<String, Vec<PathMatcher>>,
        tech: &str,
        kind: DocKind,
        path: &str,
        value: Option<&str>,
        files: &[String],
    ) {
        let compiled_value = match value {
            Some(v) => match compile_pattern(v) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!(tech, pattern = v, error = %e,
                          "skipping uncompilable path value pattern");
                    return;
                }
            },
            None => None,
        };

        for file in files {
            index.entry(file.clone()).or_default().push(PathMatcher {
                tech: tech.to_string(),
                kind,
                path: path.to_string(),
                value: compiled_value.clone(),
            });
        }
    }

    pub fn has_extension_matchers(&self, ext: &str) -> bool {
        self.by_extension.contains_key(ext)
    }

    pub fn has_filename_matchers(&self, name: &str) -> bool {
        self.by_filename.contains_key(name) || self.paths_by_filename.contains_key(name)
    }

    /// Regex body matching for extension-scoped predicates. Stops after
    /// the first matching pattern per tech.
    pub fn match_content(&self, ext: &str, content: &str) -> BTreeMap<String, Vec<String>> {
        let mut results: BTreeMap<String, Vec<String>> = BTreeMap::new();

        if let Some(matchers) = self.by_extension.get(ext) {
            for matcher in matchers {
                if results.contains_key(&matcher.tech) {
                    continue;
                }
                if matcher.pattern.is_match(content) {
                    results.insert(
                        matcher.tech.clone(),
                        vec![format!("content matched: {}", matcher.pattern.as_str())],
                    );
                }
            }
        }

        results
    }

    /// Regex body matching for filename-scoped predicates.
    pub fn match_file_content(
        &self,
        filename: &str,
        content: &str,
    ) -> BTreeMap<String, Vec<String>> {
        let mut results: BTreeMap<String, Vec<String>> = BTreeMap::new();

        if let Some(matchers) = self.by_filename.get(filename) {
            for matcher in matchers {
                if results.contains_key(&matcher.tech) {
                    continue;
                }
                if matcher.pattern.is_match(content) {
                    results.insert(
                        matcher.tech.clone(),
                        vec![format!(
                            "content matched in {}: {}",
                            filename,
                            matcher.pattern.as_str()
                        )],
                    );
                }
            }
        }

        results
    }

    /// Structured-path (JSON/YAML/XML) matching for filename-scoped
    /// predicates. Subject to a tighter size ceiling than body matching.
    pub fn match_structured(
        &self,
        filename: &str,
        content: &str,
    ) -> BTreeMap<String, Vec<String>> {
        let mut results: BTreeMap<String, Vec<String>> = BTreeMap::new();

        if let Some(matchers) = self.paths_by_filename.get(filename) {
            for matcher in matchers {
                if results.contains_key(&matcher.tech) {
                    continue;
                }
                if matcher.evaluate(content) {
                    results.insert(
                        matcher.tech.clone(),
                        vec![format!(
                            "content matched in {}: {}",
                            filename, matcher.path
                        )],
                    );
                }
            }
        }

        results
    }
}

impl PathMatcher {
    fn evaluate(&self, content: &str) -> bool {
        let found = match self.kind {
            DocKind::Json => serde_json::from_str::<serde_json::Value>(content)
                .ok()
                .and_then(|doc| lookup_json(&doc, &self.path)),
            DocKind::Yaml => serde_yaml::from_str::<serde_json::Value>(content)
                .ok()
                .and_then(|doc| lookup_json(&doc, &self.path)),
            DocKind::Xml => roxmltree::Document::parse(content)
                .ok()
                .and_then(|doc| lookup_xml(&doc, &self.path)),
        };

        match (found, &self.value) {
            (Some(_), None) => true,
            (Some(scalar), Some(re)) => re.is_match(&scalar),
            (None, _) => false,
        }
    }
}

/// Dotted-path lookup into a JSON-shaped document. A leading `$.` is
/// stripped; `$schema` stays a single key.
fn lookup_json(doc: &serde_json::Value, path: &str) -> Option<String> {
    let trimmed = path.strip_prefix("$.").unwrap_or(path);
    let mut current = doc;
    for segment in trimmed.split('.') {
        current = current.get(segment)?;
    }
    Some(render_scalar(current))
}

/// Slash-separated element path into an XML document, rooted below the
/// document element.
fn lookup_xml(doc: &roxmltree::Document, path: &str) -> Option<String> {
    let mut node = doc.root_element();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        node = node
            .children()
            .find(|c| c.is_element() && c.has_tag_name(segment))?;
    }
    Some(node.text().unwrap_or("").trim().to_string())
}

fn render_scalar(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
