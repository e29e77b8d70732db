//! File and extension matchers
//!
//! A rule's `files[]` pattern is one of three kinds: an exact entry name, a
//! `/`-bearing directory suffix matched against the current path, or a
//! regex (detected by the presence of regex metacharacters). Extension
//! matchers are built only from rules without content predicates; content
//! carrying rules are confirmed through the content index instead.

use crate::fs::DirEntry;
use crate::rules::RuleSet;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

const REGEX_METACHARS: &[char] = &['*', '+', '?', '[', ']', '(', ')', '|', '^', '$', '\\', '.'];

enum FilePattern {
    Exact(String),
    DirSuffix(String),
    Regex(Regex),
}

struct FileMatcher {
    tech: String,
    pattern: FilePattern,
}

/// Precomputed extension and filename lookup structures.
pub struct FileMatchers {
    ext_index: HashMap<String, Vec<String>>,
    scan_matchers: Vec<FileMatcher>,
}

impl FileMatchers {
    pub fn from_rules(rules: &RuleSet) -> Self {
        let mut ext_index: HashMap<String, Vec<String>> = HashMap::new();
        let mut scan_matchers = Vec::new();

        for rule in rules.iter() {
            // package managers are indexed nowhere; their manifests are
            // handled by the specialized detectors
            if rule.rule_type == "package_manager" {
                continue;
            }

            if !rule.has_content_rules() {
                for ext in &rule.extensions {
                    let bucket = ext_index.entry(ext.clone()).or_default();
                    if !bucket.contains(&rule.tech) {
                        bucket.push(rule.tech.clone());
                    }
                }
            }

            for pattern in &rule.files {
                if pattern.contains('/') && !is_slash_delimited_regex(pattern) {
                    scan_matchers.push(FileMatcher {
                        tech: rule.tech.clone(),
                        pattern: FilePattern::DirSuffix(pattern.clone()),
                    });
                } else if is_slash_delimited_regex(pattern) {
                    match Regex::new(&pattern[1..pattern.len() - 1]) {
                        Ok(re) => scan_matchers.push(FileMatcher {
                            tech: rule.tech.clone(),
                            pattern: FilePattern::Regex(re),
                        }),
                        Err(e) => {
                            warn!(tech = %rule.tech, pattern = %pattern, error = %e,
                                  "skipping uncompilable file pattern");
                        }
                    }
                } else if pattern.contains(REGEX_METACHARS) {
                    match Regex::new(pattern) {
                        Ok(re) => scan_matchers.push(FileMatcher {
                            tech: rule.tech.clone(),
                            pattern: FilePattern::Regex(re),
                        }),
                        Err(e) => {
                            warn!(tech = %rule.tech, pattern = %pattern, error = %e,
                                  "skipping uncompilable file pattern");
                        }
                    }
                } else {
                    scan_matchers.push(FileMatcher {
                        tech: rule.tech.clone(),
                        pattern: FilePattern::Exact(pattern.clone()),
                    });
                }
            }
        }

        Self {
            ext_index,
            scan_matchers,
        }
    }

    /// Runs all file matchers over a directory listing. First match wins
    /// per tech. The reason names the matched entry (or the directory
    /// suffix pattern).
    pub fn match_files(
        &self,
        files: &[DirEntry],
        current_path: &str,
    ) -> BTreeMap<String, Vec<String>> {
        let mut matched: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for matcher in &self.scan_matchers {
            if matched.contains_key(&matcher.tech) {
                continue;
            }

            let hit = match &matcher.pattern {
                FilePattern::Exact(name) => files
                    .iter()
                    .find(|f| &f.name == name)
                    .map(|f| f.name.clone()),
                FilePattern::Regex(re) => files
                    .iter()
                    .find(|f| re.is_match(&f.name))
                    .map(|f| f.name.clone()),
                FilePattern::DirSuffix(suffix) => {
                    if current_path.ends_with(suffix.as_str()) {
                        Some(suffix.clone())
                    } else {
                        None
                    }
                }
            };

            if let Some(name) = hit {
                matched.insert(
                    matcher.tech.clone(),
                    vec![format!("matched file: {}", name)],
                );
            }
        }

        matched
    }

    /// Extension-based matches for a listing; only rules without content
    /// predicates participate.
    pub fn match_extensions(&self, files: &[DirEntry]) -> BTreeMap<String, Vec<String>> {
        let mut matched: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for file in files.iter().filter(|f| f.is_file()) {
            let Some(ext) = extension_of(&file.name) else {
                continue;
            };
            if let Some(techs) = self.ext_index.get(&ext) {
                for tech in techs {
                    matched
                        .entry(tech.clone())
                        .or_insert_with(|| vec![format!("matched extension: {}", ext)]);
                }
            }
        }

        matched
    }

}

/// `.ext`-style extension including the leading dot.
pub fn extension_of(name: &str) -> Option<String> {
    let idx = name.rfind('.')?;
    if idx == 0 && !name[1..].contains('.') {
        // dotfiles like `.gitignore` have no extension
        return None;
    }
    Some(name[idx..].to_string())
}

fn is_slash_delimited_regex(pattern: &str) -> bool {
    pattern.len() > 2 && pattern.starts_with('/') && pattern.ends_with('/')
}
