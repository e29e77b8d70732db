//! Dependency resolution against the rule corpus
//!
//! Maps extracted package names to technology slugs via the compiled
//! per-dep-type pattern index.

use crate::rules::{compile_pattern, RuleSet};
use regex::Regex;
use std::collections::BTreeMap;
use tracing::warn;

struct CompiledDependency {
    tech: String,
    regex: Regex,
}

/// Pre-compiled `dep_type → patterns` index.
pub struct DependencyResolver {
    by_type: BTreeMap<String, Vec<CompiledDependency>>,
}

impl DependencyResolver {
    pub fn from_rules(rules: &RuleSet) -> Self {
        let mut by_type: BTreeMap<String, Vec<CompiledDependency>> = BTreeMap::new();

        for rule in rules.iter() {
            for dep in &rule.dependencies {
                match compile_pattern(&dep.name) {
                    Ok(regex) => {
                        by_type.entry(dep.dep_type.clone()).or_default().push(
                            CompiledDependency {
                                tech: rule.tech.clone(),
                                regex,
                            },
                        );
                    }
                    Err(e) => {
                        // validated at load time, so this only fires for
                        // hand-constructed rule sets
                        warn!(tech = %rule.tech, pattern = %dep.name, error = %e,
                              "skipping uncompilable dependency pattern");
                    }
                }
            }
        }

        Self { by_type }
    }

    /// Resolves package names of one dep type to matched techs. Multiple
    /// rules may match the same package; all are returned. Within a
    /// bucket, the first matching pattern wins per tech.
    pub fn match_dependencies(
        &self,
        packages: &[String],
        dep_type: &str,
    ) -> BTreeMap<String, Vec<String>> {
        let mut matched: BTreeMap<String, Vec<String>> = BTreeMap::new();

        let Some(bucket) = self.by_type.get(dep_type) else {
            return matched;
        };

        for package in packages {
            for compiled in bucket {
                if compiled.regex.is_match(package) {
                    let reasons = matched.entry(compiled.tech.clone()).or_default();
                    let reason = format!("matched dependency: {}", package);
                    if !reasons.contains(&reason) {
                        reasons.push(reason);
                    }
                }
            }
        }

        matched
    }
}
