//! Ignore and exclusion policy
//!
//! Directories are skipped either by the built-in name set (exact,
//! case-insensitive) or by user-supplied glob patterns. Files are excluded
//! by glob match against their repository-relative path or bare name.

use glob::Pattern;
use tracing::warn;

/// Directory names never descended into. `.github` is deliberately absent:
/// workflow detection needs it.
const BUILTIN_IGNORED_DIRS: &[&str] = &[
    // vcs
    ".git",
    ".svn",
    ".gitlab",
    // nodejs
    "node_modules",
    ".npm",
    ".yarn",
    ".pnp",
    ".next",
    ".nuxt",
    ".vuepress",
    // python
    "venv",
    ".venv",
    "__pycache__",
    ".pytest_cache",
    ".ruff_cache",
    ".mypy_cache",
    ".tox",
    ".eggs",
    ".hypothesis",
    // java
    ".gradle",
    ".m2",
    // dotnet
    "obj",
    "packages",
    // ruby
    ".bundle",
    // rust
    "target",
    // terraform
    ".terraform",
    "terraform.tfstate.d",
    // docker
    ".docker",
    // caches and editors
    ".cache",
    ".idea",
    ".vscode",
    ".devcontainer",
    // test fixtures
    "__fixtures__",
    "__snapshots__",
];

pub struct IgnorePolicy {
    patterns: Vec<Pattern>,
    literals: Vec<String>,
}

impl IgnorePolicy {
    pub fn new(excludes: &[String]) -> Self {
        let mut patterns = Vec::new();
        let mut literals = Vec::new();

        for exclude in excludes {
            match Pattern::new(exclude) {
                Ok(pattern) => patterns.push(pattern),
                Err(e) => {
                    warn!(pattern = %exclude, error = %e, "invalid exclude glob, using literal match");
                }
            }
            literals.push(exclude.clone());
        }

        Self { patterns, literals }
    }

    /// Should this directory be skipped entirely?
    pub fn is_ignored_dir(&self, name: &str) -> bool {
        for pattern in &self.patterns {
            if pattern.matches(name) {
                return true;
            }
        }
        for literal in &self.literals {
            if name.eq_ignore_ascii_case(literal) {
                return true;
            }
        }

        BUILTIN_IGNORED_DIRS
            .iter()
            .any(|ignored| name.eq_ignore_ascii_case(ignored))
    }

    /// Should this file be dropped from the listing? Matched against the
    /// repository-relative path and the bare name.
    pub fn is_excluded_file(&self, relative_path: &str, name: &str) -> bool {
        let trimmed = relative_path.trim_start_matches('/');
        self.patterns
            .iter()
            .any(|pattern| pattern.matches(trimmed) || pattern.matches(name))
    }

    pub fn has_excludes(&self) -> bool {
        !self.literals.is_empty()
    }
}
