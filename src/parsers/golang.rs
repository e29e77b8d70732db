//! go.mod parsing

use crate::payload::Dependency;

#[derive(Debug, Clone, Default)]
pub struct GoModule {
    pub module: Option<String>,
    pub dependencies: Vec<Dependency>,
}

/// Parses a `go.mod` body: module path plus `require` entries in both the
/// single-line and block forms. `// indirect` markers are kept as
/// dependencies; the comment itself is discarded.
pub fn parse_go_mod(content: &str) -> GoModule {
    let mut module = GoModule::default();
    let mut in_require_block = false;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }

        if let Some(rest) = line.strip_prefix("module ") {
            module.module = Some(rest.trim().to_string());
            continue;
        }

        if line == "require (" {
            in_require_block = true;
            continue;
        }
        if in_require_block && line == ")" {
            in_require_block = false;
            continue;
        }

        let entry = if in_require_block {
            Some(line)
        } else {
            line.strip_prefix("require ")
        };

        if let Some(entry) = entry {
            let entry = entry.split("//").next().unwrap_or("").trim();
            let mut parts = entry.split_whitespace();
            if let (Some(name), Some(version)) = (parts.next(), parts.next()) {
                let dep = Dependency::new("golang", name, version.trim_start_matches('v'));
                if !module.dependencies.contains(&dep) {
                    module.dependencies.push(dep);
                }
            }
        }
    }

    module
}
