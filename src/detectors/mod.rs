//! Component detectors
//!
//! One detector per ecosystem. A detector inspects a single directory
//! listing and returns named payloads (attached as child components) and
//! virtual fragments (merged into the enclosing context). The registry is
//! an explicit ordered list; ordering does not affect correctness because
//! results are merged.

mod deno;
mod docker;
mod dotenv;
mod dotnet;
mod github_actions;
mod golang;
mod java;
mod json_schema;
mod license;
mod node;
mod php;
mod python;
mod ruby;
mod rust;
mod terraform;

pub use deno::DenoDetector;
pub use docker::DockerDetector;
pub use dotenv::DotenvDetector;
pub use dotnet::DotNetDetector;
pub use github_actions::GithubActionsDetector;
pub use golang::GoDetector;
pub use java::JavaDetector;
pub use json_schema::{is_json_schema_predicate, JsonSchemaDetector};
pub use license::detect_directory_licenses;
pub use node::NodeDetector;
pub use php::PhpDetector;
pub use python::PythonDetector;
pub use ruby::RubyDetector;
pub use rust::RustDetector;
pub use terraform::TerraformDetector;

use crate::deps::DependencyResolver;
use crate::fs::{DirEntry, FileSystem};
use crate::payload::Payload;
use crate::rules::RuleSet;
use std::path::Path;

/// A detector result: either a named component or a virtual fragment to
/// merge into the enclosing context.
pub enum Detection {
    Named(Payload),
    Virtual(Payload),
}

/// Everything a detector sees for one directory.
pub struct DetectorContext<'a> {
    pub files: &'a [DirEntry],
    pub current_path: &'a Path,
    pub base_path: &'a Path,
    pub fs: &'a dyn FileSystem,
    pub resolver: &'a DependencyResolver,
    pub rules: &'a RuleSet,
}

impl<'a> DetectorContext<'a> {
    /// Reads a file from the current directory; unreadable files are
    /// treated as absent.
    pub fn read(&self, name: &str) -> Option<String> {
        self.fs.read_to_string(&self.current_path.join(name)).ok()
    }

    /// Repository-relative POSIX path (`/`-prefixed) of a file in the
    /// current directory.
    pub fn relative_path(&self, name: &str) -> String {
        relative_file_path(self.base_path, self.current_path, name)
    }

    /// Name of the current directory, used when a manifest declares no
    /// project name.
    pub fn directory_name(&self) -> String {
        self.current_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("main")
            .to_string()
    }
}

pub trait ComponentDetector: Send + Sync {
    fn name(&self) -> &'static str;

    fn detect(&self, ctx: &DetectorContext) -> Vec<Detection>;
}

/// The standard detector list, in registration order.
pub fn default_detectors() -> Vec<Box<dyn ComponentDetector>> {
    vec![
        Box::new(NodeDetector),
        Box::new(PythonDetector),
        Box::new(JavaDetector),
        Box::new(DotNetDetector),
        Box::new(GoDetector),
        Box::new(RustDetector),
        Box::new(PhpDetector),
        Box::new(RubyDetector),
        Box::new(DenoDetector),
        Box::new(DockerDetector),
        Box::new(TerraformDetector),
    ]
}

/// Builds the `/`-prefixed repository-relative path for `name` inside
/// `current`, relative to `base`. The root itself maps to `/`.
pub fn relative_file_path(base: &Path, current: &Path, name: &str) -> String {
    let full = current.join(name);
    let rel = full.strip_prefix(base).unwrap_or(&full);

    let mut out = String::from("/");
    let joined = rel
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect::<Vec<_>>()
        .join("/");
    out.push_str(&joined);
    out
}

/// Same, for the directory itself.
pub fn relative_dir_path(base: &Path, current: &Path) -> String {
    let rel = current.strip_prefix(base).unwrap_or(current);
    let joined = rel
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect::<Vec<_>>()
        .join("/");

    if joined.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", joined)
    }
}
