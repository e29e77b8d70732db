//! Error taxonomy for scan initialization and execution
//!
//! Fatal errors bubble to the caller as structured values; non-fatal
//! conditions (parser failures, unreadable files, unlistable
//! subdirectories) are logged at the point of occurrence and skipped.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised before any scan side effects (rule corpus, type config,
/// project config). All of these are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A rule document in the embedded corpus failed to parse or validate
    #[error("invalid rule document {file}: {reason}")]
    RuleLoad { file: String, reason: String },

    /// Two carriers of the same tech slug disagree on name or type
    #[error("conflicting rules for tech '{tech}': {reason}")]
    RuleConflict { tech: String, reason: String },

    /// The type configuration document failed to parse
    #[error("invalid type configuration: {0}")]
    TypeConfig(String),

    /// The project configuration (.stack-analyzer.yml) failed to parse
    #[error("invalid project configuration {path}: {reason}")]
    ProjectConfig { path: PathBuf, reason: String },

    /// A regex in a rule failed to compile at load time
    #[error("invalid regex in rule '{tech}': {pattern}: {reason}")]
    Regex {
        tech: String,
        pattern: String,
        reason: String,
    },
}

/// Errors raised during a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The scan root could not be listed at all
    #[error("cannot access scan root {path}: {reason}")]
    Provider { path: PathBuf, reason: String },

    /// The host requested cancellation; no payload is produced
    #[error("scan canceled")]
    Canceled,
}
