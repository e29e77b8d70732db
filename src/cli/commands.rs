use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Technology stack analyzer for source repositories
#[derive(Parser, Debug)]
#[command(
    name = "stack-analyzer",
    about = "Detects languages, frameworks, databases, and services used in a codebase",
    version,
    long_about = "stack-analyzer walks a repository on local disk, evaluates a declarative \
                  rule corpus plus specialized manifest parsers, and emits a hierarchical \
                  JSON description of the detected technology stack."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    /// Logging level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    /// Enable verbose output (equivalent to --log-level debug)
    #[arg(short = 'v', long, global = true, help = "Increase verbosity")]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a project directory or single file
    #[command(
        about = "Scan a project or file for its technology stack",
        long_about = "Analyzes a project directory (or a single manifest file) to detect \
                      technologies, frameworks, databases, and services.\n\n\
                      Examples:\n  \
                      stack-analyzer scan /path/to/project\n  \
                      stack-analyzer scan /path/to/pom.xml\n  \
                      stack-analyzer scan --aggregate techs,languages /path/to/project\n  \
                      stack-analyzer scan --exclude-dir 'vendor,**/__tests__/**' ."
    )]
    Scan(ScanArgs),

    /// Display information about rules, types, and languages
    #[command(about = "Display information about rules and types")]
    Info(InfoArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ScanArgs {
    /// Path to scan (defaults to the current directory)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Write output to a file instead of stdout
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Comma-separated directories or glob patterns to exclude
    #[arg(long = "exclude-dir", value_name = "PATTERNS")]
    pub exclude_dir: Option<String>,

    /// Aggregate fields: tech,techs,languages,licenses,dependencies,all
    #[arg(long, value_name = "FIELDS")]
    pub aggregate: Option<String>,

    /// Pretty print JSON output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub pretty: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct InfoArgs {
    #[command(subcommand)]
    pub command: InfoCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum InfoCommands {
    /// List technology types that create components vs those that don't
    ComponentTypes {
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: InfoFormat,
    },
    /// List all technologies known to the rule corpus
    Techs {
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: InfoFormat,
    },
    /// Show the rule definition for one technology
    Rule {
        /// Technology slug, e.g. postgresql
        tech: String,
        #[arg(short = 'f', long, value_enum, default_value = "yaml")]
        format: InfoFormat,
    },
    /// List all languages known to the language adapter
    Languages {
        #[arg(short = 'f', long, value_enum, default_value = "json")]
        format: InfoFormat,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoFormat {
    Text,
    Json,
    Yaml,
}
