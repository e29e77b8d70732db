//! Pure manifest parsers
//!
//! Each parser is a function from file content to a normalized result and
//! never touches the filesystem. Failure modes are non-fatal: a field that
//! cannot be read falls back to `latest` (versions) or is skipped.

mod cargo;
mod composer;
mod compose;
mod deno;
mod dockerfile;
mod dotenv;
mod dotnet;
mod golang;
mod gradle;
mod license;
mod maven;
mod node;
mod python;
mod ruby;
mod terraform;

pub use cargo::{parse_cargo_toml, CargoManifest};
pub use compose::{parse_compose, split_image, ComposeService};
pub use composer::{parse_composer_json, ComposerPackage};
pub use deno::{parse_deno_config, DenoConfig};
pub use dockerfile::{parse_dockerfile, DockerfileInfo};
pub use dotenv::parse_env_keys;
pub use dotnet::{parse_dotnet_project, DotNetProject};
pub use golang::{parse_go_mod, GoModule};
pub use gradle::{parse_gradle_dependencies, parse_gradle_project_name};
pub use license::detect_license_text;
pub use maven::{parse_pom, PomProject};
pub use node::{parse_package_json, NodePackage};
pub use python::{parse_pyproject, PyProject};
pub use ruby::parse_gemfile;
pub use terraform::{
    parse_terraform_lock, parse_terraform_resources, TerraformProvider, MAX_TF_FILE_SIZE,
};
