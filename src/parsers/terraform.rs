//! Terraform file parsing
//!
//! Line-oriented extraction of provider blocks from `.terraform.lock.hcl`
//! and resource types from `.tf` files. Only the block headers and the
//! lock file's `version` attribute are needed, so no HCL document model is
//! involved.

use regex::Regex;
use std::sync::OnceLock;

/// Files above this size are skipped entirely.
pub const MAX_TF_FILE_SIZE: u64 = 500_000;

#[derive(Debug, Clone, PartialEq)]
pub struct TerraformProvider {
    pub name: String,
    pub version: String,
}

fn provider_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"^provider\s+"([^"]+)"\s*\{"#).expect("valid regex"))
}

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"^\s*version\s*=\s*"([^"]+)""#).expect("valid regex"))
}

fn resource_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^resource\s+"([^"]+)"\s+"[^"]+"\s*\{"#).expect("valid regex")
    })
}

/// Extracts `(provider, version)` pairs from a `.terraform.lock.hcl` body.
pub fn parse_terraform_lock(content: &str) -> Vec<TerraformProvider> {
    let mut providers = Vec::new();
    let mut current: Option<TerraformProvider> = None;

    for line in content.lines() {
        if let Some(caps) = provider_regex().captures(line.trim_start()) {
            if let Some(provider) = current.take() {
                providers.push(provider);
            }
            current = Some(TerraformProvider {
                name: caps[1].to_string(),
                version: "latest".to_string(),
            });
            continue;
        }

        if let Some(provider) = current.as_mut() {
            if let Some(caps) = version_regex().captures(line) {
                provider.version = caps[1].to_string();
            }
            if line.trim() == "}" {
                providers.push(current.take().expect("provider is set"));
            }
        }
    }

    if let Some(provider) = current {
        providers.push(provider);
    }

    providers
}

/// Extracts the set of distinct resource types (first label of each
/// `resource` block) from a `.tf` body, in first-seen order.
pub fn parse_terraform_resources(content: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut resources = Vec::new();

    for line in content.lines() {
        if let Some(caps) = resource_regex().captures(line.trim_start()) {
            let resource_type = caps[1].to_string();
            if seen.insert(resource_type.clone()) {
                resources.push(resource_type);
            }
        }
    }

    resources
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lock_providers() {
        let content = r#"
# This file is maintained automatically by "terraform init".

provider "registry.terraform.io/hashicorp/aws" {
  version     = "5.46.0"
  constraints = "~> 5.0"
  hashes = [
    "h1:abc=",
  ]
}

provider "registry.terraform.io/hashicorp/random" {
  version = "3.6.1"
}
"#;
        let providers = parse_terraform_lock(content);
        assert_eq!(providers.len(), 2);
        assert_eq!(providers[0].name, "registry.terraform.io/hashicorp/aws");
        assert_eq!(providers[0].version, "5.46.0");
        assert_eq!(providers[1].version, "3.6.1");
    }

    #[test]
    fn test_parse_lock_missing_version() {
        let providers = parse_terraform_lock("provider \"x/y\" {\n}\n");
        assert_eq!(providers[0].version, "latest");
    }

    #[test]
    fn test_parse_resources_deduplicated() {
        let content = r#"
resource "aws_s3_bucket" "logs" {
  bucket = "logs"
}

resource "aws_s3_bucket" "assets" {
  bucket = "assets"
}

resource "aws_db_instance" "main" {
  engine = "postgres"
}
"#;
        let resources = parse_terraform_resources(content);
        assert_eq!(resources, vec!["aws_s3_bucket", "aws_db_instance"]);
    }

    #[test]
    fn test_data_blocks_not_resources() {
        let content = "data \"aws_ami\" \"ubuntu\" {\n}\n";
        assert!(parse_terraform_resources(content).is_empty());
    }
}
