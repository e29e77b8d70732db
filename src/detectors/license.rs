//! Directory license detection

use super::DetectorContext;
use crate::parsers::detect_license_text;

const LICENSE_STEMS: &[&str] = &["LICENSE", "LICENCE", "COPYING"];

fn is_license_file(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    LICENSE_STEMS.iter().any(|stem| {
        upper == *stem
            || upper == format!("{}.MD", stem)
            || upper == format!("{}.TXT", stem)
            || upper.starts_with(&format!("{}-", stem))
    })
}

/// Identifies licenses from any LICENSE/LICENCE file in the directory.
pub fn detect_directory_licenses(ctx: &DetectorContext) -> Vec<String> {
    let mut licenses = Vec::new();

    for file in ctx
        .files
        .iter()
        .filter(|f| f.is_file() && is_license_file(&f.name))
    {
        let Some(content) = ctx.read(&file.name) else {
            continue;
        };
        if let Some(license) = detect_license_text(&content) {
            if !licenses.iter().any(|l| l == license) {
                licenses.push(license.to_string());
            }
        }
    }

    licenses
}
