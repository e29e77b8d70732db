//! .NET project file parsing (.csproj / .vbproj / .fsproj)

use roxmltree::Document;

#[derive(Debug, Clone, Default)]
pub struct DotNetProject {
    pub name: String,
    pub target_framework: Option<String>,
    /// `(package, version)` pairs from `PackageReference` items
    pub packages: Vec<(String, String)>,
}

/// Parses a .NET project XML body. The project name falls back to the
/// file stem when no `AssemblyName` is declared.
pub fn parse_dotnet_project(content: &str, file_stem: &str) -> DotNetProject {
    let mut project = DotNetProject {
        name: file_stem.to_string(),
        ..Default::default()
    };

    let Ok(doc) = Document::parse(content) else {
        return project;
    };

    for node in doc.descendants().filter(|n| n.is_element()) {
        if node.has_tag_name("AssemblyName") {
            if let Some(name) = node.text() {
                let name = name.trim();
                if !name.is_empty() {
                    project.name = name.to_string();
                }
            }
        } else if node.has_tag_name("TargetFramework") || node.has_tag_name("TargetFrameworks") {
            if project.target_framework.is_none() {
                project.target_framework = node.text().map(|s| s.trim().to_string());
            }
        } else if node.has_tag_name("PackageReference") {
            let Some(include) = node.attribute("Include") else {
                continue;
            };
            let version = node
                .attribute("Version")
                .map(|v| v.to_string())
                .or_else(|| {
                    node.children()
                        .find(|c| c.has_tag_name("Version"))
                        .and_then(|c| c.text())
                        .map(|s| s.trim().to_string())
                })
                .unwrap_or_else(|| "latest".to_string());

            project.packages.push((include.to_string(), version));
        }
    }

    project
}
