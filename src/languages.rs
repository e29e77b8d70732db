//! Filename → language adapter
//!
//! Static extension and special-filename tables mapping a filename to a
//! language name and kind. Extension lookup runs first, then the
//! special-filename table (Makefile, Dockerfile, ...).

use serde::Serialize;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Language kind, mirroring the classification downstream consumers use
/// for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageType {
    Programming,
    Data,
    Markup,
    Prose,
    Unknown,
}

impl LanguageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageType::Programming => "programming",
            LanguageType::Data => "data",
            LanguageType::Markup => "markup",
            LanguageType::Prose => "prose",
            LanguageType::Unknown => "unknown",
        }
    }
}

use LanguageType::{Data, Markup, Programming, Prose};

const BY_EXTENSION: &[(&str, &str, LanguageType)] = &[
    (".rs", "Rust", Programming),
    (".go", "Go", Programming),
    (".py", "Python", Programming),
    (".pyi", "Python", Programming),
    (".js", "JavaScript", Programming),
    (".mjs", "JavaScript", Programming),
    (".cjs", "JavaScript", Programming),
    (".jsx", "JSX", Programming),
    (".ts", "TypeScript", Programming),
    (".mts", "TypeScript", Programming),
    (".tsx", "TSX", Programming),
    (".java", "Java", Programming),
    (".kt", "Kotlin", Programming),
    (".kts", "Kotlin", Programming),
    (".scala", "Scala", Programming),
    (".groovy", "Groovy", Programming),
    (".rb", "Ruby", Programming),
    (".php", "PHP", Programming),
    (".cs", "C#", Programming),
    (".vb", "Visual Basic .NET", Programming),
    (".fs", "F#", Programming),
    (".fsx", "F#", Programming),
    (".c", "C", Programming),
    (".h", "C", Programming),
    (".cpp", "C++", Programming),
    (".cc", "C++", Programming),
    (".cxx", "C++", Programming),
    (".hpp", "C++", Programming),
    (".hh", "C++", Programming),
    (".m", "Objective-C", Programming),
    (".mm", "Objective-C++", Programming),
    (".swift", "Swift", Programming),
    (".dart", "Dart", Programming),
    (".ex", "Elixir", Programming),
    (".exs", "Elixir", Programming),
    (".erl", "Erlang", Programming),
    (".hs", "Haskell", Programming),
    (".ml", "OCaml", Programming),
    (".clj", "Clojure", Programming),
    (".cljs", "ClojureScript", Programming),
    (".lua", "Lua", Programming),
    (".r", "R", Programming),
    (".jl", "Julia", Programming),
    (".zig", "Zig", Programming),
    (".nim", "Nim", Programming),
    (".pl", "Perl", Programming),
    (".pm", "Perl", Programming),
    (".sh", "Shell", Programming),
    (".bash", "Shell", Programming),
    (".zsh", "Shell", Programming),
    (".fish", "Shell", Programming),
    (".ps1", "PowerShell", Programming),
    (".bat", "Batchfile", Programming),
    (".sql", "SQL", Programming),
    (".tf", "HCL", Programming),
    (".tfvars", "HCL", Programming),
    (".hcl", "HCL", Programming),
    (".vue", "Vue", Programming),
    (".svelte", "Svelte", Programming),
    (".sol", "Solidity", Programming),
    (".proto", "Protocol Buffer", Data),
    (".json", "JSON", Data),
    (".jsonc", "JSON with Comments", Data),
    (".yml", "YAML", Data),
    (".yaml", "YAML", Data),
    (".toml", "TOML", Data),
    (".xml", "XML", Data),
    (".ini", "INI", Data),
    (".env", "Dotenv", Data),
    (".csv", "CSV", Data),
    (".graphql", "GraphQL", Data),
    (".gql", "GraphQL", Data),
    (".html", "HTML", Markup),
    (".htm", "HTML", Markup),
    (".css", "CSS", Markup),
    (".scss", "SCSS", Markup),
    (".sass", "Sass", Markup),
    (".less", "Less", Markup),
    (".svg", "SVG", Data),
    (".md", "Markdown", Prose),
    (".mdx", "MDX", Markup),
    (".rst", "reStructuredText", Prose),
    (".adoc", "AsciiDoc", Prose),
    (".txt", "Text", Prose),
    (".tex", "TeX", Markup),
];

const BY_FILENAME: &[(&str, &str, LanguageType)] = &[
    ("Makefile", "Makefile", Programming),
    ("GNUmakefile", "Makefile", Programming),
    ("Dockerfile", "Dockerfile", Programming),
    ("Containerfile", "Dockerfile", Programming),
    ("Jenkinsfile", "Groovy", Programming),
    ("Gemfile", "Ruby", Programming),
    ("Rakefile", "Ruby", Programming),
    ("Vagrantfile", "Ruby", Programming),
    ("Brewfile", "Ruby", Programming),
    ("CMakeLists.txt", "CMake", Programming),
    ("Caddyfile", "Caddyfile", Data),
    ("Procfile", "Procfile", Data),
    (".gitignore", "Ignore List", Data),
    (".dockerignore", "Ignore List", Data),
    (".editorconfig", "EditorConfig", Data),
    (".babelrc", "JSON", Data),
    (".eslintrc", "JSON", Data),
    (".prettierrc", "JSON", Data),
];

fn extension_index() -> &'static HashMap<&'static str, (&'static str, LanguageType)> {
    static INDEX: OnceLock<HashMap<&'static str, (&'static str, LanguageType)>> = OnceLock::new();
    INDEX.get_or_init(|| {
        BY_EXTENSION
            .iter()
            .map(|&(ext, name, kind)| (ext, (name, kind)))
            .collect()
    })
}

fn filename_index() -> &'static HashMap<&'static str, (&'static str, LanguageType)> {
    static INDEX: OnceLock<HashMap<&'static str, (&'static str, LanguageType)>> = OnceLock::new();
    INDEX.get_or_init(|| {
        BY_FILENAME
            .iter()
            .map(|&(file, name, kind)| (file, (name, kind)))
            .collect()
    })
}

/// Maps a filename to `(language, type)`. Returns `None` for unknown
/// files.
pub fn detect_language(filename: &str) -> Option<(&'static str, LanguageType)> {
    if let Some(idx) = filename.rfind('.') {
        if idx > 0 {
            let ext = filename[idx..].to_ascii_lowercase();
            if let Some(&(name, kind)) = extension_index().get(ext.as_str()) {
                return Some((name, kind));
            }
        }
    }

    // special filenames (Makefile, Dockerfile, dotfiles)
    if let Some(&(name, kind)) = filename_index().get(filename) {
        return Some((name, kind));
    }

    // .env, .env.local, .env.production
    if filename == ".env" || filename.starts_with(".env.") {
        return Some(("Dotenv", Data));
    }

    None
}

/// All known languages with their type, for the `info languages` command.
pub fn all_languages() -> Vec<(&'static str, LanguageType, Vec<&'static str>)> {
    let mut by_name: std::collections::BTreeMap<&str, (LanguageType, Vec<&str>)> =
        std::collections::BTreeMap::new();

    for &(ext, name, kind) in BY_EXTENSION {
        let entry = by_name.entry(name).or_insert((kind, Vec::new()));
        entry.1.push(ext);
    }
    for &(_, name, kind) in BY_FILENAME {
        by_name.entry(name).or_insert((kind, Vec::new()));
    }

    by_name
        .into_iter()
        .map(|(name, (kind, exts))| (name, kind, exts))
        .collect()
}
