//! Command implementations for the scan and info verbs

pub mod commands;
pub mod output;

pub use commands::{CliArgs, Commands, InfoArgs, InfoCommands, InfoFormat, ScanArgs};

use crate::aggregator::Aggregator;
use crate::config::{ProjectConfig, Settings};
use crate::fs::RealFileSystem;
use crate::languages;
use crate::metadata::ScanMetadata;
use crate::rules;
use crate::scanner::{Engine, ForcedTech, ScanOptions, Scanner};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Exit codes: 0 success, 1 initialization failure, 2 scan failure,
/// 3 output failure.
pub const EXIT_INIT: i32 = 1;
pub const EXIT_SCAN: i32 = 2;
pub const EXIT_OUTPUT: i32 = 3;

pub fn run_scan(args: &ScanArgs, quiet: bool) -> i32 {
    let mut settings = Settings::from_env();
    if let Some(output) = &args.output {
        settings.output_file = Some(output.clone());
    }
    if let Some(excludes) = &args.exclude_dir {
        settings
            .exclude_dirs
            .extend(excludes.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()));
    }
    if let Some(aggregate) = &args.aggregate {
        settings.aggregate = aggregate
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
    settings.pretty_print = args.pretty;

    let path = args.path.clone().unwrap_or_else(|| PathBuf::from("."));
    let path = match path.canonicalize() {
        Ok(path) => path,
        Err(e) => {
            error!(path = %path.display(), error = %e, "path does not exist");
            eprintln!("Error: path does not exist: {}", path.display());
            return EXIT_INIT;
        }
    };

    let scan_target_file = path.is_file().then(|| {
        path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    });
    let base_path = if scan_target_file.is_some() {
        path.parent().map(PathBuf::from).unwrap_or_else(|| path.clone())
    } else {
        path.clone()
    };

    let project = match ProjectConfig::load(&base_path) {
        Ok(project) => project,
        Err(e) => {
            error!(error = %e, "project configuration rejected");
            eprintln!("Error: {}", e);
            return EXIT_INIT;
        }
    };

    let engine = match Engine::load() {
        Ok(engine) => Arc::new(engine),
        Err(e) => {
            error!(error = %e, "rule corpus failed to load");
            eprintln!("Error: {}", e);
            return EXIT_INIT;
        }
    };

    // validate aggregation fields before spending time on the scan
    let aggregator = if settings.aggregate.is_empty() {
        None
    } else {
        match Aggregator::new(&settings.aggregate) {
            Ok(aggregator) => Some(aggregator),
            Err(message) => {
                eprintln!("Error: {}", message);
                return EXIT_INIT;
            }
        }
    };

    let mut exclude = settings.exclude_dirs.clone();
    exclude.extend(project.exclude.iter().cloned());

    let options = ScanOptions {
        exclude: exclude.clone(),
        forced_techs: project
            .techs
            .iter()
            .map(|t| ForcedTech {
                tech: t.tech.clone(),
                reason: t.reason.clone(),
            })
            .collect(),
        ..Default::default()
    };

    let scanner = Scanner::new(engine, Arc::new(RealFileSystem::new()), base_path.clone(), options);

    if !quiet {
        info!(path = %path.display(), "scanning");
    }
    let started = Instant::now();

    let mut payload = {
        let result = match &scan_target_file {
            Some(file_name) => scanner.scan_file(file_name),
            None => scanner.scan(),
        };
        match result {
            Ok(payload) => payload,
            Err(e) => {
                error!(error = %e, "scan failed");
                eprintln!("Error: scan failed: {}", e);
                return EXIT_SCAN;
            }
        }
    };

    let mut metadata = ScanMetadata::new(&path, exclude);
    metadata.set_duration(started.elapsed());
    let (tech_count, techs_count) = payload.tech_counts();
    metadata.set_counts(
        payload.file_count(),
        payload.component_count(),
        payload.language_names().len() as u64,
        tech_count,
        techs_count,
    );
    metadata.set_properties(project.properties.clone());
    payload.metadata = Some(metadata);

    debug!(
        components = payload.component_count(),
        "assembling output"
    );

    let rendered = {
        let result = match &aggregator {
            Some(aggregator) => output::to_json(&aggregator.aggregate(&payload), settings.pretty_print),
            None => output::to_json(&payload, settings.pretty_print),
        };
        match result {
            Ok(rendered) => rendered,
            Err(e) => {
                error!(error = %e, "serialization failed");
                eprintln!("Error: failed to serialize output: {}", e);
                return EXIT_OUTPUT;
            }
        }
    };

    if let Err(e) = output::write_output(&rendered, settings.output_file.as_deref()) {
        error!(error = %e, "write failed");
        eprintln!("Error: failed to write output: {}", e);
        return EXIT_OUTPUT;
    }

    0
}

pub fn run_info(args: &InfoArgs) -> i32 {
    match &args.command {
        InfoCommands::ComponentTypes { format } => info_component_types(*format),
        InfoCommands::Techs { format } => info_techs(*format),
        InfoCommands::Rule { tech, format } => info_rule(tech, *format),
        InfoCommands::Languages { format } => info_languages(*format),
    }
}

fn info_component_types(format: InfoFormat) -> i32 {
    let types = match rules::load_types_config() {
        Ok(types) => types,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_INIT;
        }
    };

    let mut component_types = Vec::new();
    let mut non_component_types = Vec::new();
    for (name, definition) in &types.types {
        if definition.is_component {
            component_types.push(name.clone());
        } else {
            non_component_types.push(name.clone());
        }
    }

    match format {
        InfoFormat::Text => {
            println!("=== Component types (create components) ===");
            for name in &component_types {
                print_type_line(&types, name);
            }
            println!();
            println!("=== Non-component types (tools/libraries only) ===");
            for name in &non_component_types {
                print_type_line(&types, name);
            }
        }
        InfoFormat::Json | InfoFormat::Yaml => {
            let value = serde_json::json!({
                "component_types": component_types,
                "non_component_types": non_component_types,
            });
            print_structured(&value, format);
        }
    }

    0
}

fn print_type_line(types: &rules::TypesConfig, name: &str) {
    match types.types.get(name).and_then(|t| t.description.as_deref()) {
        Some(description) => println!("{} - {}", name, description),
        None => println!("{}", name),
    }
}

fn info_techs(format: InfoFormat) -> i32 {
    let rule_set = match rules::load_rules() {
        Ok(rule_set) => rule_set,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_INIT;
        }
    };

    let mut techs: Vec<&str> = rule_set.iter().map(|r| r.tech.as_str()).collect();
    techs.sort_unstable();
    techs.dedup();

    match format {
        InfoFormat::Text => {
            for tech in &techs {
                println!("{}", tech);
            }
            eprintln!("\nTotal: {} technologies", techs.len());
        }
        InfoFormat::Json | InfoFormat::Yaml => {
            let technologies: Vec<_> = techs
                .iter()
                .filter_map(|tech| rule_set.find(tech))
                .map(|rule| {
                    serde_json::json!({
                        "tech": rule.tech,
                        "name": rule.name,
                        "type": rule.rule_type,
                    })
                })
                .collect();
            print_structured(&serde_json::json!({ "technologies": technologies }), format);
        }
    }

    0
}

fn info_rule(tech: &str, format: InfoFormat) -> i32 {
    let rule_set = match rules::load_rules() {
        Ok(rule_set) => rule_set,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_INIT;
        }
    };

    let Some(rule) = rule_set.find(tech) else {
        eprintln!("Error: rule not found: {}", tech);
        return EXIT_INIT;
    };

    match format {
        InfoFormat::Yaml => match serde_yaml::to_string(rule) {
            Ok(rendered) => print!("{}", rendered),
            Err(e) => {
                eprintln!("Error: {}", e);
                return EXIT_OUTPUT;
            }
        },
        InfoFormat::Json | InfoFormat::Text => match serde_json::to_string_pretty(rule) {
            Ok(rendered) => println!("{}", rendered),
            Err(e) => {
                eprintln!("Error: {}", e);
                return EXIT_OUTPUT;
            }
        },
    }

    0
}

fn info_languages(format: InfoFormat) -> i32 {
    let all = languages::all_languages();

    match format {
        InfoFormat::Text => {
            for (name, kind, extensions) in &all {
                println!("{:<30} {:<12} {:?}", name, kind.as_str(), extensions);
            }
            println!("\nTotal: {} languages", all.len());
        }
        InfoFormat::Json | InfoFormat::Yaml => {
            let list: Vec<_> = all
                .iter()
                .map(|(name, kind, extensions)| {
                    serde_json::json!({
                        "name": name,
                        "type": kind.as_str(),
                        "extensions": extensions,
                    })
                })
                .collect();
            let value = serde_json::json!({
                "languages": list,
                "summary": { "total": list.len() },
            });
            print_structured(&value, format);
        }
    }

    0
}

fn print_structured(value: &serde_json::Value, format: InfoFormat) {
    match format {
        InfoFormat::Json | InfoFormat::Text => {
            println!("{}", serde_json::to_string_pretty(value).unwrap_or_default())
        }
        InfoFormat::Yaml => print!("{}", serde_yaml::to_string(value).unwrap_or_default()),
    }
}
