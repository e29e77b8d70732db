//! Declarative rule corpus: model, loader, and type configuration

mod loader;
mod model;

pub use loader::{load_rules, load_types_config, RuleSet};
pub use model::{compile_pattern, Content, DependencyPattern, Rule, TypeDefinition, TypesConfig};
