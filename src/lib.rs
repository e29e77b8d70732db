pub mod aggregator;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod deps;
pub mod detectors;
pub mod error;
pub mod fs;
pub mod languages;
pub mod matchers;
pub mod metadata;
pub mod parsers;
pub mod payload;
pub mod rules;
pub mod scanner;

pub use aggregator::{AggregateOutput, Aggregator};
pub use classifier::Classifier;
pub use config::{ProjectConfig, Settings};
pub use deps::DependencyResolver;
pub use error::{ConfigError, ScanError};
pub use fs::{FileSystem, MockFileSystem, RealFileSystem};
pub use metadata::{GitInfo, ScanMetadata};
pub use payload::{Dependency, Edge, Payload};
pub use rules::{Rule, RuleSet, TypesConfig};
pub use scanner::{Engine, ForcedTech, ScanOptions, Scanner};

pub fn init_default() {
    use std::sync::Once;
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::from_default_env()
            .add_directive("stack_analyzer=info".parse().expect("valid directive"));

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    });
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "stack-analyzer");
    }
}
