use clap::Parser;
use stack_analyzer::cli::{self, CliArgs, Commands};
use stack_analyzer::VERSION;
use std::env;
use std::process;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("stack-analyzer v{} starting", VERSION);

    let exit_code = match &args.command {
        Commands::Scan(scan_args) => cli::run_scan(scan_args, args.quiet),
        Commands::Info(info_args) => cli::run_info(info_args),
    };

    process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let level = if let Some(level_str) = &args.log_level {
            parse_level(level_str)
        } else if args.verbose {
            Level::DEBUG
        } else if args.quiet {
            Level::ERROR
        } else {
            let level_str =
                env::var("STACK_ANALYZER_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string());
            parse_level(&level_str)
        };

        let mut filter = EnvFilter::from_default_env();
        if env::var("RUST_LOG").is_err() {
            filter = filter.add_directive(
                format!("stack_analyzer={}", level)
                    .parse()
                    .expect("valid directive"),
            );
        }

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    });
}

fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to WARN. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::WARN
        }
    }
}
