//! cloudpack CLI application
//!
//! Resolves one task from the command line and runs it. Every failure is
//! reported as a single message on stderr with exit status 1.

use std::process;

use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

use cloudpack::cli::{default_registry, Cli, TaskContext};
use cloudpack::config::AppConfig;
use cloudpack::errors::{FilesystemError, Result};

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        debug!("Task failed ({})", e.category());
        eprintln!("Error: {}", e.report());
        process::exit(e.exit_code());
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();
    init_logging(&cli);

    info!("cloudpack v{} starting", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load(cli.global.config.clone()).await?;
    let working_dir = std::env::current_dir().map_err(|source| FilesystemError::Read {
        path: ".".into(),
        source,
    })?;
    let registry = default_registry()?;

    let ctx = TaskContext {
        config,
        args: cli.args.clone(),
        working_dir,
        quiet: cli.global.quiet,
    };
    registry.dispatch(cli.task.as_deref(), ctx).await
}

/// Initialize logging based on CLI verbosity settings
fn init_logging(cli: &Cli) {
    let log_level = cli.log_level();

    let filter = EnvFilter::from_default_env().add_directive(
        format!("cloudpack={}", log_level)
            .parse()
            .unwrap_or_else(|_| log_level.into()),
    );

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(cli.global.very_verbose) // Show levels only in very verbose mode
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
