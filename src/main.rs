//! infocache - agent-side attach info and fabric cache
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use infocache::cli::{commands, Cli, Commands};
use infocache::config::{Config, ConfigManager};
use infocache::error::InfoCacheResult;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> InfoCacheResult<()> {
    let cli = Cli::parse();

    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };
    let config = config_manager.load().await?;

    init_logging(cli.verbose, &config);

    match cli.command {
        Commands::Config(args) => commands::config(args, &config_manager, &config).await,
        Commands::NetScan(args) => commands::net_scan(args, &cli.sources, &config).await,
        Commands::Select(args) => commands::select(args, &cli.sources, &config).await,
        Commands::AttachInfo(args) => commands::attach_info(args, &cli.sources, &config).await,
        Commands::Watch => commands::watch(&cli.sources, &config).await,
    }
}

/// 0 = warn, 1 = info, 2+ = debug; RUST_LOG wins when set
fn init_logging(verbose: u8, config: &Config) {
    let default = match verbose {
        0 => "infocache=warn",
        1 => "infocache=info",
        _ => "infocache=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
