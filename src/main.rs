//! shellcache - offline cache manager CLI
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use shellcache::cli::args::ConfigAction;
use shellcache::cli::{commands, Cli, Commands};
use shellcache::config::{Config, ConfigManager};
use shellcache::error::ShellCacheResult;
use std::process::ExitCode;
use tracing::debug;
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

async fn run() -> ShellCacheResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };

    // `config init --force` must work even when the current file does not parse
    if let Commands::Config(ref args) = cli.command {
        if let Some(ConfigAction::Init { force }) = args.action {
            init_logging(cli.verbose, &Config::default());
            return commands::config::init_config(&config_manager, force).await;
        }
    }

    let config = config_manager.load().await?;
    init_logging(cli.verbose, &config);
    debug!("Loaded config from {}", config_manager.path().display());

    ConfigManager::ensure_state_dirs(&config).await?;
    shellcache::ui::init_theme();

    match cli.command {
        Commands::Install(args) => commands::install(args, &config).await,
        Commands::Activate => commands::activate(&config).await,
        Commands::Fetch(args) => commands::fetch(args, &config).await,
        Commands::Message(args) => commands::message(args, &config).await,
        Commands::Push(args) => commands::push(args, &config).await,
        Commands::Sync(args) => commands::sync(args, &config).await,
        Commands::Cache(args) => commands::cache(args, &config).await,
        Commands::Status => commands::status(&config, config_manager.path()).await,
        Commands::Config(args) => commands::config(args, &config, &config_manager).await,
    }
}

/// 0 = warn, 1 = info, 2+ = debug; RUST_LOG overrides
fn init_logging(verbose: u8, config: &Config) {
    let default = match verbose {
        0 => "shellcache=warn",
        1 => "shellcache=info",
        _ => "shellcache=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
