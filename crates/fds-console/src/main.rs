//! FDS Console - Main entry point

use clap::Parser;
use fds_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use fds_console::commands::{self, Console};
use fds_console::{render, Cli, Commands, Config, ConfigCommand};
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Verbose mode: debug to stderr. Normal mode: warnings only.
    let log_config = LogConfig::builder()
        .level(if cli.verbose {
            LogLevel::Debug
        } else {
            LogLevel::Warn
        })
        .output(LogOutput::Console)
        .log_file_prefix("fds")
        .build();

    // Environment variables take precedence
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    // The console works without logging; keep the guard alive for file output
    let _guard = init_logging(&log_config).unwrap_or(None);

    let class = cli.command.action_class();
    if let Err(e) = execute_command(&cli).await {
        error!(error = %e, "Command failed");
        if let Some(text) = render::render_error(&e, e.presentation(class)) {
            eprint!("{}", text);
        }
        process::exit(1);
    }
}

/// Config file and environment, then the `--server-url` flag
fn load_config(cli: &Cli) -> fds_console::Result<Config> {
    let mut config = Config::load()?;
    if let Some(ref url) = cli.server_url {
        config.set_server_url(url.clone());
    }
    config.validate()?;
    Ok(config)
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> fds_console::Result<()> {
    let config = load_config(cli)?;

    let assume_yes = match cli.command {
        Commands::Reset { yes } | Commands::Ingest { yes, .. } => yes,
        _ => false,
    };
    let console = Console::connect(config, assume_yes)?;

    match &cli.command {
        Commands::Watch => commands::watch::run(&console).await,
        Commands::Status => commands::status::run(&console).await,
        Commands::Logs { limit } => commands::logs::run(&console, *limit).await,
        Commands::Discover { toc_url } => commands::control::discover(&console, toc_url).await,
        Commands::Start => commands::control::start(&console).await,
        Commands::Pause => commands::control::pause(&console).await,
        Commands::Resume => commands::control::resume(&console).await,
        Commands::Retry => commands::control::retry(&console).await,
        Commands::Reset { .. } => commands::control::reset(&console).await,
        Commands::Search { table_name } => commands::search::run(&console, table_name).await,
        Commands::Ingest {
            table_name,
            table_url,
            ..
        } => commands::ingest::single(&console, table_name, table_url).await,
        Commands::IngestByName { table_name } => {
            commands::ingest::by_name(&console, table_name).await
        }
        Commands::Query { sql, format } => commands::query::run(&console, sql, format).await,
        Commands::Config {
            command: ConfigCommand::Show,
        } => commands::config::show(&console.config),
    }
}
