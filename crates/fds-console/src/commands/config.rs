//! `fds config` command implementation

use crate::config::Config;
use crate::error::{ConsoleError, Result};
use colored::Colorize;

/// Show the effective configuration and where it was loaded from.
pub fn show(config: &Config) -> Result<()> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| ConsoleError::config(format!("cannot render configuration: {}", e)))?;

    println!("{}", "FDS Console Configuration:".cyan().bold());
    println!();
    print!("{}", rendered);
    println!();

    match Config::config_file_path() {
        Some(path) if path.exists() => println!("Config file: {}", path.display()),
        Some(path) => println!("Config file: {} {}", path.display(), "(not found)".dimmed()),
        None => println!("Config file: {}", "(no config directory)".dimmed()),
    }
    println!();
    println!("{}", "Environment Variables:".cyan());
    println!("  FDS_SERVER_URL          - Server URL");
    println!("  FDS_STATUS_INTERVAL_MS  - Status poll period");
    println!("  FDS_LOGS_INTERVAL_MS    - Log poll period");
    println!("  FDS_LOG_LIMIT           - Log lines per poll");
    println!("  FDS_API_TIMEOUT_SECS    - Request timeout");
    println!("  FDS_MUTATION_POLICY     - exclusive or independent");
    println!("  FDS_CONFIG              - Config file path");

    Ok(())
}
