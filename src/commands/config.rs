//! Config command handler.

use nestlist::config::NestlistConfig;
use nestlist::observability::LOG_ENV;

/// Config command.
pub fn cmd_config(config: &NestlistConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("Current Configuration");
    println!("=====================");
    println!();
    println!("Database Path: {}", config.database_path.display());
    println!("Table: {}", config.table);
    println!();

    println!("Logging:");
    println!(
        "  Format: {}",
        config.logging.format.as_deref().unwrap_or("pretty")
    );
    println!(
        "  File: {}",
        config
            .logging
            .file
            .as_ref()
            .map_or_else(|| "(stderr)".to_string(), |p| p.display().to_string())
    );
    println!(
        "  Filter: {}",
        config.logging.filter.as_deref().unwrap_or("info")
    );
    if let Ok(filter) = std::env::var(LOG_ENV) {
        println!("  {LOG_ENV}: {filter}");
    }

    Ok(())
}
