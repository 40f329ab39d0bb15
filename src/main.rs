//! Binary entry point for nestlist.
//!
//! This binary provides a CLI over persistent lists stored in a `SQLite` file.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow unnecessary_wraps for consistent command function signatures
#![allow(clippy::unnecessary_wraps)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

mod commands;

use clap::{Parser, Subcommand};
use nestlist::config::NestlistConfig;
use nestlist::observability::{self, LoggingConfig};
use std::path::PathBuf;
use std::process::ExitCode;

/// Nestlist - cursor-navigated linked lists persisted to `SQLite`.
#[derive(Parser)]
#[command(name = "nestlist")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "NESTLIST_CONFIG")]
    config: Option<PathBuf>,

    /// Database file (overrides config and `NESTLIST_DATABASE`).
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Table name (overrides config and `NESTLIST_TABLE`).
    #[arg(short, long, global = true)]
    table: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Print the stored list.
    Show {
        /// Treat the table as a list of lists.
        #[arg(long)]
        nested: bool,
    },

    /// Append a node.
    Append {
        /// Label of the new node.
        label: String,

        /// Payload id stored with the node.
        #[arg(short, long)]
        payload: Option<i64>,
    },

    /// Insert a node before the node at a position.
    Insert {
        /// Label of the new node.
        label: String,

        /// Zero-based position of the node to insert before.
        #[arg(short, long)]
        before: usize,
    },

    /// Append an empty sublist.
    AddList {
        /// Label of the new sublist.
        label: String,
    },

    /// Append a node to a sublist.
    AddNode {
        /// Zero-based position of the sublist.
        list_index: usize,

        /// Label of the new node.
        label: String,
    },

    /// Delete a node, or with `--nested` a whole sublist.
    Delete {
        /// Zero-based position.
        index: usize,

        /// Delete the sublist at the position and all of its nodes.
        #[arg(long)]
        nested: bool,
    },

    /// Show row count and head pointer.
    Status,

    /// Copy the database file.
    Backup {
        /// Destination file.
        path: PathBuf,
    },

    /// Show the effective configuration.
    Config,
}

fn main() -> ExitCode {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    let logging = LoggingConfig::from_settings(Some(&config.logging), cli.verbose);
    if let Err(e) = observability::init(&logging) {
        eprintln!("Failed to initialize observability: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

fn run_command(command: Commands, config: &NestlistConfig) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Show { nested } => commands::cmd_show(config, nested),
        Commands::Append { label, payload } => commands::cmd_append(config, label, payload),
        Commands::Insert { label, before } => commands::cmd_insert(config, label, before),
        Commands::AddList { label } => commands::cmd_add_list(config, label),
        Commands::AddNode { list_index, label } => commands::cmd_add_node(config, list_index, label),
        Commands::Delete { index, nested } => commands::cmd_delete(config, index, nested),
        Commands::Status => commands::cmd_status(config),
        Commands::Backup { path } => commands::cmd_backup(config, path),
        Commands::Config => commands::cmd_config(config),
    }
}

/// Loads configuration: file (explicit or default location), then
/// environment, then command-line flags.
fn load_config(cli: &Cli) -> Result<NestlistConfig, Box<dyn std::error::Error>> {
    let config = match cli.config.as_deref() {
        Some(path) => NestlistConfig::load_from_file(path)?,
        None => NestlistConfig::load_default(),
    };
    let mut config = config.with_env_overrides();

    if let Some(database) = &cli.database {
        config = config.with_database_path(database);
    }
    if let Some(table) = &cli.table {
        config = config.with_table(table);
    }
    Ok(config)
}
