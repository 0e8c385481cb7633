//! Ruledesk CLI - build and submit automation rules from the terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{catalog, delete, edit, logs, new, server};

/// Ruledesk - edit automation rules and submit them to the rule server
#[derive(Parser)]
#[command(name = "ruledesk", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new rule
    New(new::NewArgs),

    /// Edit an existing rule
    Edit(edit::EditArgs),

    /// Delete a rule on the server
    Delete {
        /// Server id of the rule
        id: u64,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show condition and action keys with their value choices
    Catalog {
        /// Catalog file (defaults to catalogPath from settings)
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or change the rule server settings
    Server(server::ServerArgs),

    /// View and manage application logs
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::New(args) => new::run(args),
        Commands::Edit(args) => edit::run(args),
        Commands::Delete { id, force, json } => delete::run(id, force, json),
        Commands::Catalog { catalog, json } => catalog::run(catalog, json),
        Commands::Server(args) => server::run(args),
        Commands::Logs { command } => logs::run(command),
    }
}
