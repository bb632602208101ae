pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "inventory")]
#[command(about = "Inventory CLI - run the Asset Inventory API and check identifiers offline")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP API")]
    Serve {
        #[arg(long, help = "Keep data in memory instead of PostgreSQL")]
        in_memory: bool,
    },

    #[command(about = "Apply database migrations and exit")]
    Migrate,

    #[command(about = "Validate an identifier or search term")]
    Check {
        #[command(subcommand)]
        cmd: commands::check::CheckCommands,
    },

    #[command(about = "Show how a value is escaped for an OData filter")]
    Sanitize {
        #[arg(help = "Raw value")]
        value: String,
    },

    #[command(about = "Compute the asset code following a set of existing codes")]
    NextCode(commands::code::NextCodeArgs),

    #[command(about = "Issue a development bearer token signed with AUTH_DEV_SECRET")]
    DevToken(commands::token::DevTokenArgs),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Serve { in_memory } => commands::serve::serve(in_memory).await,
        Commands::Migrate => commands::serve::migrate(&output_format).await,
        Commands::Check { cmd } => commands::check::handle(cmd, &output_format),
        Commands::Sanitize { value } => commands::check::sanitize(&value, &output_format),
        Commands::NextCode(args) => commands::code::handle(args, &output_format),
        Commands::DevToken(args) => commands::token::handle(args, &output_format),
    }
}
