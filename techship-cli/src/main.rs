//! TechShip CLI - shipment tracking from the terminal.
//!
//! Live carrier lookups (`track`), the PIN-scoped dashboard view (`show`),
//! and the master database maintenance commands (`update`, `trim`) over the
//! techship library.

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};

use crate::commands::{config, init, show, track, trim, update};

#[derive(Debug, Parser)]
#[command(name = "techship", version, about = "TechShip shipment tracking dashboard")]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Live tracking lookup against the carrier API
    Track(track::TrackArgs),

    /// Show your shipments from the master database (PIN required)
    Show(show::ShowArgs),

    /// Merge the newest warehouse export into the master database
    Update(update::UpdateArgs),

    /// Trim the master database to its row cap, newest rows first
    Trim(trim::TrimArgs),

    /// View or modify configuration
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },

    /// Create the configuration file with default settings
    Init,
}

fn main() {
    let cli = Cli::parse();
    techship::logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Track(args) => track::run(args),
        Commands::Show(args) => show::run(args),
        Commands::Update(args) => update::run(args),
        Commands::Trim(args) => trim::run(args),
        Commands::Config { command } => config::run(command),
        Commands::Init => init::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
