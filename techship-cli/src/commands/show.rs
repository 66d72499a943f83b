//! Show command - the PIN-scoped dashboard view of the master database.

use std::path::PathBuf;

use clap::Args;
use dialoguer::Password;
use techship::store::MasterDb;

use crate::commands::common;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Client PIN (prompted interactively when omitted)
    #[arg(long)]
    pub pin: Option<String>,

    /// Search terms; a row matches when any cell contains any term
    #[arg(long, value_name = "TERM")]
    pub search: Vec<String>,

    /// Only rows with one of these shipment statuses
    #[arg(long, value_name = "STATUS")]
    pub status: Vec<String>,

    /// Start of the processed-date range (inclusive)
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub from: Option<String>,

    /// End of the processed-date range (inclusive)
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub to: Option<String>,

    /// Columns to display (default: the dashboard column set)
    #[arg(long, value_name = "NAME")]
    pub columns: Vec<String>,

    /// Write the filtered rows to a CSV file
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,

    /// Master database path (default: from config)
    #[arg(long, value_name = "PATH")]
    pub master: Option<PathBuf>,
}

/// Run the show command.
pub fn run(args: ShowArgs) -> Result<(), CliError> {
    let config = common::load_config()?;

    let pin = match args.pin {
        Some(pin) => pin,
        None => Password::new()
            .with_prompt("Client PIN")
            .interact()
            .map_err(|e| CliError::Prompt(e.to_string()))?,
    };
    let client_code = config
        .clients
        .authenticate(&pin)
        .ok_or(CliError::AuthFailed)?
        .to_string();
    println!("Welcome! Viewing data for {}", client_code);

    let master_path = common::resolve_master_path(args.master, &config);
    let master = MasterDb::load(&master_path)?;

    let mine = master.filter_client(&client_code)?;
    let total = mine.len();
    if total == 0 {
        println!("No shipments found for client {}", client_code);
        return Ok(());
    }

    let mut view = mine;
    match (&args.from, &args.to) {
        (Some(from), Some(to)) => {
            let from = common::parse_date(from, "--from")?;
            let to = common::parse_date(to, "--to")?;
            if from > to {
                return Err(CliError::InvalidArgument(
                    "--from must not be after --to".to_string(),
                ));
            }
            view = view.filter_date_range(from, to);
        }
        (None, None) => {}
        _ => {
            return Err(CliError::InvalidArgument(
                "--from and --to must be used together".to_string(),
            ));
        }
    }
    if !args.status.is_empty() {
        view = view.filter_status(&args.status);
    }
    if !args.search.is_empty() {
        view = view.search(&args.search);
        println!("Found {} matching results", view.len());
    }

    let columns = if args.columns.is_empty() {
        let defaults: Vec<String> = techship::store::DEFAULT_COLUMNS
            .iter()
            .filter(|name| view.column_index(name).is_some())
            .map(|name| name.to_string())
            .collect();
        if defaults.is_empty() {
            view.display_columns()
        } else {
            defaults
        }
    } else {
        args.columns.clone()
    };
    let display = view.select_columns(&columns);

    println!();
    output::print_table(&display);
    println!();
    println!("Showing {} shipments | Total for {}: {}", display.len(), client_code, total);

    if let Some(path) = args.export {
        display.save(&path)?;
        println!("Exported filtered results to {}", path.display());
    }

    Ok(())
}
