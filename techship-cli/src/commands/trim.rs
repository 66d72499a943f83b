//! Trim command - cap the master database at its row limit.

use std::path::PathBuf;

use clap::Args;
use techship::store::{trim_master, MasterDb};

use crate::commands::common;
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct TrimArgs {
    /// Row cap (default: from config)
    #[arg(long, value_name = "N")]
    pub max_rows: Option<usize>,

    /// Write the trimmed database here instead of back to the master
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Master database path (default: from config)
    #[arg(long, value_name = "PATH")]
    pub master: Option<PathBuf>,
}

/// Run the trim command.
pub fn run(args: TrimArgs) -> Result<(), CliError> {
    let config = common::load_config()?;
    let master_path = common::resolve_master_path(args.master, &config);
    let max_rows = args.max_rows.unwrap_or(config.database.max_rows);

    println!("Trimming master database to {} newest rows...", max_rows);
    let mut master = MasterDb::load(&master_path)?;
    let loaded = master.len();
    println!("Loaded {} rows", loaded);

    let outcome = trim_master(&mut master, max_rows);
    if !outcome.by_timestamp {
        println!("'ProcessedOn' column not found, kept the file tail instead");
    }
    if outcome.trimmed > 0 {
        println!("Trimmed {} oldest rows", outcome.trimmed);
    }

    let output_path = args.output.unwrap_or(master_path);
    master.save(&output_path)?;
    println!("Saved {} rows to {}", outcome.kept, output_path.display());
    Ok(())
}
