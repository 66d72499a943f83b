//! Update command - merge the newest warehouse export into the master.

use std::path::PathBuf;

use clap::Args;
use techship::store::{latest_export, merge_master, MasterDb};

use crate::commands::common;
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Directory containing warehouse CSV exports
    #[arg(long, value_name = "DIR")]
    pub input_dir: PathBuf,

    /// Master database path (default: from config)
    #[arg(long, value_name = "PATH")]
    pub master: Option<PathBuf>,
}

/// Run the update command.
///
/// Picks the newest `.csv` in the input directory and upserts its rows into
/// the master file, creating the master when it does not exist yet.
pub fn run(args: UpdateArgs) -> Result<(), CliError> {
    let config = common::load_config()?;
    let master_path = common::resolve_master_path(args.master, &config);

    let export = latest_export(&args.input_dir)?;
    println!(
        "Processing: {}",
        export.file_name().unwrap_or_default().to_string_lossy()
    );

    let incoming = MasterDb::load(&export)?;
    let mut master = if master_path.exists() {
        MasterDb::load(&master_path)?
    } else {
        MasterDb::default()
    };

    let outcome = merge_master(&mut master, &incoming);
    master.save(&master_path)?;

    if outcome.replaced {
        println!("Master DB created from export: {} rows", master.len());
    } else {
        println!(
            "Master DB updated: {} rows ({} updated, {} added)",
            master.len(),
            outcome.updated,
            outcome.added
        );
    }
    Ok(())
}
