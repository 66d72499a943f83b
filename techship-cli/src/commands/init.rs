//! Init command - initialize the configuration file.

use techship::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Run the init command.
pub fn run() -> Result<(), CliError> {
    let config = ConfigFile::load().unwrap_or_default();
    config.save()?;

    let path = config_file_path();
    println!("Configuration file: {}", path.display());
    println!();
    println!("Edit this file to customize TechShip settings.");
    println!("CLI arguments override config file values when specified.");
    Ok(())
}
