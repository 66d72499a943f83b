//! Shared helpers for CLI commands.

use std::path::PathBuf;

use chrono::NaiveDate;
use techship::config::ConfigFile;

use crate::error::CliError;

/// Load the config file, treating a broken file as a hard error but a
/// missing one as defaults.
pub fn load_config() -> Result<ConfigFile, CliError> {
    ConfigFile::load().map_err(CliError::from)
}

/// Master database path: CLI argument wins over the config file.
pub fn resolve_master_path(cli_path: Option<PathBuf>, config: &ConfigFile) -> PathBuf {
    cli_path.unwrap_or_else(|| config.database.master_path.clone())
}

/// Split raw tracking input on commas and whitespace, dropping empties.
/// `"398384333811, 1Z90RR77 xyz"` becomes three entries.
pub fn split_tracking_input(args: &[String]) -> Vec<String> {
    args.iter()
        .flat_map(|arg| arg.split(|c: char| c == ',' || c.is_whitespace()))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a `YYYY-MM-DD` CLI date argument.
pub fn parse_date(value: &str, flag: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        CliError::InvalidArgument(format!(
            "Invalid date '{}' for {}; expected YYYY-MM-DD",
            value, flag
        ))
    })
}
