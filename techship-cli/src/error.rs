//! CLI error type.

use std::fmt;

use techship::config::ConfigError;
use techship::store::StoreError;

/// Errors surfaced to the terminal user.
#[derive(Debug)]
pub enum CliError {
    /// Configuration problem (bad key, unreadable file, invalid value).
    Config(ConfigError),

    /// Master database problem.
    Store(StoreError),

    /// PIN did not match any configured client.
    AuthFailed,

    /// Bad command-line input (dates, empty tracking list, ...).
    InvalidArgument(String),

    /// Failed to create the HTTP client.
    Http(String),

    /// Interactive prompt failed.
    Prompt(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Store(e) => write!(f, "Database error: {}", e),
            CliError::AuthFailed => {
                write!(f, "Invalid PIN. Please check with your account manager.")
            }
            CliError::InvalidArgument(msg) => write!(f, "{}", msg),
            CliError::Http(msg) => write!(f, "HTTP client error: {}", msg),
            CliError::Prompt(msg) => write!(f, "Prompt error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        CliError::Store(e)
    }
}
