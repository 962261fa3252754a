//! CLI command implementations for Skirmish.

pub(crate) mod run;
pub(crate) mod summary;

use std::error::Error;
use std::fmt;

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<skirmish::transport::TransportError> for CliError {
    fn from(e: skirmish::transport::TransportError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<skirmish::journal::JournalError> for CliError {
    fn from(e: skirmish::journal::JournalError) -> Self {
        Self::new(e.to_string())
    }
}
