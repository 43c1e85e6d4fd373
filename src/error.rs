use std::path::PathBuf;
use thiserror::Error;

/// Caller-facing failures; each one is fatal and raised where the mistake is made
#[derive(Error, Debug)]
pub enum Error {
    #[error("Report root does not exist: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("Unknown parser '{name}', expected one of: {known}")]
    UnknownParser { name: String, known: String },

    #[error("Invalid parameter '{name}' for parser {parser}: {reason}")]
    InvalidParameter {
        parser: &'static str,
        name: String,
        reason: String,
    },

    #[error("Parser {parser} is not configured, missing parameter(s): {}", .missing.join(", "))]
    NotConfigured {
        parser: &'static str,
        missing: Vec<&'static str>,
    },

    #[error("Invalid report pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid exclude glob '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// Failure to interpret a single report's content
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Parser {parser} is not configured, missing parameter(s): {}", .missing.join(", "))]
    NotConfigured {
        parser: &'static str,
        missing: Vec<&'static str>,
    },

    #[error("Malformed report: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for ParseError {
    fn from(e: serde_json::Error) -> Self {
        Self::Malformed(e.to_string())
    }
}
