use crate::types::Severity;
use clap::{Parser, Subcommand};

// Display order for log level option (placed at end of help text)
const LOG_LEVEL_DISPLAY_ORDER: usize = 100;

/// CLI arguments
#[derive(Parser)]
#[command(name = "violations", version, about = "Normalize lint and static-analysis reports into one violation format", long_about = None)]
pub struct Cli {
    /// Log level (see https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html)
    /// [env: VIOLATIONS_LOG=] [default: info]
    #[arg(
        long,
        env = "VIOLATIONS_LOG",
        default_value = "info",
        global = true,
        hide_default_value = true,
        hide_env = true,
        display_order = LOG_LEVEL_DISPLAY_ORDER,
        verbatim_doc_comment
    )]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a default violations.toml config file
    Init(InitArgs),
    /// Parse every report source listed in the config file
    Run(RunArgs),
    /// Parse one report source given on the command line
    Parse(ParseArgs),
    /// List known parsers and their parameters
    Parsers,
    /// Print the JSON schema of the output
    Schema,
}

/// Arguments for the init command
#[derive(Parser)]
pub struct InitArgs {
    /// Path to config file
    #[arg(long, default_value = "violations.toml")]
    pub config: String,

    /// Override existing config file
    #[arg(long)]
    pub r#override: bool,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to config file (initialize with `violations init`)
    #[arg(long, default_value = "violations.toml")]
    pub config: String,

    /// Output file path (.json), overrides the config file
    #[arg(long)]
    pub output: Option<String>,

    /// Exit with status 1 if a violation at or above this severity is found (ERROR, WARN, INFO)
    #[arg(long)]
    pub fail_on: Option<Severity>,
}

/// Arguments for the parse command
#[derive(Parser, Debug)]
pub struct ParseArgs {
    /// Parser identifier (see `violations parsers`)
    #[arg(long)]
    pub parser: String,

    /// Directory searched recursively for reports
    #[arg(long, default_value = ".")]
    pub folder: String,

    /// Regex the full report path must match; `/` also matches `\`
    #[arg(long)]
    pub pattern: Option<String>,

    /// Glob pattern, relative to the folder, to leave out (repeatable)
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Parser parameter as NAME=VALUE (repeatable, later values win)
    #[arg(long = "param", value_parser = parse_key_val)]
    pub params: Vec<(String, String)>,

    /// Credit violations to this reporter instead of the parser
    #[arg(long)]
    pub reporter: Option<String>,

    /// Output file path (.json)
    #[arg(long)]
    pub output: Option<String>,

    /// Exit with status 1 if a violation at or above this severity is found (ERROR, WARN, INFO)
    #[arg(long)]
    pub fail_on: Option<Severity>,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid NAME=VALUE: no `=` found in '{}'", s))?;
    Ok((name.trim().to_string(), value.to_string()))
}
