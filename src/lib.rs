// Public API exports
pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod orchestrator;
pub mod parser;
pub mod run;
pub mod types;

// Re-export main types for convenience
pub use error::{Error, ParseError};
pub use orchestrator::Orchestrator;
pub use parser::{
    NativeParser, ParameterizedParser, ParserKind, ParserRegistry, RegexParser, ReportParser,
};
pub use types::{Severity, Violation, ViolationBuilder};
