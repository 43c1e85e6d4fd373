mod native;
mod regex_parser;
mod registry;

pub use native::NativeParser;
pub use regex_parser::RegexParser;
pub use registry::{ParserKind, ParserRegistry};

use crate::error::{Error, ParseError};
use crate::types::Violation;

/// Core trait that all report parsers must implement
pub trait ReportParser: Send + Sync {
    /// Registry identifier this parser is bound to
    fn kind(&self) -> ParserKind;

    /// Translate one report's raw content into violations
    ///
    /// # Arguments
    /// * `content` - Full text of a report file
    ///
    /// # Returns
    /// Violations in the order they appear in the report, or
    /// `ParseError` when the content is not in the expected syntax at all
    fn parse_report_output(&self, content: &str) -> Result<Vec<Violation>, ParseError>;

    /// Parameter access for parsers that accept named parameters
    fn as_parameterized(&self) -> Option<&dyn ParameterizedParser> {
        None
    }

    fn as_parameterized_mut(&mut self) -> Option<&mut dyn ParameterizedParser> {
        None
    }
}

/// A parser whose behavior is configured through named parameters
pub trait ParameterizedParser: ReportParser {
    /// Validate and apply a parameter value
    ///
    /// Fails with `Error::InvalidParameter` for an unknown name or a value
    /// that fails validation. A failed call leaves the parser unchanged.
    fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), Error>;

    fn parameter_description(&self, name: &str) -> Result<&'static str, Error>;

    fn parameter_names(&self) -> &'static [&'static str];

    /// Reset every parameter to its unset state
    fn clear_parameters(&mut self);

    /// Whether all required parameters are set
    fn is_configured(&self) -> bool;
}
