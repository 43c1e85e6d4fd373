use super::{ParameterizedParser, ParserKind, ReportParser};
use crate::error::{Error, ParseError};
use crate::types::{Severity, Violation};
use regex::{Captures, Regex};
use tracing::{debug, trace};

const REGEX_PARAMETER: &str = "regex";
const PARAMETER_NAMES: &[&str] = &[REGEX_PARAMETER];
const REGEX_DESCRIPTION: &str = "Pattern with named groups fileName, lineNumber and message \
    (optional: column, rule, category), matched anywhere in each report line. \
    \\d is Unicode-aware and a non-ASCII line number or column becomes 0; \
    use (?-u:\\d) or [0-9] to match ASCII digits only";

const FILE_NAME_GROUP: &str = "fileName";
const LINE_NUMBER_GROUP: &str = "lineNumber";
const MESSAGE_GROUP: &str = "message";
const COLUMN_GROUP: &str = "column";
const RULE_GROUP: &str = "rule";
const CATEGORY_GROUP: &str = "category";

const MANDATORY_GROUPS: [&str; 3] = [FILE_NAME_GROUP, LINE_NUMBER_GROUP, MESSAGE_GROUP];
const KNOWN_GROUPS: [&str; 6] = [
    FILE_NAME_GROUP,
    LINE_NUMBER_GROUP,
    MESSAGE_GROUP,
    COLUMN_GROUP,
    RULE_GROUP,
    CATEGORY_GROUP,
];
const MISSING_GROUPS_MESSAGE: &str =
    "pattern must declare the named groups fileName, lineNumber and message";

/// Line-oriented parser driven by a user supplied named-group pattern
#[derive(Debug, Default)]
pub struct RegexParser {
    pattern: Option<Regex>,
}

impl RegexParser {
    pub fn new() -> Self {
        Self::default()
    }

    fn invalid(name: &str, reason: String) -> Error {
        Error::InvalidParameter {
            parser: ParserKind::Regex.name(),
            name: name.to_string(),
            reason,
        }
    }
}

/// Text of a named group; undeclared or non-participating groups yield ""
fn group<'h>(caps: &Captures<'h>, name: &str) -> &'h str {
    caps.name(name).map_or("", |m| m.as_str())
}

impl ReportParser for RegexParser {
    fn kind(&self) -> ParserKind {
        ParserKind::Regex
    }

    fn parse_report_output(&self, content: &str) -> Result<Vec<Violation>, ParseError> {
        let Some(regex) = &self.pattern else {
            return Err(ParseError::NotConfigured {
                parser: ParserKind::Regex.name(),
                missing: PARAMETER_NAMES.to_vec(),
            });
        };

        let extra_groups: Vec<&str> = regex
            .capture_names()
            .flatten()
            .filter(|name| !KNOWN_GROUPS.contains(name))
            .collect();

        let violations: Vec<Violation> = content
            .lines()
            .filter_map(|line| regex.captures(line))
            .map(|caps| {
                trace!("Matched line: {}", &caps[0]);
                extra_groups
                    .iter()
                    .fold(Violation::builder(), |builder, name| {
                        builder.specific(*name, group(&caps, name))
                    })
                    .reporter(ParserKind::Regex.name())
                    .parser(ParserKind::Regex.name())
                    .file(group(&caps, FILE_NAME_GROUP))
                    .start_line_text(group(&caps, LINE_NUMBER_GROUP))
                    .column_text(group(&caps, COLUMN_GROUP))
                    .severity(Severity::Warn)
                    .message(group(&caps, MESSAGE_GROUP))
                    .rule(group(&caps, RULE_GROUP))
                    .category(group(&caps, CATEGORY_GROUP))
                    .build()
            })
            .collect();

        debug!("Regex parser extracted {} violations", violations.len());
        Ok(violations)
    }

    fn as_parameterized(&self) -> Option<&dyn ParameterizedParser> {
        Some(self)
    }

    fn as_parameterized_mut(&mut self) -> Option<&mut dyn ParameterizedParser> {
        Some(self)
    }
}

impl ParameterizedParser for RegexParser {
    fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), Error> {
        if name != REGEX_PARAMETER {
            return Err(Self::invalid(
                name,
                format!("unknown parameter, expected one of: {}", PARAMETER_NAMES.join(", ")),
            ));
        }

        let regex = Regex::new(value)
            .map_err(|e| Self::invalid(name, format!("invalid pattern '{}': {}", value, e)))?;

        let declared: Vec<&str> = regex.capture_names().flatten().collect();
        if MANDATORY_GROUPS.iter().any(|g| !declared.contains(g)) {
            return Err(Self::invalid(name, MISSING_GROUPS_MESSAGE.to_string()));
        }

        debug!("Regex parser configured with pattern: {}", value);
        self.pattern = Some(regex);
        Ok(())
    }

    fn parameter_description(&self, name: &str) -> Result<&'static str, Error> {
        match name {
            REGEX_PARAMETER => Ok(REGEX_DESCRIPTION),
            _ => Err(Self::invalid(name, "unknown parameter".to_string())),
        }
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        PARAMETER_NAMES
    }

    fn clear_parameters(&mut self) {
        self.pattern = None;
    }

    fn is_configured(&self) -> bool {
        self.pattern.is_some()
    }
}
