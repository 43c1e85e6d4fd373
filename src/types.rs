use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Severity of a violation, ordered `INFO < WARN < ERROR`
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    #[default]
    Warn,
    Error,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Error, Severity::Warn, Severity::Info];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ERROR" => Ok(Self::Error),
            "WARN" | "WARNING" => Ok(Self::Warn),
            "INFO" => Ok(Self::Info),
            other => Err(format!(
                "Unknown severity '{}', expected ERROR, WARN or INFO",
                other
            )),
        }
    }
}

/// A normalized finding extracted from a tool's report
///
/// Immutable once built. Use [`Violation::builder`] to create one and
/// [`Violation::with_reporter`] to derive a copy attributed to another reporter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// Tool credited as the source of this violation
    reporter: String,
    /// Registry identifier of the parser that produced this violation
    parser: String,
    /// File path as reported by the tool
    file: String,
    /// Start line, 0 when unknown
    start_line: u32,
    /// End line (inclusive), defaults to the start line
    end_line: u32,
    /// Column, 0 when unknown
    column: u32,
    severity: Severity,
    message: String,
    /// Rule identifier, empty when absent
    rule: String,
    /// Rule category, empty when absent
    category: String,
    /// Tool-specific extra values
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    specifics: BTreeMap<String, String>,
}

impl Violation {
    pub fn builder() -> ViolationBuilder {
        ViolationBuilder::default()
    }

    /// Builder pre-filled with every attribute of this violation
    pub fn to_builder(&self) -> ViolationBuilder {
        ViolationBuilder {
            reporter: self.reporter.clone(),
            parser: self.parser.clone(),
            file: self.file.clone(),
            start_line: self.start_line,
            end_line: Some(self.end_line),
            column: self.column,
            severity: self.severity,
            message: self.message.clone(),
            rule: self.rule.clone(),
            category: self.category.clone(),
            specifics: self.specifics.clone(),
        }
    }

    /// Copy of this violation credited to `reporter`
    pub fn with_reporter(&self, reporter: impl Into<String>) -> Self {
        self.to_builder().reporter(reporter).build()
    }

    pub fn reporter(&self) -> &str {
        &self.reporter
    }

    pub fn parser(&self) -> &str {
        &self.parser
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn start_line(&self) -> u32 {
        self.start_line
    }

    pub fn end_line(&self) -> u32 {
        self.end_line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn rule(&self) -> &str {
        &self.rule
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn specifics(&self) -> &BTreeMap<String, String> {
        &self.specifics
    }
}

/// Accumulates violation attributes; building never fails
#[derive(Debug, Clone, Default)]
pub struct ViolationBuilder {
    reporter: String,
    parser: String,
    file: String,
    start_line: u32,
    end_line: Option<u32>,
    column: u32,
    severity: Severity,
    message: String,
    rule: String,
    category: String,
    specifics: BTreeMap<String, String>,
}

/// Parse a non-negative integer, coercing anything unparsable to `None`
fn parse_number(text: &str) -> Option<u32> {
    text.trim().parse::<u32>().ok()
}

impl ViolationBuilder {
    pub fn reporter(mut self, reporter: impl Into<String>) -> Self {
        self.reporter = reporter.into();
        self
    }

    pub fn parser(mut self, parser: impl Into<String>) -> Self {
        self.parser = parser.into();
        self
    }

    pub fn file(mut self, file: impl Into<String>) -> Self {
        self.file = file.into();
        self
    }

    pub fn start_line(mut self, line: u32) -> Self {
        self.start_line = line;
        self
    }

    /// Set the start line from text; unparsable text yields 0
    pub fn start_line_text(mut self, text: &str) -> Self {
        self.start_line = parse_number(text).unwrap_or(0);
        self
    }

    pub fn end_line(mut self, line: u32) -> Self {
        self.end_line = Some(line);
        self
    }

    pub fn column(mut self, column: u32) -> Self {
        self.column = column;
        self
    }

    /// Set the column from text; unparsable text yields 0
    pub fn column_text(mut self, text: &str) -> Self {
        self.column = parse_number(text).unwrap_or(0);
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = rule.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn specific(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.specifics.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Violation {
        Violation {
            reporter: self.reporter,
            parser: self.parser,
            file: self.file,
            start_line: self.start_line,
            end_line: self.end_line.unwrap_or(self.start_line),
            column: self.column,
            severity: self.severity,
            message: self.message,
            rule: self.rule,
            category: self.category,
            specifics: self.specifics,
        }
    }
}
