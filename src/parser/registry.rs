use super::{NativeParser, ParameterizedParser, RegexParser, ReportParser};
use crate::error::{Error, ParseError};
use crate::types::Violation;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Identifier of a known report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserKind {
    /// Generic line parser configured with a named-group pattern
    Regex,
    /// JSON written by this tool
    Native,
}

impl ParserKind {
    /// Every known parser, in listing order
    pub const ALL: [ParserKind; 2] = [ParserKind::Regex, ParserKind::Native];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Regex => "REGEX",
            Self::Native => "NATIVE",
        }
    }

    /// Create a fresh, unconfigured parser instance for this identifier
    pub fn create(&self) -> Box<dyn ReportParser> {
        match self {
            Self::Regex => Box::new(RegexParser::new()),
            Self::Native => Box::new(NativeParser),
        }
    }

    fn known_names() -> String {
        Self::ALL
            .iter()
            .map(|k| k.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParserKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::UnknownParser {
                name: wanted.to_string(),
                known: Self::known_names(),
            })
    }
}

/// Closed table binding each identifier to exactly one parser instance
pub struct ParserRegistry {
    entries: Vec<(ParserKind, Box<dyn ReportParser>)>,
}

impl ParserRegistry {
    /// Create a registry holding one fresh instance per known identifier
    pub fn new() -> Self {
        Self {
            entries: ParserKind::ALL.iter().map(|k| (*k, k.create())).collect(),
        }
    }

    pub fn parser(&self, kind: ParserKind) -> Result<&dyn ReportParser, Error> {
        self.entries
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, p)| &**p)
            .ok_or_else(|| Error::UnknownParser {
                name: kind.name().to_string(),
                known: ParserKind::known_names(),
            })
    }

    pub fn parser_mut(&mut self, kind: ParserKind) -> Result<&mut dyn ReportParser, Error> {
        match self.entries.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, p)) => Ok(&mut **p),
            None => Err(Error::UnknownParser {
                name: kind.name().to_string(),
                known: ParserKind::known_names(),
            }),
        }
    }

    /// Parse every file with the parser bound to `kind`
    ///
    /// A file that cannot be read or parsed is logged and contributes no
    /// violations; the rest of the batch is still processed. Results keep
    /// the file order and, within a file, the parser's order.
    ///
    /// Fails only when `kind` is unbound or its parser is not configured.
    pub fn find_violations(
        &self,
        kind: ParserKind,
        files: &[PathBuf],
    ) -> Result<Vec<Violation>, Error> {
        let parser = self.parser(kind)?;
        if let Some(parameterized) = parser.as_parameterized() {
            if !parameterized.is_configured() {
                return Err(Error::NotConfigured {
                    parser: kind.name(),
                    missing: parameterized.parameter_names().to_vec(),
                });
            }
        }

        let mut violations = Vec::new();
        let mut failed = 0;
        for file in files {
            match parse_file(parser, file) {
                Ok(found) => {
                    debug!("[{}] {} violations in {}", kind, found.len(), file.display());
                    violations.extend(found);
                }
                Err(FileFailure::Parse(ParseError::NotConfigured { parser, missing })) => {
                    return Err(Error::NotConfigured { parser, missing });
                }
                Err(e) => {
                    failed += 1;
                    warn!("[{}] Skipping report {}: {}", kind, file.display(), e);
                }
            }
        }

        info!(
            "[{}] Parsed {} of {} reports, found {} violations",
            kind,
            files.len() - failed,
            files.len(),
            violations.len()
        );
        Ok(violations)
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Why a single report contributed nothing
#[derive(Debug)]
enum FileFailure {
    Read(std::io::Error),
    Parse(ParseError),
    Panic(String),
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFailure::Read(e) => write!(f, "Failed to read report: {}", e),
            FileFailure::Parse(e) => write!(f, "{}", e),
            FileFailure::Panic(msg) => write!(f, "Parser panicked: {}", msg),
        }
    }
}

fn parse_file(parser: &dyn ReportParser, file: &Path) -> Result<Vec<Violation>, FileFailure> {
    let content = std::fs::read_to_string(file).map_err(FileFailure::Read)?;
    match panic::catch_unwind(AssertUnwindSafe(|| parser.parse_report_output(&content))) {
        Ok(result) => result.map_err(FileFailure::Parse),
        Err(payload) => {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(FileFailure::Panic(msg))
        }
    }
}
