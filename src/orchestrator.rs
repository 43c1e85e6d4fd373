use crate::discovery;
use crate::error::Error;
use crate::parser::{ParameterizedParser, ParserKind, ParserRegistry, ReportParser};
use crate::types::Violation;
use globset::GlobSet;
use regex::Regex;
use std::path::PathBuf;
use tracing::{debug, info, trace, warn};

const DEFAULT_ROOT: &str = ".";

/// Fluent configuration of one extraction run
///
/// Configuration mistakes (missing root, unknown parser, invalid pattern)
/// fail where they are made. Running with [`Orchestrator::violations`]
/// only fails on parameter or configuration errors, never on a bad report.
pub struct Orchestrator {
    registry: ParserRegistry,
    kind: ParserKind,
    root: PathBuf,
    pattern: Option<Regex>,
    exclude: Option<GlobSet>,
    reporter: Option<String>,
    parameters: Vec<(String, String)>,
}

impl Orchestrator {
    /// Start a run that parses reports with `kind`
    pub fn find_all(kind: ParserKind) -> Self {
        Self {
            registry: ParserRegistry::new(),
            kind,
            root: PathBuf::from(DEFAULT_ROOT),
            pattern: None,
            exclude: None,
            reporter: None,
            parameters: Vec::new(),
        }
    }

    /// Start a run by parser identifier, failing with `UnknownParser` before any I/O
    pub fn find_all_named(identifier: &str) -> Result<Self, Error> {
        Ok(Self::find_all(identifier.parse()?))
    }

    /// Use an existing registry instead of a fresh one
    ///
    /// Parameters already set on its parsers are cleared when the run starts.
    pub fn with_registry(mut self, registry: ParserRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Directory to search for reports; it must exist
    pub fn in_folder(mut self, root: impl Into<PathBuf>) -> Result<Self, Error> {
        let root = root.into();
        if !root.exists() {
            return Err(Error::RootNotFound(root));
        }
        self.root = root;
        Ok(self)
    }

    /// Regex a report path must fully match; `/` also matches `\`
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, Error> {
        self.pattern = Some(discovery::platform_independent_pattern(pattern)?);
        Ok(self)
    }

    /// Glob patterns, relative to the root, of files to leave out
    pub fn with_exclude(mut self, patterns: &[String]) -> Result<Self, Error> {
        self.exclude = if patterns.is_empty() {
            None
        } else {
            Some(discovery::build_globset(patterns)?)
        };
        Ok(self)
    }

    /// Credit every violation to `reporter` instead of the parser
    pub fn with_reporter(mut self, reporter: impl Into<String>) -> Self {
        self.reporter = Some(reporter.into());
        self
    }

    /// Parameter for a parameterized parser
    ///
    /// A later value for the same name replaces the earlier one, which is
    /// never applied. Names keep their first insertion order.
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let (name, value) = (name.into(), value.into());
        match self.parameters.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.parameters.push((name, value)),
        }
        self
    }

    pub fn kind(&self) -> ParserKind {
        self.kind
    }

    /// Discover reports, parse them and return the violations in file order
    pub fn violations(&mut self) -> Result<Vec<Violation>, Error> {
        debug!(
            "[{}] Searching {} for reports",
            self.kind,
            self.root.display()
        );
        let files =
            discovery::find_all_reports(&self.root, self.pattern.as_ref(), self.exclude.as_ref());
        info!("[{}] Found {} reports", self.kind, files.len());
        trace!("Reports: {:?}", files);

        self.apply_parameters()?;

        let violations = self.registry.find_violations(self.kind, &files)?;

        match self.reporter_override() {
            Some(reporter) => {
                debug!("[{}] Crediting violations to '{}'", self.kind, reporter);
                Ok(violations
                    .iter()
                    .map(|v| v.with_reporter(reporter))
                    .collect())
            }
            None => Ok(violations),
        }
    }

    fn apply_parameters(&mut self) -> Result<(), Error> {
        let parser = self.registry.parser_mut(self.kind)?;
        match parser.as_parameterized_mut() {
            Some(parameterized) => {
                parameterized.clear_parameters();
                for (name, value) in &self.parameters {
                    debug!("[{}] Setting parameter {}", self.kind, name);
                    parameterized.set_parameter(name, value)?;
                }
            }
            None => {
                if !self.parameters.is_empty() {
                    warn!(
                        "[{}] Parser takes no parameters, ignoring {} configured",
                        self.kind,
                        self.parameters.len()
                    );
                }
            }
        }
        Ok(())
    }

    /// Reporter to apply, when one is set, non-blank and not the parser's own name
    ///
    /// Surrounding whitespace is trimmed, both for the comparison and for
    /// the value written to the records.
    fn reporter_override(&self) -> Option<&str> {
        self.reporter
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty() && *r != self.kind.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;
    use tempfile::TempDir;

    const PATTERN: &str = r"(?<fileName>[^:]+):(?<lineNumber>\d+): (?<message>.*)";

    fn reports_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("lint")).unwrap();
        std::fs::write(dir.path().join("lint/a.txt"), "src/a.rs:1: one\nnoise\n").unwrap();
        std::fs::write(dir.path().join("lint/b.txt"), "src/b.rs:2: two\n").unwrap();
        std::fs::write(dir.path().join("lint/c.txt"), [0xFFu8, 0xFE]).unwrap();
        std::fs::write(dir.path().join("notes.md"), "src/x.rs:9: not a report\n").unwrap();
        dir
    }

    #[test]
    fn test_regex_run_end_to_end() {
        let dir = reports_dir();
        let violations = Orchestrator::find_all(ParserKind::Regex)
            .in_folder(dir.path())
            .unwrap()
            .with_pattern(r".*/lint/.*\.txt")
            .unwrap()
            .with_parameter("regex", PATTERN)
            .violations()
            .unwrap();

        let found: Vec<(&str, u32)> = violations
            .iter()
            .map(|v| (v.file(), v.start_line()))
            .collect();
        assert_eq!(found, vec![("src/a.rs", 1), ("src/b.rs", 2)]);
        assert!(violations.iter().all(|v| v.reporter() == "REGEX"));
        assert!(violations.iter().all(|v| v.severity() == Severity::Warn));
    }

    #[test]
    fn test_reporter_override() {
        let dir = reports_dir();
        let violations = Orchestrator::find_all(ParserKind::Regex)
            .in_folder(dir.path())
            .unwrap()
            .with_pattern(r".*\.txt")
            .unwrap()
            .with_parameter("regex", PATTERN)
            .with_reporter("mylint")
            .violations()
            .unwrap();

        assert_eq!(violations.len(), 2);
        assert!(violations.iter().all(|v| v.reporter() == "mylint"));
        assert!(violations.iter().all(|v| v.parser() == "REGEX"));
    }

    #[test]
    fn test_blank_or_same_reporter_is_ignored() {
        let dir = reports_dir();
        for reporter in ["   ", "REGEX"] {
            let violations = Orchestrator::find_all(ParserKind::Regex)
                .in_folder(dir.path())
                .unwrap()
                .with_pattern(r".*\.txt")
                .unwrap()
                .with_parameter("regex", PATTERN)
                .with_reporter(reporter)
                .violations()
                .unwrap();
            assert!(violations.iter().all(|v| v.reporter() == "REGEX"));
        }
    }

    #[test]
    fn test_native_keeps_self_reported_reporter() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("old.json"),
            r#"[{"reporter": "eslint", "file": "a.js", "startLine": 1}]"#,
        )
        .unwrap();

        let violations = Orchestrator::find_all(ParserKind::Native)
            .in_folder(dir.path())
            .unwrap()
            .with_reporter("NATIVE")
            .violations()
            .unwrap();
        assert_eq!(violations[0].reporter(), "eslint");
    }

    #[test]
    fn test_later_parameter_wins() {
        let dir = reports_dir();
        let violations = Orchestrator::find_all(ParserKind::Regex)
            .in_folder(dir.path())
            .unwrap()
            .with_pattern(r".*\.txt")
            .unwrap()
            .with_parameter("regex", r"(?<fileName>nothing)(?<lineNumber>\d+)(?<message>x)")
            .with_parameter("regex", PATTERN)
            .violations()
            .unwrap();
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn test_overridden_invalid_parameter_is_never_applied() {
        let dir = reports_dir();
        let violations = Orchestrator::find_all(ParserKind::Regex)
            .in_folder(dir.path())
            .unwrap()
            .with_pattern(r".*\.txt")
            .unwrap()
            .with_parameter("regex", "(")
            .with_parameter("regex", PATTERN)
            .violations()
            .unwrap();
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn test_reporter_override_is_trimmed() {
        let dir = reports_dir();
        let violations = Orchestrator::find_all(ParserKind::Regex)
            .in_folder(dir.path())
            .unwrap()
            .with_pattern(r".*\.txt")
            .unwrap()
            .with_parameter("regex", PATTERN)
            .with_reporter(" mylint ")
            .violations()
            .unwrap();
        assert!(violations.iter().all(|v| v.reporter() == "mylint"));
    }

    #[test]
    fn test_injected_registry_parameters_are_cleared() {
        let dir = reports_dir();
        let mut registry = ParserRegistry::new();
        registry
            .parser_mut(ParserKind::Regex)
            .unwrap()
            .as_parameterized_mut()
            .unwrap()
            .set_parameter("regex", PATTERN)
            .unwrap();

        let err = Orchestrator::find_all(ParserKind::Regex)
            .with_registry(registry)
            .in_folder(dir.path())
            .unwrap()
            .violations()
            .unwrap_err();
        assert!(matches!(err, Error::NotConfigured { parser: "REGEX", .. }));
    }

    #[test]
    fn test_rerun_clears_previous_parameters() {
        let dir = reports_dir();
        let mut orchestrator = Orchestrator::find_all(ParserKind::Regex)
            .in_folder(dir.path())
            .unwrap()
            .with_pattern(r".*\.txt")
            .unwrap()
            .with_parameter("regex", PATTERN);
        let first = orchestrator.violations().unwrap();
        let second = orchestrator.violations().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_root() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let err = Orchestrator::find_all(ParserKind::Regex)
            .in_folder(&missing)
            .err()
            .unwrap();
        assert!(matches!(err, Error::RootNotFound(ref p) if *p == missing));
    }

    #[test]
    fn test_unknown_parser() {
        assert!(matches!(
            Orchestrator::find_all_named("PMD").err().unwrap(),
            Error::UnknownParser { .. }
        ));
        assert_eq!(
            Orchestrator::find_all_named("regex").unwrap().kind(),
            ParserKind::Regex
        );
    }

    #[test]
    fn test_invalid_parameter_is_fatal() {
        let dir = reports_dir();
        let err = Orchestrator::find_all(ParserKind::Regex)
            .in_folder(dir.path())
            .unwrap()
            .with_parameter("regex", r"(?<fileName>.*)")
            .violations()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));
    }

    #[test]
    fn test_missing_parameter_is_not_configured() {
        let dir = reports_dir();
        let err = Orchestrator::find_all(ParserKind::Regex)
            .in_folder(dir.path())
            .unwrap()
            .violations()
            .unwrap_err();
        assert!(matches!(err, Error::NotConfigured { .. }));
    }
}
