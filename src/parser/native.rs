use super::{ParserKind, ReportParser};
use crate::error::ParseError;
use crate::types::{Severity, Violation};
use serde::Deserialize;
use std::collections::BTreeMap;

/// One entry of a report previously written by this tool
#[derive(Deserialize, Debug, Default)]
#[serde(default, rename_all = "camelCase")]
struct NativeRecord {
    reporter: String,
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

/// Reads the JSON array of violations this tool writes, so earlier results can be merged
#[derive(Debug, Default)]
pub struct NativeParser;

impl ReportParser for NativeParser {
    fn kind(&self) -> ParserKind {
        ParserKind::Native
    }

    fn parse_report_output(&self, content: &str) -> Result<Vec<Violation>, ParseError> {
        if content.trim().is_empty() {
            return Ok(vec![]);
        }

        let records: Vec<NativeRecord> = serde_json::from_str(content)?;

        Ok(records
            .into_iter()
            .map(|record| {
                let reporter = if record.reporter.trim().is_empty() {
                    ParserKind::Native.name().to_string()
                } else {
                    record.reporter
                };
                let builder = Violation::builder()
                    .reporter(reporter)
                    .parser(ParserKind::Native.name())
                    .file(record.file)
                    .start_line(record.start_line)
                    .column(record.column)
                    .severity(record.severity)
                    .message(record.message)
                    .rule(record.rule)
                    .category(record.category);
                let builder = match record.end_line {
                    Some(end_line) => builder.end_line(end_line),
                    None => builder,
                };
                record
                    .specifics
                    .into_iter()
                    .fold(builder, |builder, (key, value)| builder.specific(key, value))
                    .build()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_own_output() {
        let original = vec![
            Violation::builder()
                .reporter("mylint")
                .parser("REGEX")
                .file("src/a.rs")
                .start_line(3)
                .end_line(4)
                .column(2)
                .severity(Severity::Error)
                .message("broken")
                .rule("R1")
                .specific("level", "high")
                .build(),
        ];
        let json = serde_json::to_string(&original).unwrap();

        let parsed = NativeParser.parse_report_output(&json).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].reporter(), "mylint");
        assert_eq!(parsed[0].parser(), "NATIVE");
        assert_eq!(parsed[0].end_line(), 4);
        assert_eq!(parsed[0].severity(), Severity::Error);
        assert_eq!(parsed[0].specifics().get("level").map(String::as_str), Some("high"));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let parsed = NativeParser
            .parse_report_output(r#"[{"file": "a.rs", "startLine": 7, "message": "m"}]"#)
            .unwrap();
        let v = &parsed[0];
        assert_eq!(v.reporter(), "NATIVE");
        assert_eq!(v.end_line(), 7);
        assert_eq!(v.severity(), Severity::Warn);
        assert_eq!(v.rule(), "");
    }

    #[test]
    fn test_empty_content_has_no_violations() {
        assert!(NativeParser.parse_report_output("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_content_fails() {
        assert!(matches!(
            NativeParser.parse_report_output("<checkstyle/>"),
            Err(ParseError::Malformed(_))
        ));
        assert!(NativeParser.as_parameterized().is_none());
    }
}
