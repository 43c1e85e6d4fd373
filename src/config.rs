use crate::types::Severity;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct Config {
    /// Output file (.json); violations are printed to stdout when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Exit with a failure status when a violation at or above this severity is found
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_on: Option<Severity>,
    /// Report sources, processed in order
    #[serde(default)]
    pub reports: Vec<ReportConfig>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ReportConfig {
    /// Parser identifier (e.g. REGEX, NATIVE)
    pub parser: String,
    /// Directory searched recursively for reports
    #[serde(default = "default_folder")]
    pub folder: String,
    /// Regex the full report path must match; `/` also matches `\`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Glob patterns, relative to the folder, to leave out
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Credit violations to this reporter instead of the parser
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter: Option<String>,
    /// Parser parameters, applied in order
    #[serde(default)]
    pub parameters: Vec<ParameterConfig>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ParameterConfig {
    pub name: String,
    pub value: String,
}

fn default_folder() -> String {
    ".".to_string()
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path))?;
        Self::parse(&content).with_context(|| format!("Invalid config {}", path))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Starter config written by `init`
    pub fn example() -> Self {
        Self {
            output: Some("violations.json".into()),
            fail_on: Some(Severity::Error),
            reports: vec![ReportConfig {
                parser: "REGEX".into(),
                folder: default_folder(),
                pattern: Some(r".*/lint\.txt".into()),
                exclude: vec!["**/node_modules/**".into(), "**/target/**".into()],
                reporter: Some("lint".into()),
                parameters: vec![ParameterConfig {
                    name: "regex".into(),
                    value: r"(?<fileName>[^:]+):(?<lineNumber>\d+):(?<column>\d+): (?<message>.*)"
                        .into(),
                }],
            }],
        }
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
