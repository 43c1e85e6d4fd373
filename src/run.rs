use crate::config::ReportConfig;
use crate::error::Error;
use crate::orchestrator::Orchestrator;
use crate::types::{Severity, Violation};
use anyhow::Context;
use tracing::{debug, info, warn};

/// Build the run for one configured report source
pub fn build_orchestrator(report: &ReportConfig) -> Result<Orchestrator, Error> {
    let mut orchestrator = Orchestrator::find_all_named(&report.parser)?
        .in_folder(&report.folder)?
        .with_exclude(&report.exclude)?;
    if let Some(pattern) = &report.pattern {
        orchestrator = orchestrator.with_pattern(pattern)?;
    }
    if let Some(reporter) = &report.reporter {
        orchestrator = orchestrator.with_reporter(reporter);
    }
    for parameter in &report.parameters {
        orchestrator = orchestrator.with_parameter(&parameter.name, &parameter.value);
    }
    Ok(orchestrator)
}

/// Run every report source in order and concatenate their violations
pub fn run_reports(reports: &[ReportConfig]) -> anyhow::Result<Vec<Violation>> {
    if reports.is_empty() {
        warn!("No report sources configured");
    }

    let mut violations = Vec::new();
    for (i, report) in reports.iter().enumerate() {
        debug!(
            "Report source {}: parser={}, folder={}",
            i, report.parser, report.folder
        );
        let found = build_orchestrator(report)
            .and_then(|mut o| o.violations())
            .with_context(|| format!("Report source {} ({})", i, report.parser))?;
        info!("Report source {} ({}): {} violations", i, report.parser, found.len());
        violations.extend(found);
    }
    Ok(violations)
}

/// Write violations as JSON to `path`, or to stdout when no path is given
pub fn write_output(path: Option<&str>, violations: &[Violation]) -> anyhow::Result<()> {
    let content = serde_json::to_string_pretty(violations)?;
    match path {
        Some(path) => {
            if !path.ends_with(".json") {
                anyhow::bail!("Output file must end with .json");
            }
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write output file {}", path))?;
            info!("Results written to {}", path);
        }
        None => println!("{}", content),
    }
    Ok(())
}

/// Log how many violations were found per severity
pub fn log_summary(violations: &[Violation]) {
    if violations.is_empty() {
        info!("No violations found");
        return;
    }

    let counts = Severity::ALL
        .iter()
        .map(|s| {
            let count = violations.iter().filter(|v| v.severity() == *s).count();
            format!("{} {}", count, s)
        })
        .collect::<Vec<_>>()
        .join(", ");
    info!("Found {} violations ({})", violations.len(), counts);
}

/// Whether any violation is at or above `threshold`
pub fn exceeds(violations: &[Violation], threshold: Severity) -> bool {
    violations.iter().any(|v| v.severity() >= threshold)
}
