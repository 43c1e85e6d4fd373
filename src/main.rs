use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use violations::cli::{Cli, Commands, InitArgs, ParseArgs, RunArgs};
use violations::config::{Config, ParameterConfig, ReportConfig};
use violations::types::{Severity, Violation};
use violations::{ParameterizedParser, ParserKind, ReportParser, run};

const EXIT_FAILURE: i32 = 1;

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cli.log_level))
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Init(args) => init(&args),
        Commands::Run(args) => run_config(&args),
        Commands::Parse(args) => parse(args),
        Commands::Parsers => list_parsers(),
        Commands::Schema => print_schema(),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(EXIT_FAILURE);
    }
}

fn init(args: &InitArgs) -> anyhow::Result<()> {
    if std::path::Path::new(&args.config).exists() && !args.r#override {
        anyhow::bail!(
            "Config file {} already exists, use --override to replace it",
            args.config
        );
    }
    std::fs::write(&args.config, Config::example().to_toml()?)?;
    info!("Config written to {}", args.config);
    Ok(())
}

fn run_config(args: &RunArgs) -> anyhow::Result<()> {
    let config = Config::load(&args.config)?;
    let violations = run::run_reports(&config.reports)?;
    finish(
        &violations,
        args.output.as_deref().or(config.output.as_deref()),
        args.fail_on.or(config.fail_on),
    );
    Ok(())
}

fn parse(args: ParseArgs) -> anyhow::Result<()> {
    let report = ReportConfig {
        parser: args.parser,
        folder: args.folder,
        pattern: args.pattern,
        exclude: args.exclude,
        reporter: args.reporter,
        parameters: args
            .params
            .into_iter()
            .map(|(name, value)| ParameterConfig { name, value })
            .collect(),
    };
    let violations = run::run_reports(std::slice::from_ref(&report))?;
    finish(&violations, args.output.as_deref(), args.fail_on);
    Ok(())
}

/// Write results, then exit with failure when the severity threshold is reached
fn finish(violations: &[Violation], output: Option<&str>, fail_on: Option<Severity>) {
    run::log_summary(violations);
    if let Err(e) = run::write_output(output, violations) {
        error!("{:#}", e);
        std::process::exit(EXIT_FAILURE);
    }

    if let Some(threshold) = fail_on {
        if run::exceeds(violations, threshold) {
            error!("Found violations at or above {}", threshold);
            std::process::exit(EXIT_FAILURE);
        }
    }
}

fn list_parsers() -> anyhow::Result<()> {
    for kind in ParserKind::ALL {
        println!("{}", kind);
        let parser = kind.create();
        if let Some(parameterized) = parser.as_parameterized() {
            for name in parameterized.parameter_names() {
                println!("  {}: {}", name, parameterized.parameter_description(name)?);
            }
        }
    }
    Ok(())
}

fn print_schema() -> anyhow::Result<()> {
    let schema = schemars::schema_for!(Vec<Violation>);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
