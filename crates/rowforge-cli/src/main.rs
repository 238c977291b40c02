mod config;
mod diagram;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use rowforge_generate::{GenerateOptions, GenerationEngine, RowCounts};
use rowforge_schema::{AttributeCatalog, diagram_data, load_definition_path, parse_definition_path};
use rowforge_validate::ValidationEngine;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Schema(#[from] rowforge_schema::Error),
    #[error(transparent)]
    Generation(#[from] rowforge_generate::GenerationError),
    #[error(transparent)]
    Validation(#[from] rowforge_validate::ValidateError),
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("validation found {0} violation(s)")]
    Violations(u64),
}

#[derive(Parser, Debug)]
#[command(name = "rowforge", version, about = "Referentially-consistent test data generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate CSV datasets from a schema definition.
    Generate(GenerateArgs),
    /// Validate existing CSV datasets against a schema definition.
    Validate(ValidateArgs),
    /// Emit a mermaid ER diagram for a schema definition.
    Diagram(DiagramArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Schema definition file (YAML).
    #[arg(long, value_name = "FILE")]
    definition: PathBuf,
    /// Output directory for CSV files.
    #[arg(long, default_value = "out")]
    out: PathBuf,
    /// Default row count for entities without a configured count.
    #[arg(long, default_value_t = 10)]
    rows: u64,
    /// Optional per-entity row count file (TOML).
    #[arg(long, value_name = "FILE")]
    counts: Option<PathBuf>,
    /// Seed for reproducible output.
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Disable row-count based one-to-one/one-to-many inference.
    #[arg(long)]
    no_auto_cardinality: bool,
    /// Keep relationship edges even when they close a dependency cycle.
    #[arg(long)]
    no_prevent_cycles: bool,
    /// Skip writing generation_report.json.
    #[arg(long)]
    no_report: bool,
    /// Validate the generated rows after generation.
    #[arg(long)]
    validate: bool,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Schema definition file (YAML).
    #[arg(long, value_name = "FILE")]
    definition: PathBuf,
    /// Directory containing one CSV file per entity.
    #[arg(long, value_name = "DIR")]
    dir: PathBuf,
}

#[derive(Args, Debug)]
struct DiagramArgs {
    /// Schema definition file (YAML).
    #[arg(long, value_name = "FILE")]
    definition: PathBuf,
    /// Output file; stdout when omitted.
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,
}

fn main() -> Result<(), CliError> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Validate(args) => run_validate(args),
        Command::Diagram(args) => run_diagram(args),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let schema = load_definition_path(&args.definition)?;
    let counts = match args.counts.as_deref() {
        Some(path) => config::load_counts(path)?,
        None => RowCounts::uniform(),
    };

    let engine = GenerationEngine::new(GenerateOptions {
        out_dir: args.out,
        default_rows: args.rows,
        seed: args.seed,
        auto_cardinality: !args.no_auto_cardinality,
        prevent_cycles: !args.no_prevent_cycles,
        write_report: !args.no_report,
    });
    tracing::info!(
        definition = %args.definition.display(),
        entities = schema.entities.len(),
        "generate started"
    );
    let result = engine.run(&schema, &counts)?;

    println!(
        "generated {} rows across {} entities into {}",
        result.report.total_rows,
        result.report.entities.len(),
        result.out_dir.display()
    );
    for issue in &result.report.warnings {
        println!("warning [{}]: {}", issue.code, issue.message);
    }

    if args.validate {
        let validation = ValidationEngine::new().validate_rows(&schema, &result.row_sets);
        report_violations(&validation.messages())?;
        println!("validation passed: no violations");
    }

    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), CliError> {
    let schema = load_definition_path(&args.definition)?;
    tracing::info!(dir = %args.dir.display(), "validation started");
    let result = ValidationEngine::new().validate_dir(&schema, &args.dir)?;
    report_violations(&result.messages())?;
    println!("validation passed: no violations");
    Ok(())
}

fn report_violations(messages: &[String]) -> Result<(), CliError> {
    if messages.is_empty() {
        return Ok(());
    }
    for message in messages {
        println!("{message}");
    }
    Err(CliError::Violations(messages.len() as u64))
}

fn run_diagram(args: DiagramArgs) -> Result<(), CliError> {
    // Parsed without validation: a schema with broken relationships can
    // still be drawn, the renderer soft-skips what does not resolve.
    let schema = parse_definition_path(&args.definition)?;
    let catalog = AttributeCatalog::new(&schema.entities);
    let rendered = diagram::render_mermaid(&diagram_data(&schema, &catalog));

    match args.out {
        Some(path) => std::fs::write(&path, rendered.as_bytes())?,
        None => print!("{rendered}"),
    }
    Ok(())
}
