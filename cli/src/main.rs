use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use schema_consolidate_core::{ConsolidateOptions, consolidate_document, equal_schemas};
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Serialization format for documents read or written by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Picks the format from a file extension, defaulting to JSON.
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "schema-consolidate", version)]
#[command(about = "Move titled inline schemas into a shared component table")]
struct Cli {
    /// Log progress to stderr (RUST_LOG is honored otherwise).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Consolidate a JSON or YAML document.
    Run(RunArgs),
    /// Compare two schema files structurally.
    Compare(CompareArgs),
    /// Write the default options to a YAML file.
    InitConfig(InitConfigArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Input document (`-` reads from stdin).
    input: PathBuf,
    /// Output path (default: stdout).
    #[arg(long)]
    output: Option<PathBuf>,
    /// Output format (default: same as the input).
    #[arg(long)]
    format: Option<DocumentFormat>,
    /// YAML options file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Key ignored when comparing schemas; repeatable, replaces the configured list.
    #[arg(long = "ignore-key")]
    ignore_keys: Vec<String>,
    /// Write the extraction report as JSON to this path.
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct CompareArgs {
    /// First schema file.
    left: PathBuf,
    /// Second schema file.
    right: PathBuf,
    /// Key ignored during comparison; repeatable (default: description).
    #[arg(long = "ignore-key")]
    ignore_keys: Vec<String>,
    /// Compare every key, including descriptions.
    #[arg(long, conflicts_with = "ignore_keys")]
    strict: bool,
}

#[derive(Debug, Args)]
struct InitConfigArgs {
    /// Destination YAML path.
    path: PathBuf,
    /// Overwrite an existing file.
    #[arg(long)]
    force: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Run(args) => run_consolidate(args),
        Command::Compare(args) => run_compare(args),
        Command::InitConfig(args) => run_init_config(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("schema_consolidate_core=debug,schema_consolidate=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_consolidate(args: RunArgs) -> Result<(), String> {
    let mut options = match &args.config {
        Some(path) => ConsolidateOptions::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => ConsolidateOptions::default(),
    };
    if !args.ignore_keys.is_empty() {
        options.ignore_keys = args.ignore_keys.clone();
    }
    debug!(?options, "resolved options");

    let (document, input_format) = read_document(&args.input)?;
    let result = consolidate_document(&document, &options).map_err(|err| err.to_string())?;

    let format = args.format.unwrap_or(input_format);
    let raw = format_document(&result.document, format)?;
    match &args.output {
        Some(path) => {
            create_parent_dir(path)?;
            fs::write(path, raw)
                .map_err(|err| format!("Failed to write '{}': {err}", path.display()))?;
        }
        None => print!("{raw}"),
    }

    if let Some(path) = &args.report {
        create_parent_dir(path)?;
        let raw = serde_json::to_string_pretty(&result.report)
            .map_err(|err| format!("Failed to serialize report: {err}"))?;
        fs::write(path, raw)
            .map_err(|err| format!("Failed to write '{}': {err}", path.display()))?;
    }

    let report = &result.report;
    eprintln!(
        "Consolidated {} schema(s): {} registered, {} reused, {} renamed.",
        report.len(),
        report.registered_count(),
        report.reused_count(),
        report.renamed().count()
    );

    Ok(())
}

fn run_compare(args: CompareArgs) -> Result<(), String> {
    let (left, _) = read_document(&args.left)?;
    let (right, _) = read_document(&args.right)?;

    let ignore_keys = if args.strict {
        Vec::new()
    } else if args.ignore_keys.is_empty() {
        ConsolidateOptions::default().ignore_keys
    } else {
        args.ignore_keys
    };

    if equal_schemas(&left, &right, &ignore_keys) {
        println!("equal");
        Ok(())
    } else {
        println!("different");
        std::process::exit(1)
    }
}

fn run_init_config(args: InitConfigArgs) -> Result<(), String> {
    if args.path.exists() && !args.force {
        return Err(format!(
            "'{}' already exists (use --force to overwrite)",
            args.path.display()
        ));
    }
    create_parent_dir(&args.path)?;
    ConsolidateOptions::default()
        .save(&args.path)
        .map_err(|err| format!("Failed to write '{}': {err}", args.path.display()))?;
    println!("Wrote default options to '{}'.", args.path.display());
    Ok(())
}

/// Reads a document, returning it with the format it was read as.
///
/// Stdin is parsed as YAML, which also accepts JSON, and reported as JSON.
fn read_document(path: &Path) -> Result<(Value, DocumentFormat), String> {
    if path.as_os_str() == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .map_err(|err| format!("Failed to read stdin: {err}"))?;
        let value = serde_yaml::from_str(&raw)
            .map_err(|err| format!("Failed to parse stdin: {err}"))?;
        return Ok((value, DocumentFormat::Json));
    }

    let raw = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
    let format = DocumentFormat::from_path(path);
    let value = match format {
        DocumentFormat::Json => serde_json::from_str(&raw)
            .map_err(|err| format!("Failed to parse '{}': {err}", path.display()))?,
        DocumentFormat::Yaml => serde_yaml::from_str(&raw)
            .map_err(|err| format!("Failed to parse '{}': {err}", path.display()))?,
    };
    Ok((value, format))
}

fn format_document(document: &Value, format: DocumentFormat) -> Result<String, String> {
    match format {
        DocumentFormat::Json => serde_json::to_string_pretty(document)
            .map(|mut raw| {
                raw.push('\n');
                raw
            })
            .map_err(|err| format!("JSON serialization failed: {err}")),
        DocumentFormat::Yaml => {
            serde_yaml::to_string(document).map_err(|err| format!("YAML serialization failed: {err}"))
        }
    }
}

fn create_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new("api.yaml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("api.YML")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("api.json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("api")), DocumentFormat::Json);
    }

    #[test]
    fn test_cli_parses_repeated_ignore_keys() {
        let cli = Cli::parse_from([
            "schema-consolidate",
            "run",
            "api.json",
            "--ignore-key",
            "description",
            "--ignore-key",
            "example",
        ]);
        match cli.command {
            Command::Run(args) => assert_eq!(args.ignore_keys, vec!["description", "example"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_yaml_output_round_trips() {
        let doc = serde_json::json!({"paths": {"/": {"$ref": "#/components/schemas/Pet"}}});
        let raw = format_document(&doc, DocumentFormat::Yaml).unwrap();
        let parsed: Value = serde_yaml::from_str(&raw).unwrap();
        assert_eq!(parsed, doc);
    }
}
