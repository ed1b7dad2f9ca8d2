use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use indexmap::IndexMap;
use serde::Serialize;

use oah_core::config::{self, CONFIG_FILE_NAME, OahConfig, OutputFormat};
use oah_core::parse::{self, spec::SpecVersion};
use oah_core::snippet::Target;
use oah_core::{ApiDocument, TranslateOptions, Translator};

#[derive(Parser)]
#[command(name = "oah", about = "OpenAPI / Swagger to HAR request translator", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print HAR request records for every operation, or for one
    Har {
        /// Path to the API description (YAML or JSON)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Path template of a single operation, e.g. /pets/{id}
        #[arg(long, requires = "method")]
        path: Option<String>,

        /// HTTP method of a single operation
        #[arg(long, requires = "path")]
        method: Option<String>,

        /// Parameter value as name=json, e.g. --value id=5 --value 'tags=["a"]'
        #[arg(long = "value", value_name = "NAME=JSON")]
        values: Vec<String>,

        /// Output format
        #[arg(long)]
        format: Option<Format>,
    },

    /// List operations grouped by resource
    Endpoints {
        /// Path to the API description
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output format
        #[arg(long)]
        format: Option<Format>,
    },

    /// Check that a description parses and translates
    Validate {
        /// Path to the API description
        #[arg(short, long)]
        input: PathBuf,
    },

    /// List snippet targets, or validate the given target ids
    Targets {
        /// Target ids such as shell_curl or node_request
        ids: Vec<String>,
    },

    /// Initialize a new oah configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

impl From<OutputFormat> for Format {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => Format::Json,
            OutputFormat::Yaml => Format::Yaml,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Har {
            input,
            path,
            method,
            values,
            format,
        } => cmd_har(input, path.zip(method), values, format),

        Commands::Endpoints { input, format } => cmd_endpoints(input, format),

        Commands::Validate { input } => cmd_validate(input),

        Commands::Targets { ids } => cmd_targets(ids),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "oah", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<OahConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    config::load_config(&config_path).map_err(|e| anyhow::anyhow!(e))
}

fn load_document(path: &Path) -> Result<ApiDocument> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");

    let document = match ext {
        "json" => parse::from_json(&content),
        _ => parse::from_yaml(&content),
    }
    .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(document)
}

/// Parse `name=json` pairs. A value that is not valid JSON is taken as a
/// plain string.
fn parse_values(raw: &[String]) -> Result<IndexMap<String, serde_json::Value>> {
    raw.iter()
        .map(|pair| {
            let (name, value) = pair
                .split_once('=')
                .with_context(|| format!("expected NAME=JSON, got {}", pair))?;
            let value = serde_json::from_str(value)
                .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
            Ok::<_, anyhow::Error>((name.to_string(), value))
        })
        .collect()
}

fn print_output<T: Serialize>(value: &T, format: Format) -> Result<()> {
    match format {
        Format::Yaml => {
            let yaml = serde_yaml_ng::to_string(value)?;
            print!("{}", yaml);
        }
        Format::Json => {
            let json = serde_json::to_string_pretty(value)?;
            println!("{}", json);
        }
    }
    Ok(())
}

fn cmd_har(
    input: Option<PathBuf>,
    operation: Option<(String, String)>,
    values: Vec<String>,
    format: Option<Format>,
) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let input = input.unwrap_or_else(|| PathBuf::from(&cfg.input));
    log::debug!("reading {}", input.display());
    let document = load_document(&input)?;
    let translator = Translator::new(TranslateOptions::from(&cfg));

    let requests = match operation {
        Some((path, method)) => {
            let values = parse_values(&values)?;
            translator
                .translate_one(&document, &path, &method, &values)
                .with_context(|| format!("failed to translate {} {}", method, path))?
        }
        None => {
            if !values.is_empty() {
                eprintln!(
                    "note: --value only applies with --path and --method; use `values` in {} instead",
                    CONFIG_FILE_NAME
                );
            }
            translator.translate(&document)?
        }
    };

    print_output(&requests, format.unwrap_or_else(|| cfg.format.into()))
}

fn cmd_endpoints(input: Option<PathBuf>, format: Option<Format>) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let input = input.unwrap_or_else(|| PathBuf::from(&cfg.input));
    let document = load_document(&input)?;
    let endpoints = Translator::new(TranslateOptions::from(&cfg)).endpoints(&document)?;

    print_output(&endpoints, format.unwrap_or_else(|| cfg.format.into()))
}

fn cmd_validate(input: PathBuf) -> Result<()> {
    let document = load_document(&input)?;

    let family = match document.version {
        SpecVersion::Swagger2 => "Swagger 2.0",
        SpecVersion::OpenApi3 => "OpenAPI 3.x",
    };
    eprintln!("Valid {} description: {}", family, document.spec.info.title);
    eprintln!("  Version: {}", document.spec.info.version);
    eprintln!("  Paths: {}", document.spec.paths.len());

    let operations: usize = document
        .spec
        .paths
        .values()
        .map(|item| item.operations().count())
        .sum();
    eprintln!("  Operations: {}", operations);

    // Also validate that every operation translates
    let requests = Translator::new(TranslateOptions::default()).translate(&document)?;
    eprintln!("  Requests: {}", requests.len());

    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_targets(ids: Vec<String>) -> Result<()> {
    let ids = if ids.is_empty() {
        try_load_config()?.map(|c| c.targets).unwrap_or_default()
    } else {
        ids
    };

    if ids.is_empty() {
        for target in Target::all() {
            println!(
                "{:<12} {:<14} {}",
                target.language,
                target.client,
                target.clients().join(", ")
            );
        }
        return Ok(());
    }

    for id in &ids {
        let target = Target::parse(id)?;
        println!("{:<20} {}", target.id, target.title());
    }
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
