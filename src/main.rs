use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use family_geodata::config::{
    DEFAULT_AREA_CODE_SOURCE, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_OUTPUT, DEFAULT_ZIP_SOURCE,
};
use family_geodata::{run_append_schema, run_build, DocumentIndex, PersistedDocument, PhoneCheck, PipelineConfig};

#[derive(Parser)]
#[command(name = "family-geodata")]
#[command(about = "Build the ZIP geography and area code reference document", long_about = None)]
#[command(version)]
struct Cli {
    /// Persisted JSON document
    #[arg(short, long, global = true, env = "GEODATA_OUTPUT", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// ZIP code CSV (URL, file:// URL or path)
    #[arg(long, global = true, env = "GEODATA_ZIP_SOURCE", default_value = DEFAULT_ZIP_SOURCE)]
    zip_source: String,

    /// Area code CSV (URL, file:// URL or path)
    #[arg(long, global = true, env = "GEODATA_AREA_CODE_SOURCE", default_value = DEFAULT_AREA_CODE_SOURCE)]
    area_code_source: String,

    /// Seconds to wait for each source
    #[arg(long, global = true, env = "GEODATA_FETCH_TIMEOUT_SECS", default_value_t = DEFAULT_FETCH_TIMEOUT_SECS)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch both sources, rebuild the dataset and merge it into the document (default)
    Build,
    /// Refresh the schema block of an existing document in place
    AppendSchema,
    /// Query an existing document
    Lookup {
        /// ZIP code to resolve
        #[arg(long, conflicts_with = "phone", required_unless_present = "phone")]
        zip: Option<String>,

        /// Phone number whose area code should be checked
        #[arg(long)]
        phone: Option<String>,
    },
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("❌ {:#}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = PipelineConfig::default()
        .with_output(&cli.output)
        .with_sources(&cli.zip_source, &cli.area_code_source)
        .with_timeout_secs(cli.timeout_secs);

    match cli.command.unwrap_or(Command::Build) {
        Command::Build => run_build_mode(&config),
        Command::AppendSchema => run_append_mode(&config.output_path),
        Command::Lookup { zip, phone } => run_lookup(&config.output_path, zip, phone),
    }
}

fn run_build_mode(config: &PipelineConfig) -> Result<()> {
    let summary = run_build(config).context("Build failed")?;

    println!("✓ Wrote: {}", summary.output_path.display());
    println!("  Geography rows: {}", summary.report.geography_rows);
    println!("  Unique area codes: {}", summary.report.unique_area_codes);
    if summary.report.unresolved_states > 0 {
        println!("  Unresolved states: {}", summary.report.unresolved_states);
    }
    println!("  SHA-256: {}", summary.digest);

    Ok(())
}

fn run_append_mode(path: &Path) -> Result<()> {
    let digest = run_append_schema(path)
        .with_context(|| format!("Could not append schema to {}", path.display()))?;

    println!("✓ Appended schema to: {}", path.display());
    println!("  SHA-256: {}", digest);

    Ok(())
}

fn run_lookup(path: &Path, zip: Option<String>, phone: Option<String>) -> Result<()> {
    let document = PersistedDocument::load(path)
        .with_context(|| format!("Could not read {}", path.display()))?;
    let index = DocumentIndex::from_document(document)?;

    if let Some(zip) = zip {
        match index.find_zip(&zip) {
            Some(record) => println!("{}", serde_json::to_string_pretty(record)?),
            None => {
                eprintln!("❌ No geography record for ZIP {}", zip.trim());
                std::process::exit(2);
            }
        }
    }

    if let Some(phone) = phone {
        match index.check_phone(&phone) {
            PhoneCheck::Incomplete => println!("… Fewer than 10 digits, not checked"),
            PhoneCheck::Valid { area_code } => println!("✓ Area code {} is valid", area_code),
            PhoneCheck::UnknownAreaCode { area_code } => {
                eprintln!("❌ Invalid Phone Number. Unknown area code {}", area_code);
                std::process::exit(2);
            }
        }
    }

    Ok(())
}
