//! Import abbreviations into a store
//!
//! Supported input formats:
//! - JSON: [{"abbreviation": "brb", "expansion": "be right back"}, ...]
//!   (the output of `export_abbreviations --format json`; `id` is ignored)
//! - CSV: abbreviation,expansion header with data rows; `\n` in a field is a newline
//!
//! Usage:
//!   cargo run -p import_abbreviations -- --db data/abbreviations.redb --input abbreviations.json
//!   cargo run -p import_abbreviations -- --db data/abbreviations.redb --input abbreviations.csv --format csv
//!   cargo run -p import_abbreviations -- --db data/abbreviations.redb --input abbreviations.csv --format csv --mode replace

use clap::Parser;
use libabbrev_core::interchange::parse_csv;
use libabbrev_core::AbbreviationStore;
use serde::Deserialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(clap::Parser, Debug)]
#[command(name = "import_abbreviations")]
#[command(about = "Import abbreviations into the abbreviation store")]
struct Args {
    /// Path to the abbreviation database
    #[arg(short, long)]
    db: PathBuf,

    /// Input file containing abbreviations
    #[arg(short, long)]
    input: PathBuf,

    /// Input format: json or csv
    #[arg(short, long, default_value = "json")]
    format: String,

    /// Merge mode: add (default) keeps existing entries, replace drops them
    #[arg(short, long, default_value = "add")]
    mode: String,

    /// Dry run (show what would be imported without actually importing)
    #[arg(long)]
    dry_run: bool,
}

#[derive(Deserialize)]
struct Entry {
    abbreviation: String,
    expansion: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let content = std::fs::read_to_string(&args.input)
        .map_err(|e| anyhow::anyhow!("Failed to read input file: {}", e))?;

    let entries = match args.format.as_str() {
        "json" => parse_json(&content)?,
        "csv" => parse_csv(&content),
        _ => anyhow::bail!("Unsupported format: {}. Use 'json' or 'csv'", args.format),
    };

    println!("Parsed {} abbreviations from {}", entries.len(), args.input.display());

    if args.dry_run {
        println!("\n[DRY RUN] Would import:");
        for (abbreviation, expansion) in entries.iter().take(10) {
            println!("  {} -> {:?}", abbreviation, expansion);
        }
        if entries.len() > 10 {
            println!("  ... and {} more", entries.len() - 10);
        }
        return Ok(());
    }

    let store = AbbreviationStore::new_redb(&args.db)
        .map_err(|e| anyhow::anyhow!("Failed to open abbreviation store: {}", e))?;

    match args.mode.as_str() {
        "add" => {
            println!("Importing in ADD mode (existing triggers get the new expansion)...");
            for (abbreviation, expansion) in &entries {
                store
                    .insert_or_update(abbreviation, expansion, None)
                    .map_err(|e| anyhow::anyhow!("Failed to import '{}': {}", abbreviation, e))?;
            }
        }
        "replace" => {
            println!("Importing in REPLACE mode (existing abbreviations are removed)...");
            store
                .replace_with(&entries)
                .map_err(|e| anyhow::anyhow!("Import rejected, store unchanged: {}", e))?;
        }
        _ => anyhow::bail!("Unsupported mode: {}. Use 'add' or 'replace'", args.mode),
    }

    tracing::info!(count = entries.len(), mode = %args.mode, "import finished");
    println!("✓ Import complete!");
    Ok(())
}

fn parse_json(content: &str) -> anyhow::Result<Vec<(String, String)>> {
    let entries: Vec<Entry> = serde_json::from_str(content)
        .map_err(|e| anyhow::anyhow!("Failed to parse JSON: {}", e))?;
    Ok(entries
        .into_iter()
        .map(|e| (e.abbreviation, e.expansion))
        .collect())
}
