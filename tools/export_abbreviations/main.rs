//! Export abbreviations to JSON or CSV format
//!
//! Usage:
//!   cargo run -p export_abbreviations -- --db data/abbreviations.redb --format json
//!   cargo run -p export_abbreviations -- --db data/abbreviations.redb --format csv --output abbreviations.csv
//!
//! CSV output quotes every field and writes newlines inside expansions as the
//! two characters `\n` (and a backslash as `\\`), which `import_abbreviations`
//! turns back into the original text.

use clap::Parser;
use libabbrev_core::interchange::quote_csv_field;
use libabbrev_core::{Abbreviation, AbbreviationStore};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "export_abbreviations")]
#[command(about = "Export abbreviations to JSON or CSV format")]
struct Args {
    /// Path to the abbreviation database
    #[arg(short, long)]
    db: PathBuf,

    /// Output format: json or csv
    #[arg(short, long, default_value = "json")]
    format: String,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let store = AbbreviationStore::new_redb(&args.db)
        .map_err(|e| anyhow::anyhow!("Failed to open abbreviation store: {}", e))?;
    let rows = store.all()?;
    tracing::info!(count = rows.len(), "exporting abbreviations");

    let output = match args.format.as_str() {
        "json" => export_json(&rows)?,
        "csv" => export_csv(&rows),
        _ => anyhow::bail!("Unsupported format: {}. Use 'json' or 'csv'", args.format),
    };

    if let Some(path) = args.output {
        std::fs::write(path, output)?;
    } else {
        print!("{}", output);
    }

    Ok(())
}

fn export_json(rows: &[Abbreviation]) -> anyhow::Result<String> {
    let json = serde_json::to_string_pretty(rows)?;
    Ok(json)
}

fn export_csv(rows: &[Abbreviation]) -> String {
    let mut output = String::from("abbreviation,expansion\n");
    for row in rows {
        output.push_str(&format!(
            "{},{}\n",
            quote_csv_field(&row.abbreviation),
            quote_csv_field(&row.expansion)
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use libabbrev_core::interchange::parse_csv;

    fn row(id: u64, abbreviation: &str, expansion: &str) -> Abbreviation {
        Abbreviation {
            id,
            abbreviation: abbreviation.to_string(),
            expansion: expansion.to_string(),
        }
    }

    #[test]
    fn csv_export_reads_back_unchanged() {
        let rows = vec![
            row(1, "addr", "1 Main St, Springfield"),
            row(2, "path", "C:\\new\\dir"),
            row(3, "q", "say \"hi\""),
            row(4, "sig", "Best,\n$0\nSam"),
            row(5, "lit", "a literal \\n stays"),
            row(6, "pad", " spaced "),
        ];
        let csv = export_csv(&rows);
        assert_eq!(csv.lines().count(), rows.len() + 1);

        let parsed = parse_csv(&csv);
        let expected: Vec<(String, String)> = rows
            .iter()
            .map(|r| (r.abbreviation.clone(), r.expansion.clone()))
            .collect();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn json_export_keeps_ids() {
        let json = export_json(&[row(7, "brb", "be right back")]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["id"], 7);
        assert_eq!(value[0]["expansion"], "be right back");
    }
}
