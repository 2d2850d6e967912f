//! Add, edit, delete and list abbreviations in a store
//!
//! Usage:
//!   cargo run -p manage_abbreviations -- --db data/abbreviations.redb add brb "be right back"
//!   cargo run -p manage_abbreviations -- --db data/abbreviations.redb edit 3 sig 'Best,\n$0'
//!   cargo run -p manage_abbreviations -- --db data/abbreviations.redb delete 3
//!   cargo run -p manage_abbreviations -- --db data/abbreviations.redb list
//!   cargo run -p manage_abbreviations -- --db data/abbreviations.redb lookup "hello BRB"

use clap::{Parser, Subcommand};
use libabbrev_core::{resolve, unescape, AbbreviationStore, ExpansionConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "manage_abbreviations")]
#[command(about = "Manage the abbreviation store")]
struct Args {
    /// Path to the abbreviation database (overrides the config file)
    #[arg(short, long)]
    db: Option<PathBuf>,

    /// TOML config providing `store_path`
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add an abbreviation, or replace the expansion of an existing trigger
    Add {
        abbreviation: String,
        expansion: String,
    },
    /// Edit the abbreviation with the given id
    Edit {
        id: u64,
        abbreviation: String,
        expansion: String,
    },
    /// Delete the abbreviation with the given id
    Delete { id: u64 },
    /// List all abbreviations
    List,
    /// Show what the last word of TEXT would expand to
    Lookup { text: String },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = match &args.config {
        Some(path) => ExpansionConfig::load_toml(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {}", path.display(), e))?,
        None => ExpansionConfig::default(),
    };
    let Some(db) = args.db.clone().or(config.store_path) else {
        anyhow::bail!("No database given. Pass --db or set store_path in --config");
    };

    tracing::debug!(db = %db.display(), "opening abbreviation store");
    let store = AbbreviationStore::new_redb(&db)
        .map_err(|e| anyhow::anyhow!("Failed to open abbreviation store: {}", e))?;

    match args.command {
        Command::Add {
            abbreviation,
            expansion,
        } => {
            let row = store.insert_or_update(&abbreviation, &unescape(&expansion), None)?;
            println!("Saved [{}] {} -> {:?}", row.id, row.abbreviation, row.expansion);
        }
        Command::Edit {
            id,
            abbreviation,
            expansion,
        } => {
            let row = store.insert_or_update(&abbreviation, &unescape(&expansion), Some(id))?;
            println!("Updated [{}] {} -> {:?}", row.id, row.abbreviation, row.expansion);
        }
        Command::Delete { id } => {
            if store.delete(id)? {
                println!("Deleted abbreviation {}", id);
            } else {
                anyhow::bail!("No abbreviation with id {}", id);
            }
        }
        Command::List => {
            let rows = store.all()?;
            if rows.is_empty() {
                println!("No abbreviations in {}", db.display());
            }
            for row in rows {
                println!("{:>5}  {:<16} {:?}", row.id, row.abbreviation, row.expansion);
            }
        }
        Command::Lookup { text } => {
            let result = resolve(&text, &store)?;
            if result.should_expand {
                println!("expands to: {:?}", result.expanded_text);
                println!("delete before: {} chars", result.abbreviation_length);
                match result.cursor_offset {
                    Some(offset) => println!("cursor offset: {}", offset),
                    None => println!("cursor offset: end"),
                }
            } else {
                println!("no expansion");
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_parses_and_unescapes_expansion() {
        let args = Args::try_parse_from([
            "manage_abbreviations",
            "--db",
            "abbr.redb",
            "add",
            "sig",
            "Best,\\n$0",
        ])
        .unwrap();
        let Command::Add { expansion, .. } = args.command else {
            panic!("expected the add subcommand");
        };
        assert_eq!(unescape(&expansion), "Best,\n$0");
    }

    #[test]
    fn escaped_backslash_keeps_literal_backslash_n() {
        assert_eq!(unescape("C:\\\\new"), "C:\\new");
    }

    #[test]
    fn edit_needs_numeric_id() {
        assert!(Args::try_parse_from(["manage_abbreviations", "edit", "x", "a", "b"]).is_err());
    }
}
