//! Type text through a keyboard session and print the resulting document
//!
//! Every input character is sent as a key press, so expansion happens exactly
//! as it would on the keyboard. A line starting with `@` is a control line:
//! `@move` reports an external cursor move, `@back` a backspace.
//!
//! Usage:
//!   echo "hello brb " | cargo run -p expand_text -- --abbr brb="be right back"
//!   cargo run -p expand_text -- --db data/abbreviations.redb --input notes.txt
//!   cargo run -p expand_text -- --config expansion.toml --direct < notes.txt

use anyhow::Context;
use clap::Parser;
use libabbrev_core::{unescape, AbbreviationStore, ExpansionConfig, KeyEvent, KeyboardSession};
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "expand_text")]
#[command(about = "Simulate typing text through the abbreviation expander")]
struct Args {
    /// Path to the abbreviation database (overrides the config file)
    #[arg(short, long)]
    db: Option<PathBuf>,

    /// TOML expansion config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Extra abbreviation as TRIGGER=EXPANSION (repeatable, `\n` and `\\` escapes allowed)
    #[arg(short, long = "abbr", value_parser = parse_abbr)]
    abbreviations: Vec<(String, String)>,

    /// Check the text before the cursor instead of the typed buffer
    #[arg(long)]
    direct: bool,

    /// Read input from a file instead of stdin
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn parse_abbr(s: &str) -> Result<(String, String), String> {
    let (trigger, expansion) = s
        .split_once('=')
        .ok_or_else(|| format!("expected TRIGGER=EXPANSION, got '{}'", s))?;
    Ok((trigger.to_string(), unescape(expansion)))
}

/// Plain-text document with a character cursor.
struct Document {
    text: String,
    cursor: usize,
}

impl Document {
    fn before_cursor(&self) -> String {
        self.text.chars().take(self.cursor).collect()
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if args.verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => ExpansionConfig::load_toml(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ExpansionConfig::default(),
    };
    if args.db.is_some() {
        config.store_path = args.db.clone();
    }
    if args.direct {
        config.track_typed_buffer = false;
    }

    let session = KeyboardSession::from_config(config)
        .map_err(|e| anyhow::anyhow!("Failed to open abbreviation store: {}", e))?;
    seed(session.tracker().lookup(), &args.abbreviations)?;

    let input = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let mut doc = Document {
        text: String::new(),
        cursor: 0,
    };
    let mut expansions = 0usize;

    for line in input.split_inclusive('\n') {
        let keys = match line.trim_end_matches('\n') {
            "@move" => vec![KeyEvent::CursorMoved],
            "@back" => vec![KeyEvent::Backspace],
            _ => line.chars().map(KeyEvent::Char).collect(),
        };
        for key in keys {
            let before = doc.before_cursor();
            let action = session.process_key(key, Some(before.as_str()))?;
            if matches!(action, libabbrev_core::EditAction::Expand { .. }) {
                expansions += 1;
            }
            action.apply(&mut doc.text, &mut doc.cursor);
        }
    }

    print!("{}", doc.text);
    if !doc.text.ends_with('\n') {
        println!();
    }
    eprintln!("[{} expansions, cursor at {}]", expansions, doc.cursor);
    Ok(())
}

fn seed(store: &AbbreviationStore, entries: &[(String, String)]) -> anyhow::Result<()> {
    for (trigger, expansion) in entries {
        store
            .insert_or_update(trigger, expansion, None)
            .map_err(|e| anyhow::anyhow!("Invalid abbreviation '{}': {}", trigger, e))?;
    }
    tracing::debug!(count = entries.len(), "seeded abbreviations");
    Ok(())
}
