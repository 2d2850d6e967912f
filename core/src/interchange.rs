//! Text interchange helpers shared by the import/export tools.
//!
//! CSV rows are `abbreviation,expansion`. Fields written by
//! [`quote_csv_field`] are always quoted, with `"` doubled and newlines and
//! backslashes escaped as `\n` and `\\` so every row stays on one line.
//! [`parse_csv`] reads those rows back, and also accepts hand-written files
//! with unquoted fields.

/// Expand `\n` to a newline and `\x` to `x`; a trailing lone `\` is kept.
///
/// Also used for expansions given on the command line, where a literal
/// newline is awkward to type.
pub fn unescape(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Inverse of [`unescape`].
pub fn escape(field: &str) -> String {
    field.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Escape and quote one CSV field.
pub fn quote_csv_field(field: &str) -> String {
    format!("\"{}\"", escape(field).replace('"', "\"\""))
}

/// Parse CSV content into `(abbreviation, expansion)` pairs.
///
/// A first line starting with `abbreviation` is a header. Blank lines and
/// lines starting with `#` are skipped, as are rows with fewer than two
/// fields.
pub fn parse_csv(content: &str) -> Vec<(String, String)> {
    let mut entries = Vec::new();
    let mut lines = content.lines();

    if let Some(first_line) = lines.next() {
        if !first_line.to_lowercase().starts_with("abbreviation") {
            entries.extend(parse_csv_line(first_line));
        }
    }

    for line in lines {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        entries.extend(parse_csv_line(line));
    }

    entries
}

/// Parse one CSV row. Unquoted fields are trimmed; quoted ones are kept as
/// written, so an expansion can start or end with a space.
pub fn parse_csv_line(line: &str) -> Option<(String, String)> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut current = String::new();
    let mut chars = line.chars().peekable();

    let finish = |current: &mut String, quoted: bool| {
        let field = std::mem::take(current);
        if quoted {
            field
        } else {
            field.trim().to_string()
        }
    };

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                chars.next();
                current.push('"');
            }
            '"' => {
                if !in_quotes && current.trim().is_empty() {
                    current.clear();
                }
                in_quotes = !in_quotes;
                quoted = true;
            }
            ',' if !in_quotes => {
                parts.push(finish(&mut current, quoted));
                quoted = false;
            }
            _ if quoted && !in_quotes && ch.is_whitespace() => {}
            _ => current.push(ch),
        }
    }
    parts.push(finish(&mut current, quoted));

    match parts.as_slice() {
        [abbreviation, expansion, ..] => Some((unescape(abbreviation), unescape(expansion))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescape_keeps_escaped_backslash() {
        assert_eq!(unescape("Best,\\n$0"), "Best,\n$0");
        assert_eq!(unescape("C:\\\\new"), "C:\\new");
        assert_eq!(unescape("trailing\\"), "trailing\\");
    }

    #[test]
    fn escape_inverts_unescape() {
        let raw = "a\\nb\nc\\";
        assert_eq!(unescape(&escape(raw)), raw);
    }

    #[test]
    fn csv_with_header_quotes_and_newlines() {
        let csv = "abbreviation,expansion\n\"sig\",\"Best,\\n$0\"\nbrb,be right back\n\"q\",\"say \"\"hi\"\"\"\n";
        assert_eq!(
            parse_csv(csv),
            vec![
                ("sig".to_string(), "Best,\n$0".to_string()),
                ("brb".to_string(), "be right back".to_string()),
                ("q".to_string(), "say \"hi\"".to_string()),
            ]
        );
    }

    #[test]
    fn unquoted_fields_are_trimmed() {
        assert_eq!(
            parse_csv("abbreviation,expansion\nbrb, be right back\n"),
            vec![("brb".to_string(), "be right back".to_string())]
        );
    }

    #[test]
    fn quoted_fields_keep_surrounding_spaces() {
        assert_eq!(
            parse_csv_line("\"pad\", \" x \""),
            Some(("pad".to_string(), " x ".to_string()))
        );
    }

    #[test]
    fn short_rows_are_skipped() {
        assert!(parse_csv("only_one_field\n\n# comment\n").is_empty());
    }
}
