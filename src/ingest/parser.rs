use std::str::Split;
use std::sync::Arc;

/// One parsed line, keyed by the header of its file.
///
/// The header is shared across all rows of a file; values sit in header
/// order. Rows are never mutated after creation.
#[derive(Debug, Clone)]
pub struct RawRow {
    header: Arc<Vec<String>>,
    values: Vec<String>,
}

impl RawRow {
    /// Look up a column by its exact (case-sensitive) header name.
    /// Returns `None` when the column is absent from the header.
    pub fn get(&self, key: &str) -> Option<&str> {
        let idx = self.header.iter().position(|h| h == key)?;
        Some(self.values[idx].as_str())
    }
}

/// Lazy row iterator over one file's text.
///
/// Restartable: calling [`parse_rows`] on the same text again
/// reproduces the same sequence.
pub struct RowReader<'a> {
    lines: Split<'a, [char; 2]>,
    header: Arc<Vec<String>>,
    required: Option<usize>,
}

impl<'a> RowReader<'a> {
    /// The header fields, trimmed. Empty when the text held no
    /// non-blank line.
    pub fn header(&self) -> &[String] {
        &self.header
    }
}

/// Parse delimited text into rows.
///
/// The first non-blank line is the header. If any of `id_candidates`
/// appears in the header, that column is treated as required and rows
/// leaving it empty are skipped. Blank lines are skipped; short rows
/// are padded with empty fields; overlong rows are truncated to the
/// header width. No single line can abort the file.
pub fn parse_rows<'a>(text: &'a str, id_candidates: &[&str]) -> RowReader<'a> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    // Splitting on both CR and LF covers every line-ending style; the
    // empty fragments a CRLF pair produces fall out with blank lines.
    let mut lines = text.split(['\r', '\n']);

    let mut header = Vec::new();
    for line in lines.by_ref() {
        if line.trim().is_empty() {
            continue;
        }
        header = split_fields(line)
            .into_iter()
            .map(|field| field.trim().to_string())
            .collect();
        break;
    }

    let required = header
        .iter()
        .position(|column| id_candidates.contains(&column.as_str()));

    RowReader {
        lines,
        header: Arc::new(header),
        required,
    }
}

impl<'a> Iterator for RowReader<'a> {
    type Item = RawRow;

    fn next(&mut self) -> Option<RawRow> {
        loop {
            let line = self.lines.next()?;
            if line.trim().is_empty() {
                continue;
            }

            let mut values = split_fields(line);
            if values.len() < self.header.len() {
                values.resize(self.header.len(), String::new());
            }
            values.truncate(self.header.len());

            if let Some(idx) = self.required {
                if values[idx].trim().is_empty() {
                    continue;
                }
            }

            return Some(RawRow {
                header: Arc::clone(&self.header),
                values,
            });
        }
    }
}

/// Comma-delimited, double-quote-escaped field tokenizer.
///
/// A quote toggles quoted state; two consecutive quotes inside a
/// quoted field are one literal quote; commas inside quotes do not
/// separate.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}
