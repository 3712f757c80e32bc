//! CSV record sink.
//!
//! Every field is quoted (inner quotes doubled), fields are comma separated
//! and rows end with `\n`. [`parse_rows`] reads the same dialect back, so text
//! containing commas, quotes, semicolons or line breaks survives a
//! write/read cycle unchanged.

use crate::models::{CATEGORY_FIELDS, Category, QA_FIELDS, QaRecord};
use std::error::Error;
use std::path::Path;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument};

const DELIMITER: char = ',';
const QUOTE: char = '"';

/// Quote a single field.
fn quote_field(field: &str) -> String {
    let escaped = field.replace(QUOTE, "\"\"");
    format!("{QUOTE}{escaped}{QUOTE}")
}

/// Render one row, terminator included.
pub fn format_row<S: AsRef<str>>(fields: &[S]) -> String {
    let mut line = fields
        .iter()
        .map(|f| quote_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(&DELIMITER.to_string());
    line.push('\n');
    line
}

fn format_records(records: &[QaRecord]) -> String {
    records.iter().map(|r| format_row(&r.to_row())).collect()
}

/// Create (or truncate) `path` and write the QA header plus `records`.
///
/// # Arguments
///
/// * `path` - Destination file; its directory must already exist
/// * `records` - Rows to write after the header, in order
///
/// # Errors
///
/// Returns the underlying I/O error if the file cannot be written.
#[instrument(
    level = "info",
    skip_all,
    fields(path = %path.as_ref().display(), count = records.len())
)]
pub async fn write_records(
    path: impl AsRef<Path>,
    records: &[QaRecord],
) -> Result<(), Box<dyn Error>> {
    let mut out = format_row(&QA_FIELDS);
    out.push_str(&format_records(records));
    fs::write(path.as_ref(), out).await?;
    info!("Wrote QA pairs");
    Ok(())
}

/// Create (or truncate) `path` with only a header row.
pub async fn write_header(path: impl AsRef<Path>, fields: &[&str]) -> Result<(), Box<dyn Error>> {
    fs::write(path.as_ref(), format_row(fields)).await?;
    Ok(())
}

/// Append `records` to an existing file, creating it if needed.
///
/// No header is written; pair with [`write_header`] to build a file one
/// batch at a time.
#[instrument(
    level = "debug",
    skip_all,
    fields(path = %path.as_ref().display(), count = records.len())
)]
pub async fn append_records(
    path: impl AsRef<Path>,
    records: &[QaRecord],
) -> Result<(), Box<dyn Error>> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path.as_ref())
        .await?;
    file.write_all(format_records(records).as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

/// Write the WHO category listing (`url,category`).
#[instrument(
    level = "info",
    skip_all,
    fields(path = %path.as_ref().display(), count = categories.len())
)]
pub async fn write_categories(
    path: impl AsRef<Path>,
    categories: &[Category],
) -> Result<(), Box<dyn Error>> {
    let mut out = format_row(&CATEGORY_FIELDS);
    for category in categories {
        out.push_str(&format_row(&category.to_row()));
    }
    fs::write(path.as_ref(), out).await?;
    info!("Wrote category listing");
    Ok(())
}

/// Read a file written by this module back into rows (header included).
///
/// # Errors
///
/// I/O errors, or a [`CsvParseError`] when the text is not valid CSV.
pub async fn read_rows(path: impl AsRef<Path>) -> Result<Vec<Vec<String>>, Box<dyn Error>> {
    let text = fs::read_to_string(path.as_ref()).await?;
    Ok(parse_rows(&text)?)
}

/// Malformed CSV input.
#[derive(Debug, thiserror::Error)]
#[error("csv line {line}: {message}")]
pub struct CsvParseError {
    pub line: usize,
    pub message: &'static str,
}

/// Split CSV text into rows of unescaped fields.
///
/// Accepts quoted and bare fields, `""` escapes and line breaks inside
/// quoted fields. A trailing newline does not produce an empty row.
pub fn parse_rows(text: &str) -> Result<Vec<Vec<String>>, CsvParseError> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut field_started = false;
    let mut line = 1usize;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                QUOTE if chars.peek() == Some(&QUOTE) => {
                    chars.next();
                    field.push(QUOTE);
                }
                QUOTE => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            QUOTE if field.is_empty() => {
                in_quotes = true;
                field_started = true;
            }
            QUOTE => {
                return Err(CsvParseError {
                    line,
                    message: "quote inside unquoted field",
                });
            }
            DELIMITER => {
                row.push(std::mem::take(&mut field));
                field_started = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
                field_started = false;
                line += 1;
            }
            _ => {
                field.push(c);
                field_started = true;
            }
        }
    }

    if in_quotes {
        return Err(CsvParseError {
            line,
            message: "unterminated quoted field",
        });
    }
    if field_started || !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    Ok(rows)
}
