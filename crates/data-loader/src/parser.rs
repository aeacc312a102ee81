//! Line-level parsing helpers shared by the dataset loaders.
//!
//! - reading a file into lines with a readable error when it is missing
//! - CSV header lookup and field splitting (double-quoted fields allowed)
//! - typed field conversion carrying file / line context
//! - integer lists such as `[12, 7, 42]`

use crate::error::{LoadError, Result};
use std::collections::HashMap;
use std::fmt::Display;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::str::FromStr;

/// Name of a file, for error messages.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Reads a whole file into lines.
///
/// Invalid UTF-8 sequences are replaced rather than rejected; the datasets
/// handled here are ASCII.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => LoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => LoadError::IoError(e),
    })?;
    let content = String::from_utf8_lossy(&bytes);
    Ok(content.lines().map(|s| s.to_string()).collect())
}

/// Splits one CSV line on commas.
///
/// A field wrapped in double quotes may contain commas; `""` inside it is a
/// literal quote.
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Column positions of a CSV file, looked up by name.
#[derive(Debug, Clone)]
pub struct CsvHeader {
    file: String,
    columns: HashMap<String, usize>,
}

impl CsvHeader {
    pub fn parse(file: &str, line: &str) -> Self {
        let columns = split_csv_line(line)
            .into_iter()
            .enumerate()
            .map(|(idx, name)| (name.trim().to_string(), idx))
            .collect();
        Self {
            file: file.to_string(),
            columns,
        }
    }

    /// Position of a required column.
    pub fn index(&self, column: &str) -> Result<usize> {
        self.columns
            .get(column)
            .copied()
            .ok_or_else(|| LoadError::MissingColumn {
                file: self.file.clone(),
                column: column.to_string(),
            })
    }
}

/// Converts field `idx` of a split line, naming `column` on failure.
pub fn parse_field<T>(fields: &[String], idx: usize, column: &str, file: &str, line: usize) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = fields.get(idx).ok_or_else(|| LoadError::ParseError {
        file: file.to_string(),
        line,
        reason: format!("Missing {}", column),
    })?;
    raw.trim().parse().map_err(|e| LoadError::ParseError {
        file: file.to_string(),
        line,
        reason: format!("Invalid {}: {}", column, e),
    })
}

/// Extracts every non-negative integer of a list such as `[12, 7, 42]`.
///
/// Any run of non-digit characters separates two values, so brackets,
/// commas and whitespace need no special handling.
pub fn parse_id_list(s: &str, file: &str, line: usize) -> Result<Vec<u64>> {
    s.split(|c: char| !c.is_ascii_digit())
        .filter(|token| !token.is_empty())
        .map(|token| {
            token.parse().map_err(|e| LoadError::ParseError {
                file: file.to_string(),
                line,
                reason: format!("Invalid id '{}' in list: {}", token, e),
            })
        })
        .collect()
}
