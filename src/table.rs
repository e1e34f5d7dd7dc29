//! Tabular data parsed out of model answers.
//!
//! Models are asked to emit tables as fenced ```csv blocks. [`Table`] parses
//! those bodies (RFC 4180 style: quoted fields, doubled quotes, delimiters
//! and newlines inside quotes), renders them as GFM pipe tables for display,
//! and serialises them back to CSV for export.

use serde::{Deserialize, Serialize};

/// A rectangular table: one header row plus data rows.
///
/// Every row has exactly `headers.len()` cells; ragged input is padded with
/// empty cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Parse comma-separated text. Returns `None` when there is no row.
    pub fn parse_csv(input: &str) -> Option<Self> {
        Self::parse_delimited(input, ',')
    }

    /// Parse tab-separated text. Returns `None` when there is no row.
    pub fn parse_tsv(input: &str) -> Option<Self> {
        Self::parse_delimited(input, '\t')
    }

    /// Parse delimiter-separated text; the first non-blank record is the header.
    pub fn parse_delimited(input: &str, delimiter: char) -> Option<Self> {
        let mut records = parse_records(input, delimiter).into_iter();
        let mut headers = records.next()?;
        let mut rows: Vec<Vec<String>> = records.collect();

        let width = rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(headers.len()))
            .max()
            .unwrap_or(0);
        headers.resize(width, String::new());
        for row in &mut rows {
            row.resize(width, String::new());
        }

        Some(Self { headers, rows })
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Serialise as CSV with `\n` line endings and a trailing newline.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        for record in std::iter::once(&self.headers).chain(self.rows.iter()) {
            let line: Vec<String> = record.iter().map(|c| quote_csv_field(c)).collect();
            out.push_str(&line.join(","));
            out.push('\n');
        }
        out
    }

    /// Render as a GFM pipe table (no trailing newline).
    pub fn to_markdown(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        lines.push(markdown_row(&self.headers));
        let sep: String = std::iter::once("|")
            .chain(std::iter::repeat_n(" --- |", self.headers.len().max(1)))
            .collect();
        lines.push(sep);
        for row in &self.rows {
            lines.push(markdown_row(row));
        }
        lines.join("\n")
    }
}

fn markdown_row(cells: &[String]) -> String {
    let escaped: Vec<String> = cells
        .iter()
        .map(|c| c.replace('|', "\\|").replace('\n', " "))
        .collect();
    format!("| {} |", escaped.join(" | "))
}

fn quote_csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Split `input` into records of trimmed fields, skipping blank lines.
fn parse_records(input: &str, delimiter: char) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = input.chars().peekable();

    let mut finish_record = |record: &mut Vec<String>, field: &mut String| {
        record.push(field.trim().to_string());
        field.clear();
        let blank = record.len() == 1 && record[0].is_empty();
        let taken = std::mem::take(record);
        if !blank {
            records.push(taken);
        }
    };

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
            }
            c if c == delimiter && !in_quotes => {
                record.push(field.trim().to_string());
                field.clear();
            }
            '\r' if !in_quotes => {}
            '\n' if !in_quotes => finish_record(&mut record, &mut field),
            _ => field.push(c),
        }
    }
    if !field.is_empty() || !record.is_empty() {
        finish_record(&mut record, &mut field);
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple() {
        let t = Table::parse_csv("a,b,c\n1,2,3").unwrap();
        assert_eq!(t.headers, vec!["a", "b", "c"]);
        assert_eq!(t.rows, vec![vec!["1", "2", "3"]]);
    }

    #[test]
    fn parse_quoted_with_comma_and_escaped_quote() {
        let t = Table::parse_csv("name,quote\n\"Smith, J\",\"say \"\"hi\"\"\"").unwrap();
        assert_eq!(t.rows[0], vec!["Smith, J", "say \"hi\""]);
    }

    #[test]
    fn parse_newline_inside_quotes() {
        let t = Table::parse_csv("item,notes\nA,\"line one\nline two\"\nB,x").unwrap();
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.rows[0][1], "line one\nline two");
    }

    #[test]
    fn ragged_rows_are_padded() {
        let t = Table::parse_csv("a,b,c\n1\n1,2,3,4").unwrap();
        assert_eq!(t.column_count(), 4);
        assert_eq!(t.rows[0], vec!["1", "", "", ""]);
        assert_eq!(t.headers[3], "");
    }

    #[test]
    fn blank_lines_and_crlf_are_ignored() {
        let t = Table::parse_csv("\r\na,b\r\n\r\n1,2\r\n").unwrap();
        assert_eq!(t.headers, vec!["a", "b"]);
        assert_eq!(t.row_count(), 1);
    }

    #[test]
    fn empty_input_has_no_table() {
        assert!(Table::parse_csv("").is_none());
        assert!(Table::parse_csv("\n  \n").is_none());
    }

    #[test]
    fn tsv_uses_tabs() {
        let t = Table::parse_tsv("a\tb\n1,5\t2").unwrap();
        assert_eq!(t.rows[0], vec!["1,5", "2"]);
    }

    #[test]
    fn to_csv_quotes_when_needed() {
        let t = Table {
            headers: vec!["name".into(), "amount".into()],
            rows: vec![vec!["Smith, J".into(), "1\"000".into()]],
        };
        assert_eq!(t.to_csv(), "name,amount\n\"Smith, J\",\"1\"\"000\"\n");
    }

    #[test]
    fn to_markdown_escapes_pipes() {
        let t = Table::parse_csv("a,b\nx|y,2").unwrap();
        assert_eq!(t.to_markdown(), "| a | b |\n| --- | --- |\n| x\\|y | 2 |");
    }
}
