//! Result types produced by extraction and question answering.

use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the text of a document was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Read from the PDF's embedded text layer.
    TextLayer,
    /// Recognised from rasterised page images.
    Ocr,
}

impl ExtractionMethod {
    pub fn used_ocr(self) -> bool {
        matches!(self, ExtractionMethod::Ocr)
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionMethod::TextLayer => f.write_str("text layer"),
            ExtractionMethod::Ocr => f.write_str("OCR"),
        }
    }
}

/// Text extracted from one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extraction {
    /// Name of the loaded file (no directory).
    pub file_name: String,
    /// Hex SHA-256 of the PDF bytes; identifies the document.
    #[serde(default)]
    pub content_hash: String,
    /// Full extracted text. OCR output carries `--- Page N ---` markers.
    pub text: String,
    pub method: ExtractionMethod,
    pub page_count: usize,
    pub duration_ms: u64,
}

impl Extraction {
    /// Number of characters (not bytes) in the extracted text.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// First `max_chars` characters of the text, followed by `...` when the
    /// text is longer.
    pub fn preview(&self, max_chars: usize) -> String {
        preview_text(&self.text, max_chars)
    }
}

/// Truncate `text` to `max_chars` characters, appending `...` if anything
/// was cut.
pub fn preview_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// PDF metadata, available without a model provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}

/// One display segment of a model answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerSegment {
    /// Free-form text, rendered as Markdown.
    Prose { text: String },
    /// A table parsed from a fenced csv/tsv block.
    Table { table: Table },
}

/// A model answer to one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    /// The model output exactly as received.
    pub raw: String,
    /// `raw` split into prose and table segments, in source order.
    pub segments: Vec<AnswerSegment>,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub duration_ms: u64,
    pub retries: u32,
}

impl Answer {
    /// Tables found in the answer, in order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.segments.iter().filter_map(|s| match s {
            AnswerSegment::Table { table } => Some(table),
            AnswerSegment::Prose { .. } => None,
        })
    }

    pub fn has_tables(&self) -> bool {
        self.tables().next().is_some()
    }

    /// Render the answer for a terminal: prose as-is, tables as GFM pipe tables.
    pub fn to_markdown(&self) -> String {
        let parts: Vec<String> = self
            .segments
            .iter()
            .map(|s| match s {
                AnswerSegment::Prose { text } => text.trim().to_string(),
                AnswerSegment::Table { table } => table.to_markdown(),
            })
            .collect();
        let mut out = parts.join("\n\n");
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out
    }
}
