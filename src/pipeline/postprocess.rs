//! Post-processing: split a model answer into prose and table segments.
//!
//! The question prompt asks for tables as fenced ```` ```csv ```` blocks
//! (```` ```tsv ```` is accepted too, tag case-insensitive). [`split_answer`]
//! walks the answer in source order:
//!
//! - text between fences becomes a [`AnswerSegment::Prose`] segment, unless
//!   it is only whitespace
//! - a fenced block that parses into at least one row becomes an
//!   [`AnswerSegment::Table`]
//! - a fenced block that does not parse stays in the prose, verbatim
//!
//! An answer with no tabular fence is a single prose segment.
//!
//! Before splitting, line endings are normalised and invisible Unicode is
//! stripped. The raw answer kept on [`crate::output::Answer`] is untouched.

use crate::output::AnswerSegment;
use crate::table::Table;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_TABLE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?ms)^[ \t]*```[ \t]*((?i:csv|tsv))[ \t]*\n(.*?)^[ \t]*```[ \t]*$").unwrap()
});

/// Split `raw` into display segments in source order.
pub fn split_answer(raw: &str) -> Vec<AnswerSegment> {
    let text = remove_invisible_chars(&normalise_line_endings(raw));
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in RE_TABLE_FENCE.captures_iter(&text) {
        let (Some(whole), Some(tag), Some(body)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        push_prose(&mut segments, &text[last..whole.start()]);

        let delimiter = if tag.as_str().eq_ignore_ascii_case("tsv") {
            '\t'
        } else {
            ','
        };
        match Table::parse_delimited(body.as_str(), delimiter) {
            Some(table) => segments.push(AnswerSegment::Table { table }),
            None => push_prose(&mut segments, whole.as_str()),
        }
        last = whole.end();
    }
    push_prose(&mut segments, &text[last..]);

    segments
}

/// Append prose, merging with a preceding prose segment.
fn push_prose(segments: &mut Vec<AnswerSegment>, text: &str) {
    if text.trim().is_empty() {
        return;
    }
    if let Some(AnswerSegment::Prose { text: prev }) = segments.last_mut() {
        prev.push_str(text);
        return;
    }
    segments.push(AnswerSegment::Prose {
        text: text.to_string(),
    });
}

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}
